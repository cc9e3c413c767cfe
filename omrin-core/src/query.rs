//! Lookups over a calendar as returned by the provider.
//!
//! The provider delivers events in chronological order; none of these helpers
//! sort, they all answer with the first match in list order.

use chrono::NaiveDate;

use crate::model::{Category, CollectionEvent};
use crate::session::DateFormat;

/// Date of the first event collecting `category`.
#[must_use]
pub fn next_event_for(events: &[CollectionEvent], category: &Category) -> Option<NaiveDate> {
    events
        .iter()
        .find(|event| &event.category == category)
        .map(|event| event.date)
}

/// Category of the first event falling on `date`.
#[must_use]
pub fn event_on<'events>(
    events: &'events [CollectionEvent],
    date: NaiveDate,
) -> Option<&'events Category> {
    events
        .iter()
        .find(|event| event.date == date)
        .map(|event| &event.category)
}

/// Earliest event by provider ordering.
#[must_use]
pub fn soonest_event(events: &[CollectionEvent]) -> Option<&CollectionEvent> {
    events.first()
}

/// Render a date with the configured format.
#[must_use]
pub fn format_date(date: NaiveDate, format: &DateFormat) -> String {
    format.render(date)
}

/// Parse a date rendered with [`format_date`].
///
/// # Errors
///
/// Returns a [`chrono::ParseError`] when `text` does not match `format` or the
/// format lacks the components needed to rebuild a calendar date.
pub fn parse_date(text: &str, format: &DateFormat) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(text, format.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(year: i32, month: u32, dom: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, dom).unwrap()
    }

    fn calendar() -> Vec<CollectionEvent> {
        vec![
            CollectionEvent::new(day(2024, 5, 1), "Biobak"),
            CollectionEvent::new(day(2024, 5, 3), "Sortibak"),
            CollectionEvent::new(day(2024, 5, 8), "Papierbak"),
            CollectionEvent::new(day(2024, 5, 15), "Biobak"),
        ]
    }

    #[test]
    fn today_and_next_category_from_provider_list() {
        let events = calendar();
        let today = day(2024, 5, 1);

        assert_eq!(
            event_on(&events, today).map(Category::as_str),
            Some("Biobak")
        );
        assert_eq!(
            next_event_for(&events, &Category::new("Sortibak")),
            Some(day(2024, 5, 3))
        );
    }

    #[test]
    fn next_event_is_first_match_in_list_order() {
        let events = calendar();
        assert_eq!(
            next_event_for(&events, &Category::new("Biobak")),
            Some(day(2024, 5, 1)),
            "the earlier Biobak entry wins"
        );
    }

    #[test]
    fn input_order_is_trusted_over_chronology() {
        let events = vec![
            CollectionEvent::new(day(2024, 6, 1), "Biobak"),
            CollectionEvent::new(day(2024, 5, 1), "Biobak"),
        ];
        assert_eq!(
            next_event_for(&events, &Category::new("Biobak")),
            Some(day(2024, 6, 1))
        );
        assert_eq!(soonest_event(&events).map(|event| event.date), Some(day(2024, 6, 1)));
    }

    #[test]
    fn first_event_on_a_shared_day_wins() {
        let events = vec![
            CollectionEvent::new(day(2024, 5, 1), "Biobak"),
            CollectionEvent::new(day(2024, 5, 1), "Papierbak"),
        ];
        assert_eq!(
            event_on(&events, day(2024, 5, 1)).map(Category::as_str),
            Some("Biobak")
        );
    }

    #[test]
    fn missing_matches_are_none() {
        let events = calendar();
        assert_eq!(next_event_for(&events, &Category::new("Grofvuil")), None);
        assert_eq!(event_on(&events, day(2024, 5, 2)), None);
    }

    #[test]
    fn empty_calendar_answers_none_everywhere() {
        let events: Vec<CollectionEvent> = Vec::new();
        assert_eq!(next_event_for(&events, &Category::new("Biobak")), None);
        assert_eq!(event_on(&events, day(2024, 5, 1)), None);
        assert_eq!(soonest_event(&events), None);
    }

    #[test]
    fn soonest_of_single_event_is_that_event() {
        let only = CollectionEvent::new(day(2024, 5, 3), "Sortibak");
        let events = vec![only.clone()];
        assert_eq!(soonest_event(&events), Some(&only));
    }

    #[test]
    fn formatted_dates_parse_back() {
        for pattern in ["%Y-%m-%d", "%d-%m-%Y", "%A %d %B %Y", "%Y%m%d"] {
            let format = DateFormat::new(pattern).unwrap();
            let date = day(2024, 2, 29);
            let rendered = format_date(date, &format);
            assert_eq!(
                parse_date(&rendered, &format).unwrap(),
                date,
                "round trip through {pattern}"
            );
        }
    }

    #[test]
    fn lossy_format_does_not_parse_back() {
        let format = DateFormat::new("%d %B").unwrap();
        let rendered = format_date(day(2024, 5, 3), &format);
        assert_eq!(rendered, "03 May");
        assert!(parse_date(&rendered, &format).is_err(), "year is missing");
    }

    #[test]
    fn format_with_time_of_day_renders_and_parses_back() {
        let format = DateFormat::new("%Y-%m-%d %H:%M").unwrap();
        let rendered = format_date(day(2024, 5, 3), &format);
        assert_eq!(rendered, "2024-05-03 00:00");
        assert_eq!(parse_date(&rendered, &format).unwrap(), day(2024, 5, 3));
    }
}
