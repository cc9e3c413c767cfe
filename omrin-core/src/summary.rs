//! Answers a sensor set needs, computed once per refresh.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{Categories, Category, CollectionEvent};
use crate::query::{event_on, next_event_for, soonest_event};
use crate::sensor::SensorKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Value published for one logical key.
pub enum SensorValue {
    /// A collection day.
    Date(NaiveDate),
    /// A category label.
    Category(Category),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Snapshot of one calendar relative to a reference day.
///
/// Dates and categories are kept as values; formatting happens when a sensor
/// renders its state.
pub struct CollectionSummary {
    /// Day `today` and `tomorrow` are relative to.
    pub reference_day: NaiveDate,
    /// Next organic waste collection.
    pub next_biobak: Option<NaiveDate>,
    /// Next sorted residual waste collection.
    pub next_sortibak: Option<NaiveDate>,
    /// Next paper collection.
    pub next_papierbak: Option<NaiveDate>,
    /// Category collected on the reference day.
    pub today: Option<Category>,
    /// Category collected the day after.
    pub tomorrow: Option<Category>,
    /// Soonest event in the calendar.
    pub next: Option<CollectionEvent>,
}

impl CollectionSummary {
    /// Compute every answer from a fetched calendar.
    #[must_use]
    pub fn from_events(events: &[CollectionEvent], today: NaiveDate) -> Self {
        let tomorrow = today.checked_add_days(Days::new(1));
        Self {
            reference_day: today,
            next_biobak: next_event_for(events, &Categories::Biobak.into()),
            next_sortibak: next_event_for(events, &Categories::Sortibak.into()),
            next_papierbak: next_event_for(events, &Categories::Papierbak.into()),
            today: event_on(events, today).cloned(),
            tomorrow: tomorrow.and_then(|day| event_on(events, day)).cloned(),
            next: soonest_event(events).cloned(),
        }
    }

    /// Value for a logical key, `None` when the calendar has no answer.
    #[must_use]
    pub fn value(&self, kind: SensorKind) -> Option<SensorValue> {
        match kind {
            SensorKind::Biobak => self.next_biobak.map(SensorValue::Date),
            SensorKind::Sortibak => self.next_sortibak.map(SensorValue::Date),
            SensorKind::Papierbak => self.next_papierbak.map(SensorValue::Date),
            SensorKind::Today => self.today.clone().map(SensorValue::Category),
            SensorKind::Tomorrow => self.tomorrow.clone().map(SensorValue::Category),
            SensorKind::Next => self
                .next
                .as_ref()
                .map(|event| SensorValue::Category(event.category.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(year: i32, month: u32, dom: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, dom).unwrap()
    }

    #[test]
    fn summarizes_calendar_for_reference_day() {
        let events = vec![
            CollectionEvent::new(day(2024, 5, 1), "Biobak"),
            CollectionEvent::new(day(2024, 5, 2), "Papierbak"),
            CollectionEvent::new(day(2024, 5, 3), "Sortibak"),
        ];
        let summary = CollectionSummary::from_events(&events, day(2024, 5, 1));

        assert_eq!(summary.next_biobak, Some(day(2024, 5, 1)));
        assert_eq!(summary.next_sortibak, Some(day(2024, 5, 3)));
        assert_eq!(summary.next_papierbak, Some(day(2024, 5, 2)));
        assert_eq!(summary.today, Some(Category::new("Biobak")));
        assert_eq!(summary.tomorrow, Some(Category::new("Papierbak")));
        assert_eq!(
            summary.value(SensorKind::Next),
            Some(SensorValue::Category(Category::new("Biobak")))
        );
    }

    #[test]
    fn next_keeps_the_event_date() {
        let events = vec![CollectionEvent::new(day(2024, 12, 31), "Sortibak")];
        let summary = CollectionSummary::from_events(&events, day(2024, 12, 30));

        assert_eq!(summary.next.map(|event| event.date), Some(day(2024, 12, 31)));
        assert_eq!(summary.tomorrow, Some(Category::new("Sortibak")));
    }

    #[test]
    fn empty_calendar_yields_no_values() {
        let summary = CollectionSummary::from_events(&[], day(2024, 5, 1));
        for kind in SensorKind::ALL {
            assert_eq!(summary.value(kind), None, "{kind:?} should be empty");
        }
    }
}
