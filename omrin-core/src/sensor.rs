//! Sensor entities exposing a [`CollectionSummary`] to the host.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::query::format_date;
use crate::session::DateFormat;
use crate::summary::{CollectionSummary, SensorValue};

/// Prefix shared by every entity name.
pub const ENTITY_PREFIX: &str = "omrin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Logical keys of the published values.
pub enum SensorKind {
    /// Next organic waste date.
    Biobak,
    /// Next sorted residual waste date.
    Sortibak,
    /// Next paper date.
    Papierbak,
    /// Category collected today.
    Today,
    /// Category collected tomorrow.
    Tomorrow,
    /// Category of the soonest collection.
    Next,
}

impl SensorKind {
    /// Every key, in registration order.
    pub const ALL: [SensorKind; 6] = [
        SensorKind::Biobak,
        SensorKind::Sortibak,
        SensorKind::Papierbak,
        SensorKind::Today,
        SensorKind::Tomorrow,
        SensorKind::Next,
    ];

    /// Lowercase key used in entity names.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            SensorKind::Biobak => "biobak",
            SensorKind::Sortibak => "sortibak",
            SensorKind::Papierbak => "papierbak",
            SensorKind::Today => "today",
            SensorKind::Tomorrow => "tomorrow",
            SensorKind::Next => "next",
        }
    }

    /// Human-friendly label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SensorKind::Biobak => "Biobak",
            SensorKind::Sortibak => "Sortibak",
            SensorKind::Papierbak => "Papierbak",
            SensorKind::Today => "Today",
            SensorKind::Tomorrow => "Tomorrow",
            SensorKind::Next => "Next",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// One published entity.
pub struct WasteSensor {
    kind: SensorKind,
}

impl WasteSensor {
    /// Sensor for a key.
    #[must_use]
    pub fn new(kind: SensorKind) -> Self {
        Self { kind }
    }

    /// The full fixed sensor set.
    #[must_use]
    pub fn all() -> Vec<WasteSensor> {
        SensorKind::ALL.into_iter().map(WasteSensor::new).collect()
    }

    /// Key this sensor publishes.
    #[must_use]
    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Entity name, e.g. `omrin_biobak`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{ENTITY_PREFIX}_{}", self.kind.key())
    }

    /// Display name, e.g. `Omrin Biobak`.
    #[must_use]
    pub fn friendly_name(&self) -> String {
        format!("Omrin {}", self.kind.label())
    }

    /// Rendered state; `None` when the calendar has no answer.
    #[must_use]
    pub fn state(&self, summary: &CollectionSummary, format: &DateFormat) -> Option<String> {
        summary.value(self.kind).map(|value| match value {
            SensorValue::Date(date) => format_date(date, format),
            SensorValue::Category(category) => category.0,
        })
    }

    /// Extra attributes shown next to the state.
    #[must_use]
    pub fn attributes(
        &self,
        summary: &CollectionSummary,
        format: &DateFormat,
    ) -> BTreeMap<&'static str, String> {
        let mut attributes = BTreeMap::new();
        let reference = summary.reference_day;

        let date = match self.kind {
            SensorKind::Biobak | SensorKind::Sortibak | SensorKind::Papierbak => {
                match summary.value(self.kind) {
                    Some(SensorValue::Date(date)) => Some(date),
                    _ => None,
                }
            }
            SensorKind::Next => summary.next.as_ref().map(|event| event.date),
            SensorKind::Today => Some(reference),
            SensorKind::Tomorrow => reference.checked_add_days(Days::new(1)),
        };

        if let Some(date) = date {
            if matches!(self.kind, SensorKind::Next | SensorKind::Today | SensorKind::Tomorrow) {
                attributes.insert("date", format_date(date, format));
            }
            if !matches!(self.kind, SensorKind::Today | SensorKind::Tomorrow) {
                attributes.insert("days_until", days_between(reference, date).to_string());
            }
        }

        attributes
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Rendered view of one sensor, ready for display.
pub struct SensorReading {
    /// Key the reading belongs to.
    pub kind: SensorKind,
    /// Entity name.
    pub name: String,
    /// Display name.
    pub friendly_name: String,
    /// Rendered state, `None` while unknown.
    pub state: Option<String>,
    /// Extra attributes.
    pub attributes: BTreeMap<&'static str, String>,
}

impl WasteSensor {
    /// Render state and attributes; without a summary everything is unknown.
    #[must_use]
    pub fn reading(&self, summary: Option<&CollectionSummary>, format: &DateFormat) -> SensorReading {
        SensorReading {
            kind: self.kind,
            name: self.name(),
            friendly_name: self.friendly_name(),
            state: summary.and_then(|summary| self.state(summary, format)),
            attributes: summary
                .map(|summary| self.attributes(summary, format))
                .unwrap_or_default(),
        }
    }
}

fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CollectionEvent;

    fn day(year: i32, month: u32, dom: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, dom).unwrap()
    }

    fn summary() -> CollectionSummary {
        let events = vec![
            CollectionEvent::new(day(2024, 5, 3), "Sortibak"),
            CollectionEvent::new(day(2024, 5, 10), "Biobak"),
        ];
        CollectionSummary::from_events(&events, day(2024, 5, 1))
    }

    #[test]
    fn entity_names_follow_keys() {
        let names: Vec<String> = WasteSensor::all().iter().map(WasteSensor::name).collect();
        assert_eq!(
            names,
            [
                "omrin_biobak",
                "omrin_sortibak",
                "omrin_papierbak",
                "omrin_today",
                "omrin_tomorrow",
                "omrin_next"
            ]
        );
        assert_eq!(
            WasteSensor::new(SensorKind::Tomorrow).friendly_name(),
            "Omrin Tomorrow"
        );
    }

    #[test]
    fn date_sensor_renders_with_configured_format() {
        let format = DateFormat::new("%d-%m-%Y").unwrap();
        let sensor = WasteSensor::new(SensorKind::Biobak);

        assert_eq!(sensor.state(&summary(), &format).as_deref(), Some("10-05-2024"));
        assert_eq!(
            sensor.attributes(&summary(), &format).get("days_until").map(String::as_str),
            Some("9")
        );
    }

    #[test]
    fn next_sensor_exposes_category_and_date() {
        let format = DateFormat::default();
        let sensor = WasteSensor::new(SensorKind::Next);
        let attributes = sensor.attributes(&summary(), &format);

        assert_eq!(sensor.state(&summary(), &format).as_deref(), Some("Sortibak"));
        assert_eq!(attributes.get("date").map(String::as_str), Some("2024-05-03"));
        assert_eq!(attributes.get("days_until").map(String::as_str), Some("2"));
    }

    #[test]
    fn absent_values_have_no_state() {
        let format = DateFormat::default();
        let summary = summary();

        assert_eq!(WasteSensor::new(SensorKind::Papierbak).state(&summary, &format), None);
        assert!(WasteSensor::new(SensorKind::Papierbak)
            .attributes(&summary, &format)
            .is_empty());
        assert_eq!(WasteSensor::new(SensorKind::Today).state(&summary, &format), None);
        assert_eq!(WasteSensor::new(SensorKind::Next).reading(None, &format).state, None);
        assert_eq!(
            WasteSensor::new(SensorKind::Tomorrow)
                .attributes(&summary, &format)
                .get("date")
                .map(String::as_str),
            Some("2024-05-02")
        );
    }
}
