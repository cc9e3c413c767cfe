//! Session values that used to live in process-wide globals.

use std::fmt::{self, Write as _};

use chrono::{NaiveDate, NaiveTime};

use crate::model::{Address, ClientId, HouseNumber};

/// Date format applied when no format is configured.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
/// Errors raised while building a [`Session`] from configured values.
pub enum ConfigError {
    /// Postal code was empty.
    #[error("Postal code must not be empty")]
    MissingPostalCode,
    /// House number was empty.
    #[error("House number must not be empty")]
    MissingHouseNumber,
    /// Date format contains a specifier chrono cannot render for a local date.
    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Validated `strftime` pattern used for every rendered date.
pub struct DateFormat(String);

impl DateFormat {
    /// Validate a pattern.
    ///
    /// Dates render as local midnight, so time specifiers such as `%H:%M` are
    /// accepted. Offset and zone specifiers are not.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDateFormat`] when chrono cannot interpret
    /// one of the specifiers or cannot render it without an offset.
    pub fn new<S: Into<String>>(pattern: S) -> Result<Self, ConfigError> {
        let pattern = pattern.into();
        if render(NaiveDate::default(), &pattern).is_none() {
            return Err(ConfigError::InvalidDateFormat(pattern));
        }
        Ok(Self(pattern))
    }

    /// Render `date` at midnight with this pattern.
    #[must_use]
    pub fn render(&self, date: NaiveDate) -> String {
        render(date, &self.0).unwrap_or_else(|| date.to_string())
    }

    /// The pattern text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self(DEFAULT_DATE_FORMAT.to_owned())
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

fn render(date: NaiveDate, pattern: &str) -> Option<String> {
    let mut rendered = String::new();
    write!(rendered, "{}", date.and_time(NaiveTime::MIN).format(pattern)).ok()?;
    Some(rendered)
}

#[derive(Debug, Clone)]
/// Everything one polling session needs: who we are, where we poll, how we render.
pub struct Session {
    /// Identifier sent with every provider request.
    pub client_id: ClientId,
    /// Polled address.
    pub address: Address,
    /// Format for rendered dates.
    pub date_format: DateFormat,
}

impl Session {
    /// Start a session with a freshly generated client identifier.
    #[must_use]
    pub fn new(address: Address, date_format: DateFormat) -> Self {
        Self {
            client_id: ClientId::generate(),
            address,
            date_format,
        }
    }

    /// Build a session from raw configured values.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a required value is empty or the date
    /// format is invalid.
    pub fn from_config(
        postal_code: &str,
        house_number: &str,
        date_format: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let postal_code = postal_code.trim();
        if postal_code.is_empty() {
            return Err(ConfigError::MissingPostalCode);
        }
        if house_number.trim().is_empty() {
            return Err(ConfigError::MissingHouseNumber);
        }
        let date_format = date_format.map_or_else(|| Ok(DateFormat::default()), DateFormat::new)?;

        let address = Address {
            postal_code: postal_code.to_uppercase().replace(' ', ""),
            house_number: HouseNumber::parse(house_number),
        };
        Ok(Self::new(address, date_format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_session_with_defaults() {
        let session = Session::from_config("8921 ab", "12", None).unwrap();
        assert_eq!(session.address.postal_code, "8921AB");
        assert_eq!(session.address.house_number, HouseNumber::Number(12));
        assert_eq!(session.date_format.as_str(), DEFAULT_DATE_FORMAT);
    }

    #[test]
    fn sessions_get_distinct_client_ids() {
        let first = Session::from_config("8921AB", "1", None).unwrap();
        let second = Session::from_config("8921AB", "1", None).unwrap();
        assert_ne!(first.client_id, second.client_id);
    }

    #[test]
    fn rejects_empty_values() {
        assert_eq!(
            Session::from_config("  ", "1", None).unwrap_err(),
            ConfigError::MissingPostalCode
        );
        assert_eq!(
            Session::from_config("8921AB", "", None).unwrap_err(),
            ConfigError::MissingHouseNumber
        );
    }

    #[test]
    fn rejects_unknown_format_specifier() {
        assert!(matches!(
            DateFormat::new("%Y-%m-%"),
            Err(ConfigError::InvalidDateFormat(_))
        ));
        assert!(DateFormat::new("%d-%m-%Y").is_ok());
    }

    #[test]
    fn time_specifiers_render_as_midnight() {
        let format = DateFormat::new("%Y-%m-%d %H:%M").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        assert_eq!(format.render(date), "2024-05-03 00:00");
    }

    #[test]
    fn rejects_offset_specifiers() {
        for pattern in ["%Y-%m-%d %z", "%d %Z", "%+"] {
            assert_eq!(
                DateFormat::new(pattern),
                Err(ConfigError::InvalidDateFormat(pattern.to_owned())),
                "{pattern}"
            );
        }
    }
}
