//! Domain data structures for addresses, keys, and collection events.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Waste categories tracked with a dedicated "next date" sensor.
pub enum Categories {
    /// Organic waste bin.
    Biobak,
    /// Sorted residual waste bin.
    Sortibak,
    /// Paper and cardboard bin.
    Papierbak,
}

impl fmt::Display for Categories {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Categories::Biobak => "Biobak",
            Categories::Sortibak => "Sortibak",
            Categories::Papierbak => "Papierbak",
        };
        write!(formatter, "{label}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Waste category label as reported by the provider, e.g. `"Biobak"`.
pub struct Category(pub String);

impl Category {
    /// Create a category from a provider label.
    #[must_use]
    pub fn new<S: Into<String>>(label: S) -> Self {
        Self(label.into())
    }

    /// The raw label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<Categories> for Category {
    fn from(category: Categories) -> Self {
        Category(category.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A single collection date paired with the category emptied that day.
pub struct CollectionEvent {
    /// Day of the collection.
    pub date: NaiveDate,
    /// Category collected.
    pub category: Category,
}

impl CollectionEvent {
    /// Construct an event.
    #[must_use]
    pub fn new<C: Into<Category>>(date: NaiveDate, category: C) -> Self {
        Self {
            date,
            category: category.into(),
        }
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        Category(label.to_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Token identifying this polling session to the provider.
pub struct ClientId(pub Uuid);

impl ClientId {
    /// Generate a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Clone, PartialEq, Eq)]
/// Provider-issued public key, Base64-decoded but otherwise opaque.
pub struct PublicKey(pub Vec<u8>);

impl PublicKey {
    /// Raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "PublicKey({} bytes)", self.0.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
/// House number as sent to the provider.
///
/// Purely numeric values are sent as JSON numbers, anything with an addition
/// (such as `12a`) as a string. Values a number would not reproduce, like
/// `012`, stay strings.
pub enum HouseNumber {
    /// Plain number.
    Number(u32),
    /// Number with addition.
    Text(String),
}

impl HouseNumber {
    /// Interpret a configured value.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<u32>() {
            Ok(number) if number.to_string() == trimmed => HouseNumber::Number(number),
            _ => HouseNumber::Text(trimmed.to_owned()),
        }
    }
}

impl fmt::Display for HouseNumber {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HouseNumber::Number(number) => write!(formatter, "{number}"),
            HouseNumber::Text(text) => formatter.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Address whose calendar is polled.
pub struct Address {
    /// Dutch postal code, e.g. `8921AB`.
    pub postal_code: String,
    /// House number including additions.
    pub house_number: HouseNumber,
}

impl fmt::Display for Address {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} {}", self.postal_code, self.house_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_house_number_serializes_as_number() {
        let json = serde_json::to_string(&HouseNumber::parse(" 12 ")).unwrap();
        assert_eq!(json, "12", "plain numbers must stay numeric");
    }

    #[test]
    fn house_number_with_addition_serializes_as_string() {
        let json = serde_json::to_string(&HouseNumber::parse("12a")).unwrap();
        assert_eq!(json, "\"12a\"", "additions force a string");
    }

    #[test]
    fn house_number_keeps_leading_zero() {
        assert_eq!(HouseNumber::parse("012"), HouseNumber::Text("012".into()));
        assert_eq!(HouseNumber::parse("+12"), HouseNumber::Text("+12".into()));
        assert_eq!(HouseNumber::parse("0"), HouseNumber::Number(0));
        let json = serde_json::to_string(&HouseNumber::parse("012")).unwrap();
        assert_eq!(json, "\"012\"");
    }

    #[test]
    fn tracked_categories_use_provider_labels() {
        assert_eq!(Category::from(Categories::Biobak).as_str(), "Biobak");
        assert_eq!(Category::from(Categories::Sortibak).as_str(), "Sortibak");
        assert_eq!(Category::from(Categories::Papierbak).as_str(), "Papierbak");
    }

    #[test]
    fn public_key_debug_hides_bytes() {
        let key = PublicKey(vec![1, 2, 3]);
        assert_eq!(format!("{key:?}"), "PublicKey(3 bytes)");
    }
}
