//! Listing record value types
//!
//! A [`Record`] is one listing entry as extracted during a run. An
//! [`ItemMap`] keys records by their stable identifier and is used both for
//! the current-run snapshot and for the persisted price history.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::errors::RecordError;

/// One listing entry
///
/// Fields are private so every instance has passed validation: `id`,
/// `title` and `url` are non-empty and `price` is non-negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RecordFields")]
pub struct Record {
    title: String,
    byline: Option<String>,
    price: Decimal,
    url: String,
    id: String,
}

/// Unvalidated shape accepted when reading persisted records.
/// `asin` is the identifier key written by older history files.
#[derive(Deserialize)]
struct RecordFields {
    title: String,
    #[serde(default)]
    byline: Option<String>,
    price: Decimal,
    url: String,
    #[serde(alias = "asin")]
    id: String,
}

impl TryFrom<RecordFields> for Record {
    type Error = RecordError;

    fn try_from(fields: RecordFields) -> Result<Self, Self::Error> {
        Self::from_parts(fields.title, fields.byline, fields.price, fields.url, fields.id)
    }
}

impl Record {
    /// Create a record from raw listing values.
    ///
    /// `price` must be a plain decimal string without currency symbol.
    /// A blank byline is stored as absent.
    pub fn new(
        title: impl Into<String>,
        byline: Option<String>,
        price: &str,
        url: impl Into<String>,
        id: impl Into<String>,
    ) -> Result<Self, RecordError> {
        Self::from_parts(title.into(), byline, parse_price(price)?, url.into(), id.into())
    }

    fn from_parts(
        title: String,
        byline: Option<String>,
        price: Decimal,
        url: String,
        id: String,
    ) -> Result<Self, RecordError> {
        let id = id.trim().to_string();
        if id.is_empty() {
            return Err(RecordError::EmptyField { field: "id" });
        }
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(RecordError::EmptyField { field: "title" });
        }
        let url = url.trim().to_string();
        if url.is_empty() {
            return Err(RecordError::EmptyField { field: "url" });
        }
        if price.is_sign_negative() && !price.is_zero() {
            return Err(RecordError::InvalidPrice {
                value: price.to_string(),
                reason: "price must not be negative".to_string(),
            });
        }

        let byline = byline
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());

        Ok(Self { title, byline, price, url, id })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn byline(&self) -> Option<&str> {
        self.byline.as_deref()
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Listing-relative link to the item page
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Copy of this record carrying a different price
    #[must_use]
    pub fn with_price(&self, price: Decimal) -> Self {
        Self { price, ..self.clone() }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] @ {}", self.title, self.id, self.price)
    }
}

/// Parse a listing price. Non-numeric markers such as `-Infinity` fail here;
/// negatives are rejected by record validation.
pub fn parse_price(value: &str) -> Result<Decimal, RecordError> {
    Decimal::from_str(value.trim()).map_err(|e| RecordError::InvalidPrice {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Records keyed by identifier, ordered by identifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemMap(BTreeMap<String, Record>);

impl ItemMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under its own id, returning the record it replaced
    pub fn insert(&mut self, record: Record) -> Option<Record> {
        self.0.insert(record.id.clone(), record)
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.0.values()
    }
}

impl FromIterator<Record> for ItemMap {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut map = Self::new();
        for record in iter {
            map.insert(record);
        }
        map
    }
}

impl IntoIterator for ItemMap {
    type Item = Record;
    type IntoIter = btree_map::IntoValues<String, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_values()
    }
}

impl Serialize for ItemMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ItemMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = BTreeMap::<String, Record>::deserialize(deserializer)?;
        if let Some((key, record)) = entries.iter().find(|(key, record)| *key != record.id()) {
            return Err(D::Error::custom(format!(
                "entry key '{}' does not match record id '{}'",
                key,
                record.id()
            )));
        }
        Ok(Self(entries))
    }
}
