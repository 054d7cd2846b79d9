//! Freshness status levels
//!
//! The status table (label, UI color, expected shelf-life range) is fixed
//! and independent of calibration. `StatusMap` is the insertion-ordered
//! map keyed by status used for reference tables and distance tables.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Freshness state of a TTI sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Fresh,
    Good,
    Warning,
    Expired,
}

impl StatusLevel {
    /// All levels in canonical order
    pub const ALL: [StatusLevel; 4] = [
        StatusLevel::Fresh,
        StatusLevel::Good,
        StatusLevel::Warning,
        StatusLevel::Expired,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            StatusLevel::Fresh => "fresh",
            StatusLevel::Good => "good",
            StatusLevel::Warning => "warning",
            StatusLevel::Expired => "expired",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.key() == key)
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            StatusLevel::Fresh => "FRESH",
            StatusLevel::Good => "GOOD",
            StatusLevel::Warning => "WARNING",
            StatusLevel::Expired => "EXPIRED",
        }
    }

    /// UI color as hex
    pub fn color(&self) -> &'static str {
        match self {
            StatusLevel::Fresh => "#22c55e",
            StatusLevel::Good => "#84cc16",
            StatusLevel::Warning => "#f59e0b",
            StatusLevel::Expired => "#ef4444",
        }
    }

    /// Expected remaining days as `(min, max)`
    pub fn days_range(&self) -> (u32, u32) {
        match self {
            StatusLevel::Fresh => (30, 40),
            StatusLevel::Good => (15, 30),
            StatusLevel::Warning => (5, 15),
            StatusLevel::Expired => (0, 0),
        }
    }

    /// Remaining days formatted as `"min-max"`
    pub fn days_remaining(&self) -> String {
        let (min, max) = self.days_range();
        format!("{}-{}", min, max)
    }
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Map from status to `V` that keeps insertion order
///
/// Serializes as a JSON object. Deserializing rejects duplicate keys and
/// any key that is not a canonical status.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMap<V> {
    entries: Vec<(StatusLevel, V)>,
}

impl<V> StatusMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace; a replaced entry keeps its position
    pub fn insert(&mut self, status: StatusLevel, value: V) {
        match self.entries.iter_mut().find(|(key, _)| *key == status) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((status, value)),
        }
    }

    pub fn get(&self, status: StatusLevel) -> Option<&V> {
        self.entries
            .iter()
            .find(|(key, _)| *key == status)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, status: StatusLevel) -> bool {
        self.get(status).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatusLevel, &V)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }

    pub fn keys(&self) -> impl Iterator<Item = StatusLevel> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for StatusMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(StatusLevel, V)> for StatusMap<V> {
    fn from_iter<I: IntoIterator<Item = (StatusLevel, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (status, value) in iter {
            map.insert(status, value);
        }
        map
    }
}

impl<V: Serialize> Serialize for StatusMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(key, value)| (key, value)))
    }
}

struct StatusMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for StatusMapVisitor<V> {
    type Value = StatusMap<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map keyed by fresh, good, warning or expired")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = StatusMap::new();
        while let Some((status, value)) = access.next_entry::<StatusLevel, V>()? {
            if map.contains(status) {
                return Err(de::Error::custom(format!("duplicate status `{}`", status)));
            }
            map.insert(status, value);
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for StatusMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StatusMapVisitor(PhantomData))
    }
}
