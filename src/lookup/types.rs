//! Theatre records as served by the lookup service

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque key naming one theatre on the lookup service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TheatreId(String);

impl TheatreId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for TheatreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TheatreId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<i64> for TheatreId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

/// A venue as returned by `GET /theaters/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TheatreRecord {
    /// Server-side primary key, present on records listed by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    pub name: String,

    pub location: String,

    pub capacity: i64,

    /// Showtimes of tickets sold for this theatre
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ticket_showtimes: Vec<String>,

    /// Screens of tickets sold for this theatre
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ticket_screens: Vec<i64>,
}

impl TheatreRecord {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, location: impl Into<String>, capacity: i64) -> Self {
        Self {
            id: None,
            name: name.into(),
            location: location.into(),
            capacity,
            ticket_showtimes: Vec::new(),
            ticket_screens: Vec::new(),
        }
    }

    /// Identifier to request this record by, if the service sent one
    pub fn theatre_id(&self) -> Option<TheatreId> {
        self.id.map(TheatreId::from)
    }

    /// Distinct showtimes in first-seen order
    pub fn showtimes(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for showtime in &self.ticket_showtimes {
            if !seen.contains(&showtime.as_str()) {
                seen.push(showtime.as_str());
            }
        }
        seen
    }

    /// Distinct screens in ascending order
    pub fn screens(&self) -> Vec<i64> {
        let mut screens = self.ticket_screens.clone();
        screens.sort_unstable();
        screens.dedup();
        screens
    }
}
