//! Events tracked by the office
//!
//! An [`Event`] is created by an authenticated user and read by anyone.
//! Reference data such as teachers and locations is not modelled here.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{UserId, error::ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(i64);

impl EventId {
    pub fn new(id: i64) -> Self {
        EventId(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for EventId {
    fn from(id: i64) -> Self {
        EventId(id)
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventStatus {
    #[default]
    #[serde(rename = "planned")]
    Planned,
    #[serde(rename = "in progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "canceled")]
    Canceled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Planned => "planned",
            EventStatus::InProgress => "in progress",
            EventStatus::Completed => "completed",
            EventStatus::Canceled => "canceled",
        }
    }
}

impl FromStr for EventStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planned" => Ok(EventStatus::Planned),
            "in progress" => Ok(EventStatus::InProgress),
            "completed" => Ok(EventStatus::Completed),
            "canceled" => Ok(EventStatus::Canceled),
            other => Err(ValidationError::InvalidField(format!(
                "Unknown event status {other:?}"
            ))),
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,

    pub title: String,

    pub description: Option<String>,

    pub start_date: DateTime<Utc>,

    pub end_date: DateTime<Utc>,

    pub status: EventStatus,

    /// Whole currency units
    pub estimated_budget: Option<i64>,

    pub notes: Option<String>,

    /// The account that created the event; cleared when that account is deleted
    pub created_by: Option<UserId>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// An event about to be persisted.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: EventStatus,
    pub estimated_budget: Option<i64>,
    pub notes: Option<String>,
    pub created_by: UserId,
}
