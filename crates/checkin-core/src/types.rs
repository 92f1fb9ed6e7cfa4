// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across adapter traits and engine crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Identifier returned by a transport for an accepted delivery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Transport,
    Classifier,
}

/// A check-in touchpoint offset, in days after questionnaire completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Day {
    Day3,
    Day7,
    Day14,
}

impl Day {
    /// Number of days after completion.
    pub const fn as_u32(self) -> u32 {
        match self {
            Day::Day3 => 3,
            Day::Day7 => 7,
            Day::Day14 => 14,
        }
    }

    /// All touchpoints in schedule order.
    pub const ALL: [Day; 3] = [Day::Day3, Day::Day7, Day::Day14];
}

impl TryFrom<u32> for Day {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(Day::Day3),
            7 => Ok(Day::Day7),
            14 => Ok(Day::Day14),
            other => Err(format!("unsupported check-in day {other}")),
        }
    }
}

impl From<Day> for u32 {
    fn from(day: Day) -> Self {
        day.as_u32()
    }
}

impl std::fmt::Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

/// Response bucket selecting the template and insert variant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, EnumIter,
    Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    /// Legacy label for the first touchpoint; falls back to `Same` content.
    Initial,
    Same,
    Better,
    Worse,
}

/// The value a user taps in a one-tap response link.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, EnumIter,
    Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ResponseValue {
    Better,
    Same,
    Worse,
}

impl ResponseValue {
    /// All response values in link order.
    pub const ALL: [ResponseValue; 3] =
        [ResponseValue::Better, ResponseValue::Same, ResponseValue::Worse];

    /// The content branch selected by this response.
    pub const fn branch(self) -> Branch {
        match self {
            ResponseValue::Better => Branch::Better,
            ResponseValue::Same => Branch::Same,
            ResponseValue::Worse => Branch::Worse,
        }
    }

    /// Human-facing label used in rendered action links.
    pub const fn label(self) -> &'static str {
        match self {
            ResponseValue::Better => "Feeling better",
            ResponseValue::Same => "About the same",
            ResponseValue::Worse => "Feeling worse",
        }
    }
}

/// Delivery channel for a queue item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
}

/// Lifecycle state of a queue item.
///
/// `Queued` is the only non-terminal state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Queued,
    Sent,
    Failed,
    Skipped,
}

/// Normalized diagnosis classification used to select content.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, EnumIter,
    Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisCode {
    Sciatica,
    LumbarStrain,
    DiscHerniation,
    FacetJointSyndrome,
    SacroiliacDysfunction,
    SpinalStenosis,
    NonspecificLowBackPain,
}

/// Machine-readable reason recorded in `last_error` when content resolution fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FailureTag {
    MissingContact,
    MissingTemplate,
    MissingDiagnosisMapping,
    MissingDiagnosisInsert,
    /// The template is authored for a different channel than the item.
    TemplateChannelMismatch,
}

/// A questionnaire subject as read from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Raw classifier output label.
    pub diagnosis_label: Option<String>,
    /// Triage outcome, e.g. `"urgent"`.
    pub outcome: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Subject {
    /// Whether the questionnaire outcome was the urgent classification.
    pub fn is_urgent(&self) -> bool {
        self.outcome
            .as_deref()
            .is_some_and(|o| o.trim().eq_ignore_ascii_case("urgent"))
    }

    /// Contact address for a channel, ignoring blank values.
    pub fn address_for(&self, channel: Channel) -> Option<&str> {
        let raw = match channel {
            Channel::Email => self.email.as_deref(),
            Channel::Sms => self.phone.as_deref(),
        };
        raw.map(str::trim).filter(|s| !s.is_empty())
    }

    /// Preferred channel: email when present, otherwise SMS.
    pub fn preferred_channel(&self) -> Option<Channel> {
        [Channel::Email, Channel::Sms]
            .into_iter()
            .find(|c| self.address_for(*c).is_some())
    }
}

/// One scheduled touchpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: i64,
    pub subject_id: String,
    pub day: Day,
    pub due_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub template_key: String,
    pub branch: Branch,
    pub channel: Channel,
    pub status: QueueStatus,
    pub last_error: Option<String>,
}

/// A queue row to be upserted on `(subject_id, day)`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQueueItem {
    pub subject_id: String,
    pub day: Day,
    pub due_at: DateTime<Utc>,
    pub template_key: String,
    pub branch: Branch,
    pub channel: Channel,
}

/// The terminal write-back applied to a queued item.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTransition {
    pub status: QueueStatus,
    pub sent_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl StatusTransition {
    pub fn sent(at: DateTime<Utc>) -> Self {
        Self {
            status: QueueStatus::Sent,
            sent_at: Some(at),
            last_error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: QueueStatus::Failed,
            sent_at: None,
            last_error: Some(error.into()),
        }
    }

    pub fn skipped() -> Self {
        Self {
            status: QueueStatus::Skipped,
            sent_at: None,
            last_error: None,
        }
    }

    /// Operator reset of a failed item back to the queue.
    pub fn requeued() -> Self {
        Self {
            status: QueueStatus::Queued,
            sent_at: None,
            last_error: None,
        }
    }
}

/// Content shell for a `(day, branch)` template key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub key: String,
    pub subject: String,
    /// Body containing the `{{diagnosis_insert}}` and `{{encouragement}}` markers.
    pub body: String,
    pub disclaimer: String,
    pub channel: Channel,
}

/// Diagnosis-specific copy keyed by `(code, day, branch)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisInsert {
    pub code: DiagnosisCode,
    pub day: Day,
    pub branch: Branch,
    pub body: String,
}

/// A recorded one-tap response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub subject_id: String,
    pub day: Day,
    pub value: ResponseValue,
    pub note: Option<String>,
    pub responded_at: DateTime<Utc>,
}

/// A fully rendered message handed to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub channel: Channel,
    pub address: String,
    pub subject: String,
    pub body: String,
}
