use super::dates::{optional_date, CalendarDate};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identifier as delivered by the API: a JSON number or a string holding one.
///
/// Equality is numeric ([`RecordId::matches`]); an id that is not a number matches
/// nothing, not even itself.
#[derive(Debug, Clone)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn numeric(&self) -> Option<f64> {
        self.0
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }

    pub fn matches(&self, other: &RecordId) -> bool {
        match (self.numeric(), other.numeric()) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.trim().parse::<i64>() {
            Ok(value) => serializer.serialize_i64(value),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordIdVisitor;

        impl<'de> Visitor<'de> for RecordIdVisitor {
            type Value = RecordId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a numeric or string identifier")
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<RecordId, E> {
                Ok(RecordId(value.to_string()))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<RecordId, E> {
                Ok(RecordId(value.to_string()))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<RecordId, E> {
                Ok(RecordId(value.to_string()))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<RecordId, E> {
                Ok(RecordId(value.to_string()))
            }
        }

        deserializer.deserialize_any(RecordIdVisitor)
    }
}

/// Review state carried by a single work submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    Pending,
    Submitted,
    Verified,
    Rejected,
}

impl SubmissionStatus {
    pub const fn ordered() -> [Self; 4] {
        [Self::Pending, Self::Submitted, Self::Verified, Self::Rejected]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Submitted => "Submitted",
            Self::Verified => "Verified",
            Self::Rejected => "Rejected",
        }
    }

    pub fn from_name(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "SUBMITTED" => Some(Self::Submitted),
            "VERIFIED" => Some(Self::Verified),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Aggregate status of one staff member's submissions on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayStatus {
    NotSubmitted,
    Submitted,
    Verified,
    Rejected,
    Partial,
}

impl DayStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotSubmitted => "Not Submitted",
            Self::Submitted => "Submitted",
            Self::Verified => "Verified",
            Self::Rejected => "Rejected",
            Self::Partial => "Partially Verified",
        }
    }
}

/// A recurring unit of work with an optional active window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Responsibility {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<CalendarDate>,
    #[serde(
        default,
        deserialize_with = "optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<CalendarDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_department_id: Option<RecordId>,
}

/// Binding of a responsibility to one staff member; persists across every day it recurs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: RecordId,
    pub staff_id: RecordId,
    pub responsibility_id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsibility: Option<Responsibility>,
    /// Legacy top-level status. Carried through for round-tripping API payloads but
    /// never read: a submission's effective status comes from the record itself or its
    /// embedded `assignment` reference.
    #[serde(
        default,
        deserialize_with = "lenient_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<SubmissionStatus>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub work_submissions: Vec<WorkSubmission>,
}

/// The slice of an assignment embedded in a submission payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentStatusRef {
    #[serde(
        default,
        deserialize_with = "lenient_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<SubmissionStatus>,
}

/// One staff member's record of work for one assignment on one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSubmission {
    pub id: RecordId,
    pub assignment_id: RecordId,
    pub staff_id: RecordId,
    #[serde(
        default,
        deserialize_with = "optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub work_date: Option<CalendarDate>,
    #[serde(
        default,
        deserialize_with = "optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub submitted_at: Option<CalendarDate>,
    #[serde(
        default,
        deserialize_with = "lenient_hours",
        skip_serializing_if = "Option::is_none"
    )]
    pub hours_worked: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<SubmissionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub verified_at: Option<CalendarDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<AssignmentStatusRef>,
}

impl WorkSubmission {
    /// The date this record is about: `workDate`, falling back to `submittedAt`.
    pub fn work_day_field(&self) -> Option<&CalendarDate> {
        self.work_date.as_ref().or(self.submitted_at.as_ref())
    }

    /// Normalized work day, `None` when absent or unparseable.
    pub fn work_day(&self) -> Option<chrono::NaiveDate> {
        self.work_day_field().and_then(CalendarDate::day)
    }

    /// Free-text account of the work, from `content` or the older `description` field.
    pub fn summary(&self) -> Option<&str> {
        self.content.as_deref().or(self.description.as_deref())
    }

    pub fn hours(&self) -> f64 {
        self.hours_worked.unwrap_or(0.0)
    }
}

fn lenient_status<'de, D>(deserializer: D) -> Result<Option<SubmissionStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(value)) => SubmissionStatus::from_name(&value),
        _ => None,
    })
}

fn lenient_hours<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::Number(value)) => value.as_f64(),
        Some(serde_json::Value::String(value)) => value.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|hours| hours.is_finite()))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
