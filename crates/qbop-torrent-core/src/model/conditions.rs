//! Status conditions keyed by type.
//!
//! # Design
//! - Conditions live in an insertion-ordered map so lookups and exclusivity
//!   checks do not scan, while the serialized form stays the usual list.
//! - `Available` and `Degraded` are mutually exclusive; marking one removes
//!   the other in the same mutation.
//! - Re-setting a condition with an unchanged status keeps its transition time.
//! - Entries of condition types this controller does not own are skipped on
//!   read so a foreign writer cannot make the resource undecodable.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Reason;

/// Condition types reported on a torrent resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ConditionType {
    /// The torrent is present on the remote service.
    Available,
    /// The last reconciliation step against the remote service failed.
    Degraded,
}

impl ConditionType {
    /// The condition type that cannot be `True` at the same time as this one.
    #[must_use]
    pub const fn exclusive_with(self) -> Self {
        match self {
            Self::Available => Self::Degraded,
            Self::Degraded => Self::Available,
        }
    }

    /// Resolve a serialized condition type name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Available" => Some(Self::Available),
            "Degraded" => Some(Self::Degraded),
            _ => None,
        }
    }
}

/// Tri-state condition status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ConditionStatus {
    /// The condition holds.
    True,
    /// The condition does not hold.
    False,
    /// The controller cannot tell.
    Unknown,
}

/// A single typed, timestamped status flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Condition type.
    #[serde(rename = "type")]
    pub type_: ConditionType,
    /// Condition status.
    pub status: ConditionStatus,
    /// Machine-readable reason for the last change.
    pub reason: String,
    /// Human-readable detail.
    #[serde(default)]
    pub message: String,
    /// When the status last changed.
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    /// Build a `True` condition for the supplied reason.
    #[must_use]
    pub fn truthy(
        type_: ConditionType,
        reason: Reason,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            type_,
            status: ConditionStatus::True,
            reason: reason.as_str().to_string(),
            message: message.into(),
            last_transition_time: now,
        }
    }
}

/// Ordered set of conditions with at most one entry per type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conditions(IndexMap<ConditionType, Condition>);

impl Conditions {
    /// Look up the condition of the given type.
    #[must_use]
    pub fn get(&self, type_: ConditionType) -> Option<&Condition> {
        self.0.get(&type_)
    }

    /// Whether the condition of the given type is present with status `True`.
    #[must_use]
    pub fn is_true(&self, type_: ConditionType) -> bool {
        self.get(type_)
            .is_some_and(|condition| condition.status == ConditionStatus::True)
    }

    /// Iterate conditions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.0.values()
    }

    /// Number of conditions present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no condition is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert or update a condition, returning `true` when anything changed.
    ///
    /// The transition time of an existing entry only moves when its status
    /// changes; reason and message are always refreshed.
    pub fn set(&mut self, condition: Condition) -> bool {
        let Some(existing) = self.0.get_mut(&condition.type_) else {
            self.0.insert(condition.type_, condition);
            return true;
        };

        let mut changed = false;
        if existing.status != condition.status {
            existing.status = condition.status;
            existing.last_transition_time = condition.last_transition_time;
            changed = true;
        }
        if existing.reason != condition.reason {
            existing.reason = condition.reason;
            changed = true;
        }
        if existing.message != condition.message {
            existing.message = condition.message;
            changed = true;
        }
        changed
    }

    /// Remove the condition of the given type, returning `true` if it existed.
    pub fn remove(&mut self, type_: ConditionType) -> bool {
        self.0.shift_remove(&type_).is_some()
    }

    /// Set `Available=True` and drop any `Degraded` entry.
    pub fn mark_available(
        &mut self,
        reason: Reason,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> bool {
        self.mark(ConditionType::Available, reason, message.into(), now)
    }

    /// Set `Degraded=True` and drop any `Available` entry.
    pub fn mark_degraded(
        &mut self,
        reason: Reason,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> bool {
        self.mark(ConditionType::Degraded, reason, message.into(), now)
    }

    fn mark(
        &mut self,
        type_: ConditionType,
        reason: Reason,
        message: String,
        now: DateTime<Utc>,
    ) -> bool {
        let set = self.set(Condition::truthy(type_, reason, message, now));
        let removed = self.remove(type_.exclusive_with());
        set || removed
    }
}

impl FromIterator<Condition> for Conditions {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        let mut map = IndexMap::new();
        for condition in iter {
            map.insert(condition.type_, condition);
        }
        Self(map)
    }
}

impl Serialize for Conditions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.values())
    }
}

/// Wire form of a condition whose type has not been resolved yet.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCondition {
    #[serde(rename = "type")]
    type_: String,
    status: ConditionStatus,
    reason: String,
    #[serde(default)]
    message: String,
    last_transition_time: DateTime<Utc>,
}

impl<'de> Deserialize<'de> for Conditions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let list = Vec::<RawCondition>::deserialize(deserializer)?;
        Ok(list
            .into_iter()
            .filter_map(|raw| {
                Some(Condition {
                    type_: ConditionType::from_name(&raw.type_)?,
                    status: raw.status,
                    reason: raw.reason,
                    message: raw.message,
                    last_transition_time: raw.last_transition_time,
                })
            })
            .collect())
    }
}
