//! Rotation policy: decide, from the current key set, what (if anything) to do.
//!
//! Evaluation is pure. Executing the plan is the caller's job, in order:
//! stale inactive cleanup first, then the decision.

use crate::models::access_key::{AccessKey, KeyStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RotationDecision {
    /// More than one active key. Needs manual intervention.
    Block { active: Vec<String> },
    /// No active key. Nothing is created.
    NoActiveKey,
    /// The single active key is within the age threshold.
    NoActionNeeded { active: String, age_days: i64 },
    /// The single active key is too old: create a new key, then delete this one.
    RotateActive { active: String, age_days: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotationPlan {
    /// Inactive key deleted before anything else.
    pub delete_stale_inactive: Option<String>,
    pub decision: RotationDecision,
}

impl RotationPlan {
    /// Whether executing the plan calls create or delete.
    pub fn has_side_effects(&self) -> bool {
        self.delete_stale_inactive.is_some()
            || matches!(self.decision, RotationDecision::RotateActive { .. })
    }

    /// Human-readable steps, in execution order.
    pub fn steps(&self) -> Vec<String> {
        let mut steps = Vec::new();
        if let Some(id) = &self.delete_stale_inactive {
            steps.push(format!("delete stale inactive key {}", id));
        }
        match &self.decision {
            RotationDecision::Block { active } => {
                steps.push(format!("blocked: {} active keys ({})", active.len(), active.join(", ")));
            }
            RotationDecision::NoActiveKey => steps.push("no active key: nothing to rotate".into()),
            RotationDecision::NoActionNeeded { active, age_days } => {
                steps.push(format!("keep {} (age {} days)", active, age_days));
            }
            RotationDecision::RotateActive { active, age_days } => {
                steps.push("create new access key".into());
                steps.push(format!("delete old active key {} (age {} days)", active, age_days));
            }
        }
        steps
    }
}

pub fn evaluate(keys: &[AccessKey], max_age_days: i64, now: DateTime<Utc>) -> RotationPlan {
    let (active, inactive): (Vec<&AccessKey>, Vec<&AccessKey>) =
        keys.iter().partition(|k| k.status == KeyStatus::Active);

    if active.len() > 1 {
        return RotationPlan {
            delete_stale_inactive: None,
            decision: RotationDecision::Block {
                active: active.iter().map(|k| k.id.clone()).collect(),
            },
        };
    }

    let Some(current) = active.first() else {
        return RotationPlan {
            delete_stale_inactive: None,
            decision: RotationDecision::NoActiveKey,
        };
    };

    // Inactive key age is irrelevant: it goes before any rotation.
    let delete_stale_inactive = match inactive.as_slice() {
        [stale] => Some(stale.id.clone()),
        _ => None,
    };

    let age_days = current.age_days(now);
    let decision = if age_days > max_age_days {
        RotationDecision::RotateActive {
            active: current.id.clone(),
            age_days,
        }
    } else {
        RotationDecision::NoActionNeeded {
            active: current.id.clone(),
            age_days,
        }
    };

    RotationPlan {
        delete_stale_inactive,
        decision,
    }
}
