// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};

/// A status condition as reported by the Flux controllers
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

impl Condition {
    pub fn new(condition_type: &str, status: &str) -> Self {
        Self {
            condition_type: condition_type.to_string(),
            status: status.to_string(),
            reason: None,
            message: None,
            last_transition_time: None,
            observed_generation: None,
        }
    }

    pub fn with_reason(mut self, reason: &str, message: &str) -> Self {
        self.reason = Some(reason.to_string());
        self.message = Some(message.to_string());
        self
    }

    /// Human readable summary of why the condition has its status
    pub fn describe(&self) -> String {
        match (&self.reason, &self.message) {
            (Some(reason), Some(message)) => format!("{}: {}", reason, message),
            (Some(reason), None) => reason.clone(),
            (None, Some(message)) => message.clone(),
            (None, None) => format!("{}={}", self.condition_type, self.status),
        }
    }
}

/// Find the condition of the given type
pub fn find_status_condition<'a>(
    conditions: &'a [Condition],
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions
        .iter()
        .find(|c| c.condition_type == condition_type)
}

/// True only when the condition is present and explicitly "False".
/// An absent condition or an "Unknown" status is not false.
pub fn is_status_condition_false(conditions: &[Condition], condition_type: &str) -> bool {
    find_status_condition(conditions, condition_type).is_some_and(|c| c.status == "False")
}

/// Resources carrying a list of status conditions
pub trait HasConditions {
    fn conditions(&self) -> &[Condition];

    /// The condition of the given type if it is explicitly "False"
    fn failed_condition(&self, condition_type: &str) -> Option<&Condition> {
        find_status_condition(self.conditions(), condition_type).filter(|c| c.status == "False")
    }
}
