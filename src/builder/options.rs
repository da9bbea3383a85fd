//! Tunable machine options.

use crate::builder::error::BuildError;
use serde::{Deserialize, Serialize};

/// Default bound on follow-up events and hook-requested transitions per call.
pub const DEFAULT_MAX_FOLLOWUPS: usize = 64;

/// Default number of transitions kept in a machine's journal.
pub const DEFAULT_JOURNAL_CAPACITY: usize = 32;

/// Options shared by every machine a builder produces.
///
/// Missing fields take their defaults when deserialized.
///
/// ```rust
/// use fsm_core::builder::MachineOptions;
///
/// let options = MachineOptions::from_json(r#"{ "name": "pipeline", "max_followups": 8 }"#).unwrap();
/// assert_eq!(options.name.as_deref(), Some("pipeline"));
/// assert_eq!(options.max_followups, 8);
/// assert_eq!(options.journal_capacity, 32);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineOptions {
    /// Label used in log output instead of the machine id
    pub name: Option<String>,

    /// Maximum follow-up events plus hook-requested transitions per call
    pub max_followups: usize,

    /// Transitions retained in the journal; 0 disables it
    pub journal_capacity: usize,
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self {
            name: None,
            max_followups: DEFAULT_MAX_FOLLOWUPS,
            journal_capacity: DEFAULT_JOURNAL_CAPACITY,
        }
    }
}

impl MachineOptions {
    /// Parse options from JSON and validate them.
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        let options: Self =
            serde_json::from_str(json).map_err(|e| BuildError::InvalidOptions(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), BuildError> {
        if self.max_followups == 0 {
            return Err(BuildError::InvalidFollowupLimit);
        }
        Ok(())
    }
}
