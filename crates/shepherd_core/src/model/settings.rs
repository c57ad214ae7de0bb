//! Process-wide business settings: category thresholds and access password.
//!
//! Settings are passed explicitly into analytics calls; nothing reads them
//! from ambient state.

use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};

const DEFAULT_ACCESS_PASSWORD: &str = "123456";

/// Absence-count floors of each frequency tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryThresholds {
    pub regular: u32,
    pub attention: u32,
    pub low: u32,
    pub critical: u32,
}

impl Default for CategoryThresholds {
    fn default() -> Self {
        Self {
            regular: 0,
            attention: 1,
            low: 3,
            critical: 5,
        }
    }
}

impl CategoryThresholds {
    /// Floors must start at 0 and be strictly ascending so that every
    /// absence count maps to exactly one reachable tier.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let ascending = self.regular == 0
            && self.regular < self.attention
            && self.attention < self.low
            && self.low < self.critical;
        if ascending {
            Ok(())
        } else {
            Err(ValidationError::ThresholdsNotAscending {
                regular: self.regular,
                attention: self.attention,
                low: self.low,
                critical: self.critical,
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub thresholds: CategoryThresholds,
    pub access_password: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            thresholds: CategoryThresholds::default(),
            access_password: DEFAULT_ACCESS_PASSWORD.to_string(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.thresholds.validate()?;
        if self.access_password.trim().is_empty() {
            return Err(ValidationError::BlankPassword);
        }
        Ok(())
    }
}
