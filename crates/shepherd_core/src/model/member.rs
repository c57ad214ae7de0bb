//! Tracked members of a unit.

use crate::model::unit::{NucleusId, UnitId};
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type MemberId = Uuid;

/// A tracked individual. Belongs to exactly one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub unit_id: UnitId,
    /// Optional display/filter grouping inside the unit.
    pub nucleus_id: Option<NucleusId>,
    /// Inactive members are kept but excluded from rosters and statistics.
    pub active: bool,
}

impl Member {
    /// Creates an active member with a generated stable ID.
    pub fn new(unit_id: UnitId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            unit_id,
            nucleus_id: None,
            active: true,
        }
    }

    pub fn with_nucleus(mut self, nucleus_id: NucleusId) -> Self {
        self.nucleus_id = Some(nucleus_id);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId("member.id"));
        }
        if self.unit_id.is_nil() {
            return Err(ValidationError::NilId("member.unit_id"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankName("member.name"));
        }
        Ok(())
    }
}
