// Purpose-condition mapping. Pure and per-record: no cross-record logic.

use serde::{Deserialize, Serialize};

use crate::records::LegacyPurposeCondition;

/// A purpose condition in target-store shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedPurposeCondition {
    pub external_id: String,
    pub purpose_external_id: String,
    pub code: String,
    pub subcode: Option<String>,
    pub param_1: Option<String>,
    pub param_2: Option<String>,
    pub notes: Option<String>,
}

/// Map one legacy condition. Total on well-typed input: the record's fields
/// were already normalized at construction, so this never fails.
pub fn map_condition(raw: &LegacyPurposeCondition) -> MappedPurposeCondition {
    MappedPurposeCondition {
        external_id: raw.external_id(),
        purpose_external_id: raw.purpose_external_id(),
        code: raw.code.clone(),
        subcode: raw.subcode.clone(),
        param_1: raw.param_1.clone(),
        param_2: raw.param_2.clone(),
        notes: raw.notes.clone(),
    }
}

pub fn map_conditions(raw: &[LegacyPurposeCondition]) -> Vec<MappedPurposeCondition> {
    raw.iter().map(map_condition).collect()
}
