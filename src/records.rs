// 📜 Legacy Records - Typed views of the NALD extract
//
// Each legacy record is a struct with named optional fields, not an open
// key/value bag: normalization gaps show up at construction time instead of
// at whatever read site happens to touch the field first.
//
// External identifiers are composed here and nowhere else. They join every
// field of the legacy composite key with ':' so that distinct source rows
// can never collide, and the same source row always yields the same key.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ImportError;
use crate::normalize::parse_counter;
use crate::regions::Region;

/// Delimiter used in every composed external identifier.
pub const EXTERNAL_ID_DELIMITER: &str = ":";

// ============================================================================
// LICENCE HEAD
// ============================================================================

/// A legacy licence head record (NALD_ABS_LICENCES).
///
/// Drives the document set: one abstraction-licence document per licence
/// reference. Orphan cleanup compares the store against this set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyLicence {
    pub licence_ref: String,
    pub region: Region,
    pub start_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
}

// ============================================================================
// LICENCE VERSIONS
// ============================================================================

/// A legacy licence version snapshot (NALD_ABS_LIC_VERSIONS).
///
/// Issue and increment arrive as legacy strings and stay that way until the
/// resolver orders them; parsing is fallible and must not be hidden here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyLicenceVersion {
    pub licence_id: String,
    pub region: Region,
    pub issue_no: String,
    pub increment_no: String,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl LegacyLicenceVersion {
    /// Parsed issue counter (major revision).
    pub fn issue(&self) -> Result<u32, ImportError> {
        parse_counter("ISSUE_NO", &self.issue_no)
    }

    /// Parsed increment counter (minor revision within an issue).
    pub fn increment(&self) -> Result<u32, ImportError> {
        parse_counter("INCR_NO", &self.increment_no)
    }

    /// Stable merge key: region, licence id, issue and increment all
    /// participate in the legacy composite key.
    pub fn external_id(&self) -> String {
        [
            self.region.to_string(),
            self.licence_id.clone(),
            self.issue_no.clone(),
            self.increment_no.clone(),
        ]
        .join(EXTERNAL_ID_DELIMITER)
    }
}

// ============================================================================
// PARTIES
// ============================================================================

/// Legacy party classification (APAR_TYPE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartyType {
    /// 'PER' - an individual; maps to a contact (and a person company)
    Person,

    /// 'ORG' - an organisation; maps to a company only
    Organisation,
}

impl PartyType {
    pub fn from_legacy(raw: &str) -> Result<PartyType, ImportError> {
        match raw.trim() {
            "PER" => Ok(PartyType::Person),
            "ORG" => Ok(PartyType::Organisation),
            other => Err(ImportError::normalization(
                "APAR_TYPE",
                other,
                "expected PER or ORG",
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PartyType::Person => "person",
            PartyType::Organisation => "organisation",
        }
    }
}

/// A legacy party record (NALD_PARTIES), uniquely identified by
/// `(region, party_id)`. Party ids repeat across regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyParty {
    pub region: Region,
    pub party_id: String,
    pub party_type: PartyType,
    pub salutation: Option<String>,
    pub initials: Option<String>,
    pub forename: Option<String>,
    pub name: Option<String>,
}

impl LegacyParty {
    pub fn external_id(&self) -> String {
        [self.region.to_string(), self.party_id.clone()].join(EXTERNAL_ID_DELIMITER)
    }
}

// ============================================================================
// PURPOSE CONDITIONS
// ============================================================================

/// A legacy purpose condition (NALD_LIC_CONDITIONS), attached to an
/// abstraction purpose via its AABP id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyPurposeCondition {
    pub condition_id: String,
    pub region: Region,
    pub purpose_id: String,
    pub code: String,
    pub subcode: Option<String>,
    pub param_1: Option<String>,
    pub param_2: Option<String>,
    pub notes: Option<String>,
}

impl LegacyPurposeCondition {
    pub fn external_id(&self) -> String {
        [
            self.condition_id.clone(),
            self.region.to_string(),
            self.purpose_id.clone(),
        ]
        .join(EXTERNAL_ID_DELIMITER)
    }

    pub fn purpose_external_id(&self) -> String {
        [self.region.to_string(), self.purpose_id.clone()].join(EXTERNAL_ID_DELIMITER)
    }
}
