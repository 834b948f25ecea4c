// 📂 Staging Loader - Staged NALD extract CSVs into typed records
//
// The extract mechanism (file transfer, decompression) lives upstream; by
// the time this module runs, each record collection is a CSV with the
// legacy column headers. Every field goes through the normalizer as the
// typed record is constructed.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::normalize::{normalize, parse_legacy_date, require};
use crate::records::{
    LegacyLicence, LegacyLicenceVersion, LegacyParty, LegacyPurposeCondition, PartyType,
};
use crate::regions::Region;

// ============================================================================
// RAW ROWS (legacy column headers, everything a string)
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawLicenceRow {
    #[serde(rename = "LIC_NO")]
    lic_no: String,

    #[serde(rename = "FGAC_REGION_CODE")]
    region_code: String,

    #[serde(rename = "ORIG_EFF_DATE")]
    orig_eff_date: String,

    #[serde(rename = "EXPIRY_DATE")]
    expiry_date: String,
}

#[derive(Debug, Deserialize)]
struct RawVersionRow {
    #[serde(rename = "AABL_ID")]
    aabl_id: String,

    #[serde(rename = "FGAC_REGION_CODE")]
    region_code: String,

    #[serde(rename = "ISSUE_NO")]
    issue_no: String,

    #[serde(rename = "INCR_NO")]
    incr_no: String,

    #[serde(rename = "STATUS")]
    status: String,

    #[serde(rename = "EFF_ST_DATE")]
    eff_st_date: String,

    #[serde(rename = "EFF_END_DATE")]
    eff_end_date: String,
}

#[derive(Debug, Deserialize)]
struct RawPartyRow {
    #[serde(rename = "ID")]
    id: String,

    #[serde(rename = "FGAC_REGION_CODE")]
    region_code: String,

    #[serde(rename = "APAR_TYPE")]
    apar_type: String,

    #[serde(rename = "SALUTATION")]
    salutation: String,

    #[serde(rename = "INITIALS")]
    initials: String,

    #[serde(rename = "FORENAME")]
    forename: String,

    #[serde(rename = "NAME")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawConditionRow {
    #[serde(rename = "ID")]
    id: String,

    #[serde(rename = "FGAC_REGION_CODE")]
    region_code: String,

    #[serde(rename = "AABP_ID")]
    aabp_id: String,

    #[serde(rename = "ACIN_CODE")]
    acin_code: String,

    #[serde(rename = "ACIN_SUBCODE")]
    acin_subcode: String,

    #[serde(rename = "PARAM1")]
    param1: String,

    #[serde(rename = "PARAM2")]
    param2: String,

    #[serde(rename = "TEXT")]
    text: String,
}

// ============================================================================
// LOADERS
// ============================================================================

pub fn load_licences(path: &Path) -> Result<Vec<LegacyLicence>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open licence extract {}", path.display()))?;

    let mut licences = Vec::new();
    for row in rdr.deserialize() {
        let raw: RawLicenceRow = row.context("failed to deserialize licence row")?;

        licences.push(LegacyLicence {
            licence_ref: require("LIC_NO", &raw.lic_no)?,
            region: Region::from_code_str(&raw.region_code)?,
            start_date: parse_legacy_date("ORIG_EFF_DATE", &raw.orig_eff_date)?,
            expiry_date: parse_legacy_date("EXPIRY_DATE", &raw.expiry_date)?,
        });
    }

    Ok(licences)
}

pub fn load_licence_versions(path: &Path) -> Result<Vec<LegacyLicenceVersion>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open version extract {}", path.display()))?;

    let mut versions = Vec::new();
    for row in rdr.deserialize() {
        let raw: RawVersionRow = row.context("failed to deserialize licence version row")?;

        versions.push(LegacyLicenceVersion {
            licence_id: require("AABL_ID", &raw.aabl_id)?,
            region: Region::from_code_str(&raw.region_code)?,
            issue_no: require("ISSUE_NO", &raw.issue_no)?,
            increment_no: require("INCR_NO", &raw.incr_no)?,
            status: normalize(&raw.status),
            start_date: parse_legacy_date("EFF_ST_DATE", &raw.eff_st_date)?,
            end_date: parse_legacy_date("EFF_END_DATE", &raw.eff_end_date)?,
        });
    }

    Ok(versions)
}

pub fn load_parties(path: &Path) -> Result<Vec<LegacyParty>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open party extract {}", path.display()))?;

    let mut parties = Vec::new();
    for row in rdr.deserialize() {
        let raw: RawPartyRow = row.context("failed to deserialize party row")?;

        parties.push(LegacyParty {
            region: Region::from_code_str(&raw.region_code)?,
            party_id: require("ID", &raw.id)?,
            party_type: PartyType::from_legacy(&raw.apar_type)?,
            salutation: normalize(&raw.salutation),
            initials: normalize(&raw.initials),
            forename: normalize(&raw.forename),
            name: normalize(&raw.name),
        });
    }

    Ok(parties)
}

pub fn load_conditions(path: &Path) -> Result<Vec<LegacyPurposeCondition>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open condition extract {}", path.display()))?;

    let mut conditions = Vec::new();
    for row in rdr.deserialize() {
        let raw: RawConditionRow = row.context("failed to deserialize condition row")?;

        conditions.push(LegacyPurposeCondition {
            condition_id: require("ID", &raw.id)?,
            region: Region::from_code_str(&raw.region_code)?,
            purpose_id: require("AABP_ID", &raw.aabp_id)?,
            code: require("ACIN_CODE", &raw.acin_code)?,
            subcode: normalize(&raw.acin_subcode),
            param_1: normalize(&raw.param1),
            param_2: normalize(&raw.param2),
            notes: normalize(&raw.text),
        });
    }

    Ok(conditions)
}
