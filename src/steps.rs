// 🪜 Import Steps - The ordered units the orchestrator runs
//
// Each step normalizes/maps its record type, merges it, then (where the
// type has an orphan rule) cleans up - in that order, inside the step, so
// a current row can never be mistaken for an orphan mid-import. Steps
// propagate their errors; containing them is the orchestrator's job.

use log::info;
use rusqlite::Connection;

use crate::cleanup::OrphanCleaner;
use crate::conditions::map_conditions;
use crate::error::ImportError;
use crate::merge::MergeWriter;
use crate::parties::PartyDirectory;
use crate::records::{LegacyLicence, LegacyLicenceVersion, LegacyParty, LegacyPurposeCondition};
use crate::versions::resolve_current;

/// One unit of the import sequence.
pub trait ImportStep {
    fn name(&self) -> &'static str;

    fn run(&self, conn: &Connection) -> Result<(), ImportError>;
}

// ============================================================================
// LICENCE STEP
// ============================================================================

/// Resolves current licence versions, merges licence heads, documents and
/// versions, then soft-deletes documents the legacy set no longer covers.
pub struct LicenceStep {
    pub licences: Vec<LegacyLicence>,
    pub versions: Vec<LegacyLicenceVersion>,
}

impl ImportStep for LicenceStep {
    fn name(&self) -> &'static str {
        "licences"
    }

    fn run(&self, conn: &Connection) -> Result<(), ImportError> {
        let current = resolve_current(&self.versions)?;
        info!(
            "resolved {} current licence versions from {}",
            current.len(),
            self.versions.len()
        );

        let writer = MergeWriter::new(conn);
        writer.merge_licences(&self.licences)?;
        writer.merge_documents(&self.licences)?;
        writer.merge_licence_versions(&current)?;

        let current_refs: Vec<String> = self
            .licences
            .iter()
            .map(|licence| licence.licence_ref.clone())
            .collect();
        OrphanCleaner::new(conn).soft_delete_orphan_documents(&current_refs)?;

        Ok(())
    }
}

// ============================================================================
// PARTY STEP
// ============================================================================

/// Maps parties into the region directory and merges companies and contacts.
pub struct PartyStep {
    pub parties: Vec<LegacyParty>,
}

impl ImportStep for PartyStep {
    fn name(&self) -> &'static str {
        "parties"
    }

    fn run(&self, conn: &Connection) -> Result<(), ImportError> {
        let directory = PartyDirectory::map_parties(&self.parties);

        let writer = MergeWriter::new(conn);
        writer.merge_companies(&directory.companies())?;
        writer.merge_contacts(&directory.contacts())?;

        Ok(())
    }
}

// ============================================================================
// CONDITION STEP
// ============================================================================

/// Maps purpose conditions, merges them, then hard-deletes station links
/// pointing at conditions the legacy set no longer contains.
pub struct ConditionStep {
    pub conditions: Vec<LegacyPurposeCondition>,
}

impl ImportStep for ConditionStep {
    fn name(&self) -> &'static str {
        "purpose_conditions"
    }

    fn run(&self, conn: &Connection) -> Result<(), ImportError> {
        let mapped = map_conditions(&self.conditions);

        MergeWriter::new(conn).merge_conditions(&mapped)?;

        let current_ids: Vec<String> = mapped
            .iter()
            .map(|condition| condition.external_id.clone())
            .collect();
        OrphanCleaner::new(conn).delete_orphan_station_links(&current_ids)?;

        Ok(())
    }
}
