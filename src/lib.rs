// NALD Sync - Legacy abstraction-licensing reconciliation pipeline
// Exposes all modules for use in the CLI and tests

pub mod cleanup;
pub mod conditions;
pub mod db;
pub mod error;
pub mod loader;
pub mod merge;
pub mod normalize;
pub mod notify;
pub mod orchestrator;
pub mod parties;
pub mod records;
pub mod regions;
pub mod steps;
pub mod versions;

// Re-export commonly used types
pub use cleanup::OrphanCleaner;
pub use conditions::{map_condition, map_conditions, MappedPurposeCondition};
pub use db::{count_rows, get_document, setup_database, DocumentRow, Table, ABSTRACTION_LICENCE};
pub use error::ImportError;
pub use loader::{load_conditions, load_licence_versions, load_licences, load_parties};
pub use merge::{MergeStats, MergeWriter};
pub use normalize::{normalize, normalize_opt, parse_counter, parse_legacy_date, require};
pub use notify::{LogNotifier, Notification, Notifier, RecordingNotifier};
pub use orchestrator::{ImportOrchestrator, ImportOutcome, ImportState};
pub use parties::{map_company, map_contact, MappedCompany, MappedContact, MappedParty, PartyDirectory};
pub use records::{
    LegacyLicence, LegacyLicenceVersion, LegacyParty, LegacyPurposeCondition, PartyType,
};
pub use regions::Region;
pub use steps::{ConditionStep, ImportStep, LicenceStep, PartyStep};
pub use versions::resolve_current;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
