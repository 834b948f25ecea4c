// 🗄️ Target Store - SQLite schema and row access
//
// The target store is the only stateful part of the pipeline. Every table
// that receives legacy data carries a stable external identifier (the merge
// key), a creation timestamp set once, and an update timestamp refreshed on
// every merge. Timestamps are RFC 3339 TEXT, as everywhere else in this
// codebase.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

/// Document type tag for abstraction-licence documents.
pub const ABSTRACTION_LICENCE: &str = "abstraction_licence";

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Licences and their documents
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS licences (
            id TEXT PRIMARY KEY,
            licence_ref TEXT UNIQUE NOT NULL,
            region_code INTEGER NOT NULL,
            start_date TEXT,
            expiry_date TEXT,
            date_created TEXT NOT NULL,
            date_updated TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            document_ref TEXT UNIQUE NOT NULL,
            document_type TEXT NOT NULL,
            date_created TEXT NOT NULL,
            date_updated TEXT NOT NULL,
            date_deleted TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS licence_versions (
            id TEXT PRIMARY KEY,
            external_id TEXT UNIQUE NOT NULL,
            licence_id TEXT NOT NULL,
            issue_no INTEGER NOT NULL,
            increment_no INTEGER NOT NULL,
            status TEXT,
            start_date TEXT,
            end_date TEXT,
            date_created TEXT NOT NULL,
            date_updated TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Parties
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS companies (
            id TEXT PRIMARY KEY,
            external_id TEXT UNIQUE NOT NULL,
            name TEXT NOT NULL,
            company_type TEXT NOT NULL,
            date_created TEXT NOT NULL,
            date_updated TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS contacts (
            id TEXT PRIMARY KEY,
            external_id TEXT UNIQUE NOT NULL,
            salutation TEXT,
            initials TEXT,
            first_name TEXT,
            last_name TEXT NOT NULL,
            date_created TEXT NOT NULL,
            date_updated TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Purpose conditions and monitoring-station links
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS purpose_conditions (
            id TEXT PRIMARY KEY,
            external_id TEXT UNIQUE NOT NULL,
            purpose_external_id TEXT NOT NULL,
            code TEXT NOT NULL,
            subcode TEXT,
            param_1 TEXT,
            param_2 TEXT,
            notes TEXT,
            date_created TEXT NOT NULL,
            date_updated TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS licence_monitoring_stations (
            id TEXT PRIMARY KEY,
            station_ref TEXT NOT NULL,
            condition_external_id TEXT NOT NULL,
            date_created TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_documents_type ON documents(document_type)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_versions_licence ON licence_versions(licence_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_stations_condition
         ON licence_monitoring_stations(condition_external_id)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// ROW VIEWS (for verification and tests)
// ============================================================================

#[derive(Debug, Clone)]
pub struct DocumentRow {
    pub id: String,
    pub document_ref: String,
    pub document_type: String,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
    pub date_deleted: Option<DateTime<Utc>>,
}

pub fn get_document(conn: &Connection, document_ref: &str) -> Result<Option<DocumentRow>> {
    let row = conn
        .query_row(
            "SELECT id, document_ref, document_type, date_created, date_updated, date_deleted
             FROM documents WHERE document_ref = ?1",
            params![document_ref],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            },
        )
        .optional()?;

    match row {
        None => Ok(None),
        Some((id, document_ref, document_type, created, updated, deleted)) => {
            Ok(Some(DocumentRow {
                id,
                document_ref,
                document_type,
                date_created: parse_timestamp(&created)?,
                date_updated: parse_timestamp(&updated)?,
                date_deleted: deleted.as_deref().map(parse_timestamp).transpose()?,
            }))
        }
    }
}

/// Known target tables. Row counting goes through this enum so table names
/// are never interpolated from caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Licences,
    Documents,
    LicenceVersions,
    Companies,
    Contacts,
    PurposeConditions,
    MonitoringStations,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Licences => "licences",
            Table::Documents => "documents",
            Table::LicenceVersions => "licence_versions",
            Table::Companies => "companies",
            Table::Contacts => "contacts",
            Table::PurposeConditions => "purpose_conditions",
            Table::MonitoringStations => "licence_monitoring_stations",
        }
    }
}

pub fn count_rows(conn: &Connection, table: Table) -> Result<i64> {
    let count = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", table.name()),
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}
