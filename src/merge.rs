// 💾 Merge Writer - Idempotent upserts into the target store
//
// Every merge is "insert, or on external-identifier conflict update": the
// insert path mints a surrogate uuid and sets date_created once; the
// conflict path refreshes every mutable field plus date_updated and never
// touches id or date_created. Re-running the same batch leaves the store in
// the same observable state apart from date_updated.
//
// Each batch runs inside one transaction per record type. A mid-batch
// failure rolls the whole batch back and surfaces as a PartialMerge error
// naming the scope, how many rows had been applied, and the identifier
// that failed.

use chrono::Utc;
use log::info;
use rusqlite::{params, Connection};

use crate::conditions::MappedPurposeCondition;
use crate::db::ABSTRACTION_LICENCE;
use crate::error::ImportError;
use crate::parties::{MappedCompany, MappedContact};
use crate::records::{LegacyLicence, LegacyLicenceVersion};

/// Outcome of one committed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    pub scope: &'static str,
    pub merged: usize,
}

pub struct MergeWriter<'conn> {
    conn: &'conn Connection,
}

impl<'conn> MergeWriter<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        MergeWriter { conn }
    }

    /// Upsert licence head rows, keyed by licence reference.
    pub fn merge_licences(&self, licences: &[LegacyLicence]) -> Result<MergeStats, ImportError> {
        self.batch(
            "licences",
            licences,
            |licence| licence.licence_ref.clone(),
            |conn, licence, now| {
                conn.execute(
                    "INSERT INTO licences (
                        id, licence_ref, region_code, start_date, expiry_date,
                        date_created, date_updated
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                    ON CONFLICT(licence_ref) DO UPDATE SET
                        region_code = excluded.region_code,
                        start_date = excluded.start_date,
                        expiry_date = excluded.expiry_date,
                        date_updated = excluded.date_updated",
                    params![
                        new_row_id(),
                        licence.licence_ref,
                        licence.region.code(),
                        licence.start_date.map(|d| d.to_string()),
                        licence.expiry_date.map(|d| d.to_string()),
                        now,
                    ],
                )?;
                Ok(())
            },
        )
    }

    /// Upsert one abstraction-licence document per licence reference.
    ///
    /// A licence present in the legacy set is by definition not an orphan,
    /// so the conflict path also clears date_deleted: a licence that
    /// disappears and later reappears gets its document reinstated.
    pub fn merge_documents(&self, licences: &[LegacyLicence]) -> Result<MergeStats, ImportError> {
        self.batch(
            "documents",
            licences,
            |licence| licence.licence_ref.clone(),
            |conn, licence, now| {
                conn.execute(
                    "INSERT INTO documents (
                        id, document_ref, document_type, date_created, date_updated, date_deleted
                    ) VALUES (?1, ?2, ?3, ?4, ?4, NULL)
                    ON CONFLICT(document_ref) DO UPDATE SET
                        document_type = excluded.document_type,
                        date_updated = excluded.date_updated,
                        date_deleted = NULL",
                    params![new_row_id(), licence.licence_ref, ABSTRACTION_LICENCE, now],
                )?;
                Ok(())
            },
        )
    }

    /// Upsert resolved licence versions, keyed by composed external id.
    ///
    /// Counters are parsed before the transaction opens; a bad counter is a
    /// normalization error, not a partial merge.
    pub fn merge_licence_versions(
        &self,
        versions: &[LegacyLicenceVersion],
    ) -> Result<MergeStats, ImportError> {
        let mut rows = Vec::with_capacity(versions.len());
        for version in versions {
            rows.push((version, version.issue()?, version.increment()?));
        }

        self.batch(
            "licence_versions",
            &rows,
            |(version, _, _)| version.external_id(),
            |conn, (version, issue, increment), now| {
                conn.execute(
                    "INSERT INTO licence_versions (
                        id, external_id, licence_id, issue_no, increment_no,
                        status, start_date, end_date, date_created, date_updated
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
                    ON CONFLICT(external_id) DO UPDATE SET
                        status = excluded.status,
                        start_date = excluded.start_date,
                        end_date = excluded.end_date,
                        date_updated = excluded.date_updated",
                    params![
                        new_row_id(),
                        version.external_id(),
                        version.licence_id,
                        issue,
                        increment,
                        version.status,
                        version.start_date.map(|d| d.to_string()),
                        version.end_date.map(|d| d.to_string()),
                        now,
                    ],
                )?;
                Ok(())
            },
        )
    }

    pub fn merge_companies(&self, companies: &[&MappedCompany]) -> Result<MergeStats, ImportError> {
        self.batch(
            "companies",
            companies,
            |company| company.external_id.clone(),
            |conn, company, now| {
                conn.execute(
                    "INSERT INTO companies (
                        id, external_id, name, company_type, date_created, date_updated
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                    ON CONFLICT(external_id) DO UPDATE SET
                        name = excluded.name,
                        company_type = excluded.company_type,
                        date_updated = excluded.date_updated",
                    params![
                        new_row_id(),
                        company.external_id,
                        company.name,
                        company.company_type.as_str(),
                        now,
                    ],
                )?;
                Ok(())
            },
        )
    }

    pub fn merge_contacts(&self, contacts: &[&MappedContact]) -> Result<MergeStats, ImportError> {
        self.batch(
            "contacts",
            contacts,
            |contact| contact.external_id.clone(),
            |conn, contact, now| {
                conn.execute(
                    "INSERT INTO contacts (
                        id, external_id, salutation, initials, first_name, last_name,
                        date_created, date_updated
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
                    ON CONFLICT(external_id) DO UPDATE SET
                        salutation = excluded.salutation,
                        initials = excluded.initials,
                        first_name = excluded.first_name,
                        last_name = excluded.last_name,
                        date_updated = excluded.date_updated",
                    params![
                        new_row_id(),
                        contact.external_id,
                        contact.salutation,
                        contact.initials,
                        contact.first_name,
                        contact.last_name,
                        now,
                    ],
                )?;
                Ok(())
            },
        )
    }

    pub fn merge_conditions(
        &self,
        conditions: &[MappedPurposeCondition],
    ) -> Result<MergeStats, ImportError> {
        self.batch(
            "purpose_conditions",
            conditions,
            |condition| condition.external_id.clone(),
            |conn, condition, now| {
                conn.execute(
                    "INSERT INTO purpose_conditions (
                        id, external_id, purpose_external_id, code, subcode,
                        param_1, param_2, notes, date_created, date_updated
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
                    ON CONFLICT(external_id) DO UPDATE SET
                        purpose_external_id = excluded.purpose_external_id,
                        code = excluded.code,
                        subcode = excluded.subcode,
                        param_1 = excluded.param_1,
                        param_2 = excluded.param_2,
                        notes = excluded.notes,
                        date_updated = excluded.date_updated",
                    params![
                        new_row_id(),
                        condition.external_id,
                        condition.purpose_external_id,
                        condition.code,
                        condition.subcode,
                        condition.param_1,
                        condition.param_2,
                        condition.notes,
                        now,
                    ],
                )?;
                Ok(())
            },
        )
    }

    /// Run one batch inside a transaction.
    ///
    /// The failing row's identifier and the count merged before it are
    /// reported; the transaction rolls back on drop, so the store never
    /// holds half a batch.
    fn batch<T>(
        &self,
        scope: &'static str,
        items: &[T],
        key: impl Fn(&T) -> String,
        apply: impl Fn(&Connection, &T, &str) -> rusqlite::Result<()>,
    ) -> Result<MergeStats, ImportError> {
        let tx = self.conn.unchecked_transaction()?;
        let now = Utc::now().to_rfc3339();

        let mut merged = 0;
        for item in items {
            if let Err(source) = apply(&tx, item, &now) {
                return Err(ImportError::PartialMerge {
                    scope,
                    merged,
                    failed_id: key(item),
                    source,
                });
            }
            merged += 1;
        }

        tx.commit()?;
        info!("merged {merged} {scope} rows");

        Ok(MergeStats { scope, merged })
    }
}

fn new_row_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
