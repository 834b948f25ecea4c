// 🧽 Orphan Cleaner - Remove target rows with no legacy counterpart
//
// Repeated imports converge: anything the legacy snapshot no longer
// contains gets cleaned out of the target store. Licence documents are
// soft-deleted (timestamped) so history stays queryable; monitoring-station
// links are hard-deleted.
//
// Both cleanups are anti-joins against a temp table of current identifiers,
// populated with bound parameters. They must run AFTER the merge for the
// same record type: cleaning first would treat not-yet-merged current rows
// as orphans.

use chrono::Utc;
use log::info;
use rusqlite::{params, Connection};

use crate::db::ABSTRACTION_LICENCE;
use crate::error::ImportError;

pub struct OrphanCleaner<'conn> {
    conn: &'conn Connection,
}

impl<'conn> OrphanCleaner<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        OrphanCleaner { conn }
    }

    /// Soft-delete abstraction-licence documents whose reference is absent
    /// from the current legacy licence set. Already-deleted rows keep their
    /// original deletion timestamp.
    ///
    /// Returns the number of documents marked deleted.
    pub fn soft_delete_orphan_documents(
        &self,
        current_refs: &[String],
    ) -> Result<usize, ImportError> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "CREATE TEMP TABLE import_current_documents (document_ref TEXT PRIMARY KEY)",
            [],
        )?;

        let result = (|| {
            for document_ref in current_refs {
                tx.execute(
                    "INSERT OR IGNORE INTO import_current_documents (document_ref) VALUES (?1)",
                    params![document_ref],
                )?;
            }

            let now = Utc::now().to_rfc3339();
            let deleted = tx.execute(
                "UPDATE documents
                 SET date_deleted = ?1, date_updated = ?1
                 WHERE document_type = ?2
                   AND date_deleted IS NULL
                   AND document_ref NOT IN (
                       SELECT document_ref FROM import_current_documents
                   )",
                params![now, ABSTRACTION_LICENCE],
            )?;

            Ok::<usize, rusqlite::Error>(deleted)
        })();

        // The temp table lives on the connection, not the transaction, so
        // drop it on both the success and the failure path.
        tx.execute("DROP TABLE import_current_documents", [])?;

        let deleted = result?;
        tx.commit()?;

        if deleted > 0 {
            info!("soft-deleted {deleted} orphan licence documents");
        }
        Ok(deleted)
    }

    /// Hard-delete monitoring-station links whose referenced purpose
    /// condition is absent from the current mapped condition set.
    ///
    /// Returns the number of links removed.
    pub fn delete_orphan_station_links(
        &self,
        current_condition_ids: &[String],
    ) -> Result<usize, ImportError> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "CREATE TEMP TABLE import_current_conditions (external_id TEXT PRIMARY KEY)",
            [],
        )?;

        let result = (|| {
            for external_id in current_condition_ids {
                tx.execute(
                    "INSERT OR IGNORE INTO import_current_conditions (external_id) VALUES (?1)",
                    params![external_id],
                )?;
            }

            let deleted = tx.execute(
                "DELETE FROM licence_monitoring_stations
                 WHERE condition_external_id NOT IN (
                     SELECT external_id FROM import_current_conditions
                 )",
                [],
            )?;

            Ok::<usize, rusqlite::Error>(deleted)
        })();

        tx.execute("DROP TABLE import_current_conditions", [])?;

        let deleted = result?;
        tx.commit()?;

        if deleted > 0 {
            info!("deleted {deleted} orphan monitoring-station links");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{count_rows, get_document, setup_database, Table};
    use crate::merge::MergeWriter;
    use crate::records::LegacyLicence;
    use crate::regions::Region;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn licence(licence_ref: &str) -> LegacyLicence {
        LegacyLicence {
            licence_ref: licence_ref.to_string(),
            region: Region::Anglian,
            start_date: None,
            expiry_date: None,
        }
    }

    fn insert_station_link(conn: &Connection, station_ref: &str, condition_id: &str) {
        conn.execute(
            "INSERT INTO licence_monitoring_stations
             (id, station_ref, condition_external_id, date_created)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                uuid::Uuid::new_v4().to_string(),
                station_ref,
                condition_id,
                Utc::now().to_rfc3339(),
            ],
        )
        .unwrap();
    }

    #[test]
    fn test_soft_deletes_only_the_orphan() {
        let conn = test_conn();
        let writer = MergeWriter::new(&conn);
        writer
            .merge_documents(&[licence("A"), licence("B"), licence("C")])
            .unwrap();

        // Legacy set no longer contains B
        let cleaner = OrphanCleaner::new(&conn);
        let deleted = cleaner
            .soft_delete_orphan_documents(&["A".to_string(), "C".to_string()])
            .unwrap();

        assert_eq!(deleted, 1);
        assert!(get_document(&conn, "A").unwrap().unwrap().date_deleted.is_none());
        assert!(get_document(&conn, "B").unwrap().unwrap().date_deleted.is_some());
        assert!(get_document(&conn, "C").unwrap().unwrap().date_deleted.is_none());
    }

    #[test]
    fn test_already_deleted_documents_keep_their_timestamp() {
        let conn = test_conn();
        let writer = MergeWriter::new(&conn);
        writer.merge_documents(&[licence("B")]).unwrap();

        let cleaner = OrphanCleaner::new(&conn);
        cleaner.soft_delete_orphan_documents(&[]).unwrap();
        let first = get_document(&conn, "B").unwrap().unwrap().date_deleted;

        // Second cleanup pass must not re-stamp the row
        let deleted = cleaner.soft_delete_orphan_documents(&[]).unwrap();
        assert_eq!(deleted, 0);

        let second = get_document(&conn, "B").unwrap().unwrap().date_deleted;
        assert_eq!(first, second);
    }

    #[test]
    fn test_non_licence_documents_are_out_of_scope() {
        let conn = test_conn();
        conn.execute(
            "INSERT INTO documents
             (id, document_ref, document_type, date_created, date_updated)
             VALUES ('x', 'R1', 'returns', ?1, ?1)",
            params![Utc::now().to_rfc3339()],
        )
        .unwrap();

        let cleaner = OrphanCleaner::new(&conn);
        let deleted = cleaner.soft_delete_orphan_documents(&[]).unwrap();

        assert_eq!(deleted, 0);
        assert!(get_document(&conn, "R1").unwrap().unwrap().date_deleted.is_none());
    }

    #[test]
    fn test_hard_deletes_orphan_station_links() {
        let conn = test_conn();
        insert_station_link(&conn, "STN-1", "4455:2:789");
        insert_station_link(&conn, "STN-2", "9999:2:789");

        let cleaner = OrphanCleaner::new(&conn);
        let deleted = cleaner
            .delete_orphan_station_links(&["4455:2:789".to_string()])
            .unwrap();

        assert_eq!(deleted, 1);
        assert_eq!(count_rows(&conn, Table::MonitoringStations).unwrap(), 1);

        let remaining: String = conn
            .query_row(
                "SELECT condition_external_id FROM licence_monitoring_stations",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(remaining, "4455:2:789");
    }

    #[test]
    fn test_cleanup_is_re_runnable_on_same_connection() {
        // Temp tables are per-connection; a second run must not collide
        let conn = test_conn();
        let cleaner = OrphanCleaner::new(&conn);

        cleaner.soft_delete_orphan_documents(&[]).unwrap();
        cleaner.soft_delete_orphan_documents(&[]).unwrap();
        cleaner.delete_orphan_station_links(&[]).unwrap();
        cleaner.delete_orphan_station_links(&[]).unwrap();
    }
}
