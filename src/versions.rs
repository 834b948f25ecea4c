// ⚖️ Version Resolver - Which licence version is currently authoritative?
//
// NALD keeps every historical version of a licence. When several versions
// share an effective start date, only one of them is the live one; the
// others were superseded by later corrections. The ordering convention:
//
//   1. Higher issue number wins outright.
//   2. Same issue: LOWER increment number wins. Increment 0 is the
//      authoritative record and 1, 2, ... are its superseded drafts. This
//      is the observed legacy convention, not a numeric ordering - do not
//      "fix" it without confirmation from the NALD documentation.
//   3. Equal issue and increment: neither supersedes the other.
//
// Versions with different start dates never compete, so the filter is
// idempotent: every survivor either has no same-date peer or ties with all
// of its same-date peers.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::error::ImportError;
use crate::records::LegacyLicenceVersion;

/// Resolve the currently-authoritative subset of a set of licence versions.
///
/// Input may span multiple licences; supersession is only ever evaluated
/// between versions of the same licence with the same effective start date.
/// Input order is preserved in the output.
///
/// Counters that fail to parse abort the whole resolution: defaulting a
/// junk issue number to 0 would silently demote a live version.
pub fn resolve_current(
    versions: &[LegacyLicenceVersion],
) -> Result<Vec<LegacyLicenceVersion>, ImportError> {
    // Parse every counter up front so one bad row fails fast, before any
    // ordering decision has been made.
    let mut parsed: Vec<(u32, u32)> = Vec::with_capacity(versions.len());
    for version in versions {
        parsed.push((version.issue()?, version.increment()?));
    }

    // Group by (licence, start date); only same-date peers compete.
    let mut groups: HashMap<(&str, Option<NaiveDate>), Vec<usize>> = HashMap::new();
    for (idx, version) in versions.iter().enumerate() {
        groups
            .entry((version.licence_id.as_str(), version.start_date))
            .or_default()
            .push(idx);
    }

    let mut current = Vec::new();
    for (idx, version) in versions.iter().enumerate() {
        let peers = &groups[&(version.licence_id.as_str(), version.start_date)];

        let superseded = peers
            .iter()
            .any(|&other| other != idx && beats(parsed[other], parsed[idx]));

        if !superseded {
            current.push(version.clone());
        }
    }

    Ok(current)
}

/// True if counters `a` order strictly ahead of counters `b`.
fn beats(a: (u32, u32), b: (u32, u32)) -> bool {
    let (issue_a, increment_a) = a;
    let (issue_b, increment_b) = b;

    if issue_a != issue_b {
        // An issue-number difference is decisive regardless of increment
        issue_a > issue_b
    } else {
        // Legacy convention: lower increment is more authoritative
        increment_a < increment_b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::Region;

    fn version(licence: &str, start: &str, issue: &str, increment: &str) -> LegacyLicenceVersion {
        LegacyLicenceVersion {
            licence_id: licence.to_string(),
            region: Region::Thames,
            issue_no: issue.to_string(),
            increment_no: increment.to_string(),
            status: Some("CURR".to_string()),
            start_date: NaiveDate::parse_from_str(start, "%Y-%m-%d").ok(),
            end_date: None,
        }
    }

    #[test]
    fn test_higher_issue_wins_regardless_of_increment() {
        let versions = vec![
            version("L1", "2018-04-01", "1", "5"),
            version("L1", "2018-04-01", "2", "0"),
        ];

        let current = resolve_current(&versions).unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].issue_no, "2");
    }

    #[test]
    fn test_lower_increment_wins_within_issue() {
        let versions = vec![
            version("L1", "2018-04-01", "3", "2"),
            version("L1", "2018-04-01", "3", "1"),
        ];

        let current = resolve_current(&versions).unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].increment_no, "1");
    }

    #[test]
    fn test_exact_tie_retains_both() {
        let versions = vec![
            version("L1", "2018-04-01", "3", "0"),
            version("L1", "2018-04-01", "3", "0"),
        ];

        let current = resolve_current(&versions).unwrap();
        assert_eq!(current.len(), 2);
    }

    #[test]
    fn test_disjoint_start_dates_never_compete() {
        let versions = vec![
            version("L1", "2018-04-01", "1", "0"),
            version("L1", "2019-04-01", "9", "0"),
        ];

        let current = resolve_current(&versions).unwrap();
        assert_eq!(current.len(), 2);
    }

    #[test]
    fn test_different_licences_never_compete() {
        let versions = vec![
            version("L1", "2018-04-01", "1", "0"),
            version("L2", "2018-04-01", "9", "0"),
        ];

        let current = resolve_current(&versions).unwrap();
        assert_eq!(current.len(), 2);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let versions = vec![
            version("L1", "2018-04-01", "2", "0"),
            version("L1", "2018-04-01", "1", "5"),
            version("L1", "2019-04-01", "3", "1"),
            version("L1", "2019-04-01", "3", "2"),
            version("L2", "2018-04-01", "1", "0"),
            version("L2", "2018-04-01", "1", "0"),
        ];

        let once = resolve_current(&versions).unwrap();
        let twice = resolve_current(&once).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_bad_counter_aborts_resolution() {
        let versions = vec![
            version("L1", "2018-04-01", "2", "0"),
            version("L1", "2018-04-01", "junk", "0"),
        ];

        let err = resolve_current(&versions).unwrap_err();
        assert!(err.is_data_error());
    }
}
