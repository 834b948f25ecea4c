// 🧹 Field Normalizer - Sentinel and type normalization for legacy fields
//
// The NALD export writes the literal string "null" where the source column
// was SQL NULL. Every legacy field read goes through this module so the
// sentinel is handled in exactly one place, never ad hoc per call site.

use chrono::NaiveDate;

use crate::error::ImportError;

/// Legacy NULL sentinel written by the NALD extract.
const NULL_SENTINEL: &str = "null";

/// Format NALD uses for every date column.
const LEGACY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Normalize a raw legacy field into an optional value.
///
/// The literal `"null"` sentinel (any case) and empty/whitespace-only input
/// become `None`; everything else passes through trimmed.
///
/// ```
/// use nald_sync::normalize::normalize;
///
/// assert_eq!(normalize("Smith"), Some("Smith".to_string()));
/// assert_eq!(normalize("null"), None);
/// assert_eq!(normalize(""), None);
/// ```
pub fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NULL_SENTINEL) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Normalize a field that may already be absent.
pub fn normalize_opt(raw: Option<&str>) -> Option<String> {
    raw.and_then(normalize)
}

/// Normalize a required legacy key field.
///
/// Key columns (licence numbers, party ids, condition codes) get the same
/// sentinel handling as every other field; a sentinel or empty key is bad
/// data surfacing as a normalization error, never a usable value. Without
/// this, a literal "null" licence number would become a live merge key.
pub fn require(field: &'static str, raw: &str) -> Result<String, ImportError> {
    normalize(raw)
        .ok_or_else(|| ImportError::normalization(field, raw, "required field is absent"))
}

/// Parse a legacy DD/MM/YYYY date column, treating sentinels as absent.
///
/// A present-but-unparseable date is a data error, not an absent value.
pub fn parse_legacy_date(
    field: &'static str,
    raw: &str,
) -> Result<Option<NaiveDate>, ImportError> {
    match normalize(raw) {
        None => Ok(None),
        Some(value) => NaiveDate::parse_from_str(&value, LEGACY_DATE_FORMAT)
            .map(Some)
            .map_err(|e| ImportError::normalization(field, &value, e.to_string())),
    }
}

/// Parse a legacy issue/increment counter.
///
/// These order version resolution, so a non-numeric value must surface as
/// an error. Defaulting to 0 here would silently promote a junk version to
/// "most authoritative".
pub fn parse_counter(field: &'static str, raw: &str) -> Result<u32, ImportError> {
    let value = normalize(raw)
        .ok_or_else(|| ImportError::normalization(field, raw, "counter is absent"))?;

    value
        .parse::<u32>()
        .map_err(|e| ImportError::normalization(field, &value, e.to_string()))
}
