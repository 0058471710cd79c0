//! # Code and Slug Allocation
//!
//! Codes look like `<prefix>-<NNN>`, e.g. `0525-BUN-011`: a month-year and
//! type prefix followed by a zero-padded sequence scoped to that prefix.
//! Slugs are lowercase, hyphen-joined titles with a numeric suffix on
//! collision.
//!
//! Allocation here is an optimistic probe against a snapshot of existing
//! values. The storage layer's uniqueness constraint is authoritative; the
//! lifecycle retries with a fresh snapshot when a probe loses a race.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};

/// Slug used when a title has no letters or digits at all
const FALLBACK_SLUG: &str = "item";

/// `MMYY-<tag>`, e.g. `0525-BUN`
pub fn code_prefix(date: NaiveDate, tag: &str) -> String {
    format!("{:02}{:02}-{}", date.month(), date.year().rem_euclid(100), tag)
}

/// Sequence number of `code` under exactly `prefix`, if it has one
pub fn sequence_of(code: &str, prefix: &str) -> Option<u64> {
    let digits = code.strip_prefix(prefix)?.strip_prefix('-')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn format_code(prefix: &str, seq: u64) -> String {
    format!("{}-{:03}", prefix, seq)
}

/// Next free code for `prefix`: one past the highest existing sequence,
/// stepping further while a candidate is already taken
///
/// `None` once the sequence space under `prefix` is exhausted.
pub fn allocate_code(prefix: &str, existing: &HashSet<String>) -> Option<String> {
    let highest = existing
        .iter()
        .filter_map(|code| sequence_of(code, prefix))
        .max()
        .unwrap_or(0);

    let mut seq = highest.checked_add(1)?;
    loop {
        let candidate = format_code(prefix, seq);
        if !existing.contains(&candidate) {
            return Some(candidate);
        }
        seq = seq.checked_add(1)?;
    }
}

/// Lowercase, hyphen-separated form of `title`
///
/// Letters and digits of any script are kept; whitespace and separators
/// become single hyphens; everything else is dropped.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// `base` if free, otherwise `base-1`, `base-2`, …
pub fn allocate_slug(base: &str, existing: &HashSet<String>) -> String {
    if !existing.contains(base) {
        return base.to_string();
    }

    let mut suffix: u64 = 1;
    loop {
        let candidate = format!("{}-{}", base, suffix);
        if !existing.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[&str]) -> HashSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_code_prefix_month_year() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 3).unwrap();
        assert_eq!(code_prefix(date, "BUN"), "0525-BUN");

        let date = NaiveDate::from_ymd_opt(2031, 12, 31).unwrap();
        assert_eq!(code_prefix(date, "SRV"), "1231-SRV");
    }

    #[test]
    fn test_allocate_next_in_sequence() {
        let existing = set(&["0525-BUN-001", "0525-BUN-002"]);
        assert_eq!(allocate_code("0525-BUN", &existing).unwrap(), "0525-BUN-003");
    }

    #[test]
    fn test_allocate_first_code() {
        assert_eq!(allocate_code("0525-BUN", &HashSet::new()).unwrap(), "0525-BUN-001");
    }

    #[test]
    fn test_allocate_skips_gaps_from_highest() {
        let existing = set(&["0525-BUN-001", "0525-BUN-011", "0525-BUN-004"]);
        assert_eq!(allocate_code("0525-BUN", &existing).unwrap(), "0525-BUN-012");
    }

    #[test]
    fn test_allocate_ignores_other_prefixes() {
        let existing = set(&["0425-BUN-009", "0525-SRV-007", "0525-BUNDLE-050", "X-1"]);
        assert_eq!(allocate_code("0525-BUN", &existing).unwrap(), "0525-BUN-001");
    }

    #[test]
    fn test_sequence_past_three_digits() {
        let existing = set(&["0525-BUN-999"]);
        assert_eq!(allocate_code("0525-BUN", &existing).unwrap(), "0525-BUN-1000");
    }

    #[test]
    fn test_exhausted_sequence_returns_none() {
        let top = format!("0525-BUN-{}", u64::MAX);
        let existing = set(&[top.as_str(), "0525-BUN-001"]);
        assert_eq!(allocate_code("0525-BUN", &existing), None);

        // Other prefixes are unaffected
        assert_eq!(allocate_code("0525-SRV", &existing).unwrap(), "0525-SRV-001");
    }

    #[test]
    fn test_sequence_of() {
        assert_eq!(sequence_of("0525-BUN-011", "0525-BUN"), Some(11));
        assert_eq!(sequence_of("0525-BUN-01a", "0525-BUN"), None);
        assert_eq!(sequence_of("0525-BUN-", "0525-BUN"), None);
        assert_eq!(sequence_of("0525-BUN011", "0525-BUN"), None);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Summer Skin Offer"), "summer-skin-offer");
        assert_eq!(slugify("  Botox -- 50% off!  "), "botox-50-off");
        assert_eq!(slugify("عرض خاص"), "عرض-خاص");
        assert_eq!(slugify("!!!"), "item");
    }

    #[test]
    fn test_allocate_slug_suffixes() {
        let existing = set(&["summer-offer", "summer-offer-1"]);
        assert_eq!(allocate_slug("summer-offer", &existing), "summer-offer-2");
        assert_eq!(allocate_slug("winter-offer", &existing), "winter-offer");
    }
}
