//! Tag normalization: trim, lowercase, drop blanks, de-duplicate keeping the
//! first occurrence.

use std::collections::HashSet;

pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() && seen.insert(tag.clone()) {
            out.push(tag);
        }
    }
    out
}

/// Tags given to an item created without any
pub fn default_tags(branch_id: Option<u64>) -> Vec<String> {
    let scope = match branch_id {
        Some(id) => format!("branch-{}", id),
        None => "global".to_string(),
    };
    vec!["auto".to_string(), scope]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_dedupe_keeps_first_seen_order() {
        let tags = normalize_tags(["Summer", "skin", "SUMMER", " Skin ", "laser"]);
        assert_eq!(tags, vec!["summer", "skin", "laser"]);
    }

    #[test]
    fn test_blank_tags_dropped() {
        let tags = normalize_tags(vec![String::new(), "  ".to_string(), "x".to_string()]);
        assert_eq!(tags, vec!["x"]);
    }

    #[test]
    fn test_default_tags() {
        assert_eq!(default_tags(Some(3)), vec!["auto", "branch-3"]);
        assert_eq!(default_tags(None), vec!["auto", "global"]);
    }
}
