//! Rune compatibility against the catalog of the item's buckets.

use std::collections::HashSet;

use crate::item::strip_rune_suffix;

fn normalize_rune(text: &str) -> String {
    strip_rune_suffix(text).trim().to_lowercase()
}

/// `true` when some used rune cannot go on this item.
///
/// Advisory only. No runes used is always compatible; runes used against an
/// empty or missing catalog are not.
#[must_use]
pub fn check_compatibility(used_runes: &[String], catalog: Option<&[String]>) -> bool {
    if used_runes.is_empty() {
        return false;
    }
    let Some(catalog) = catalog.filter(|c| !c.is_empty()) else {
        return true;
    };

    let allowed: HashSet<String> = catalog.iter().map(|r| normalize_rune(r)).collect();
    used_runes
        .iter()
        .any(|rune| !allowed.contains(&normalize_rune(rune)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn empty_usage_is_never_flagged() {
        assert!(!check_compatibility(&[], None));
        assert!(!check_compatibility(&[], Some(&[] as &[String])));
        assert!(!check_compatibility(&[], Some(list(&["x"]).as_slice())));
    }

    #[test]
    fn missing_catalog_flags_used_runes() {
        let used = list(&["Flame Rune (rune)"]);
        assert!(check_compatibility(&used, None));
        assert!(check_compatibility(&used, Some(&[] as &[String])));
    }

    #[test]
    fn matches_ignore_case_and_marker() {
        let catalog = list(&["+10% to Fire Resistance", "20% increased Attack Speed"]);
        let used = list(&["+10% TO FIRE RESISTANCE (rune)", "20% increased Attack Speed"]);
        assert!(!check_compatibility(&used, Some(catalog.as_slice())));

        let used = list(&["+10% to Fire Resistance (rune)", "+5 to Strength (rune)"]);
        assert!(check_compatibility(&used, Some(catalog.as_slice())));
    }
}
