use anyhow::{bail, Result};
use itertools::Itertools;
use std::collections::BTreeSet;

/// Cartesian product of per-position candidates, each combination joined with a space.
///
/// No positions yields the single empty string. A position without candidates is a
/// caller bug and is reported as an error instead of collapsing the product to nothing.
/// The result holds `product(len)` strings; bound it with `budget::cap_candidates` first.
pub fn expand_ambiguity(candidates: &[Vec<String>]) -> Result<BTreeSet<String>> {
    if candidates.is_empty() {
        return Ok(BTreeSet::from([String::new()]));
    }
    if let Some(pos) = candidates.iter().position(|c| c.is_empty()) {
        bail!("morpheme at position {} has no alias candidates", pos);
    }

    Ok(candidates
        .iter()
        .map(|c| c.iter().map(String::as_str))
        .multi_cartesian_product()
        .map(|parts| parts.join(" ").trim().to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lists(xs: &[&[&str]]) -> Vec<Vec<String>> {
        xs.iter()
            .map(|c| c.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_expand_two_positions() {
        let out = expand_ambiguity(&lists(&[&["A", "B"], &["x"]])).unwrap();
        assert_eq!(out, BTreeSet::from(["A x".to_string(), "B x".to_string()]));
    }

    #[test]
    fn test_expand_product_size() {
        let out = expand_ambiguity(&lists(&[&["a", "b"], &["c", "d", "e"], &["f"]])).unwrap();
        assert_eq!(out.len(), 6);
        assert!(out.contains("b e f"));
    }

    #[test]
    fn test_expand_empty_input() {
        let out = expand_ambiguity(&[]).unwrap();
        assert_eq!(out, BTreeSet::from([String::new()]));
    }

    #[test]
    fn test_expand_single_position() {
        let out = expand_ambiguity(&lists(&[&["走る/はしる"]])).unwrap();
        assert_eq!(out, BTreeSet::from(["走る/はしる".to_string()]));
    }

    #[test]
    fn test_expand_trims_empty_candidate() {
        let out = expand_ambiguity(&lists(&[&[""], &["x"]])).unwrap();
        assert_eq!(out, BTreeSet::from(["x".to_string()]));
    }

    #[test]
    fn test_expand_rejects_empty_position() {
        let err = expand_ambiguity(&lists(&[&["a"], &[]])).unwrap_err();
        assert!(err.to_string().contains("position 1"));
    }
}
