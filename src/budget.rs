use tracing::warn;

/// Number of strings `expand_ambiguity` would produce for `candidates`.
pub fn expansion_size(candidates: &[Vec<String>]) -> usize {
    candidates
        .iter()
        .fold(1usize, |acc, c| acc.saturating_mul(c.len()))
}

/// Narrows the widest positions to their first (analyzer-preferred) candidate until the
/// expansion fits in `max_expansions`. Returns how many positions were narrowed.
pub fn cap_candidates(candidates: &mut [Vec<String>], max_expansions: usize) -> usize {
    let cap = max_expansions.max(1);
    let before = expansion_size(candidates);
    let mut narrowed = 0usize;

    while expansion_size(candidates) > cap {
        // rev() so ties pick the leftmost position
        let Some(widest) = candidates.iter_mut().rev().max_by_key(|c| c.len()) else {
            break;
        };
        if widest.len() <= 1 {
            break;
        }
        widest.truncate(1);
        narrowed += 1;
    }

    if narrowed > 0 {
        warn!(
            "Ambiguity capped - positions_narrowed={}, expansions={} -> {}, cap={}",
            narrowed,
            before,
            expansion_size(candidates),
            cap
        );
    }
    narrowed
}
