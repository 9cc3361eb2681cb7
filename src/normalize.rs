use unicode_normalization::UnicodeNormalization;

// Japanese punctuation that survives NFKC. ASCII punctuation (including the
// folded full-width forms) is handled by `char::is_ascii_punctuation`.
const JA_PUNCTUATION: &[char] = &[
    '、', '。', '・', '「', '」', '『', '』', '【', '】', '〔', '〕', '〈', '〉', '《', '》',
    '〜', '…', '‥', '“', '”', '‘', '’', '〃', '〆',
];

fn is_stripped(c: char) -> bool {
    c.is_ascii_punctuation() || JA_PUNCTUATION.contains(&c)
}

/// Width-normalizes `surface` (NFKC), drops punctuation and collapses whitespace.
pub fn canonicalize(surface: &str) -> String {
    let folded: String = surface.nfkc().filter(|&c| !is_stripped(c)).collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drops a trailing `/reading` sense suffix from one alias component.
fn strip_sense(component: &str) -> &str {
    match component.rfind('/') {
        Some(idx) if idx > 0 => &component[..idx],
        _ => component,
    }
}

/// Bare lookup query for an alias: sense suffixes removed from every
/// space-separated component, components concatenated.
pub fn bare_query(alias: &str) -> String {
    alias.split_whitespace().map(strip_sense).collect()
}
