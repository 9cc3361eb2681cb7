use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use unicode_normalization::UnicodeNormalization;

// Maximal runs of numeral characters. Full-width digits are folded by NFKC before matching.
static NUMERAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9〇零一二三四五六七八九十百千万億兆]+").unwrap());

fn digit_value(c: char) -> Option<u128> {
    let d = match c {
        '〇' | '零' => 0,
        '一' => 1,
        '二' => 2,
        '三' => 3,
        '四' => 4,
        '五' => 5,
        '六' => 6,
        '七' => 7,
        '八' => 8,
        '九' => 9,
        _ => c.to_digit(10)?,
    };
    Some(u128::from(d))
}

fn small_unit(c: char) -> Option<u128> {
    match c {
        '十' => Some(10),
        '百' => Some(100),
        '千' => Some(1_000),
        _ => None,
    }
}

fn large_unit(c: char) -> Option<u128> {
    match c {
        '万' => Some(10_000),
        '億' => Some(100_000_000),
        '兆' => Some(1_000_000_000_000),
        _ => None,
    }
}

/// Value of the coefficient run to the right of `multiplier` once the run is closed.
fn close_run(run: u128, has_run: bool, multiplier: Option<u128>) -> u128 {
    match multiplier {
        Some(m) if has_run => run.saturating_mul(m),
        Some(m) => m,
        None => run,
    }
}

/// Evaluates a segment made of digits and `十百千`, scanning right-to-left.
fn parse_small(chars: &[char]) -> u128 {
    let mut total: u128 = 0;
    let mut run: u128 = 0;
    let mut place: u128 = 1;
    let mut has_run = false;
    let mut pending: Option<u128> = None;

    for &c in chars.iter().rev() {
        if let Some(unit) = small_unit(c) {
            total = total.saturating_add(close_run(run, has_run, pending));
            pending = Some(unit);
            run = 0;
            place = 1;
            has_run = false;
        } else if let Some(d) = digit_value(c) {
            run = run.saturating_add(d.saturating_mul(place));
            place = place.saturating_mul(10);
            has_run = true;
        }
    }
    total.saturating_add(close_run(run, has_run, pending))
}

/// Evaluates a full expression: `万億兆` split it into segments that are each
/// evaluated by [`parse_small`] and used as the coefficient of the unit to their right.
fn parse_large(chars: &[char]) -> u128 {
    let mut total: u128 = 0;
    let mut seg_end = chars.len();
    let mut pending: Option<u128> = None;

    for i in (0..chars.len()).rev() {
        if let Some(unit) = large_unit(chars[i]) {
            let seg = &chars[i + 1..seg_end];
            total = total.saturating_add(close_run(parse_small(seg), !seg.is_empty(), pending));
            pending = Some(unit);
            seg_end = i;
        }
    }
    let head = &chars[..seg_end];
    total.saturating_add(close_run(parse_small(head), !head.is_empty(), pending))
}

/// Converts one maximal numeral run into its digit string.
///
/// Runs without any unit character are positional (`二〇二三`, `〇一`) and are
/// transliterated digit by digit so leading zeros survive.
fn numeral_value(expr: &str) -> String {
    let chars: Vec<char> = expr.chars().collect();
    let has_unit = chars
        .iter()
        .any(|&c| small_unit(c).is_some() || large_unit(c).is_some());

    if !has_unit {
        return chars
            .iter()
            .filter_map(|&c| digit_value(c))
            .map(|d| d.to_string())
            .collect();
    }
    parse_large(&chars).to_string()
}

/// Replaces every numeral substring of `text` with its Arabic-digit equivalent.
///
/// The rest of the text is width-normalized (NFKC) and otherwise left untouched.
/// Never fails: overflowing expressions saturate instead of aborting.
pub fn parse(text: &str) -> String {
    let normalized: String = text.nfkc().collect();
    NUMERAL_RE
        .replace_all(&normalized, |caps: &Captures| numeral_value(&caps[0]))
        .into_owned()
}
