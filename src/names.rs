// src/names.rs
// Lineup pages spell the same rower several ways ("J. Smith", "John Q. Smith",
// "Smith, John"). Aggregation keys on a canonical "First Last" form; the raw
// spellings are still kept on the aggregate for auditing.

/// Canonical aggregation key for a raw personal name.
///
/// Heuristics: quoted/parenthesized nicknames are dropped, `"Last, First"` is
/// reordered, trailing generational suffixes (Jr/Sr/II/III/IV/V) are dropped,
/// then first token + last token win. Anything that fails to resolve falls
/// back to the trimmed raw input — this function never errors. Idempotent.
///
/// Initials are kept verbatim: "J. Smith" stays "J. Smith" and does NOT merge
/// with "John Smith". Conversely, two distinct people who share a first and
/// last name will collapse onto one key; that is accepted.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return s!();
    }

    let cleaned = strip_nicknames(trimmed);
    // Commas left over after the reorder (freeform junk) become spaces so the
    // output re-normalizes to itself.
    let flat = unswap_comma(&cleaned).replace(',', " ");

    let mut tokens: Vec<&str> = flat.split_whitespace().collect();
    while tokens.len() > 1 && is_suffix(tokens[tokens.len() - 1]) {
        tokens.pop();
    }

    match tokens.as_slice() {
        [] => s!(trimmed),
        [only] => s!(*only),
        [first, .., last] => format!("{first} {last}"),
    }
}

/// Drop `"Jack"`-style and `(Jack)`-style nickname segments.
fn strip_nicknames(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_quote = false;
    let mut depth = 0usize;
    for ch in s.chars() {
        match ch {
            '"' => in_quote = !in_quote,
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if !in_quote && depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out
}

/// `"Smith, John Q."` → `"John Q. Smith"`. Everything else passes through.
fn unswap_comma(s: &str) -> String {
    match s.split_once(',') {
        Some((last, rest)) if !last.trim().is_empty() && !rest.trim().is_empty() => {
            format!("{} {}", rest.trim(), last.trim())
        }
        _ => s!(s.trim()),
    }
}

fn is_suffix(token: &str) -> bool {
    matches!(
        token.trim_end_matches('.').to_ascii_lowercase().as_str(),
        "jr" | "sr" | "ii" | "iii" | "iv" | "v"
    )
}
