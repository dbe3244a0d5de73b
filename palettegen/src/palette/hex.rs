use std::collections::HashSet;

/// True iff `s` is `#` followed by exactly six hex digits.
pub fn is_hex_color(s: &str) -> bool {
    let Some(digits) = s.strip_prefix('#') else {
        return false;
    };
    digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

/// First `n` unique entries in first-occurrence order.
///
/// Colors compare case-insensitively, so `#ff0000` and `#FF0000` count as one
/// entry; the spelling seen first is kept. The result may be shorter than `n`.
pub fn dedupe_and_take<I, S>(seq: I, n: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(n);

    for item in seq {
        if out.len() == n {
            break;
        }
        let item = item.as_ref();
        if seen.insert(item.to_ascii_lowercase()) {
            out.push(item.to_string());
        }
    }

    out
}
