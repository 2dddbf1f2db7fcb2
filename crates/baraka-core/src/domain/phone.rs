/// Strips everything except ASCII digits and a single leading `+`.
///
/// Never fails; garbage input collapses to an empty string, which callers
/// treat as "no usable number".
pub fn normalize_phone(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch.is_ascii_digit() {
            out.push(ch);
            continue;
        }
        if ch == '+' && out.is_empty() {
            out.push(ch);
        }
    }
    out
}

pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

pub fn has_usable_digits(value: &str) -> bool {
    value.chars().any(|ch| ch.is_ascii_digit())
}

/// Last `len` digits of the value, or `None` when it carries fewer digits.
pub fn digit_suffix(value: &str, len: usize) -> Option<String> {
    let digits = digits_only(value);
    if digits.len() < len {
        return None;
    }
    Some(digits[digits.len() - len..].to_string())
}
