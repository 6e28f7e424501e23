//! Validation and sanitization for the location parameters the proxy forwards
//! upstream.

/// Longest `city` / `query` value the proxy accepts, in characters.
pub const MAX_PARAM_LEN: usize = 100;

/// Outcome of checking one raw query-string parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamCheck {
    /// Parameter absent, or present with only whitespace.
    Missing,
    /// Present but unusable: repeated, or longer than [`MAX_PARAM_LEN`].
    Invalid,
    /// Present, but sanitizing removed every character.
    Stripped,
    /// Sanitized value, safe to forward.
    Valid(String),
}

/// Keep letters, whitespace and commas; drop everything else.
pub fn sanitize_location(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace() || *c == ',')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Check a parameter given every value it was supplied with in the query string.
pub fn check_location_param(values: &[&str]) -> ParamCheck {
    let raw = match values {
        [] => return ParamCheck::Missing,
        [single] => *single,
        _ => return ParamCheck::Invalid,
    };

    if raw.trim().is_empty() {
        return ParamCheck::Missing;
    }
    if raw.chars().count() > MAX_PARAM_LEN {
        return ParamCheck::Invalid;
    }

    let sanitized = sanitize_location(raw);
    if sanitized.is_empty() {
        return ParamCheck::Stripped;
    }

    ParamCheck::Valid(sanitized)
}
