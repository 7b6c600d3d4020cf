//! Name transforms shared by the matcher and the registrar.
//!
//! Vendor tool names arrive as toolkit-prefixed SCREAMING_SNAKE_CASE
//! (`CALENDLY_LIST_EVENT_INVITEES`). Three forms are derived from them:
//! a readable display name, a canonical comparison key, and the
//! identifier actually registered with the voice platform.

/// Longest identifier the voice platform accepts.
pub const MAX_PLATFORM_NAME_LEN: usize = 64;

/// Always capitalized.
const ACTION_VERBS: &[&str] = &[
    "create", "get", "list", "add", "update", "delete", "cancel", "search",
];

/// Lowercase unless they open the phrase.
const LOWERCASE_NOUNS: &[&str] = &["event", "user", "invitees"];

/// Always capitalized, even mid-phrase.
const CAPITALIZED_WORDS: &[&str] = &["type", "invitee", "current", "one", "off"];

/// Turn a vendor identifier into a display name.
///
/// Names without an underscore are returned unchanged. Otherwise the
/// toolkit prefix is dropped, each token is cased through the word table,
/// and "one off" becomes "One-Off":
/// `CALENDLY_CREATE_ONE_OFF_EVENT_TYPE` -> `Create One-Off event Type`.
///
/// A leading ALLCAPS token that is itself an action verb is not a prefix
/// and stays: `GET_USER` -> `Get user`, not `User`.
pub fn to_readable(vendor_name: &str) -> String {
    if !vendor_name.contains('_') {
        return vendor_name.to_string();
    }

    let tokens: Vec<&str> = vendor_name.split('_').filter(|t| !t.is_empty()).collect();
    let tokens = strip_toolkit_prefix(&tokens);

    let words: Vec<String> = tokens
        .iter()
        .enumerate()
        .map(|(i, token)| case_token(token, i == 0))
        .collect();

    collapse_one_off(words).join(" ")
}

/// Comparison key: lowercase, runs of `_`, `-` and whitespace folded to a
/// single space, trimmed. Never displayed or persisted.
pub fn to_canonical(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Identifier registered with the voice platform: whitespace runs become
/// `_`, anything outside `[A-Za-z0-9_-]` is dropped, capped at 64 chars.
pub fn to_platform_safe_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .take(MAX_PLATFORM_NAME_LEN)
        .collect()
}

/// Drop a leading ALLCAPS token when more tokens follow. A leading action
/// verb is kept: `GET_USER` has no toolkit prefix.
fn strip_toolkit_prefix<'a>(tokens: &'a [&'a str]) -> &'a [&'a str] {
    match tokens {
        [first, rest @ ..]
            if !rest.is_empty()
                && is_all_caps(first)
                && !ACTION_VERBS.contains(&first.to_lowercase().as_str()) =>
        {
            rest
        }
        _ => tokens,
    }
}

fn is_all_caps(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_uppercase())
        && token
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

fn case_token(token: &str, first: bool) -> String {
    let lower = token.to_lowercase();
    let key = lower.as_str();

    if ACTION_VERBS.contains(&key) || CAPITALIZED_WORDS.contains(&key) {
        capitalize(key)
    } else if LOWERCASE_NOUNS.contains(&key) && !first {
        lower
    } else {
        capitalize(key)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn collapse_one_off(words: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(words.len());
    let mut iter = words.into_iter().peekable();
    while let Some(word) = iter.next() {
        let next_is_off = iter
            .peek()
            .is_some_and(|next| next.eq_ignore_ascii_case("off"));
        if word.eq_ignore_ascii_case("one") && next_is_off {
            iter.next();
            out.push("One-Off".to_string());
        } else {
            out.push(word);
        }
    }
    out
}
