//! Placeholder token syntax: `[NAME]`, where `NAME` is ASCII letters, digits and underscores.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([A-Za-z0-9_]+)\]").unwrap());

/// Adds the name of every token in `text` to `found`.
pub fn collect_placeholders(text: &str, found: &mut BTreeSet<String>) {
    for caps in PLACEHOLDER_RE.captures_iter(text) {
        found.insert(caps[1].to_string());
    }
}

/// Replaces every token whose name is in `mapping`; unknown tokens are left as they are.
///
/// Replacement is a single pass, so a value that itself looks like a token is
/// written verbatim.
pub fn replace_placeholders<'t>(text: &'t str, mapping: &BTreeMap<String, String>) -> Cow<'t, str> {
    let mut changed = false;
    let replaced = PLACEHOLDER_RE.replace_all(text, |caps: &Captures| match mapping.get(&caps[1]) {
        Some(value) => {
            changed = true;
            value.clone()
        }
        None => caps[0].to_string(),
    });
    if changed {
        Cow::Owned(replaced.into_owned())
    } else {
        Cow::Borrowed(text)
    }
}
