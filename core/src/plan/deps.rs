//! `$N` / `${N}` placeholders: dependency inference and substitution.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::operation::JOIN_OPERATION;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{?(\d+)\}?").expect("placeholder regex"))
}

/// Earlier tasks `idx` waits on.
///
/// Join waits on every earlier index. Any other task waits on the indices its
/// argument text references, restricted to `1..idx`; forward and self
/// references are dropped.
pub fn resolve_dependencies(idx: u32, name: &str, raw_args: &str) -> BTreeSet<u32> {
    if name == JOIN_OPERATION {
        return (1..idx).collect();
    }

    placeholder_re()
        .captures_iter(raw_args)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .filter(|&dep| dep >= 1 && dep < idx)
        .collect()
}

/// Replace each placeholder with `lookup(N)`; placeholders the lookup cannot
/// answer stay as written.
pub fn substitute_placeholders<'t, F>(text: &'t str, lookup: F) -> Cow<'t, str>
where
    F: Fn(u32) -> Option<String>,
{
    placeholder_re().replace_all(text, |caps: &Captures<'_>| {
        caps[1]
            .parse::<u32>()
            .ok()
            .and_then(&lookup)
            .unwrap_or_else(|| caps[0].to_string())
    })
}

/// Apply [`substitute_placeholders`] to every string inside `value`.
pub fn substitute_value<F>(value: &Value, lookup: &F) -> Value
where
    F: Fn(u32) -> Option<String>,
{
    match value {
        Value::String(s) => Value::String(substitute_placeholders(s, lookup).into_owned()),
        Value::Array(items) => Value::Array(items.iter().map(|v| substitute_value(v, lookup)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute_value(v, lookup)))
                .collect(),
        ),
        other => other.clone(),
    }
}
