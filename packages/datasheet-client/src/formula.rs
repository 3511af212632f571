//! Equality constraints → formula filter expression.
//!
//! Grammar: `{key}="text"`, `{key}=12.5`, `{key}=TRUE()`, `{key}=BLANK()`.
//! Several predicates are joined as `AND(p1,p2,...)` in caller order.

use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::key_map::KeyTranslator;

/// Builds a formula for `constraints`, translating keys first.
///
/// Returns `Ok(None)` for zero constraints; use [`build_required`] when a
/// filter is mandatory.
pub fn build<I, K>(translator: &KeyTranslator, constraints: I) -> Result<Option<String>>
where
    I: IntoIterator<Item = (K, Value)>,
    K: AsRef<str>,
{
    let mut predicates = Vec::new();
    for (key, value) in constraints {
        let key = translator.translate(key.as_ref());
        predicates.push(format!("{{{}}}={}", key, literal(key, &value)?));
    }

    Ok(match predicates.len() {
        0 => None,
        1 => predicates.pop(),
        _ => Some(format!("AND({})", predicates.join(","))),
    })
}

/// Like [`build`] but fails with [`ClientError::QueryBuild`] on zero constraints.
pub fn build_required<I, K>(translator: &KeyTranslator, constraints: I) -> Result<String>
where
    I: IntoIterator<Item = (K, Value)>,
    K: AsRef<str>,
{
    build(translator, constraints)?.ok_or_else(|| {
        ClientError::QueryBuild("at least one field constraint is required".to_string())
    })
}

/// Renders `value` as a formula literal.
fn literal(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(quote(s)),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(true) => Ok("TRUE()".to_string()),
        Value::Bool(false) => Ok("FALSE()".to_string()),
        Value::Null => Ok("BLANK()".to_string()),
        Value::Array(_) | Value::Object(_) => Err(ClientError::QueryBuild(format!(
            "field '{}': only scalar values can be compared for equality",
            key
        ))),
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
