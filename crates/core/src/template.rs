//! Placeholder resolution for action parameters.
//!
//! String parameters may contain `MiniJinja` expressions such as
//! `{{ outputs.lookup.role_name }}` that refer to values in the job context
//! data. Resolution never fails the action: a placeholder that cannot be
//! rendered is logged and the original string is kept.

use minijinja::{Environment, UndefinedBehavior};
use serde_json::Value;
use tracing::{debug, warn};

/// Fuel limit for a single render (denial-of-service protection).
const FUEL_LIMIT: u64 = 100_000;

/// Resolve every placeholder in `params` against `data`.
///
/// Objects and arrays are walked recursively. A string that consists of a
/// single `{{ expr }}` keeps the JSON type of the value it refers to, so a
/// placeholder can stand in for a whole `conditions` object.
pub fn resolve_placeholders(params: &Value, data: &Value) -> Value {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_fuel(Some(FUEL_LIMIT));
    let ctx = minijinja::Value::from_serialize(data);

    resolve_value(&env, &ctx, params, "")
}

fn resolve_value(
    env: &Environment<'_>,
    ctx: &minijinja::Value,
    value: &Value,
    path: &str,
) -> Value {
    match value {
        Value::String(text) if has_placeholder(text) => match render(env, ctx, text) {
            Ok(resolved) => {
                debug!(field = %path, "resolved placeholder");
                resolved
            }
            Err(e) => {
                warn!(field = %path, error = %e, "failed to resolve placeholder, keeping original value");
                value.clone()
            }
        },
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    let child = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{path}.{key}")
                    };
                    (key.clone(), resolve_value(env, ctx, item, &child))
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| resolve_value(env, ctx, item, &format!("{path}[{i}]")))
                .collect(),
        ),
        _ => value.clone(),
    }
}

fn has_placeholder(text: &str) -> bool {
    text.contains("{{") || text.contains("{%")
}

/// The inner expression of a string made of exactly one `{{ ... }}`.
fn sole_expression(text: &str) -> Option<&str> {
    let inner = text.trim().strip_prefix("{{")?.strip_suffix("}}")?;
    if inner.contains("{{") || inner.contains("}}") {
        return None;
    }
    Some(inner.trim())
}

fn render(env: &Environment<'_>, ctx: &minijinja::Value, text: &str) -> Result<Value, String> {
    if let Some(expr) = sole_expression(text) {
        let compiled = env
            .compile_expression_owned(expr.to_owned())
            .map_err(|e| e.to_string())?;
        let result = compiled.eval(ctx).map_err(|e| e.to_string())?;
        if result.is_undefined() {
            return Err(format!("undefined value: {expr}"));
        }
        return serde_json::to_value(&result).map_err(|e| e.to_string());
    }

    env.render_str(text, ctx)
        .map(Value::String)
        .map_err(|e| e.to_string())
}
