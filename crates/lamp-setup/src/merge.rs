//! Layering of config values.
//!
//! Every layer is converted to JSON and laid over the previous one,
//! but only where the incoming value differs from the default. That way a
//! flag left at its default on the command line doesn't clobber a value from
//! `setup.toml`.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{from_value, to_value, Result, Value};

/// Merges two objects (converting them to JSON in the process),
/// but only if the incoming patch value isn't the default one.
#[inline]
pub fn merge<T>(value: &T, patch: &T) -> Result<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    let json_value = to_value(value)?;
    let json_patch = to_value(patch)?;
    let json_default = to_value(T::default())?;
    let mut json_merged = json_value;
    json_merge_in(&mut json_merged, json_patch, &json_default);
    from_value(json_merged)
}

/// Recursively merges `patch` into `value` in place,
/// but only if the incoming patch value isn't the default one.
///
/// Keys unknown to `default` are ignored.
#[inline]
pub fn json_merge_in(value: &mut Value, patch: Value, default: &Value) {
    json_merge_inner(value, patch, default, None);
}

/// Inspired by: <https://stackoverflow.com/a/47142105/575773>
fn json_merge_inner(
    old_in: &mut Value,
    new_in: Value,
    defaults: &Value,
    maybe_pointer: Option<&str>,
) {
    match (old_in, new_in) {
        (Value::Object(old), Value::Object(new)) => {
            for (key, new_value) in new {
                let pointer = maybe_pointer.unwrap_or("");
                let new_pointer = format!("{pointer}/{key}");
                let old_value = old.entry(key).or_insert(Value::Null);
                json_merge_inner(old_value, new_value, defaults, Some(&new_pointer));
            }
        }
        (old, new) => {
            let Some(pointer) = maybe_pointer else {
                return;
            };
            let Some(default) = defaults.pointer(pointer) else {
                log::warn!("ignoring unknown config key `{pointer}`");
                return;
            };
            if new != *default {
                *old = new;
            }
        }
    }
}

/// Extension trait for [JSON value](Value).
pub trait JsonKeysToSnakeCase {
    /// Converts JSON keys from kebab case to snake case, e.g. from `a-b` to `a_b`.
    ///
    /// Config files use the same kebab case as the command line flags,
    /// while [`serde`] expects the field names of the Rust structs.
    fn keys_to_snake_case(self) -> Value;
}

impl JsonKeysToSnakeCase for Value {
    #[inline]
    #[expect(clippy::wildcard_enum_match_arm, reason = "we only want objects")]
    fn keys_to_snake_case(self) -> Value {
        match self {
            Self::Object(object) => Self::Object(
                object
                    .into_iter()
                    .map(|(key, value)| (key.replace('-', "_"), value.keys_to_snake_case()))
                    .collect(),
            ),
            other => other,
        }
    }
}
