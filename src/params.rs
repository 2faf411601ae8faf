//! Nested request parameters and their bracket-notation flattening
//!
//! Parameters are modelled as a recursive tree of insertion-ordered maps with
//! scalar leaves. Flattening walks the tree depth-first and names every leaf
//! by its bracketed path, e.g. `{"a": {"b": 1}}` becomes `a[b]=1`.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::{RequestError, Result};

/// Maximum nesting accepted by [`flatten`].
pub const MAX_DEPTH: usize = 32;

/// Insertion-ordered nested parameters.
pub type Params = IndexMap<String, ParamValue>;

/// Flattened parameters keyed by bracketed path.
pub type FlatParams = IndexMap<String, Scalar>;

/// Leaf value of a parameter tree.
///
/// Values are kept untransformed until they are encoded into a URL, a form
/// body or a JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// A node of a parameter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Scalar(Scalar),
    Map(Params),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(value) => write!(f, "{}", value),
            Scalar::Number(value) => write_number(f, value),
            Scalar::String(value) => write!(f, "{}", value),
        }
    }
}

/// Largest integer an `f64` holds exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Whole floats print without a fractional part, so `1.0` encodes as `1`.
fn write_number(f: &mut fmt::Formatter<'_>, value: &Number) -> fmt::Result {
    match value.as_f64() {
        Some(float)
            if value.is_f64() && float.fract() == 0.0 && float.abs() <= MAX_SAFE_INTEGER =>
        {
            write!(f, "{}", float as i64)
        }
        _ => write!(f, "{}", value),
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Scalar(Scalar::String(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Scalar(Scalar::Number(value.into()))
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::Scalar(Scalar::Number(value.into()))
    }
}

impl From<f64> for ParamValue {
    /// Non-finite numbers have no JSON representation and become null.
    fn from(value: f64) -> Self {
        match Number::from_f64(value) {
            Some(number) => ParamValue::Scalar(Scalar::Number(number)),
            None => ParamValue::Scalar(Scalar::Null),
        }
    }
}

impl From<Params> for ParamValue {
    fn from(value: Params) -> Self {
        ParamValue::Map(value)
    }
}

impl TryFrom<Value> for ParamValue {
    type Error = RequestError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(ParamValue::Scalar(Scalar::Null)),
            Value::Bool(b) => Ok(ParamValue::Scalar(Scalar::Bool(b))),
            Value::Number(n) => Ok(ParamValue::Scalar(Scalar::Number(n))),
            Value::String(s) => Ok(ParamValue::Scalar(Scalar::String(s))),
            Value::Object(map) => {
                let mut params = Params::with_capacity(map.len());
                for (key, value) in map {
                    params.insert(key, ParamValue::try_from(value)?);
                }
                Ok(ParamValue::Map(params))
            }
            Value::Array(_) => Err(RequestError::InvalidParam(
                "array values are not supported in nested parameters".to_string(),
            )),
        }
    }
}

/// Build [`Params`] from a JSON object.
///
/// Fails on anything but an object at the top level, and on arrays anywhere.
pub fn from_json(value: Value) -> Result<Params> {
    match ParamValue::try_from(value)? {
        ParamValue::Map(params) => Ok(params),
        ParamValue::Scalar(_) => Err(RequestError::InvalidParam(
            "top-level parameters must be an object".to_string(),
        )),
    }
}

/// Flatten nested parameters into bracket-notation keys.
///
/// Each leaf is named `prefix[k1][k2]...`, or `k1[k2]...` when `prefix` is
/// empty. Keys that collide resolve last-write-wins while keeping the position
/// of their first occurrence. Empty maps contribute nothing.
pub fn flatten(nested: &Params, prefix: &str) -> Result<FlatParams> {
    let mut result = FlatParams::new();
    flatten_into(nested, prefix, 0, &mut result)?;
    Ok(result)
}

fn flatten_into(nested: &Params, prefix: &str, depth: usize, out: &mut FlatParams) -> Result<()> {
    if depth >= MAX_DEPTH {
        return Err(RequestError::DepthExceeded(MAX_DEPTH));
    }

    for (key, value) in nested {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}[{}]", prefix, key)
        };

        match value {
            ParamValue::Map(inner) => flatten_into(inner, &name, depth + 1, out)?,
            ParamValue::Scalar(scalar) => {
                out.insert(name, scalar.clone());
            }
        }
    }
    Ok(())
}

/// Flatten and stringify, ready for query or form encoding.
pub fn flatten_pairs(nested: &Params) -> Result<Vec<(String, String)>> {
    Ok(flatten(nested, "")?
        .into_iter()
        .map(|(key, value)| (key, value.to_string()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nested_fixture() -> Params {
        from_json(json!({
            "a": {"a1": "value-a1", "a2": "value-a2"},
            "b": "value-b",
            "c": {"c1": {"c2": "value-c2"}, "c3": "value-c3"}
        }))
        .expect("fixture params")
    }

    #[test]
    fn flatten_produces_bracketed_paths() {
        let flat = flatten(&nested_fixture(), "").expect("flatten");
        let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a[a1]", "a[a2]", "b", "c[c1][c2]", "c[c3]"]);
        assert_eq!(flat["c[c1][c2]"], Scalar::String("value-c2".to_string()));
        assert_eq!(flat["b"], Scalar::String("value-b".to_string()));
    }

    #[test]
    fn flatten_applies_prefix() {
        let flat = flatten(&from_json(json!({"x": {"y": 1}})).expect("params"), "root")
            .expect("flatten");
        assert_eq!(flat.keys().collect::<Vec<_>>(), vec!["root[x][y]"]);
    }

    #[test]
    fn flatten_passes_scalars_through() {
        let params = from_json(json!({"n": 42, "f": 1.5, "t": true, "z": null})).expect("params");
        let flat = flatten(&params, "").expect("flatten");
        assert_eq!(flat["n"], Scalar::Number(42u64.into()));
        assert_eq!(flat["t"], Scalar::Bool(true));
        assert_eq!(flat["z"], Scalar::Null);

        let pairs = flatten_pairs(&params).expect("pairs");
        assert_eq!(
            pairs,
            vec![
                ("n".to_string(), "42".to_string()),
                ("f".to_string(), "1.5".to_string()),
                ("t".to_string(), "true".to_string()),
                ("z".to_string(), "null".to_string()),
            ]
        );
    }

    #[test]
    fn whole_floats_stringify_as_integers() {
        let mut params = Params::new();
        params.insert("whole".to_string(), ParamValue::from(1.0f64));
        params.insert("negative".to_string(), ParamValue::from(-3.0f64));
        params.insert("half".to_string(), ParamValue::from(2.5f64));
        params.insert("zero".to_string(), ParamValue::from(-0.0f64));

        let pairs = flatten_pairs(&params).expect("pairs");
        assert_eq!(
            pairs,
            vec![
                ("whole".to_string(), "1".to_string()),
                ("negative".to_string(), "-3".to_string()),
                ("half".to_string(), "2.5".to_string()),
                ("zero".to_string(), "0".to_string()),
            ]
        );
    }

    #[test]
    fn flatten_collision_is_last_write_wins() {
        let mut params = Params::new();
        params.insert("a[b]".to_string(), "first".into());
        let mut inner = Params::new();
        inner.insert("b".to_string(), "second".into());
        params.insert("a".to_string(), inner.into());
        params.insert("c".to_string(), "third".into());

        let flat = flatten(&params, "").expect("flatten");
        assert_eq!(flat.len(), 2);
        assert_eq!(flat.get_index(0).map(|(k, _)| k.as_str()), Some("a[b]"));
        assert_eq!(flat["a[b]"], Scalar::String("second".to_string()));
    }

    #[test]
    fn flatten_skips_empty_maps() {
        let params = from_json(json!({"empty": {}, "k": "v"})).expect("params");
        let flat = flatten(&params, "").expect("flatten");
        assert_eq!(flat.keys().collect::<Vec<_>>(), vec!["k"]);
    }

    #[test]
    fn flatten_rejects_excessive_depth() {
        let mut value = ParamValue::from("leaf");
        for _ in 0..=MAX_DEPTH {
            let mut map = Params::new();
            map.insert("k".to_string(), value);
            value = ParamValue::Map(map);
        }
        let ParamValue::Map(params) = value else {
            panic!("expected map");
        };
        let err = flatten(&params, "").expect_err("too deep");
        assert!(matches!(err, RequestError::DepthExceeded(MAX_DEPTH)));
    }

    #[test]
    fn arrays_are_rejected() {
        let err = from_json(json!({"list": [1, 2]})).expect_err("array");
        assert!(matches!(err, RequestError::InvalidParam(_)));

        let err = from_json(json!("scalar")).expect_err("scalar top level");
        assert!(matches!(err, RequestError::InvalidParam(_)));
    }

    #[test]
    fn params_serialize_as_compact_json() {
        let text = serde_json::to_string(&nested_fixture()).expect("serialize");
        assert_eq!(
            text,
            r#"{"a":{"a1":"value-a1","a2":"value-a2"},"b":"value-b","c":{"c1":{"c2":"value-c2"},"c3":"value-c3"}}"#
        );
    }

    #[test]
    fn non_finite_floats_become_null() {
        assert_eq!(ParamValue::from(f64::NAN), ParamValue::Scalar(Scalar::Null));
    }
}
