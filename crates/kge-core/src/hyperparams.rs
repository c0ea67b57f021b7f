//! Dynamic hyperparameter mapping used to configure training components.
//!
//! A [`Hyperparams`] is a flat, ordered map from validated parameter names to
//! dynamically typed [`ParamValue`]s. It can be assembled in code or parsed
//! from a JSON object.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{KgeError, Result};

static PARAM_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("valid param regex"));

fn config_error(message: String) -> KgeError {
    let err = KgeError::ConfigError { message };
    tracing::error!(%err, "Rejected hyperparameters");
    err
}

/// A dynamically typed value stored in [`Hyperparams`].
#[derive(Clone, PartialEq)]
pub enum ParamValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<ParamValue>),
}

impl ParamValue {
    fn to_debug_string(&self) -> String {
        match self {
            ParamValue::None => "None".to_string(),
            ParamValue::Bool(v) => v.to_string(),
            ParamValue::Int(v) => v.to_string(),
            ParamValue::Float(v) => v.to_string(),
            ParamValue::String(v) => format!("\"{}\"", v),
            ParamValue::List(v) => {
                let items = v
                    .iter()
                    .map(|x| x.to_debug_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{}]", items)
            }
        }
    }

    /// Returns the numeric value for `Int` and `Float`, `None` otherwise.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns true for a single number.
    pub fn is_scalar(&self) -> bool {
        self.as_f64().is_some()
    }

    /// Returns the list items if this is a `List`.
    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::List(v) => Some(v),
            _ => None,
        }
    }

    /// Converts a JSON value. Objects are rejected; the mapping is flat.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        use serde_json::Value;
        match value {
            Value::Null => Ok(ParamValue::None),
            Value::Bool(b) => Ok(ParamValue::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(ParamValue::Int(i)),
                None => n.as_f64().map(ParamValue::Float).ok_or_else(|| {
                    config_error(format!("Unrepresentable number: {}", n))
                }),
            },
            Value::String(s) => Ok(ParamValue::String(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(ParamValue::from_json)
                .collect::<Result<Vec<_>>>()
                .map(ParamValue::List),
            Value::Object(_) => Err(config_error(
                "Nested objects are not supported as hyperparameter values".to_string(),
            )),
        }
    }
}

impl fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_debug_string())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_debug_string())
    }
}

macro_rules! impl_from {
    ($t:ty, $variant:ident) => {
        impl From<$t> for ParamValue {
            fn from(value: $t) -> Self {
                ParamValue::$variant(value.into())
            }
        }
    };
}

impl_from!(bool, Bool);
impl_from!(i32, Int);
impl_from!(i64, Int);
impl_from!(f32, Float);
impl_from!(f64, Float);
impl_from!(String, String);

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl<T> From<Vec<T>> for ParamValue
where
    T: Into<ParamValue>,
{
    fn from(value: Vec<T>) -> Self {
        ParamValue::List(value.into_iter().map(|v| v.into()).collect())
    }
}

/// Name-keyed hyperparameter mapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hyperparams {
    params: BTreeMap<String, ParamValue>,
}

impl Hyperparams {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self {
            params: BTreeMap::new(),
        }
    }

    /// Parses a JSON object such as `{"lambda": [1e-5, 1e-4]}`.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(s).map_err(|e| {
            let err = KgeError::from(e);
            tracing::error!(%err, "Invalid hyperparameter JSON");
            err
        })?;
        Self::from_json_value(&value)
    }

    /// Converts an already parsed JSON object.
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            config_error(format!("Hyperparameters must be a JSON object, got {}", value))
        })?;
        let mut params = Self::new();
        for (name, v) in object {
            params.set(name, ParamValue::from_json(v)?)?;
        }
        Ok(params)
    }

    /// Sets a parameter, overwriting any previous value.
    pub fn set(&mut self, name: &str, value: impl Into<ParamValue>) -> Result<()> {
        if !PARAM_NAME_RE.is_match(name) {
            return Err(config_error(format!("Invalid param name: {}", name)));
        }
        self.params.insert(name.to_string(), value.into());
        Ok(())
    }

    /// Builder form of [`Hyperparams::set`].
    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Returns the value if present.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Returns true if the parameter is present.
    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns an iterator over parameters (name, value) in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Display for Hyperparams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        for (key, value) in &self.params {
            writeln!(f, "  {}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut p = Hyperparams::new();
        p.set("lambda", 0.5).unwrap();
        p.set("eta", 3_i64).unwrap();

        assert_eq!(p.get("lambda"), Some(&ParamValue::Float(0.5)));
        assert_eq!(p.get("eta").and_then(ParamValue::as_f64), Some(3.0));
        assert!(p.contains("lambda"));
        assert!(!p.contains("missing"));
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn test_invalid_name_rejected() {
        let mut p = Hyperparams::new();
        let err = p.set("Lambda", 1.0).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: Invalid param name: Lambda");
        assert!(p.set("9lives", 1.0).is_err());
        assert!(p.is_empty());
    }

    #[test]
    fn test_from_json() {
        let p = Hyperparams::from_json_str(r#"{"lambda": [1, 0.5], "verbose": true}"#).unwrap();
        assert_eq!(
            p.get("lambda"),
            Some(&ParamValue::List(vec![
                ParamValue::Int(1),
                ParamValue::Float(0.5)
            ]))
        );
        assert_eq!(p.get("verbose"), Some(&ParamValue::Bool(true)));

        assert!(Hyperparams::from_json_str("[1, 2]").is_err());
        assert!(Hyperparams::from_json_str(r#"{"lambda": {"a": 1}}"#).is_err());
    }

    #[test]
    fn test_scalar_and_list_helpers() {
        assert!(ParamValue::from(1e-5).is_scalar());
        assert!(ParamValue::from(2_i32).is_scalar());
        assert!(!ParamValue::from("x").is_scalar());

        let list = ParamValue::from(vec![1.0_f64, 2.0]);
        assert_eq!(list.as_list().map(|l| l.len()), Some(2));
        assert!(!list.is_scalar());
    }

    #[test]
    fn test_display() {
        let p = Hyperparams::new()
            .with("lambda", vec![1_i64, 2])
            .unwrap()
            .with("name", "l2")
            .unwrap();
        assert_eq!(p.to_string(), "{\n  lambda: [1, 2]\n  name: \"l2\"\n}");
    }
}
