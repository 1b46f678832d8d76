//! Defines [`Value`], the dynamically-shaped metadata value, and [`Mapping`],
//! the unit of metadata attached to a scope. Metadata may come from JSON or
//! YAML sources, so [`Value`] deserializes from either via [`serde`].

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// An ordered mapping from metadata key to [`Value`]. Keys iterate in sorted
/// order so rendering and listings are deterministic.
pub type Mapping = BTreeMap<String, Value>;

/// A metadata value. This is the shape shared by JSON and YAML documents.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Map(Mapping),
}

impl Value {
    /// Returns the string slice if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the nested mapping if this is a [`Value::Map`].
    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::String(s)
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Value {
        Value::Map(m)
    }
}

/// Deep-merges `overlay` into `base`. Where both sides hold a mapping for the
/// same key, the mappings are merged recursively; in every other case
/// (scalars, arrays, mismatched shapes) the overlay value replaces the base
/// value outright. Keys present on only one side are kept.
pub fn merge(base: &mut Mapping, overlay: &Mapping) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Map(base_inner)), Value::Map(overlay_inner)) => {
                merge(base_inner, overlay_inner)
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Returns a new mapping with `overlay` deep-merged over `base`. See
/// [`merge`].
pub fn merged(base: &Mapping, overlay: &Mapping) -> Mapping {
    let mut out = base.clone();
    merge(&mut out, overlay);
    out
}

impl From<&Value> for gtmpl::Value {
    /// Converts a metadata [`Value`] into a template value.
    fn from(v: &Value) -> gtmpl::Value {
        match v {
            Value::Null => gtmpl::Value::Nil,
            Value::Bool(b) => gtmpl::Value::Bool(*b),
            Value::Integer(i) => gtmpl::Value::from(*i),
            Value::Float(f) => gtmpl::Value::from(*f),
            Value::String(s) => gtmpl::Value::String(s.clone()),
            Value::Array(items) => {
                gtmpl::Value::Array(items.iter().map(gtmpl::Value::from).collect())
            }
            Value::Map(m) => to_template_value(m),
        }
    }
}

/// Converts a [`Mapping`] into a template object so its keys can be
/// addressed as `{{ .key }}`.
pub fn to_template_value(m: &Mapping) -> gtmpl::Value {
    let mut object: HashMap<String, gtmpl::Value> = HashMap::with_capacity(m.len());
    for (key, value) in m {
        object.insert(key.clone(), value.into());
    }
    gtmpl::Value::Object(object)
}
