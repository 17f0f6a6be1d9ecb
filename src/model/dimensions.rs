//! Metric dimensions and their alternate representations.
//!
//! The search path stores dimensions as a `{key: value}` map. List-style
//! editors work on `{key, operator, value}` rows, and the Metrics Insights
//! builder works on WHERE operator expressions. The conversions between the
//! three are small and deliberately lossy:
//!
//! - map → rows keeps only non-empty single string values; array values are
//!   a read-path artifact of legacy annotation queries and are never written
//!   back through the row editor.
//! - rows → map keeps only rows with both a key and a value.
//!
//! For inputs that already satisfy those filters both directions round-trip.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::sql::expr::{ComparisonOperator, Expression, OperatorExpression, OperatorValue};

/// Operator used by every row produced from a dimension map.
pub const EQUALS: &str = "=";

// =============================================================================
// Dimension map
// =============================================================================

/// Value of a single dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DimensionValue {
    Single(String),
    Multi(Vec<String>),
    /// Key selected without a value yet (JSON `null`).
    Unset,
}

impl DimensionValue {
    /// The value if it is a single non-empty string.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            DimensionValue::Single(v) if !v.is_empty() => Some(v),
            _ => None,
        }
    }
}

impl From<&str> for DimensionValue {
    fn from(value: &str) -> Self {
        DimensionValue::Single(value.to_string())
    }
}

impl From<String> for DimensionValue {
    fn from(value: String) -> Self {
        DimensionValue::Single(value)
    }
}

impl From<Vec<String>> for DimensionValue {
    fn from(values: Vec<String>) -> Self {
        DimensionValue::Multi(values)
    }
}

/// Insertion-ordered dimension map.
///
/// Inserting an existing key replaces its value without moving it, matching
/// how the editors display dimensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dimensions {
    entries: Vec<(String, DimensionValue)>,
}

impl Dimensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<DimensionValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace; returns the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<DimensionValue>,
    ) -> Option<DimensionValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&DimensionValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<DimensionValue> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DimensionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<DimensionValue>> FromIterator<(K, V)> for Dimensions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dims = Dimensions::new();
        for (k, v) in iter {
            dims.insert(k, v);
        }
        dims
    }
}

impl Serialize for Dimensions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Dimensions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DimensionsVisitor;

        impl<'de> Visitor<'de> for DimensionsVisitor {
            type Value = Dimensions;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of dimension keys to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Dimensions, A::Error> {
                let mut dims = Dimensions::new();
                while let Some((key, value)) = access.next_entry::<String, DimensionValue>()? {
                    dims.insert(key, value);
                }
                Ok(dims)
            }
        }

        deserializer.deserialize_map(DimensionsVisitor)
    }
}

// =============================================================================
// Filter rows
// =============================================================================

/// One row of a list-style dimension editor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl FilterCondition {
    /// An `=` row.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            operator: Some(EQUALS.to_string()),
            value: Some(value.into()),
        }
    }

    fn key_and_value(&self) -> Option<(&str, &str)> {
        let key = self.key.as_deref().filter(|k| !k.is_empty())?;
        let value = self.value.as_deref().filter(|v| !v.is_empty())?;
        Some((key, value))
    }
}

/// Map → rows: one `=` row per non-empty single value.
pub fn to_filter_conditions(dimensions: &Dimensions) -> Vec<FilterCondition> {
    dimensions
        .iter()
        .filter_map(|(key, value)| value.as_single().map(|v| FilterCondition::new(key, v)))
        .collect()
}

/// Rows → map: rows missing a key or value are dropped; later rows win.
pub fn from_filter_conditions(conditions: &[FilterCondition]) -> Dimensions {
    conditions
        .iter()
        .filter_map(FilterCondition::key_and_value)
        .collect()
}

/// Copy of `dimensions` without `key`.
///
/// Used when looking up values for `key`, so its own pending value does not
/// constrain the lookup.
pub fn without_key(dimensions: &Dimensions, key: &str) -> Dimensions {
    dimensions
        .iter()
        .filter(|(k, _)| *k != key)
        .map(|(k, v)| (k, v.clone()))
        .collect()
}

/// Dimension map with every key present but unset.
pub fn from_keys<S: AsRef<str>>(keys: &[S]) -> Dimensions {
    keys.iter()
        .map(|k| k.as_ref())
        .filter(|k| !k.is_empty())
        .map(|k| (k, DimensionValue::Unset))
        .collect()
}

// =============================================================================
// SQL operators
// =============================================================================

/// Map → WHERE: an AND of `=` filters; arrays become IN lists.
///
/// Returns `None` when nothing is representable.
pub fn to_sql_filters(dimensions: &Dimensions) -> Option<Expression> {
    let expressions: Vec<Expression> = dimensions
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                DimensionValue::Single(v) if !v.is_empty() => OperatorValue::Single(v.clone()),
                DimensionValue::Multi(vs) => {
                    let vs: Vec<String> = vs.iter().filter(|v| !v.is_empty()).cloned().collect();
                    if vs.is_empty() {
                        return None;
                    }
                    OperatorValue::Multi(vs)
                }
                _ => return None,
            };
            Some(Expression::Operator(OperatorExpression::new(
                key,
                ComparisonOperator::Eq,
                value,
            )))
        })
        .collect();

    (!expressions.is_empty()).then_some(Expression::And { expressions })
}

/// WHERE → map: only resolved `=` filters are representable.
pub fn from_sql_filters(filter: &Expression) -> Dimensions {
    let mut dims = Dimensions::new();
    collect_equalities(filter, &mut dims);
    dims
}

fn collect_equalities(expr: &Expression, dims: &mut Dimensions) {
    match expr {
        Expression::Operator(op)
            if op.is_resolved() && op.operator.name == Some(ComparisonOperator::Eq) =>
        {
            if let (Some(key), Some(value)) = (op.property.name(), op.operator.value.as_ref()) {
                let value = match value {
                    OperatorValue::Single(v) => DimensionValue::Single(v.clone()),
                    OperatorValue::Multi(vs) => DimensionValue::Multi(vs.clone()),
                };
                dims.insert(key, value);
            }
        }
        Expression::And { expressions } | Expression::Or { expressions } => {
            for child in expressions {
                collect_equalities(child, dims);
            }
        }
        _ => {}
    }
}
