//! Validated property payloads.
//!
//! A [`Properties`] value can only hold names registered for its label, so
//! statement builders never see a caller-supplied property name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::types::{Label, PropertyDef, PropertyKind};

/// A typed property value. Values are only ever sent as query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
}

impl PropertyValue {
    /// Convert a JSON value for the given property. `Ok(None)` for JSON null.
    pub fn from_json(
        label: Label,
        def: &PropertyDef,
        value: &serde_json::Value,
    ) -> Result<Option<Self>, ModelError> {
        use serde_json::Value;

        match (def.kind, value) {
            (_, Value::Null) => Ok(None),
            (PropertyKind::Text, Value::String(s)) => Ok(Some(Self::Text(s.clone()))),
            (PropertyKind::Integer, Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().and_then(whole_number))
                .map(|i| Some(Self::Integer(i)))
                .ok_or_else(|| invalid(label, def)),
            (PropertyKind::Integer, Value::String(s)) => parse_integer(s)
                .map(|i| Some(Self::Integer(i)))
                .ok_or_else(|| invalid(label, def)),
            _ => Err(invalid(label, def)),
        }
    }

    /// Convert an already-trimmed CSV cell for the given property.
    pub fn from_cell(label: Label, def: &PropertyDef, cell: &str) -> Result<Self, ModelError> {
        match def.kind {
            PropertyKind::Text => Ok(Self::Text(cell.to_string())),
            PropertyKind::Integer => parse_integer(cell)
                .map(Self::Integer)
                .ok_or_else(|| invalid(label, def)),
        }
    }
}

/// Parse an integer the way spreadsheets export them: `1999`, ` 1999 `, `1999.0`.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(i) = raw.parse::<i64>() {
        return Some(i);
    }
    raw.parse::<f64>().ok().and_then(whole_number)
}

fn whole_number(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn invalid(label: Label, def: &PropertyDef) -> ModelError {
    ModelError::InvalidValue {
        label: label.to_string(),
        property: def.name.to_string(),
        expected: def.kind.describe(),
    }
}

/// Property payload for one label, keyed by registered property names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Properties {
    label: Label,
    values: BTreeMap<&'static str, PropertyValue>,
}

impl Properties {
    pub fn new(label: Label) -> Self {
        Self {
            label,
            values: BTreeMap::new(),
        }
    }

    /// Validate a JSON object against the label's schema.
    ///
    /// Unknown keys are rejected; null values are left out.
    pub fn from_json(
        label: Label,
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, ModelError> {
        let mut props = Self::new(label);
        for (key, value) in object {
            let def = lookup(label, key)?;
            if let Some(v) = PropertyValue::from_json(label, def, value)? {
                props.values.insert(def.name, v);
            }
        }
        Ok(props)
    }

    pub fn label(&self) -> Label {
        self.label
    }

    /// Set a property by name. The name must be registered for the label.
    pub fn insert(&mut self, name: &str, value: PropertyValue) -> Result<(), ModelError> {
        let def = lookup(self.label, name)?;
        self.values.insert(def.name, value);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        self.values.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterate in property-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &PropertyValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }
}

fn lookup(label: Label, name: &str) -> Result<&'static PropertyDef, ModelError> {
    label.property(name).ok_or_else(|| ModelError::UnknownProperty {
        label: label.to_string(),
        property: name.to_string(),
    })
}
