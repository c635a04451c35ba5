//! Typed custom properties attached to layers, objects and tilesets.

use std::collections::BTreeMap;

use crate::{document::RawProperty, MalformedDocument};

/// Value of a custom property.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    /// Boolean property.
    Bool(bool),
    /// Integer property.
    Int(i64),
    /// Floating point property.
    Float(f32),
    /// String, file, colour or class property.
    String(String),
}

/// Custom properties keyed by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Properties {
    entries: BTreeMap<String, PropertyValue>,
}

impl Properties {
    /// Converts the raw document properties, inferring untyped values.
    pub fn from_raw(raw: &[RawProperty]) -> Result<Self, MalformedDocument> {
        let mut entries = BTreeMap::new();
        for property in raw {
            if let Some(value) = convert(property)? {
                let _ = entries.insert(property.name.clone(), value);
            }
        }
        Ok(Self { entries })
    }

    /// Looks up a property by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries.get(name)
    }

    /// Looks up a boolean property.
    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            PropertyValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Looks up an integer property; whole floats are accepted.
    #[must_use]
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            PropertyValue::Int(value) => Some(*value),
            PropertyValue::Float(value) if value.fract() == 0.0 => Some(*value as i64),
            _ => None,
        }
    }

    /// Looks up a string property.
    #[must_use]
    pub fn str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            PropertyValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Reports whether no properties are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn convert(property: &RawProperty) -> Result<Option<PropertyValue>, MalformedDocument> {
    let value = &property.value;
    let parsed = match property.kind.as_deref() {
        Some("bool") => value.as_bool().map(PropertyValue::Bool),
        Some("int") | Some("object") => value.as_i64().map(PropertyValue::Int),
        Some("float") => value.as_f64().map(|number| PropertyValue::Float(number as f32)),
        Some("string") | Some("file") | Some("color") | Some("class") => value
            .as_str()
            .map(|text| PropertyValue::String(text.to_owned())),
        Some(other) => {
            return Err(MalformedDocument::PropertyType {
                name: property.name.clone(),
                kind: other.to_owned(),
            })
        }
        None => {
            if let Some(flag) = value.as_bool() {
                Some(PropertyValue::Bool(flag))
            } else if let Some(number) = value.as_i64() {
                Some(PropertyValue::Int(number))
            } else if let Some(number) = value.as_f64() {
                Some(PropertyValue::Float(number as f32))
            } else {
                value
                    .as_str()
                    .map(|text| PropertyValue::String(text.to_owned()))
            }
        }
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw(name: &str, kind: Option<&str>, value: serde_json::Value) -> RawProperty {
        RawProperty {
            name: name.to_owned(),
            kind: kind.map(str::to_owned),
            value,
        }
    }

    #[test]
    fn typed_properties_follow_declared_type() {
        let properties = Properties::from_raw(&[
            raw("collidable", Some("bool"), json!(true)),
            raw("health", Some("int"), json!(3)),
            raw("item", Some("string"), json!("hammer")),
        ])
        .expect("properties convert");

        assert_eq!(properties.bool("collidable"), Some(true));
        assert_eq!(properties.int("health"), Some(3));
        assert_eq!(properties.str("item"), Some("hammer"));
        assert_eq!(properties.str("health"), None);
    }

    #[test]
    fn untyped_properties_are_inferred() {
        let properties = Properties::from_raw(&[
            raw("flag", None, json!(false)),
            raw("count", None, json!(2.0)),
            raw("label", None, json!("gate")),
        ])
        .expect("properties convert");

        assert_eq!(properties.bool("flag"), Some(false));
        assert_eq!(properties.int("count"), Some(2));
        assert_eq!(properties.str("label"), Some("gate"));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let error = Properties::from_raw(&[raw("shape", Some("polygon"), json!(1))])
            .expect_err("polygon is not a property type");

        assert!(matches!(error, MalformedDocument::PropertyType { kind, .. } if kind == "polygon"));
    }
}
