use std::collections::BTreeMap;

use serde_json::Value;

use crate::bim::model::{
    exact_integer, json_scalar_text, Element, PropertySet, PropertyValue, Scalar,
};

/// Which property sets a lookup may read from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PropertyScope<'a> {
    /// Every property set of the element
    #[default]
    Any,
    /// Only the property set with this name
    Set(&'a str),
}

impl PropertyScope<'_> {
    fn admits(&self, set_name: &str) -> bool {
        match self {
            PropertyScope::Any => true,
            PropertyScope::Set(name) => set_name.eq_ignore_ascii_case(name),
        }
    }
}

/// Conversion from a raw property value; `None` means the value has the wrong shape
pub trait FromProperty: Sized {
    fn from_property(value: &PropertyValue) -> Option<Self>;
}

/// Raw lookup: instance property sets first, then type property sets.
/// `null` values count as absent.
pub fn lookup_property<'e>(
    element: &'e Element,
    scope: PropertyScope<'_>,
    name: &str,
) -> Option<&'e PropertyValue> {
    find_in_sets(&element.property_sets, scope, name)
        .or_else(|| find_in_sets(&element.type_property_sets, scope, name))
}

fn find_in_sets<'e>(
    sets: &'e BTreeMap<String, PropertySet>,
    scope: PropertyScope<'_>,
    name: &str,
) -> Option<&'e PropertyValue> {
    let mut candidates = sets
        .iter()
        .filter(|(set_name, _)| scope.admits(set_name))
        .map(|(_, set)| set);
    let exact = candidates
        .clone()
        .find_map(|set| set.get(name).filter(|value| !value.is_null()));
    exact.or_else(|| {
        candidates.find_map(|set| {
            set.iter()
                .find(|(key, value)| key.eq_ignore_ascii_case(name) && !value.is_null())
                .map(|(_, value)| value)
        })
    })
}

/// Typed lookup; absent or mistyped values yield `None`.
pub fn property<T: FromProperty>(
    element: &Element,
    scope: PropertyScope<'_>,
    name: &str,
) -> Option<T> {
    let value = lookup_property(element, scope, name)?;
    let converted = T::from_property(value);
    if converted.is_none() {
        log::trace!(
            "Property '{}' on '{}' has an unusable value {:?}",
            name,
            element.label(),
            value
        );
    }
    converted
}

/// Lookup with a default. Never fails: absent or malformed values return `default`.
pub fn property_or<T: FromProperty>(
    element: &Element,
    scope: PropertyScope<'_>,
    name: &str,
    default: T,
) -> T {
    property(element, scope, name).unwrap_or(default)
}

/// Like [`property_or`], trying each source name in turn.
pub fn first_property_or<T: FromProperty>(
    element: &Element,
    scope: PropertyScope<'_>,
    names: &[&str],
    default: T,
) -> T {
    names
        .iter()
        .find_map(|name| property(element, scope, name))
        .unwrap_or(default)
}

fn scalar(value: &PropertyValue) -> Option<&Scalar> {
    match value {
        PropertyValue::Scalar(scalar) => Some(scalar),
        _ => None,
    }
}

fn text_to_f64(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}

impl FromProperty for i64 {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match scalar(value)? {
            Scalar::Integer(value) => Some(*value),
            Scalar::Real(value) => exact_integer(*value),
            Scalar::Text(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .or_else(|| text_to_f64(raw).and_then(exact_integer)),
            _ => None,
        }
    }
}

impl FromProperty for f64 {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match scalar(value)? {
            Scalar::Integer(value) => Some(*value as f64),
            Scalar::Real(value) if value.is_finite() => Some(*value),
            Scalar::Text(raw) => text_to_f64(raw),
            _ => None,
        }
    }
}

impl FromProperty for bool {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match scalar(value)? {
            Scalar::Bool(value) => Some(*value),
            Scalar::Integer(0) => Some(false),
            Scalar::Integer(1) => Some(true),
            Scalar::Text(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(true),
                "false" | "no" | "off" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl FromProperty for String {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        Some(scalar(value)?.to_text()).filter(|text| !text.is_empty())
    }
}

impl FromProperty for Vec<String> {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::List(items) => Some(
                items
                    .iter()
                    .map(Scalar::to_text)
                    .filter(|item| !item.is_empty())
                    .collect(),
            ),
            PropertyValue::Scalar(_) => String::from_property(value).map(|item| vec![item]),
            PropertyValue::Other(Value::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(json_scalar_text)
                    .filter(|item| !item.is_empty())
                    .collect(),
            ),
            _ => None,
        }
    }
}

impl FromProperty for BTreeMap<String, String> {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Table(table) => Some(
                table
                    .pairs()
                    .map(|(defining, defined)| (defining.to_text(), defined.to_text()))
                    .collect(),
            ),
            // Plain `{key: value}` objects, keeping only scalar entries
            PropertyValue::Other(Value::Object(entries)) => {
                let table: BTreeMap<String, String> = entries
                    .iter()
                    .filter_map(|(key, value)| Some((key.clone(), json_scalar_text(value)?)))
                    .collect();
                (table.len() == entries.len()).then_some(table)
            }
            _ => None,
        }
    }
}

impl FromProperty for Value {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        Some(value.to_json()).filter(|json| !json.is_null())
    }
}
