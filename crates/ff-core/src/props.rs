use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A flexible property value supporting the common JSON scalar and
/// container types. Used for entity `properties` and the player's
/// `custom_data` so adventures can attach their own fields without a
/// schema change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    /// A text value.
    String(String),
    /// A 64-bit signed integer value.
    Integer(i64),
    /// A 64-bit floating-point value.
    Float(f64),
    /// A boolean value.
    Bool(bool),
    /// An ordered list of property values.
    List(Vec<PropValue>),
    /// A string-keyed map of property values.
    Map(HashMap<String, PropValue>),
}

impl PropValue {
    /// Returns the boolean value, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Map(_) => write!(f, "{{...}}"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for PropValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// An open property map keyed by field name.
pub type Props = HashMap<String, PropValue>;

/// Shallow-merge `patch` into `base`: keys present in `patch` replace
/// or add top-level entries, other keys are left untouched.
pub fn merge_props(base: &mut Props, patch: Props) {
    for (key, value) in patch {
        base.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_serialization() {
        let v = PropValue::Integer(42);
        assert_eq!(serde_json::to_string(&v).unwrap(), "42");
        let v = PropValue::Bool(true);
        assert_eq!(serde_json::to_string(&v).unwrap(), "true");
        let v: PropValue = serde_json::from_str("\"locked\"").unwrap();
        assert_eq!(v, PropValue::String("locked".to_string()));
    }

    #[test]
    fn accessors() {
        assert_eq!(PropValue::Bool(false).as_bool(), Some(false));
        assert_eq!(PropValue::Integer(7).as_integer(), Some(7));
        assert_eq!(PropValue::from("axe").as_str(), Some("axe"));
        assert_eq!(PropValue::Integer(7).as_bool(), None);
    }

    #[test]
    fn merge_replaces_top_level_only() {
        let mut base = Props::new();
        base.insert("hostile".into(), PropValue::Bool(false));
        base.insert("title".into(), PropValue::from("guard"));

        let mut patch = Props::new();
        patch.insert("hostile".into(), PropValue::Bool(true));
        patch.insert("quest_giver".into(), PropValue::Bool(true));

        merge_props(&mut base, patch);
        assert_eq!(base["hostile"], PropValue::Bool(true));
        assert_eq!(base["title"], PropValue::from("guard"));
        assert_eq!(base["quest_giver"], PropValue::Bool(true));
    }

    #[test]
    fn display_forms() {
        assert_eq!(PropValue::from("sword").to_string(), "sword");
        assert_eq!(
            PropValue::List(vec![PropValue::Integer(1), PropValue::Integer(2)]).to_string(),
            "[1, 2]"
        );
    }
}
