//! Element categories and write modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::util::{Error, Result};

/// Kind of annotated element.
///
/// Each kind owns its own table in the document and its own set of JSON keys
/// (`objects`, `object_data`, `object_data_pointers`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Object,
    Action,
    Event,
    Context,
    Relation,
}

impl ElementType {
    /// All element types, in document order.
    pub const ALL: [ElementType; 5] = [
        Self::Object,
        Self::Action,
        Self::Event,
        Self::Context,
        Self::Relation,
    ];

    /// Singular name (`"object"`), also used as the RDF edge type.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Action => "action",
            Self::Event => "event",
            Self::Context => "context",
            Self::Relation => "relation",
        }
    }

    /// Key of the element table at the root and inside frames (`"objects"`).
    pub const fn table_key(self) -> &'static str {
        match self {
            Self::Object => "objects",
            Self::Action => "actions",
            Self::Event => "events",
            Self::Context => "contexts",
            Self::Relation => "relations",
        }
    }

    /// Key of the element data table (`"object_data"`).
    pub const fn data_key(self) -> &'static str {
        match self {
            Self::Object => "object_data",
            Self::Action => "action_data",
            Self::Event => "event_data",
            Self::Context => "context_data",
            Self::Relation => "relation_data",
        }
    }

    /// Key of the element data pointer table (`"object_data_pointers"`).
    pub const fn pointers_key(self) -> &'static str {
        match self {
            Self::Object => "object_data_pointers",
            Self::Action => "action_data_pointers",
            Self::Event => "event_data_pointers",
            Self::Context => "context_data_pointers",
            Self::Relation => "relation_data_pointers",
        }
    }

    /// Dense index, used for per-type arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s || t.table_key() == s)
            .ok_or_else(|| Error::invalid(format!("unknown element type: {s}")))
    }
}

/// How a write combines with what is already stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SetMode {
    /// Merge: frame intervals are fused with the existing ones.
    #[default]
    Union,
    /// Overwrite: frame intervals become exactly the given ones.
    Replace,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        assert_eq!(ElementType::Object.table_key(), "objects");
        assert_eq!(ElementType::Context.data_key(), "context_data");
        assert_eq!(ElementType::Relation.pointers_key(), "relation_data_pointers");
        assert_eq!(ElementType::Event.to_string(), "event");
    }

    #[test]
    fn test_parse() {
        assert_eq!("action".parse::<ElementType>().unwrap(), ElementType::Action);
        assert_eq!("relations".parse::<ElementType>().unwrap(), ElementType::Relation);
        assert!("vehicle".parse::<ElementType>().is_err());
    }

    #[test]
    fn test_serde_uses_singular_name() {
        assert_eq!(serde_json::to_string(&ElementType::Context).unwrap(), "\"context\"");
        let t: ElementType = serde_json::from_str("\"relation\"").unwrap();
        assert_eq!(t, ElementType::Relation);
    }

    #[test]
    fn test_index_matches_order() {
        for (i, t) in ElementType::ALL.iter().enumerate() {
            assert_eq!(t.index(), i);
        }
    }
}
