//! Element identifiers.
//!
//! A uid is either a dense, per-type integer (`"0"`, `"1"`, ...) or an
//! externally generated UUID string. The [`UidAllocator`] hands out the next
//! integer per element type, or a fresh UUID once a type has switched to
//! UUID mode.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::ElementType;
use crate::util::{Error, Result};

/// Element identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Uid {
    /// Dense integer uid, unique within its element type.
    Dense(u64),
    /// Canonical hyphenated UUID string.
    External(String),
}

impl Uid {
    /// Parse a uid string: integer-valued strings become [`Uid::Dense`],
    /// canonical UUIDs become [`Uid::External`].
    pub fn parse(s: &str) -> Result<Self> {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            return s
                .parse::<u64>()
                .map(Self::Dense)
                .map_err(|_| Error::InvalidIdentifier(s.to_string()));
        }
        if is_canonical_uuid(s) {
            return Ok(Self::External(s.to_string()));
        }
        Err(Error::InvalidIdentifier(s.to_string()))
    }

    /// Parse a uid from a JSON string or non-negative integer.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) => n
                .as_u64()
                .map(Self::Dense)
                .ok_or_else(|| Error::InvalidIdentifier(n.to_string())),
            other => Err(Error::InvalidIdentifier(other.to_string())),
        }
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        matches!(self, Self::External(_))
    }

    /// Integer value, if dense.
    #[inline]
    pub fn as_int(&self) -> Option<u64> {
        match self {
            Self::Dense(n) => Some(*n),
            Self::External(_) => None,
        }
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dense(n) => write!(f, "{n}"),
            Self::External(s) => f.write_str(s),
        }
    }
}

impl FromStr for Uid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<u64> for Uid {
    fn from(n: u64) -> Self {
        Self::Dense(n)
    }
}

impl From<u32> for Uid {
    fn from(n: u32) -> Self {
        Self::Dense(n.into())
    }
}

impl Serialize for Uid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Uid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}

/// Check the canonical `8-4-4-4-12` hex form.
///
/// Only the hyphenated layout has 36 characters; the simple, braced and urn
/// forms `uuid` also accepts are rejected by the length check.
pub fn is_canonical_uuid(s: &str) -> bool {
    s.len() == 36 && uuid::Uuid::try_parse(s).is_ok()
}

/// Source of fresh external uids.
pub trait UidGenerator: Send {
    /// Produce a new, unique, canonical UUID string.
    fn generate(&mut self) -> String;
}

impl<F: FnMut() -> String + Send> UidGenerator for F {
    fn generate(&mut self) -> String {
        self()
    }
}

/// Random (v4) UUID generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidV4Generator;

impl UidGenerator for UuidV4Generator {
    fn generate(&mut self) -> String {
        uuid::Uuid::new_v4().hyphenated().to_string()
    }
}

/// How new uids are assigned for an element type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UidMode {
    /// Next dense integer after the watermark.
    #[default]
    Integer,
    /// Fresh UUID from the generator.
    External,
}

/// Per-type uid bookkeeping owned by the document.
///
/// Invariant: the watermark of a type is always >= every dense uid stored in
/// that type's table, so auto-assigned integers are never reused.
pub struct UidAllocator {
    last: [Option<u64>; 5],
    modes: [UidMode; 5],
    generator: Box<dyn UidGenerator>,
}

impl UidAllocator {
    pub fn new() -> Self {
        Self::with_generator(UuidV4Generator)
    }

    /// Allocator using a custom external uid source.
    pub fn with_generator(generator: impl UidGenerator + 'static) -> Self {
        Self {
            last: [None; 5],
            modes: [UidMode::Integer; 5],
            generator: Box::new(generator),
        }
    }

    /// Highest dense uid issued or observed for a type.
    pub fn last(&self, element_type: ElementType) -> Option<u64> {
        self.last[element_type.index()]
    }

    pub fn mode(&self, element_type: ElementType) -> UidMode {
        self.modes[element_type.index()]
    }

    pub fn set_mode(&mut self, element_type: ElementType, mode: UidMode) {
        self.modes[element_type.index()] = mode;
    }

    /// Set the same mode for every element type.
    pub fn set_all_modes(&mut self, mode: UidMode) {
        self.modes = [mode; 5];
    }

    /// Resolve the uid for a write.
    ///
    /// - `None`: next integer, or a generated UUID in external mode.
    /// - `Some(Dense(n))`: returned as is; the watermark moves up to `n` if needed.
    ///   A value below the watermark is returned unchanged (it may name an
    ///   existing element).
    /// - `Some(External(_))`: returned as is; the type switches to external mode.
    ///
    /// Fails with [`Error::InvalidIdentifier`] when the integer space of the
    /// type is exhausted.
    pub fn allocate(&mut self, element_type: ElementType, requested: Option<Uid>) -> Result<Uid> {
        let idx = element_type.index();
        let uid = match requested {
            None => match self.modes[idx] {
                UidMode::Integer => {
                    let next = match self.last[idx] {
                        None => 0,
                        Some(n) => n.checked_add(1).ok_or_else(|| {
                            Error::InvalidIdentifier(format!("no {element_type} uid left after {n}"))
                        })?,
                    };
                    self.last[idx] = Some(next);
                    Uid::Dense(next)
                }
                UidMode::External => Uid::External(self.generator.generate()),
            },
            Some(Uid::Dense(n)) => {
                self.observe(element_type, n);
                Uid::Dense(n)
            }
            Some(uid @ Uid::External(_)) => {
                self.modes[idx] = UidMode::External;
                uid
            }
        };
        Ok(uid)
    }

    /// Raise the watermark of a type to at least `n`.
    pub fn observe(&mut self, element_type: ElementType, n: u64) {
        let last = &mut self.last[element_type.index()];
        if last.map_or(true, |l| n > l) {
            *last = Some(n);
        }
    }

    /// Rebuild the state of one type from the uids present in its table.
    ///
    /// The watermark becomes the maximum dense uid; a table holding any
    /// external uid puts the type in external mode.
    pub fn recompute<'a>(&mut self, element_type: ElementType, uids: impl IntoIterator<Item = &'a Uid>) {
        let idx = element_type.index();
        self.last[idx] = None;
        for uid in uids {
            match uid {
                Uid::Dense(n) => self.observe(element_type, *n),
                Uid::External(_) => self.modes[idx] = UidMode::External,
            }
        }
    }

    /// Forget all watermarks and return every type to integer mode.
    pub fn reset(&mut self) {
        self.last = [None; 5];
        self.modes = [UidMode::Integer; 5];
    }
}

impl Default for UidAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UidAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UidAllocator")
            .field("last", &self.last)
            .field("modes", &self.modes)
            .finish_non_exhaustive()
    }
}
