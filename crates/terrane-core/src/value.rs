//! Typed field values.
//!
//! [`Value`] is the closed set of types a field codec can carry. A composite
//! key or value is an ordered sequence of `Value`s whose shape must match the
//! owning [`Schema`](crate::schema::Schema).

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A single typed field component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// An unsigned integer, range-checked against the field's declared width.
    UInt(u64),
    /// UTF-8 text.
    Str(String),
    /// A raw byte sequence.
    Bytes(Vec<u8>),
    /// A fixed-length 16-byte binary identifier.
    Id([u8; 16]),
    /// An opaque payload carried through a serialized field's dump/load pair.
    Json(serde_json::Value),
}

impl Value {
    /// A short name for the variant, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UInt(_) => "uint",
            Self::Str(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::Id(_) => "id",
            Self::Json(_) => "json",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UInt(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Bytes(b) => write!(f, "{b:02x?}"),
            Self::Id(b) => write!(f, "{b:02x?}"),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

// JSON payloads never appear in key position (serialized codecs are rejected
// as key fields), so hashing them by their rendering is only a fallback.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);
        match self {
            Self::UInt(n) => n.hash(state),
            Self::Str(s) => s.hash(state),
            Self::Bytes(b) => b.hash(state),
            Self::Id(b) => b.hash(state),
            Self::Json(v) => v.to_string().hash(state),
        }
    }
}

macro_rules! impl_from_uint {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Self::UInt(u64::from(v))
            }
        })*
    };
}

impl_from_uint!(u8, u16, u32, u64);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Value {
    fn from(v: &[u8; N]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl From<[u8; 16]> for Value {
    fn from(v: [u8; 16]) -> Self {
        Self::Id(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

/// Conversion of caller arguments into an ordered component list.
///
/// A bare scalar and a one-element sequence normalize to the same row, so a
/// single-field keyspace accepts either form. Tuples cover multi-field
/// composites up to six components.
pub trait IntoRow {
    /// Consumes `self` and produces the ordered components.
    fn into_row(self) -> Vec<Value>;
}

impl IntoRow for Value {
    fn into_row(self) -> Vec<Value> {
        vec![self]
    }
}

impl IntoRow for Vec<Value> {
    fn into_row(self) -> Vec<Value> {
        self
    }
}

impl IntoRow for &[Value] {
    fn into_row(self) -> Vec<Value> {
        self.to_vec()
    }
}

macro_rules! impl_into_row_scalar {
    ($($ty:ty),*) => {
        $(impl IntoRow for $ty {
            fn into_row(self) -> Vec<Value> {
                vec![self.into()]
            }
        })*
    };
}

impl_into_row_scalar!(
    u8,
    u16,
    u32,
    u64,
    &str,
    String,
    Vec<u8>,
    &[u8],
    [u8; 16],
    serde_json::Value
);

macro_rules! impl_into_row_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Into<Value>),+> IntoRow for ($($name,)+) {
            fn into_row(self) -> Vec<Value> {
                vec![$(self.$idx.into()),+]
            }
        }
    };
}

impl_into_row_tuple!(A: 0);
impl_into_row_tuple!(A: 0, B: 1);
impl_into_row_tuple!(A: 0, B: 1, C: 2);
impl_into_row_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_into_row_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_into_row_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
