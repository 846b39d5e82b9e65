//! Dynamically typed map values.
//!
//! Maps that store heterogeneous payloads use [`Value`] as their value type.
//! The typed accessors on [`OrderedMap`](crate::OrderedMap) go through
//! [`FromValue`], which either extracts the requested type or reports the
//! type that is actually stored.
//!
//! # Examples
//!
//! ```rust
//! use ordmap::{Error, Value};
//!
//! let value = Value::from("9");
//! assert_eq!(value.cast::<String>(), Ok("9".to_string()));
//! assert!(matches!(
//!     value.cast::<isize>(),
//!     Err(Error::TypeMismatch { actual: "string", .. })
//! ));
//! ```

use std::fmt;

use crate::error::{Error, Result};

/// A value of one of the supported payload types.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// A pointer-width signed integer.
    Int(isize),
    /// A 64-bit signed integer.
    Int64(i64),
    /// A 64-bit float.
    Float64(f64),
    /// A UTF-8 string.
    String(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// A boolean.
    Bool(bool),
}

impl Value {
    /// The name of the stored type, as used in [`Error::TypeMismatch`].
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => isize::TYPE_NAME,
            Self::Int64(_) => i64::TYPE_NAME,
            Self::Float64(_) => f64::TYPE_NAME,
            Self::String(_) => String::TYPE_NAME,
            Self::Bytes(_) => <Vec<u8>>::TYPE_NAME,
            Self::Bool(_) => bool::TYPE_NAME,
        }
    }

    /// Extracts a `T`, or reports what is stored instead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value holds another type.
    pub fn cast<T: FromValue>(&self) -> Result<T> {
        T::from_value(self).ok_or_else(|| Error::TypeMismatch {
            expected: T::TYPE_NAME,
            actual: self.type_name(),
            value: self.to_string(),
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(number) => write!(formatter, "{number}"),
            Self::Int64(number) => write!(formatter, "{number}"),
            Self::Float64(number) => write!(formatter, "{number:?}"),
            Self::String(text) => write!(formatter, "{text:?}"),
            Self::Bytes(bytes) => write!(formatter, "{bytes:?}"),
            Self::Bool(flag) => write!(formatter, "{flag}"),
        }
    }
}

// =============================================================================
// FromValue
// =============================================================================

/// Types that can be extracted from a [`Value`].
pub trait FromValue: Sized {
    /// The name reported in [`Error::TypeMismatch`].
    const TYPE_NAME: &'static str;

    /// Returns the payload if `value` holds this type.
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_value_conversions {
    ($($variant:ident($ty:ty) => $name:literal),* $(,)?) => {
        $(
            impl FromValue for $ty {
                const TYPE_NAME: &'static str = $name;

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(inner) => Some(inner.clone()),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Value {
                #[inline]
                fn from(inner: $ty) -> Self {
                    Self::$variant(inner)
                }
            }
        )*
    };
}

impl_value_conversions! {
    Int(isize) => "int",
    Int64(i64) => "int64",
    Float64(f64) => "float64",
    String(String) => "string",
    Bytes(Vec<u8>) => "bytes",
    Bool(bool) => "bool",
}

impl From<&str> for Value {
    #[inline]
    fn from(text: &str) -> Self {
        Self::String(text.to_owned())
    }
}

impl From<&[u8]> for Value {
    #[inline]
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}
