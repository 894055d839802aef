//! Errors raised by the generator when its context stack is driven out of order.
//!
//! None of these come from the JSON content itself: any JSON value walked by
//! [`crate::walker::walk`] is representable. They signal a bug in whatever is
//! calling the [`crate::generator::Generator`] operations.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("cannot enter an object from an object context; enter a property or an array first")]
    ObjectInObject,

    #[error("cannot add type `{ty}` to an object context")]
    TypeOnObject { ty: String },

    #[error("cannot enter property `{key}` outside of an object context")]
    PropertyOutsideObject { key: String },

    #[error("`{op}` requires an active context but the stack is empty")]
    EmptyStack { op: &'static str },
}

impl Error {
    /// Every variant is a caller sequencing mistake; kept as a predicate so
    /// callers can match on the family instead of the variant.
    pub fn is_structural_misuse(&self) -> bool {
        matches!(
            self,
            Self::ObjectInObject
                | Self::TypeOnObject { .. }
                | Self::PropertyOutsideObject { .. }
                | Self::EmptyStack { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
