use core::any::TypeId;
use core::fmt;

use crate::NoType;

/// Error returned by a checked cast when the container does not hold the requested type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadAnyCast {
    requested: &'static str,
    found: TypeId,
}

impl BadAnyCast {
    pub(crate) fn new<T: ?Sized>(found: TypeId) -> Self {
        BadAnyCast {
            requested: core::any::type_name::<T>(),
            found,
        }
    }

    /// Name of the type the caller asked for.
    pub fn requested(&self) -> &'static str {
        self.requested
    }

    /// [`TypeId`] of the value actually held, [`NoType`]'s if the container was empty.
    pub fn found(&self) -> TypeId {
        self.found
    }

    /// Returns `true` if the cast failed because the container was empty.
    pub fn is_empty(&self) -> bool {
        self.found == TypeId::of::<NoType>()
    }
}

impl fmt::Display for BadAnyCast {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            write!(f, "bad any cast: requested `{}` from an empty container", self.requested)
        } else {
            write!(f, "bad any cast: container does not hold a `{}`", self.requested)
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BadAnyCast {}
