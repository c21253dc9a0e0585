//! Checked access to the value held by a [`SizedAny`].
//!
//! The `Option` forms never fail loudly: a missing container or a type mismatch yields
//! `None`. The `Result` forms report a mismatch as a [`BadAnyCast`]. In both cases the
//! container is left untouched when the types do not match.

use core::any::TypeId;

use crate::{BadAnyCast, SizedAny};

impl<const N: usize> SizedAny<N> {
    /// Returns `true` if the container holds a `T`.
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.has_value() && self.descriptor().type_id() == TypeId::of::<T>()
    }

    /// Returns a reference to the held value if it is a `T`.
    ///
    /// # Example
    ///
    /// ```
    /// use sized_any::SizedAny;
    ///
    /// let a = SizedAny::<16>::new(42i32);
    /// assert_eq!(a.downcast_ref::<i32>(), Some(&42));
    /// assert_eq!(a.downcast_ref::<u32>(), None);
    /// ```
    #[inline]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        if self.is::<T>() {
            // SAFETY: the descriptor is the one of `T`, so the buffer holds a `T`.
            Some(unsafe { &*self.value_ptr::<T>() })
        } else {
            None
        }
    }

    /// Returns a mutable reference to the held value if it is a `T`.
    #[inline]
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        if self.is::<T>() {
            // SAFETY: the descriptor is the one of `T`, so the buffer holds a `T`.
            Some(unsafe { &mut *self.value_mut_ptr::<T>() })
        } else {
            None
        }
    }

    /// Moves the held value out if it is a `T`, otherwise gives the container back.
    ///
    /// # Example
    ///
    /// ```
    /// use sized_any::SizedAny;
    ///
    /// let a = SizedAny::<8>::new(String::from("boxed"));
    /// let a = a.downcast::<u32>().unwrap_err();
    /// assert_eq!(a.downcast::<String>().unwrap(), "boxed");
    /// ```
    pub fn downcast<T: 'static>(mut self) -> Result<T, Self> {
        if self.is::<T>() {
            // SAFETY: the descriptor is the one of `T`, so the buffer holds a `T`.
            Ok(unsafe { self.take_value::<T>() })
        } else {
            Err(self)
        }
    }

    fn mismatch<T: ?Sized>(&self) -> BadAnyCast {
        BadAnyCast::new::<T>(self.type_id())
    }
}

/// Returns a reference to the value held by `operand` if there is an operand and it holds a
/// `T`, `None` otherwise.
///
/// # Example
///
/// ```
/// use sized_any::{try_any_cast, SizedAny};
///
/// let a = SizedAny::<16>::new(1.5f64);
/// assert_eq!(try_any_cast::<f64, 16>(Some(&a)), Some(&1.5));
/// assert_eq!(try_any_cast::<f32, 16>(Some(&a)), None);
/// assert_eq!(try_any_cast::<f64, 16>(None), None);
/// ```
#[inline]
pub fn try_any_cast<T: 'static, const N: usize>(operand: Option<&SizedAny<N>>) -> Option<&T> {
    operand.and_then(|operand| operand.downcast_ref::<T>())
}

/// Mutable counterpart of [`try_any_cast`].
#[inline]
pub fn try_any_cast_mut<T: 'static, const N: usize>(
    operand: Option<&mut SizedAny<N>>,
) -> Option<&mut T> {
    operand.and_then(|operand| operand.downcast_mut::<T>())
}

/// Returns a clone of the held value if it is a `T`.
///
/// # Example
///
/// ```
/// use sized_any::{any_cast, SizedAny};
///
/// let a = SizedAny::<32>::new(42);
/// assert_eq!(any_cast::<i32, 32>(&a), Ok(42));
///
/// let err = any_cast::<String, 32>(&a).unwrap_err();
/// assert!(!err.is_empty());
/// ```
pub fn any_cast<T: Clone + 'static, const N: usize>(
    operand: &SizedAny<N>,
) -> Result<T, BadAnyCast> {
    any_cast_ref::<T, N>(operand).cloned()
}

/// Returns a reference to the held value if it is a `T`.
pub fn any_cast_ref<T: 'static, const N: usize>(operand: &SizedAny<N>) -> Result<&T, BadAnyCast> {
    operand
        .downcast_ref::<T>()
        .ok_or_else(|| operand.mismatch::<T>())
}

/// Returns a mutable reference to the held value if it is a `T`.
pub fn any_cast_mut<T: 'static, const N: usize>(
    operand: &mut SizedAny<N>,
) -> Result<&mut T, BadAnyCast> {
    if operand.is::<T>() {
        // SAFETY: the descriptor is the one of `T`, so the buffer holds a `T`.
        Ok(unsafe { &mut *operand.value_mut_ptr::<T>() })
    } else {
        Err(operand.mismatch::<T>())
    }
}

/// Moves the held value out if it is a `T`, leaving `operand` empty.
///
/// On a mismatch `operand` keeps its value.
///
/// # Example
///
/// ```
/// use sized_any::{any_cast_take, SizedAny};
///
/// let mut a = SizedAny::<8>::new(vec![1, 2]);
/// assert!(any_cast_take::<String, 8>(&mut a).is_err());
/// assert!(a.has_value());
///
/// assert_eq!(any_cast_take::<Vec<i32>, 8>(&mut a), Ok(vec![1, 2]));
/// assert!(!a.has_value());
/// ```
pub fn any_cast_take<T: 'static, const N: usize>(
    operand: &mut SizedAny<N>,
) -> Result<T, BadAnyCast> {
    if operand.is::<T>() {
        // SAFETY: the descriptor is the one of `T`, so the buffer holds a `T`.
        Ok(unsafe { operand.take_value::<T>() })
    } else {
        Err(operand.mismatch::<T>())
    }
}
