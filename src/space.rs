//! Predefined capacities, counted in pointer-sized words.
//!
//! ```
//! use sized_any::SizedAny;
//! use sized_any::space::S4;
//!
//! let a = SizedAny::<S4>::new([0usize; 4]);
//! assert!(!a.is_heap());
//! ```

use core::mem::size_of;

const WORD: usize = size_of::<usize>();

/// Represent 1 * usize space
pub const S1: usize = WORD;
/// Represent 2 * usize space
pub const S2: usize = 2 * WORD;
/// Represent 4 * usize space
pub const S4: usize = 4 * WORD;
/// Represent 8 * usize space
pub const S8: usize = 8 * WORD;
/// Represent 16 * usize space
pub const S16: usize = 16 * WORD;
/// Represent 32 * usize space
pub const S32: usize = 32 * WORD;
/// Represent 64 * usize space
pub const S64: usize = 64 * WORD;
