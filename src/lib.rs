//! # SizedAny: Type-Erased Values With Inline Storage
//!
//! [`SizedAny<N>`] holds a value of any clonable `'static` type, like a `Box<dyn Any>`,
//! but keeps values that fit in `N` bytes inside the container itself. Larger or
//! over-aligned values fall back to a heap allocation, and the container keeps a pointer.
//!
//! ## Core Concept
//!
//! Every container carries a pointer to a static descriptor of the held type. The
//! descriptor knows how to clone, move and drop that type, and whether a buffer of a given
//! capacity stores it inline. All operations go through it, which is what lets containers
//! of different capacities exchange values:
//!
//! - moving between capacities hands a heap pointer over without allocating whenever the
//!   value needs the heap on both sides;
//! - assigning or emplacing a heap value over a heap value of the same layout reuses the
//!   existing block.
//!
//! ## Quick Start
//!
//! ```rust
//! use sized_any::{any_cast, SizedAny};
//!
//! // Small values are stored inline
//! let mut a: SizedAny<32> = SizedAny::new(42);
//! assert!(a.has_value());
//! assert!(!a.is_heap());
//! assert_eq!(any_cast::<i32, 32>(&a), Ok(42));
//!
//! // Moving out leaves the source empty
//! let mut b = a.take();
//! assert!(!a.has_value());
//!
//! a.set(7);
//! a.swap(&mut b);
//! assert_eq!(any_cast::<i32, 32>(&a), Ok(42));
//! assert_eq!(any_cast::<i32, 32>(&b), Ok(7));
//! ```
//!
//! ## Capacities
//!
//! The capacity is a number of bytes and must be at least the size of a pointer; smaller
//! capacities are rejected at compile time. The [`space`] module names a few common
//! capacities in pointer-sized words, [`CompactAny`] has the footprint of a `Box<dyn Any>`,
//! and [`sized_any!`] picks the smallest capacity for a given type:
//!
//! ```rust
//! #[macro_use]
//! extern crate sized_any;
//!
//! # fn main() {
//! use sized_any::SizedAny;
//! use sized_any::space::S2;
//!
//! let a: SizedAny<S2> = SizedAny::new((1usize, 2usize));
//! assert!(!a.is_heap());
//!
//! let b = sized_any!([u8; 40], [0; 40]);
//! assert_eq!(b.capacity(), 40);
//! # }
//! ```
//!
//! **Important**: alignment matters! The inline buffer is aligned like a pointer, so a
//! value with a larger alignment is heap-allocated regardless of its size.
//!
//! ## Crossing Capacities
//!
//! ```rust
//! use sized_any::SizedAny;
//!
//! let mut large: SizedAny<64> = SizedAny::new([7u64; 6]);
//! assert!(!large.is_heap());
//!
//! // The value no longer fits, it moves to the heap
//! let mut small: SizedAny<16> = SizedAny::moved_from(&mut large);
//! assert!(small.is_heap());
//! assert!(!large.has_value());
//!
//! large.set(1u8);
//! large.swap_with(&mut small);
//! assert_eq!(large.downcast_ref::<[u64; 6]>(), Some(&[7; 6]));
//! assert_eq!(small.downcast_ref::<u8>(), Some(&1));
//! ```
//!
//! ## Feature Flags
//!
//! - **`std`** (enabled by default)
//!   - Links to the standard library and implements `std::error::Error` for [`BadAnyCast`]
//!   - Disable for `#![no_std]` environments: `default-features = false`

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![deny(clippy::as_conversions)]

extern crate alloc;

mod cast;
mod descriptor;
mod error;
mod heap;
mod sized_any;
pub mod space;

pub use crate::cast::{
    any_cast, any_cast_mut, any_cast_ref, any_cast_take, try_any_cast, try_any_cast_mut,
};
pub use crate::descriptor::{fits_inline, NoType};
pub use crate::error::BadAnyCast;
pub use crate::sized_any::{
    fitting_capacity, make_compact_any, make_sized_any, CompactAny, SizedAny, COMPACT_CAPACITY,
};
