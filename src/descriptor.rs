//! Per-type operation tables for type-erased storage.
//!
//! A [`Descriptor`] knows how to clone, move and drop one concrete type `T` that lives in a
//! raw buffer, either inline or behind a heap pointer. Whether a buffer of a given capacity
//! holds the value inline is decided by [`fits_inline`] alone, so the layout of a buffer is
//! always recoverable from its descriptor and capacity. That is what lets containers of
//! different capacities hand values to each other: every operation takes the capacity of
//! the source and of the destination separately.
//!
//! # Safety Invariant
//!
//! Descriptors are only created by [`Descriptor::of`], which pairs the function pointers
//! with the type they were instantiated for. Every `unsafe` method requires that the
//! buffers it receives were laid out by this same descriptor for the capacity passed
//! alongside them.

use core::any::TypeId;
use core::mem::{self, align_of, size_of};
use core::ptr::{self, NonNull};

#[cfg(not(feature = "std"))]
use alloc::alloc::Layout;
#[cfg(feature = "std")]
use std::alloc::Layout;

use crate::heap::{self, Vacant};

/// Alignment of every inline buffer.
pub(crate) const BUFFER_ALIGN: usize = align_of::<usize>();

/// Returns `true` if a `SizedAny` of `capacity` bytes stores a `T` inline.
///
/// A value is stored inline when it is not larger than the capacity and not more aligned
/// than a pointer. Anything else is moved to the heap and only a pointer to it is kept in
/// the buffer.
///
/// # Example
///
/// ```
/// use sized_any::fits_inline;
///
/// assert!(fits_inline::<u64>(8));
/// assert!(!fits_inline::<[u64; 2]>(8));
///
/// #[repr(align(64))]
/// struct Aligned(u8);
/// assert!(!fits_inline::<Aligned>(128));
/// ```
pub const fn fits_inline<T>(capacity: usize) -> bool {
    size_of::<T>() <= capacity && align_of::<T>() <= BUFFER_ALIGN
}

/// Type identity reported by an empty `SizedAny`.
///
/// `NoType` has no values, so no stored value can ever share its [`TypeId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoType {}

/// Operation table for one stored type.
pub(crate) struct Descriptor {
    type_id: fn() -> TypeId,
    layout: Layout,
    /// Clones the value of `from` into the vacant `to`.
    copy: unsafe fn(*const u8, *mut u8, usize, usize),
    /// Moves the value of `from` into the vacant `to`, leaving `from` vacant.
    move_value: unsafe fn(*mut u8, *mut u8, usize, usize),
    /// Clones the value of `from` over the value held by `to`.
    replace_copy: unsafe fn(*const u8, usize, *mut u8, &mut &'static Descriptor, usize),
    /// Moves the value of `from` over the value held by `to`, leaving `from` vacant.
    replace_move: unsafe fn(*mut u8, usize, *mut u8, &mut &'static Descriptor, usize),
    /// Drops the value in a heap block without freeing the block, unless the drop panics.
    destroy_reuse: unsafe fn(*mut u8),
    /// Drops the value and frees its heap block, if any.
    cleanup: unsafe fn(*mut u8, usize),
}

static EMPTY: Descriptor = Descriptor {
    type_id: TypeId::of::<NoType>,
    layout: Layout::new::<()>(),
    copy: empty::copy,
    move_value: empty::move_value,
    replace_copy: empty::replace_copy,
    replace_move: empty::replace_move,
    destroy_reuse: empty::destroy_reuse,
    cleanup: empty::cleanup,
};

impl Descriptor {
    /// The descriptor of an empty container.
    #[inline]
    pub(crate) fn empty() -> &'static Descriptor {
        &EMPTY
    }

    /// The descriptor of `T`.
    #[inline]
    pub(crate) const fn of<T: Clone + 'static>() -> &'static Descriptor {
        const {
            &Descriptor {
                type_id: TypeId::of::<T>,
                layout: Layout::new::<T>(),
                copy: copy::<T>,
                move_value: move_value::<T>,
                replace_copy: replace_copy::<T>,
                replace_move: replace_move::<T>,
                destroy_reuse: destroy_reuse::<T>,
                cleanup: cleanup::<T>,
            }
        }
    }

    /// Returns `true` for the empty sentinel. Compares addresses, not contents.
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        ptr::eq(self, &EMPTY)
    }

    #[inline]
    pub(crate) fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    #[inline]
    pub(crate) fn layout(&self) -> Layout {
        self.layout
    }

    /// Returns `true` if a buffer of `capacity` bytes keeps this type behind a heap pointer.
    #[inline]
    pub(crate) fn needs_alloc(&self, capacity: usize) -> bool {
        self.layout.size() > capacity || self.layout.align() > BUFFER_ALIGN
    }

    /// # Safety
    ///
    /// `from` holds a value laid out for `from_cap`, `to` is vacant and valid for
    /// `to_cap` bytes.
    #[inline]
    pub(crate) unsafe fn copy(&self, from: *const u8, to: *mut u8, from_cap: usize, to_cap: usize) {
        (self.copy)(from, to, from_cap, to_cap)
    }

    /// # Safety
    ///
    /// As for [`Descriptor::copy`]. Afterwards `from` is vacant and must not be cleaned up.
    #[inline]
    pub(crate) unsafe fn move_value(
        &self,
        from: *mut u8,
        to: *mut u8,
        from_cap: usize,
        to_cap: usize,
    ) {
        (self.move_value)(from, to, from_cap, to_cap)
    }

    /// # Safety
    ///
    /// `from` holds a value laid out for `from_cap`; `to` holds a value laid out by
    /// `*to_descriptor` for `to_cap`. On return `*to_descriptor` describes the new content
    /// of `to`; if the clone panics, `to` and `*to_descriptor` are unchanged.
    #[inline]
    pub(crate) unsafe fn replace_copy(
        &self,
        from: *const u8,
        from_cap: usize,
        to: *mut u8,
        to_descriptor: &mut &'static Descriptor,
        to_cap: usize,
    ) {
        (self.replace_copy)(from, from_cap, to, to_descriptor, to_cap)
    }

    /// # Safety
    ///
    /// As for [`Descriptor::replace_copy`]. Afterwards `from` is vacant.
    #[inline]
    pub(crate) unsafe fn replace_move(
        &self,
        from: *mut u8,
        from_cap: usize,
        to: *mut u8,
        to_descriptor: &mut &'static Descriptor,
        to_cap: usize,
    ) {
        (self.replace_move)(from, from_cap, to, to_descriptor, to_cap)
    }

    /// # Safety
    ///
    /// `block` is the heap block of a value of this type. The block stays allocated and
    /// must later be filled with a value of the same layout or freed with it. If the
    /// value's destructor panics, the block is freed before unwinding further.
    #[inline]
    pub(crate) unsafe fn destroy_reuse(&self, block: *mut u8) {
        (self.destroy_reuse)(block)
    }

    /// # Safety
    ///
    /// `buffer` holds a value of this type laid out for `capacity`. Afterwards it is vacant.
    #[inline]
    pub(crate) unsafe fn cleanup(&self, buffer: *mut u8, capacity: usize) {
        (self.cleanup)(buffer, capacity)
    }
}

/// Address of the value held by `buffer`.
#[inline]
pub(crate) unsafe fn value_ptr<T>(buffer: *mut u8, capacity: usize) -> *mut T {
    if fits_inline::<T>(capacity) {
        buffer.cast::<T>()
    } else {
        read_pointer::<T>(buffer).as_ptr()
    }
}

/// Moves the value out of `buffer`, freeing its heap block. The buffer is left vacant.
#[inline]
pub(crate) unsafe fn read_value<T>(buffer: *mut u8, capacity: usize) -> T {
    if fits_inline::<T>(capacity) {
        buffer.cast::<T>().read()
    } else {
        heap::take(read_pointer::<T>(buffer))
    }
}

#[inline]
unsafe fn read_pointer<T>(buffer: *mut u8) -> NonNull<T> {
    NonNull::new_unchecked(buffer.cast::<*mut T>().read())
}

#[inline]
unsafe fn write_pointer<T>(buffer: *mut u8, block: NonNull<T>) {
    buffer.cast::<*mut T>().write(block.as_ptr())
}

/// Drops whatever `*descriptor` describes in `buffer` and constructs a `T` from `make` in
/// its place, reusing the old heap block when both values need one of the same layout.
///
/// The descriptor is the empty sentinel while the old value is dropped and the new one is
/// built, so a panic in either leaves the container empty. A block allocated for the new
/// value is freed on that path.
pub(crate) unsafe fn construct_replacing<T, F>(
    buffer: *mut u8,
    descriptor: &mut &'static Descriptor,
    capacity: usize,
    make: F,
) -> *mut T
where
    T: Clone + 'static,
    F: FnOnce() -> T,
{
    let previous = mem::replace(descriptor, Descriptor::empty());

    let slot = if fits_inline::<T>(capacity) {
        previous.cleanup(buffer, capacity);
        let slot = buffer.cast::<T>();
        slot.write(make());
        slot
    } else if previous.needs_alloc(capacity) && previous.layout() == Layout::new::<T>() {
        let block = read_pointer::<T>(buffer);
        previous.destroy_reuse(block.as_ptr().cast::<u8>());
        let block = Vacant::new(block).fill(make());
        write_pointer(buffer, block);
        block.as_ptr()
    } else {
        // allocate before freeing, the new block never aliases the old one
        let vacant = Vacant::new(heap::allocate::<T>());
        previous.cleanup(buffer, capacity);
        let block = vacant.fill(make());
        write_pointer(buffer, block);
        block.as_ptr()
    };

    *descriptor = Descriptor::of::<T>();
    slot
}

unsafe fn copy<T: Clone>(from: *const u8, to: *mut u8, from_cap: usize, to_cap: usize) {
    let source = &*value_ptr::<T>(from.cast_mut(), from_cap);
    if fits_inline::<T>(to_cap) {
        to.cast::<T>().write(source.clone());
    } else {
        let vacant = Vacant::new(heap::allocate::<T>());
        write_pointer(to, vacant.fill(source.clone()));
    }
}

unsafe fn move_value<T>(from: *mut u8, to: *mut u8, from_cap: usize, to_cap: usize) {
    match (fits_inline::<T>(from_cap), fits_inline::<T>(to_cap)) {
        // hand the block over, no allocation and no copy of the value
        (false, false) => write_pointer(to, read_pointer::<T>(from)),
        (true, false) => write_pointer(to, heap::store(from.cast::<T>().read())),
        (_, true) => to.cast::<T>().write(read_value::<T>(from, from_cap)),
    }
}

unsafe fn replace_copy<T: Clone + 'static>(
    from: *const u8,
    from_cap: usize,
    to: *mut u8,
    to_descriptor: &mut &'static Descriptor,
    to_cap: usize,
) {
    let value = (*value_ptr::<T>(from.cast_mut(), from_cap)).clone();
    construct_replacing(to, to_descriptor, to_cap, move || value);
}

unsafe fn replace_move<T: Clone + 'static>(
    from: *mut u8,
    from_cap: usize,
    to: *mut u8,
    to_descriptor: &mut &'static Descriptor,
    to_cap: usize,
) {
    if !fits_inline::<T>(from_cap) && !fits_inline::<T>(to_cap) {
        let previous = mem::replace(to_descriptor, Descriptor::empty());
        previous.cleanup(to, to_cap);
        write_pointer(to, read_pointer::<T>(from));
        *to_descriptor = Descriptor::of::<T>();
    } else {
        let value = read_value::<T>(from, from_cap);
        construct_replacing(to, to_descriptor, to_cap, move || value);
    }
}

unsafe fn destroy_reuse<T>(block: *mut u8) {
    let vacant = Vacant::emptied(NonNull::new_unchecked(block.cast::<T>()));
    mem::forget(vacant);
}

unsafe fn cleanup<T>(buffer: *mut u8, capacity: usize) {
    if fits_inline::<T>(capacity) {
        ptr::drop_in_place(buffer.cast::<T>());
    } else {
        drop(Vacant::emptied(read_pointer::<T>(buffer)));
    }
}

mod empty {
    use super::Descriptor;

    pub(super) unsafe fn copy(_: *const u8, _: *mut u8, _: usize, _: usize) {}

    pub(super) unsafe fn move_value(_: *mut u8, _: *mut u8, _: usize, _: usize) {}

    pub(super) unsafe fn replace_copy(
        _: *const u8,
        _: usize,
        to: *mut u8,
        to_descriptor: &mut &'static Descriptor,
        to_cap: usize,
    ) {
        clear(to, to_descriptor, to_cap)
    }

    pub(super) unsafe fn replace_move(
        _: *mut u8,
        _: usize,
        to: *mut u8,
        to_descriptor: &mut &'static Descriptor,
        to_cap: usize,
    ) {
        clear(to, to_descriptor, to_cap)
    }

    pub(super) unsafe fn destroy_reuse(_: *mut u8) {}

    pub(super) unsafe fn cleanup(_: *mut u8, _: usize) {}

    // Assigning nothing over a value still has to drop that value.
    unsafe fn clear(to: *mut u8, to_descriptor: &mut &'static Descriptor, to_cap: usize) {
        let previous = core::mem::replace(to_descriptor, Descriptor::empty());
        previous.cleanup(to, to_cap);
    }
}
