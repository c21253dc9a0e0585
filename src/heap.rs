use core::mem;
use core::ptr::{self, NonNull};

#[cfg(not(feature = "std"))]
use ::alloc::alloc::{self, Layout};
#[cfg(feature = "std")]
use std::alloc::{self, Layout};

/// Allocates an uninitialized block able to hold one `T`.
///
/// Zero-sized types never touch the allocator, a well-aligned dangling pointer stands
/// in for the block.
pub(crate) fn allocate<T>() -> NonNull<T> {
    let layout = Layout::new::<T>();
    if layout.size() == 0 {
        return NonNull::dangling();
    }

    // SAFETY: the layout has a non-zero size.
    let ptr = unsafe { alloc::alloc(layout) };
    match NonNull::new(ptr.cast::<T>()) {
        Some(block) => block,
        None => alloc::handle_alloc_error(layout),
    }
}

/// Frees a block obtained from [`allocate`] for a type with the same layout as `T`.
///
/// The pointee must already be dropped or moved out.
pub(crate) unsafe fn deallocate<T>(block: NonNull<T>) {
    let layout = Layout::new::<T>();
    if layout.size() != 0 {
        alloc::dealloc(block.as_ptr().cast::<u8>(), layout);
    }
}

/// Moves `value` into a freshly allocated block.
pub(crate) fn store<T>(value: T) -> NonNull<T> {
    let block = allocate::<T>();
    // SAFETY: the block is valid for writes of one `T`.
    unsafe { block.as_ptr().write(value) };
    block
}

/// Reads the value out of `block` and frees it without dropping the value.
pub(crate) unsafe fn take<T>(block: NonNull<T>) -> T {
    let value = block.as_ptr().read();
    deallocate(block);
    value
}

/// A heap block that holds no live value. Freed on drop unless it is filled.
///
/// Guards both ends of a value's life on the heap: the constructor filling a fresh block
/// and the destructor emptying an old one may unwind, and the block is released either way.
pub(crate) struct Vacant<T> {
    block: NonNull<T>,
}

impl<T> Vacant<T> {
    pub(crate) fn new(block: NonNull<T>) -> Self {
        Vacant { block }
    }

    /// Takes over `block` and drops the value it holds. The block is freed when the
    /// returned guard goes out of scope, including when the destructor panics.
    ///
    /// # Safety
    ///
    /// `block` holds a live `T` and is not used by the caller afterwards except through
    /// the returned guard.
    pub(crate) unsafe fn emptied(block: NonNull<T>) -> Self {
        let vacant = Vacant::new(block);
        ptr::drop_in_place(block.as_ptr());
        vacant
    }

    /// Writes `value` into the block and hands it back, now owned by the caller.
    pub(crate) fn fill(self, value: T) -> NonNull<T> {
        let block = self.block;
        mem::forget(self);
        // SAFETY: the block is valid for writes of one `T` and holds nothing yet.
        unsafe { block.as_ptr().write(value) };
        block
    }
}

impl<T> Drop for Vacant<T> {
    fn drop(&mut self) {
        // SAFETY: the block holds no value, it was never filled or its value was dropped.
        unsafe { deallocate(self.block) }
    }
}
