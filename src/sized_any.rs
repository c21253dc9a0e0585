use core::any::TypeId;
use core::cell::UnsafeCell;
use core::fmt;
use core::marker::PhantomData;
use core::mem::{self, size_of, MaybeUninit};

use crate::descriptor::{self, Descriptor};

/// Builds a `SizedAny` whose capacity exactly fits the given type.
///
/// The capacity is [`fitting_capacity::<T>()`](crate::fitting_capacity), so the value is
/// stored inline unless it is over-aligned. The type has to be spelled out because a const
/// generic cannot be computed from a generic type parameter on stable Rust.
///
/// You can think that it has the signature of
/// `sized_any!<T>(val: T) -> SizedAny<{ fitting_capacity::<T>() }>`
///
/// # Example
///
/// ```
/// #[macro_use]
/// extern crate sized_any;
///
/// # fn main() {
/// let a = sized_any!(String, String::from("world"));
/// assert_eq!(a.capacity(), std::mem::size_of::<String>());
/// assert!(!a.is_heap());
///
/// let b = sized_any!(u8, 7);
/// assert_eq!(b.capacity(), std::mem::size_of::<usize>());
/// # }
/// ```
#[macro_export]
macro_rules! sized_any {
    ( $t: ty, $e: expr ) => {
        $crate::SizedAny::<{ $crate::fitting_capacity::<$t>() }>::new::<$t>($e)
    };
}

/// Smallest valid capacity that stores a `T` by size: `size_of::<T>()`, but never less
/// than a pointer.
pub const fn fitting_capacity<T>() -> usize {
    if size_of::<T>() > size_of::<usize>() {
        size_of::<T>()
    } else {
        size_of::<usize>()
    }
}

/// Capacity of [`CompactAny`]: what is left of a `Box<dyn Any>` footprint once the
/// descriptor pointer is accounted for.
pub const COMPACT_CAPACITY: usize =
    size_of::<*const dyn core::any::Any>() - size_of::<*const ()>();

/// A `SizedAny` exactly as large as a `Box<dyn Any>`.
pub type CompactAny = SizedAny<COMPACT_CAPACITY>;

/// Builds a `SizedAny<N>` holding the value returned by `make`.
///
/// # Example
///
/// ```
/// use sized_any::{make_sized_any, SizedAny};
///
/// let a = make_sized_any::<64, _, _>(|| vec![1, 2, 3]);
/// assert_eq!(a.downcast_ref::<Vec<i32>>().map(Vec::len), Some(3));
/// ```
#[inline]
pub fn make_sized_any<const N: usize, T, F>(make: F) -> SizedAny<N>
where
    T: Clone + 'static,
    F: FnOnce() -> T,
{
    SizedAny::new_with(make)
}

/// Builds a [`CompactAny`] holding `value`.
#[inline]
pub fn make_compact_any<T: Clone + 'static>(value: T) -> CompactAny {
    SizedAny::new(value)
}

/// `N` raw bytes aligned to `usize`.
///
/// The bytes sit in an `UnsafeCell`: a value with interior mutability stored inline may be
/// mutated through a shared reference to the container.
#[repr(C)]
struct Buffer<const N: usize> {
    _align: [usize; 0],
    bytes: UnsafeCell<[MaybeUninit<u8>; N]>,
}

impl<const N: usize> Buffer<N> {
    #[inline]
    fn uninit() -> Self {
        const {
            assert!(
                N >= size_of::<usize>(),
                "the capacity of a SizedAny must be able to hold a pointer"
            )
        };
        Buffer {
            _align: [],
            bytes: UnsafeCell::new([MaybeUninit::uninit(); N]),
        }
    }

    #[inline]
    fn as_ptr(&self) -> *mut u8 {
        self.bytes.get().cast::<u8>()
    }

    #[inline]
    fn as_mut_ptr(&mut self) -> *mut u8 {
        self.bytes.get_mut().as_mut_ptr().cast::<u8>()
    }
}

/// A type-erased value with `N` bytes of inline storage.
///
/// A value of type `T` is stored inside the container when it is at most `N` bytes and not
/// more aligned than a pointer; otherwise it is moved to the heap and the container keeps a
/// pointer to it. See [`fits_inline`](crate::fits_inline).
///
/// `N` must be at least `size_of::<usize>()`, any smaller capacity fails to compile.
///
/// `SizedAny` is neither `Send` nor `Sync`, as it may hold any `'static` type.
pub struct SizedAny<const N: usize> {
    descriptor: &'static Descriptor,
    buffer: Buffer<N>,
    _marker: PhantomData<*mut ()>,
}

impl<const N: usize> SizedAny<N> {
    /// The inline capacity in bytes.
    pub const CAPACITY: usize = N;

    /// Creates an empty container.
    ///
    /// # Example
    ///
    /// ```
    /// use sized_any::{NoType, SizedAny};
    /// use std::any::TypeId;
    ///
    /// let a = SizedAny::<32>::empty();
    /// assert!(!a.has_value());
    /// assert_eq!(a.type_id(), TypeId::of::<NoType>());
    /// ```
    #[inline]
    pub fn empty() -> Self {
        SizedAny {
            descriptor: Descriptor::empty(),
            buffer: Buffer::uninit(),
            _marker: PhantomData,
        }
    }

    /// Stores `value`, inline or on the heap depending on its layout.
    ///
    /// Passing a `SizedAny` stores the container itself, nested. To take over the content
    /// of another container use [`SizedAny::moved_from`] or [`SizedAny::cloned_from`].
    /// Nesting a container of the same capacity is rejected in debug builds.
    ///
    /// # Example
    ///
    /// ```
    /// use sized_any::SizedAny;
    ///
    /// let small = SizedAny::<16>::new([1u32, 2]);
    /// let large = SizedAny::<16>::new([0u32; 32]);
    ///
    /// assert!(!small.is_heap());
    /// assert!(large.is_heap());
    /// ```
    #[inline]
    pub fn new<T: Clone + 'static>(value: T) -> Self {
        Self::new_with(move || value)
    }

    /// Stores the value returned by `make`, constructed directly in its final place.
    ///
    /// If the value goes to the heap, the block is allocated first and freed again if
    /// `make` panics.
    pub fn new_with<T, F>(make: F) -> Self
    where
        T: Clone + 'static,
        F: FnOnce() -> T,
    {
        let mut result = Self::empty();
        result.emplace_with(make);
        result
    }

    /// Collects `iter` into a `T` stored in a new container.
    ///
    /// # Example
    ///
    /// ```
    /// use sized_any::{any_cast_ref, SizedAny};
    ///
    /// let a = SizedAny::<64>::collect::<Vec<i32>, _>([1, 2, 3]);
    /// assert_eq!(any_cast_ref::<Vec<i32>, 64>(&a).unwrap(), &[1, 2, 3]);
    /// ```
    pub fn collect<T, I>(iter: I) -> Self
    where
        T: Clone + FromIterator<I::Item> + 'static,
        I: IntoIterator,
    {
        Self::new_with(move || iter.into_iter().collect::<T>())
    }

    /// Clones the content of a container of any capacity into a new one.
    ///
    /// No allocation happens if the value fits inline in `N` bytes.
    pub fn cloned_from<const M: usize>(other: &SizedAny<M>) -> Self {
        let mut buffer = Buffer::uninit();
        // SAFETY: `other.buffer` is laid out by its descriptor for `M`, `buffer` is vacant.
        unsafe {
            other
                .descriptor
                .copy(other.buffer.as_ptr(), buffer.as_mut_ptr(), M, N)
        };
        SizedAny {
            descriptor: other.descriptor,
            buffer,
            _marker: PhantomData,
        }
    }

    /// Moves the content of a container of any capacity into a new one, leaving `other`
    /// empty.
    ///
    /// A value `other` keeps on the heap is handed over without allocating if it also
    /// needs the heap in `N` bytes. A new block is only allocated when the value was
    /// inline in `other` but does not fit in `N` bytes, which cannot happen when `M <= N`.
    pub fn moved_from<const M: usize>(other: &mut SizedAny<M>) -> Self {
        let descriptor = mem::replace(&mut other.descriptor, Descriptor::empty());
        let mut buffer = Buffer::uninit();
        // SAFETY: `other.buffer` held a value laid out by `descriptor` for `M`; it is
        // vacant afterwards, matching the empty descriptor it now has.
        unsafe { descriptor.move_value(other.buffer.as_mut_ptr(), buffer.as_mut_ptr(), M, N) };
        SizedAny {
            descriptor,
            buffer,
            _marker: PhantomData,
        }
    }

    /// Changes the capacity of the container.
    ///
    /// # Example
    ///
    /// ```
    /// use sized_any::SizedAny;
    ///
    /// let s = SizedAny::<32>::new([0usize; 3]);
    /// assert!(!s.is_heap());
    /// let m: SizedAny<8> = s.resize();
    /// assert!(m.is_heap());
    /// ```
    #[inline]
    pub fn resize<const M: usize>(mut self) -> SizedAny<M> {
        SizedAny::moved_from(&mut self)
    }

    /// Moves the content out into a new container, leaving `self` empty.
    #[inline]
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::empty())
    }

    /// Replaces the content with a clone of the content of `rhs`.
    ///
    /// If cloning panics, `self` keeps its previous content. When the old and the new
    /// value both live on the heap with the same layout, the heap block is reused.
    pub fn assign_clone<const M: usize>(&mut self, rhs: &SizedAny<M>) {
        // SAFETY: both buffers are laid out by their descriptors for their capacities.
        unsafe {
            rhs.descriptor.replace_copy(
                rhs.buffer.as_ptr(),
                M,
                self.buffer.as_mut_ptr(),
                &mut self.descriptor,
                N,
            )
        }
    }

    /// Replaces the content with the content of `rhs`, leaving `rhs` empty.
    ///
    /// # Example
    ///
    /// ```
    /// use sized_any::{any_cast, SizedAny};
    ///
    /// let mut a = SizedAny::<8>::new(1u8);
    /// let mut b = SizedAny::<32>::new(String::from("moved"));
    /// a.assign_move(&mut b);
    ///
    /// assert_eq!(any_cast::<String, 8>(&a).unwrap(), "moved");
    /// assert!(!b.has_value());
    /// ```
    pub fn assign_move<const M: usize>(&mut self, rhs: &mut SizedAny<M>) {
        let source = mem::replace(&mut rhs.descriptor, Descriptor::empty());
        // SAFETY: `rhs.buffer` held a value laid out by `source` for `M` and is vacant
        // afterwards; `self.buffer` is laid out by `self.descriptor` for `N`.
        unsafe {
            source.replace_move(
                rhs.buffer.as_mut_ptr(),
                M,
                self.buffer.as_mut_ptr(),
                &mut self.descriptor,
                N,
            )
        }
    }

    /// Replaces the content with `value`. Same as [`SizedAny::emplace`].
    ///
    /// As with [`SizedAny::new`], a `SizedAny` passed here is nested; use
    /// [`SizedAny::assign_move`] or [`SizedAny::assign_clone`] to copy its content.
    #[inline]
    pub fn set<T: Clone + 'static>(&mut self, value: T) -> &mut Self {
        self.emplace(value);
        self
    }

    /// Replaces the content with `value` and returns a reference to it.
    #[inline]
    pub fn emplace<T: Clone + 'static>(&mut self, value: T) -> &mut T {
        self.emplace_with(move || value)
    }

    /// Drops the content, then stores the value returned by `make` and returns a reference
    /// to it.
    ///
    /// If the previous and the new value both need the heap and have the same layout, the
    /// new value is constructed in the previous heap block instead of freeing it and
    /// allocating again.
    ///
    /// If `make` panics the container is left empty.
    ///
    /// # Example
    ///
    /// ```
    /// use sized_any::SizedAny;
    ///
    /// let mut a = SizedAny::<8>::empty();
    /// let s = a.emplace_with(|| String::from("hello"));
    /// s.push_str(" world");
    /// assert_eq!(a.downcast_ref::<String>().unwrap(), "hello world");
    /// ```
    pub fn emplace_with<T, F>(&mut self, make: F) -> &mut T
    where
        T: Clone + 'static,
        F: FnOnce() -> T,
    {
        debug_assert!(
            TypeId::of::<T>() != TypeId::of::<Self>(),
            "a SizedAny nested in a SizedAny of the same capacity, use `assign_move` or \
             `assign_clone` to transfer its content"
        );
        // SAFETY: `self.buffer` is laid out by `self.descriptor` for `N`.
        unsafe {
            &mut *descriptor::construct_replacing(
                self.buffer.as_mut_ptr(),
                &mut self.descriptor,
                N,
                make,
            )
        }
    }

    /// Drops the content, if any. The container is empty afterwards.
    pub fn reset(&mut self) {
        if self.descriptor.is_empty() {
            return;
        }
        let descriptor = mem::replace(&mut self.descriptor, Descriptor::empty());
        // SAFETY: the buffer held a value laid out by `descriptor` for `N`.
        unsafe { descriptor.cleanup(self.buffer.as_mut_ptr(), N) }
    }

    /// Swaps the contents of two containers of the same capacity.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other)
    }

    /// Swaps the contents of two containers of different capacities.
    ///
    /// Each value is moved through a scratch buffer of the smaller capacity, so a value
    /// may move between inline and heap storage on the way.
    pub fn swap_with<const M: usize>(&mut self, other: &mut SizedAny<M>) {
        let mine = self.descriptor;
        let theirs = other.descriptor;

        // SAFETY: every buffer is vacated exactly once before it is written again, and
        // each value is moved by its own descriptor with the capacities it is laid out for.
        unsafe {
            if M < N {
                let mut scratch = Buffer::<M>::uninit();
                mine.move_value(self.buffer.as_mut_ptr(), scratch.as_mut_ptr(), N, M);
                theirs.move_value(other.buffer.as_mut_ptr(), self.buffer.as_mut_ptr(), M, N);
                mine.move_value(scratch.as_mut_ptr(), other.buffer.as_mut_ptr(), M, M);
            } else {
                let mut scratch = Buffer::<N>::uninit();
                theirs.move_value(other.buffer.as_mut_ptr(), scratch.as_mut_ptr(), M, N);
                mine.move_value(self.buffer.as_mut_ptr(), other.buffer.as_mut_ptr(), N, M);
                theirs.move_value(scratch.as_mut_ptr(), self.buffer.as_mut_ptr(), N, N);
            }
        }

        self.descriptor = theirs;
        other.descriptor = mine;
    }

    /// Returns the inline capacity in bytes.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns `true` if the container holds a value.
    #[inline]
    pub fn has_value(&self) -> bool {
        !self.descriptor.is_empty()
    }

    /// Returns the [`TypeId`] of the held value, or of [`NoType`](crate::NoType) if empty.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.descriptor.type_id()
    }

    /// Returns true if the value is heap-allocated
    #[inline]
    pub fn is_heap(&self) -> bool {
        self.descriptor.needs_alloc(N)
    }

    /// Returns `true` if a `T` would be stored inline in this container type.
    #[inline]
    pub const fn stores_inline<T>() -> bool {
        crate::fits_inline::<T>(N)
    }

    #[inline]
    pub(crate) fn descriptor(&self) -> &'static Descriptor {
        self.descriptor
    }

    /// Address of the held value, which must be a `T`.
    #[inline]
    pub(crate) unsafe fn value_ptr<T>(&self) -> *const T {
        descriptor::value_ptr::<T>(self.buffer.as_ptr(), N)
    }

    #[inline]
    pub(crate) unsafe fn value_mut_ptr<T>(&mut self) -> *mut T {
        descriptor::value_ptr::<T>(self.buffer.as_mut_ptr(), N)
    }

    /// Moves the held `T` out, leaving the container empty.
    pub(crate) unsafe fn take_value<T>(&mut self) -> T {
        self.descriptor = Descriptor::empty();
        descriptor::read_value::<T>(self.buffer.as_mut_ptr(), N)
    }
}

impl<const N: usize> Default for SizedAny<N> {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

impl<const N: usize> Clone for SizedAny<N> {
    fn clone(&self) -> Self {
        Self::cloned_from(self)
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign_clone(source)
    }
}

impl<const N: usize> Drop for SizedAny<N> {
    fn drop(&mut self) {
        // SAFETY: the buffer is laid out by the descriptor for `N`.
        unsafe { self.descriptor.cleanup(self.buffer.as_mut_ptr(), N) }
    }
}

impl<const N: usize> fmt::Debug for SizedAny<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SizedAny")
            .field("capacity", &N)
            .field("has_value", &self.has_value())
            .field("is_heap", &self.is_heap())
            .finish_non_exhaustive()
    }
}
