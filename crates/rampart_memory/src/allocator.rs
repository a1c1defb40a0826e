//! # Allocator Dispatch
//!
//! A single handle type shared by every allocator kind. Dispatch is by
//! exhaustive match on the variant, so a corrupted or foreign handle is
//! unrepresentable by construction and every operation routes to exactly
//! one concrete implementation.

use crate::align::Alignment;
use crate::block::MemBlock;
use crate::pool::PoolAllocator;
use crate::stack::StackAllocator;

/// An allocator handle: one of the concrete allocator kinds.
///
/// Allocators form a strict ownership tree. A child carved from a parent
/// holds a shared reference to it and returns its entire backing region
/// to it exactly once, when the child handle is destroyed; allocators
/// created without a parent are backed by the process heap. The borrow
/// checker enforces that children are destroyed before their parent.
///
/// # Thread Safety
///
/// NOT thread-safe. Use one allocator per logical owner.
pub enum Allocator<'p> {
    /// Bump-pointer allocator with LIFO deallocation.
    Stack(StackAllocator<'p>),
    /// Fixed-block-size allocator backed by a free list.
    Pool(PoolAllocator<'p>),
}

impl<'p> Allocator<'p> {
    /// Creates a stack allocator with `size` usable bytes.
    ///
    /// # Panics
    ///
    /// Panics if the parent cannot back the region.
    #[must_use]
    pub fn stack(parent: Option<&'p Allocator<'p>>, size: u64, alignment: Alignment) -> Self {
        Self::Stack(StackAllocator::new(parent, size, alignment))
    }

    /// Creates a pool allocator of `block_count` fixed-size blocks.
    ///
    /// # Panics
    ///
    /// Panics if the aligned block size is not a power of two, if
    /// `block_count` is out of range, or if the parent cannot back the
    /// region.
    #[must_use]
    pub fn pool(
        parent: Option<&'p Allocator<'p>>,
        block_size: u64,
        block_alignment: Alignment,
        block_count: u64,
    ) -> Self {
        Self::Pool(PoolAllocator::new(
            parent,
            block_size,
            block_alignment,
            block_count,
        ))
    }

    /// Allocates `size` bytes.
    ///
    /// Returns [`MemBlock::NULL`] when the allocator is exhausted.
    pub fn allocate(&self, size: u64) -> MemBlock {
        match self {
            Self::Stack(stack) => stack.allocate(size),
            Self::Pool(pool) => pool.allocate(size),
        }
    }

    /// Returns `block` to the allocator it came from.
    pub fn deallocate(&self, block: MemBlock) {
        match self {
            Self::Stack(stack) => stack.deallocate(block),
            Self::Pool(pool) => pool.deallocate(block),
        }
    }

    /// Invalidates every outstanding allocation at once.
    pub fn deallocate_all(&self) {
        match self {
            Self::Stack(stack) => stack.deallocate_all(),
            Self::Pool(pool) => pool.deallocate_all(),
        }
    }

    /// Returns the size a caller will actually receive for `size` bytes,
    /// or 0 if this allocator cannot serve the request.
    #[must_use]
    pub fn prefered_size(&self, size: u64) -> u64 {
        match self {
            Self::Stack(stack) => stack.prefered_size(size),
            Self::Pool(pool) => pool.prefered_size(size),
        }
    }

    /// Checks whether `block` lies within this allocator's usable region.
    #[must_use]
    pub fn owns(&self, block: MemBlock) -> bool {
        match self {
            Self::Stack(stack) => stack.owns(block),
            Self::Pool(pool) => pool.owns(block),
        }
    }

    /// Destroys the allocator, returning its entire backing region to its
    /// parent (or freeing it to the process heap).
    ///
    /// Consumes the handle, so use-after-destroy does not compile.
    pub fn destroy(self) {
        tracing::debug!(kind = self.kind_name(), "destroying allocator");
        drop(self);
    }

    /// The kind name, for diagnostics.
    fn kind_name(&self) -> &'static str {
        match self {
            Self::Stack(_) => "stack",
            Self::Pool(_) => "pool",
        }
    }
}
