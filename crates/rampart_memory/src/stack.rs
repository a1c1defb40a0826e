//! # Stack Allocator
//!
//! A bump-pointer allocator over a carved region. Allocation advances a
//! cursor; deallocation only rolls the cursor back when the freed block is
//! the most recent allocation (LIFO discipline). `deallocate_all` resets
//! the whole region in O(1).

use core::cell::RefCell;
use core::mem;

use crate::align::{checked_align, Alignment};
use crate::allocator::Allocator;
use crate::block::{Address, MemBlock};
use crate::storage::{carve, Backing};

/// A bump-pointer allocator over a carved region.
///
/// # Thread Safety
///
/// NOT thread-safe. Use one allocator per logical owner.
pub struct StackAllocator<'p> {
    /// The backing region (kept for memory reservation, released on drop).
    #[allow(dead_code)]
    backing: Backing<'p>,
    /// Start of the usable region.
    mem_start: Address,
    /// One past the end of the usable region.
    mem_end: Address,
    /// Boundary every allocation is rounded up to.
    alignment: Alignment,
    /// The bump cursor: next allocation starts here.
    cursor: RefCell<Address>,
}

impl<'p> StackAllocator<'p> {
    /// Creates a stack allocator with `size` usable bytes, carved from the
    /// parent allocator or from the process heap.
    ///
    /// # Panics
    ///
    /// Panics if the parent cannot back the region.
    #[must_use]
    pub(crate) fn new(
        parent: Option<&'p Allocator<'p>>,
        size: u64,
        alignment: Alignment,
    ) -> Self {
        let header_size = mem::size_of::<Self>() as u64;
        let storage = carve(parent, header_size, size, alignment);
        tracing::debug!(
            size = storage.usable_size,
            alignment = alignment.bytes(),
            chained = parent.is_some(),
            "created stack allocator"
        );
        Self {
            backing: storage.backing,
            mem_start: storage.usable_start,
            mem_end: storage.usable_start + storage.usable_size,
            alignment,
            cursor: RefCell::new(storage.usable_start),
        }
    }

    /// Allocates `size` bytes, rounded up to the allocator's alignment.
    ///
    /// Returns [`MemBlock::NULL`] when the region is exhausted -
    /// out-of-memory is a normal, recoverable condition here. Requests
    /// too large to even round land on the same sentinel.
    pub fn allocate(&self, size: u64) -> MemBlock {
        let Some(aligned_size) = checked_align(size, self.alignment) else {
            return MemBlock::NULL;
        };

        let mut cursor = self.cursor.borrow_mut();
        let current = *cursor;
        if aligned_size > self.mem_end - current {
            return MemBlock::NULL;
        }

        *cursor = current + aligned_size;
        MemBlock::new(current, aligned_size)
    }

    /// Rolls the cursor back if `block` was the most recent allocation.
    ///
    /// Freeing any other block is a silent no-op: the allocator cannot
    /// reclaim interior blocks, an accepted limitation of the LIFO
    /// discipline.
    pub fn deallocate(&self, block: MemBlock) {
        let mut cursor = self.cursor.borrow_mut();
        let rolled_back = *cursor - block.size;
        if rolled_back == block.addr {
            *cursor = rolled_back;
        } else {
            tracing::trace!(
                addr = block.addr.value(),
                size = block.size,
                "cannot reclaim non-top stack block"
            );
        }
    }

    /// Resets the cursor, invalidating every outstanding allocation. O(1).
    pub fn deallocate_all(&self) {
        tracing::trace!(used = self.used(), "resetting stack allocator");
        *self.cursor.borrow_mut() = self.mem_start;
    }

    /// Returns the size a caller will actually receive for `size` bytes,
    /// or 0 for a request too large to round to the alignment.
    #[inline]
    #[must_use]
    pub fn prefered_size(&self, size: u64) -> u64 {
        checked_align(size, self.alignment).unwrap_or(0)
    }

    /// Checks whether `block` lies within this allocator's usable region.
    #[inline]
    #[must_use]
    pub fn owns(&self, block: MemBlock) -> bool {
        block.addr >= self.mem_start && block.addr < self.mem_end
    }

    /// Returns the usable capacity in bytes.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.mem_end - self.mem_start
    }

    /// Returns the currently used space in bytes.
    #[inline]
    #[must_use]
    pub fn used(&self) -> u64 {
        *self.cursor.borrow() - self.mem_start
    }

    /// Returns the remaining free space in bytes.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.mem_end - *self.cursor.borrow()
    }
}
