//! # Pool Allocator
//!
//! A fixed-block-size allocator over a carved region. Free blocks are
//! threaded through a singly linked free list of slot indices with the
//! head popped on allocate and pushed on deallocate, so both operations
//! are O(1) and the most recently freed block is always reused first.

use core::cell::RefCell;
use core::mem;

use crate::align::{align, checked_align, Alignment};
use crate::allocator::Allocator;
use crate::block::{Address, MemBlock};
use crate::storage::{carve, Backing};

/// Sentinel marking the end of the free chain.
const NIL: u32 = u32::MAX;

/// The free list: a chain of slot indices threaded through `next`.
struct FreeList {
    /// Index of the first free slot, or [`NIL`] when exhausted.
    head: u32,
    /// Per-slot link to the next free slot.
    next: Box<[u32]>,
    /// Number of free slots remaining.
    free: u64,
}

impl FreeList {
    /// Rebuilds the full chain: slot i -> slot i + 1, last -> [`NIL`].
    fn rebuild(&mut self) {
        let count = self.next.len();
        for (slot, link) in self.next.iter_mut().enumerate() {
            *link = if slot + 1 < count {
                u32::try_from(slot + 1).unwrap_or(NIL)
            } else {
                NIL
            };
        }
        self.head = 0;
        self.free = count as u64;
    }
}

/// A fixed-block-size allocator over a carved region.
///
/// Every block has the same aligned, power-of-two size; the power-of-two
/// constraint lets a single bit shift map between block addresses and
/// free-list slot indices with no lookup table.
///
/// # Thread Safety
///
/// NOT thread-safe. Use one allocator per logical owner.
pub struct PoolAllocator<'p> {
    /// The backing region (kept for memory reservation, released on drop).
    #[allow(dead_code)]
    backing: Backing<'p>,
    /// Start of the usable region.
    mem_start: Address,
    /// One past the end of the usable region.
    mem_end: Address,
    /// Fixed block size after alignment; always a power of two.
    block_size: u64,
    /// Boundary every block sits on.
    alignment: Alignment,
    /// `log2(block_size)`, mapping byte offsets to slot indices.
    shift: u32,
    /// The free list.
    free_list: RefCell<FreeList>,
}

impl<'p> PoolAllocator<'p> {
    /// Creates a pool of `block_count` blocks of `block_size` bytes
    /// (rounded up to `block_alignment`), carved from the parent allocator
    /// or from the process heap.
    ///
    /// # Panics
    ///
    /// Panics if the aligned block size is not a power of two, if
    /// `block_count` is zero or exceeds the free list's index range, or if
    /// the parent cannot back the region.
    #[must_use]
    pub(crate) fn new(
        parent: Option<&'p Allocator<'p>>,
        block_size: u64,
        block_alignment: Alignment,
        block_count: u64,
    ) -> Self {
        let aligned_block_size = align(block_size, block_alignment);
        assert!(
            aligned_block_size.is_power_of_two(),
            "pool block size {aligned_block_size} must be a power of two"
        );
        assert!(block_count > 0, "pool block count must be greater than zero");
        assert!(
            block_count < u64::from(NIL),
            "pool block count {block_count} exceeds the free list index range"
        );

        let header_size = mem::size_of::<Self>() as u64;
        let usable_size = aligned_block_size * block_count;
        let storage = carve(parent, header_size, usable_size, block_alignment);
        tracing::debug!(
            block_size = aligned_block_size,
            block_count,
            alignment = block_alignment.bytes(),
            chained = parent.is_some(),
            "created pool allocator"
        );

        let count = usize::try_from(block_count).expect("pool block count exceeds address space");
        let mut free_list = FreeList {
            head: NIL,
            next: vec![NIL; count].into_boxed_slice(),
            free: 0,
        };
        free_list.rebuild();

        Self {
            backing: storage.backing,
            mem_start: storage.usable_start,
            mem_end: storage.usable_start + storage.usable_size,
            block_size: aligned_block_size,
            alignment: block_alignment,
            shift: aligned_block_size.trailing_zeros(),
            free_list: RefCell::new(free_list),
        }
    }

    /// Allocates one block.
    ///
    /// Returns [`MemBlock::NULL`] when the free list is exhausted -
    /// out-of-memory is a normal, recoverable condition here.
    ///
    /// # Panics
    ///
    /// Panics if `size`, rounded up to the pool's alignment, does not
    /// equal the fixed block size - this allocator does not serve
    /// variable sizes.
    pub fn allocate(&self, size: u64) -> MemBlock {
        // Unroundable sizes can never match the block size.
        let aligned_size = checked_align(size, self.alignment).unwrap_or(0);
        assert_eq!(
            aligned_size, self.block_size,
            "pool allocator serves {}-byte blocks only",
            self.block_size
        );

        let mut free_list = self.free_list.borrow_mut();
        let slot = free_list.head;
        if slot == NIL {
            return MemBlock::NULL;
        }

        free_list.head = free_list.next[slot as usize];
        free_list.free -= 1;

        let addr = self.mem_start + (u64::from(slot) << self.shift);
        MemBlock::new(addr, self.block_size)
    }

    /// Returns a block to the pool, making it the next block handed out.
    ///
    /// O(1). Passing a block that does not belong to this pool, or one
    /// that is already free, is a caller bug and is not validated.
    pub fn deallocate(&self, block: MemBlock) {
        let slot = ((block.addr - self.mem_start) >> self.shift) as u32;

        let mut free_list = self.free_list.borrow_mut();
        free_list.next[slot as usize] = free_list.head;
        free_list.head = slot;
        free_list.free += 1;
    }

    /// Rebuilds the free list from scratch, restoring full capacity.
    /// O(block count).
    pub fn deallocate_all(&self) {
        tracing::trace!(
            block_size = self.block_size,
            "resetting pool allocator"
        );
        self.free_list.borrow_mut().rebuild();
    }

    /// Returns the fixed block size if `size` fits in one block, else 0.
    ///
    /// A zero return signals that this pool cannot serve the request.
    #[inline]
    #[must_use]
    pub fn prefered_size(&self, size: u64) -> u64 {
        match checked_align(size, self.alignment) {
            Some(aligned) if aligned <= self.block_size => self.block_size,
            _ => 0,
        }
    }

    /// Checks whether `block` lies within this allocator's usable region.
    #[inline]
    #[must_use]
    pub fn owns(&self, block: MemBlock) -> bool {
        block.addr >= self.mem_start && block.addr < self.mem_end
    }

    /// Returns the fixed block size in bytes.
    #[inline]
    #[must_use]
    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    /// Returns the total number of blocks.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.free_list.borrow().next.len() as u64
    }

    /// Returns the number of blocks currently free.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> u64 {
        self.free_list.borrow().free
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::is_aligned;

    fn pool(block_size: u64, alignment: Alignment, count: u64) -> PoolAllocator<'static> {
        PoolAllocator::new(None, block_size, alignment, count)
    }

    #[test]
    fn test_allocations_are_aligned_blocks() {
        let alloc = pool(17, Alignment::B32, 8);
        for _ in 0..8 {
            let blk = alloc.allocate(17);
            assert_eq!(blk.size, 32);
            assert!(is_aligned(blk.addr, Alignment::B32));
        }
    }

    #[test]
    fn test_exhaustion_returns_sentinel() {
        let alloc = pool(32, Alignment::B32, 4);
        for _ in 0..4 {
            assert!(!alloc.allocate(32).is_null());
        }
        assert!(alloc.allocate(32).is_null());
        assert_eq!(alloc.free_count(), 0);
    }

    #[test]
    fn test_most_recently_freed_is_reused_first() {
        let alloc = pool(32, Alignment::B32, 4);
        let first = alloc.allocate(32);
        let second = alloc.allocate(32);

        alloc.deallocate(first);
        alloc.deallocate(second);

        // Freed in order first, second: second comes back first.
        assert_eq!(alloc.allocate(32).addr, second.addr);
        assert_eq!(alloc.allocate(32).addr, first.addr);
    }

    #[test]
    fn test_deallocate_all_restores_capacity() {
        let alloc = pool(32, Alignment::B32, 4);
        while !alloc.allocate(32).is_null() {}

        alloc.deallocate_all();
        assert_eq!(alloc.free_count(), 4);
        for _ in 0..4 {
            assert!(!alloc.allocate(32).is_null());
        }
        assert!(alloc.allocate(32).is_null());
    }

    #[test]
    fn test_blocks_tile_the_region() {
        let alloc = pool(64, Alignment::B64, 4);
        let mut prev = alloc.allocate(64);
        for _ in 1..4 {
            let blk = alloc.allocate(64);
            assert_eq!(blk.addr - prev.addr, 64);
            prev = blk;
        }
    }

    #[test]
    fn test_prefered_size() {
        let alloc = pool(32, Alignment::B32, 4);
        assert_eq!(alloc.prefered_size(1), 32);
        assert_eq!(alloc.prefered_size(32), 32);
        assert_eq!(alloc.prefered_size(33), 0);
    }

    #[test]
    fn test_huge_request_prefered_size_is_zero() {
        let alloc = pool(32, Alignment::B32, 4);
        assert_eq!(alloc.prefered_size(u64::MAX), 0);
        assert_eq!(alloc.prefered_size(u64::MAX - 16), 0);
    }

    #[test]
    #[should_panic(expected = "serves 32-byte blocks only")]
    fn test_huge_request_allocate_is_a_size_mismatch() {
        // An unroundable size can never match the fixed block size, so it
        // trips the same mismatch assert as any other wrong-size request.
        let alloc = pool(32, Alignment::B32, 4);
        let _ = alloc.allocate(u64::MAX);
    }

    #[test]
    fn test_owns_bounds() {
        let alloc = pool(32, Alignment::B32, 4);
        let blk = alloc.allocate(32);
        assert!(alloc.owns(blk));
        assert!(!alloc.owns(MemBlock::new(blk.addr + alloc.capacity() * 32, 32)));
    }

    #[test]
    #[should_panic(expected = "must be a power of two")]
    fn test_non_power_of_two_block_size_is_fatal() {
        let _ = pool(65, Alignment::B32, 4);
    }

    #[test]
    #[should_panic(expected = "serves 32-byte blocks only")]
    fn test_size_mismatch_is_fatal() {
        let alloc = pool(32, Alignment::B32, 4);
        let _ = alloc.allocate(33);
    }
}
