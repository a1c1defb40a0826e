//! # Aligned Storage Carving
//!
//! Every allocator owns a single contiguous backing region, obtained either
//! from a parent allocator or from the process heap. The carver reserves an
//! aligned header for allocator metadata at the front of the region and
//! hands back the aligned usable remainder for client allocations.

use crate::align::{align, is_aligned, Alignment};
use crate::allocator::Allocator;
use crate::block::{Address, MemBlock};

/// The backing region an allocator owns for its whole lifetime.
///
/// Dropping the backing releases the region exactly once: heap-backed
/// regions are freed to the process heap, carved regions are returned to
/// the parent as the single block they were obtained as. Children hold a
/// shared reference to their parent, so the borrow checker enforces that
/// no child outlives the allocator it was carved from.
pub(crate) enum Backing<'p> {
    /// Region allocated from the process heap (no parent).
    /// The buffer is never read, only owned until drop frees it.
    Heap(#[allow(dead_code)] Box<[u8]>),
    /// Region carved out of a parent allocator.
    Carved {
        /// The allocator the region was carved from.
        parent: &'p Allocator<'p>,
        /// The exact block the parent handed out, returned on drop.
        block: MemBlock,
    },
}

impl Drop for Backing<'_> {
    fn drop(&mut self) {
        if let Self::Carved { parent, block } = self {
            parent.deallocate(*block);
        }
    }
}

/// Carver output: an owned backing region split into header and usable space.
pub(crate) struct AlignedStorage<'p> {
    /// The owned backing region (header + usable space + alignment slack).
    pub backing: Backing<'p>,
    /// Aligned start of the usable region.
    pub usable_start: Address,
    /// Size of the usable region in bytes.
    pub usable_size: u64,
}

/// Carves an aligned backing region from a parent allocator or the heap.
///
/// Both the header and the usable size are rounded up to the requested
/// alignment, and one extra alignment's worth of slack is requested so a
/// valid aligned split always exists even when the source region does not
/// itself start on the boundary.
///
/// # Panics
///
/// Panics if the parent cannot satisfy the request or the aligned split
/// does not fit - there is no recovery path for a mis-sized control
/// region, so this is a construction-time invariant, not a runtime
/// condition to propagate.
pub(crate) fn carve<'p>(
    parent: Option<&'p Allocator<'p>>,
    header_size: u64,
    usable_size: u64,
    alignment: Alignment,
) -> AlignedStorage<'p> {
    let aligned_header = align(header_size, alignment);
    let aligned_usable = align(usable_size, alignment);
    let request = aligned_header + aligned_usable + alignment.mask();

    let (backing, base, obtained) = match parent {
        Some(parent) => {
            let block = parent.allocate(request);
            assert!(
                !block.is_null(),
                "parent allocator cannot back a {request}-byte region"
            );
            (Backing::Carved { parent, block }, block.addr, block.size)
        }
        None => {
            let len = usize::try_from(request).expect("backing region exceeds address space");
            let buffer = vec![0u8; len].into_boxed_slice();
            let base = Address::of(&buffer);
            (Backing::Heap(buffer), base, request)
        }
    };

    let usable_start = Address::new(align((base + aligned_header).value(), alignment));
    let consumed = usable_start - base;
    assert!(
        obtained - consumed >= aligned_usable,
        "not enough memory left after alignment"
    );
    debug_assert!(is_aligned(usable_start, alignment));

    AlignedStorage {
        backing,
        usable_start,
        usable_size: aligned_usable,
    }
}
