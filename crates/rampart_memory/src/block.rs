//! # Addresses and Memory Blocks
//!
//! The currency of every allocator in this crate:
//! - [`Address`] - an integer view of a memory location supporting
//!   block-relative arithmetic
//! - [`MemBlock`] - an `{address, size}` pair describing a contiguous
//!   byte range handed out by an allocator

use bytemuck::{Pod, Zeroable};

/// An integer view of a memory location.
///
/// Allocators deal exclusively in offsets, distances, and slot indices, so
/// addresses are kept as plain integers instead of raw pointers. The core
/// never dereferences through an `Address`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Address(u64);

impl Address {
    /// The null address.
    pub const NULL: Self = Self(0);

    /// Creates an address from its integer value.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Creates an address from the start of a byte slice.
    #[inline]
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        Self(bytes.as_ptr() as u64)
    }

    /// Returns the integer value of this address.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Checks if this address is null.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl core::ops::Add<u64> for Address {
    type Output = Self;

    /// Advances the address by a byte offset.
    #[inline]
    fn add(self, offset: u64) -> Self {
        Self(self.0 + offset)
    }
}

impl core::ops::Sub<u64> for Address {
    type Output = Self;

    /// Rewinds the address by a byte offset.
    #[inline]
    fn sub(self, offset: u64) -> Self {
        Self(self.0 - offset)
    }
}

impl core::ops::Sub for Address {
    type Output = u64;

    /// Returns the byte distance between two addresses.
    #[inline]
    fn sub(self, earlier: Self) -> u64 {
        self.0 - earlier.0
    }
}

/// A contiguous byte range handed out by an allocator.
///
/// Not an owning handle by itself; ownership is implied by which allocator
/// returned it. The [`NULL`](MemBlock::NULL) block is the canonical
/// "allocation failed" sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct MemBlock {
    /// Start of the range.
    pub addr: Address,
    /// Length of the range in bytes.
    pub size: u64,
}

impl MemBlock {
    /// The allocation-failure sentinel.
    pub const NULL: Self = Self {
        addr: Address::NULL,
        size: 0,
    };

    /// Creates a block from an address and a size.
    #[inline]
    #[must_use]
    pub const fn new(addr: Address, size: u64) -> Self {
        Self { addr, size }
    }

    /// Checks if this block is the allocation-failure sentinel.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.addr.is_null()
    }
}

impl Default for MemBlock {
    fn default() -> Self {
        Self::NULL
    }
}
