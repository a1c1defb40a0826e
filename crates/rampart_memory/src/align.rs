//! # Alignment Arithmetic
//!
//! Pure functions for rounding sizes up to power-of-two boundaries and
//! checking whether an address sits on one. Every allocator in this crate
//! is built on top of these.

use crate::block::Address;

/// A power-of-two alignment boundary.
///
/// Restricting alignment to this fixed set keeps the mask arithmetic in
/// [`align`] and [`is_aligned`] branch-free and makes a non-power-of-two
/// boundary unrepresentable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u64)]
pub enum Alignment {
    /// 4-byte boundary.
    B4 = 4,
    /// 8-byte boundary.
    B8 = 8,
    /// 16-byte boundary.
    B16 = 16,
    /// 32-byte boundary.
    B32 = 32,
    /// 64-byte boundary.
    B64 = 64,
    /// 128-byte boundary.
    B128 = 128,
    /// 256-byte boundary.
    B256 = 256,
    /// 512-byte boundary.
    B512 = 512,
    /// 1-kilobyte boundary.
    B1K = 1024,
    /// 4-kilobyte (page) boundary.
    B4K = 4096,
}

impl Alignment {
    /// Returns the boundary in bytes.
    #[inline]
    #[must_use]
    pub const fn bytes(self) -> u64 {
        self as u64
    }

    /// Returns the low-bit mask for this boundary.
    #[inline]
    #[must_use]
    pub const fn mask(self) -> u64 {
        self as u64 - 1
    }

    /// Rounds an arbitrary positive integer up to the next supported
    /// power-of-two boundary.
    ///
    /// Used when a caller supplies a size that must become an alignment.
    ///
    /// # Panics
    ///
    /// Panics if `raw` is zero or rounds past the largest supported
    /// boundary - both are programmer errors, not runtime conditions.
    #[must_use]
    pub fn select(raw: u64) -> Self {
        assert!(raw > 0, "alignment must be positive");
        let value = raw.next_power_of_two().max(Self::B4 as u64);
        match value {
            4 => Self::B4,
            8 => Self::B8,
            16 => Self::B16,
            32 => Self::B32,
            64 => Self::B64,
            128 => Self::B128,
            256 => Self::B256,
            512 => Self::B512,
            1024 => Self::B1K,
            2048 | 4096 => Self::B4K,
            _ => panic!("no supported alignment boundary for {raw}"),
        }
    }
}

/// Rounds `size` up to the smallest multiple of `alignment`.
///
/// Sizes within one alignment of `u64::MAX` have no representable rounded
/// value; use [`checked_align`] where such sizes can reach the allocators.
#[inline]
#[must_use]
pub const fn align(size: u64, alignment: Alignment) -> u64 {
    (size + alignment.mask()) & !alignment.mask()
}

/// Rounds `size` up to the smallest multiple of `alignment`, returning
/// `None` when the rounded value does not fit in a `u64`.
///
/// Allocation paths use this so an absurdly large request degrades into
/// the ordinary out-of-memory signal instead of an arithmetic overflow.
#[inline]
#[must_use]
pub fn checked_align(size: u64, alignment: Alignment) -> Option<u64> {
    size.checked_add(alignment.mask())
        .map(|padded| padded & !alignment.mask())
}

/// Checks whether an address sits exactly on an alignment boundary.
#[inline]
#[must_use]
pub const fn is_aligned(addr: Address, alignment: Alignment) -> bool {
    (addr.value() & alignment.mask()) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_bounds() {
        // For every size: a multiple of the boundary, >= size, < size + boundary.
        for alignment in [Alignment::B4, Alignment::B32, Alignment::B4K] {
            for size in 0..=(4 * alignment.bytes()) {
                let aligned = align(size, alignment);
                assert_eq!(aligned % alignment.bytes(), 0);
                assert!(aligned >= size);
                assert!(aligned < size + alignment.bytes());
            }
        }
    }

    #[test]
    fn test_align_exact_multiples() {
        assert_eq!(align(0, Alignment::B32), 0);
        assert_eq!(align(32, Alignment::B32), 32);
        assert_eq!(align(64, Alignment::B32), 64);
        assert_eq!(align(17, Alignment::B32), 32);
        assert_eq!(align(55, Alignment::B64), 64);
    }

    #[test]
    fn test_checked_align_matches_align_in_range() {
        for size in [0, 1, 17, 32, 55, 4095] {
            assert_eq!(
                checked_align(size, Alignment::B32),
                Some(align(size, Alignment::B32))
            );
        }
    }

    #[test]
    fn test_checked_align_rejects_unrepresentable_sizes() {
        assert_eq!(checked_align(u64::MAX, Alignment::B32), None);
        assert_eq!(checked_align(u64::MAX - 16, Alignment::B32), None);
        // Exactly representable: already a multiple of the boundary.
        assert_eq!(
            checked_align(u64::MAX - 31, Alignment::B32),
            Some(u64::MAX - 31)
        );
    }

    #[test]
    fn test_is_aligned() {
        assert!(is_aligned(Address::new(0), Alignment::B32));
        assert!(is_aligned(Address::new(0x1000), Alignment::B4K));
        assert!(!is_aligned(Address::new(0x1010), Alignment::B4K));
        assert!(!is_aligned(Address::new(33), Alignment::B32));
    }

    #[test]
    fn test_select_rounds_up() {
        assert_eq!(Alignment::select(1), Alignment::B4);
        assert_eq!(Alignment::select(4), Alignment::B4);
        assert_eq!(Alignment::select(5), Alignment::B8);
        assert_eq!(Alignment::select(33), Alignment::B64);
        assert_eq!(Alignment::select(1000), Alignment::B1K);
        assert_eq!(Alignment::select(2000), Alignment::B4K);
        assert_eq!(Alignment::select(4096), Alignment::B4K);
    }

    #[test]
    #[should_panic(expected = "alignment must be positive")]
    fn test_select_rejects_zero() {
        let _ = Alignment::select(0);
    }

    #[test]
    #[should_panic(expected = "no supported alignment boundary")]
    fn test_select_rejects_oversized() {
        let _ = Alignment::select(8192);
    }
}
