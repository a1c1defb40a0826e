//! # RAMPART Memory Core
//!
//! Stack and pool allocators over explicitly carved memory regions,
//! designed for:
//! - All gameplay memory carved up front
//! - O(1) allocate and deallocate on the hot path
//! - Composable parent/child allocator chaining
//!
//! ## Architecture Rules
//!
//! 1. **Exhaustion is not an error** - a failed allocation returns the
//!    [`MemBlock::NULL`] sentinel; callers check and recover
//! 2. **Broken invariants are fatal** - mismatched pool sizes and
//!    mis-sized control regions panic instead of limping on
//! 3. **One owner per allocator** - no locking, no sharing; destruction
//!    consumes the handle and returns the backing region to its parent
//!
//! ## Example
//!
//! ```rust,ignore
//! use rampart_memory::{Alignment, Allocator, KB};
//!
//! let frame = Allocator::stack(None, 64 * KB, Alignment::B64);
//! let particles = Allocator::pool(Some(&frame), 32, Alignment::B32, 512);
//!
//! let blk = particles.allocate(17); // 32 bytes, 32-byte aligned
//! particles.deallocate(blk);
//!
//! particles.destroy(); // region handed back to `frame`
//! frame.destroy();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

mod align;
mod allocator;
mod block;
mod pool;
mod stack;
mod storage;

pub use align::{align, checked_align, is_aligned, Alignment};
pub use allocator::Allocator;
pub use block::{Address, MemBlock};
pub use pool::PoolAllocator;
pub use stack::StackAllocator;

/// One kilobyte.
pub const KB: u64 = 1024;
/// One megabyte.
pub const MB: u64 = 1024 * KB;
/// One gigabyte.
pub const GB: u64 = 1024 * MB;
