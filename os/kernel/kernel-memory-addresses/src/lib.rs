//! # Physical and Virtual Memory Addresses
//!
//! Zero-cost newtypes that keep physical and virtual addresses apart while the
//! boot path builds the first page tables.
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`PhysicalAddress`] | An address on the machine bus (RAM, loader window). |
//! | [`VirtualAddress`] | An address as the CPU sees it once paging is on. |
//! | [`PhysicalPage`] | A 4 KiB-aligned physical frame base. |
//!
//! The kernel only ever installs 4 KiB leaves, so page arithmetic here is fixed
//! to [`PAGE_SIZE`] rather than being generic over huge page sizes.
//!
//! ```rust
//! # use kernel_memory_addresses::*;
//! let pa = PhysicalAddress::new(0x0012_3456);
//! assert_eq!(pa.page().base().as_u64(), 0x0012_3000);
//! assert_eq!(pa.page_offset(), 0x456);
//! assert!(pa.page().base().is_page_aligned());
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(clippy::inline_always)]

mod physical_address;
mod physical_page;
mod virtual_address;

pub use physical_address::PhysicalAddress;
pub use physical_page::PhysicalPage;
pub use virtual_address::VirtualAddress;

/// Size of a base page (and of every page-table frame), in bytes.
pub const PAGE_SIZE: u64 = 4096;

/// Mask selecting the in-page offset bits.
pub const PAGE_MASK: u64 = PAGE_SIZE - 1;
