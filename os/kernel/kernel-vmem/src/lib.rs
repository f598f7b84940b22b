//! # Virtual Memory Support
//!
//! x86-64 paging helpers for building the kernel's first address space.
//!
//! ## What you get
//! - A [`PageTableEntry`] bitfield and a 4 KiB-aligned [`PageTable`].
//! - An [`AddressSpace`] handle that walks, extends and activates a PML4 tree.
//! - [`bootstrap::build_direct_map`], which maps all RAM at `KERN_BASE + pa`
//!   with the kernel text read-only.
//! - The two seams the caller provides: [`FrameAlloc`] for fresh table frames
//!   and [`PhysMapper`] to reach a frame from the current address space.
//!
//! ## x86-64 Virtual Address → Physical Address Walk
//!
//! Each 48-bit virtual address is divided into five fields:
//!
//! ```text
//! | 47‒39 | 38‒30 | 29‒21 | 20‒12 | 11‒0   |
//! |  PML4 |  PDPT |   PD  |   PT  | Offset |
//! ```
//!
//! The CPU uses these fields as **indices** into four levels of page tables,
//! each level containing 512 entries of 8 bytes. Only the last level (PT)
//! holds leaves here; huge pages are never created.
//!
//! ```text
//!  CR3 → PML4 → PDPT → PD → PT → 4 KiB frame
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod address_space;
pub mod bootstrap;
mod page_table;

pub use crate::address_space::{AddressSpace, Translation};
pub use crate::page_table::{ENTRIES_PER_TABLE, PageTable, PageTableEntry, TableIndex, split_indices};
pub use kernel_memory_addresses::{PhysicalAddress, PhysicalPage, VirtualAddress};

/// Failures while building or extending page tables.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum VmemError {
    /// The allocator could not provide the top-level table.
    #[error("no frame available for the page-table root")]
    NoRootFrame,
    /// An intermediate table could not be allocated while mapping the address.
    #[error("out of page-table frames while mapping {0}")]
    OutOfFrames(VirtualAddress),
    /// A mapping endpoint was not 4 KiB aligned.
    #[error("address {0:#x} is not page aligned")]
    Unaligned(u64),
}

/// Source of **physical** 4 KiB frames for page tables.
///
/// Frames need not be zeroed; the table code clears them before use.
pub trait FrameAlloc {
    /// Allocate one 4 KiB frame, or `None` when exhausted.
    fn alloc_4k(&mut self) -> Option<PhysicalPage>;
}

/// Converts physical addresses to usable references in the current address space
/// (identity map in early boot, direct map once the kernel's tables are live).
pub trait PhysMapper {
    /// Convert a *physical* address to a mutable reference.
    ///
    /// # Safety
    /// - `pa` must be mapped writable in the current page tables.
    /// - The bytes at `pa` must be a valid `T`.
    /// - The caller must not create aliasing mutable references.
    unsafe fn phys_to_mut<'a, T>(&self, pa: PhysicalAddress) -> &'a mut T;
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{BumpAlloc, TestPhys};

    #[test]
    fn map_4k_creates_tables_and_leaf() {
        let phys = TestPhys::with_frames(8);
        let mut alloc = BumpAlloc::new(0, 8);
        let space = AddressSpace::new_empty(&phys, &mut alloc).expect("root");

        let va = VirtualAddress::new(0xffff_8000_0000_0000);
        let pa = PhysicalAddress::new(0x0030_0000);
        space.map_4k(&mut alloc, va, pa, false).expect("map");

        let t = space.translate(va + 0x123).expect("mapped");
        assert_eq!(t.phys.as_u64(), 0x0030_0123);
        assert!(!t.writable);
        assert_eq!(alloc.allocated(), 4);
    }

    #[test]
    fn second_mapping_in_the_same_table_allocates_nothing() {
        let phys = TestPhys::with_frames(8);
        let mut alloc = BumpAlloc::new(0, 8);
        let space = AddressSpace::new_empty(&phys, &mut alloc).expect("root");

        let va = VirtualAddress::new(0x0000_0080_0400_0000);
        space.map_4k(&mut alloc, va, PhysicalAddress::new(0), true).expect("map");
        let before = alloc.allocated();
        space
            .map_4k(&mut alloc, va + 0x1000, PhysicalAddress::new(0x1000), true)
            .expect("map");
        assert_eq!(alloc.allocated(), before);
    }

    #[test]
    fn unaligned_endpoints_are_rejected() {
        let phys = TestPhys::with_frames(4);
        let mut alloc = BumpAlloc::new(0, 4);
        let space = AddressSpace::new_empty(&phys, &mut alloc).expect("root");

        let err = space.map_4k(
            &mut alloc,
            VirtualAddress::new(0x1001),
            PhysicalAddress::new(0),
            true,
        );
        assert_eq!(err, Err(VmemError::Unaligned(0x1001)));
    }

    #[test]
    fn error_messages_name_the_address() {
        let err = VmemError::OutOfFrames(VirtualAddress::new(0x80_0400_0000));
        assert_eq!(
            err.to_string(),
            "out of page-table frames while mapping 0x0000008004000000"
        );
    }
}
