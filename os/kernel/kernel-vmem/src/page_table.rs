//! # Page Tables
//!
//! All four levels of the x86-64 hierarchy share one 8-byte entry format and
//! one 512-entry table shape, so a single [`PageTableEntry`] and
//! [`PageTable`] serve PML4, PDPT, PD and PT alike. The kernel never installs
//! huge pages; `PS` stays clear at every level.

use bitfield_struct::bitfield;
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage, VirtualAddress};

/// Entries per table at every level.
pub const ENTRIES_PER_TABLE: usize = 512;

/// A single 64-bit page-table entry.
///
/// | Bits   | Field          |
/// |--------|----------------|
/// | 0      | `P` present    |
/// | 1      | `RW` writable  |
/// | 2      | `US` user      |
/// | 3      | `PWT`          |
/// | 4      | `PCD`          |
/// | 5      | `A` accessed   |
/// | 6      | `D` dirty      |
/// | 7      | `PS`           |
/// | 8      | `G` global     |
/// | 9–11   | OS available   |
/// | 12–51  | frame [51:12]  |
/// | 52–62  | OS available   |
/// | 63     | `NX`           |
#[doc(alias = "PTE")]
#[bitfield(u64)]
#[derive(PartialEq, Eq)]
pub struct PageTableEntry {
    /// Present (P, bit 0).
    pub present: bool,

    /// Writable (RW, bit 1). Clear for read-only; enforced in ring 0 when `CR0.WP` is set.
    pub writable: bool,

    /// User/Supervisor (US, bit 2).
    pub user: bool,

    /// Page Write-Through (PWT, bit 3).
    pub write_through: bool,

    /// Page Cache Disable (PCD, bit 4).
    pub cache_disabled: bool,

    /// Accessed (A, bit 5), set by the CPU.
    pub accessed: bool,

    /// Dirty (D, bit 6), set by the CPU on leaf writes.
    pub dirty: bool,

    /// Page Size (PS, bit 7). Always clear here.
    pub large_page: bool,

    /// Global (G, bit 8).
    pub global: bool,

    #[bits(3)]
    pub os_available_low: u8,

    /// Frame address bits [51:12].
    #[bits(40)]
    frame_51_12: u64,

    #[bits(11)]
    pub os_available_high: u16,

    /// No-Execute (NX, bit 63).
    pub no_execute: bool,
}

impl PageTableEntry {
    /// A present, writable link to the next-level table in `frame`.
    #[inline]
    #[must_use]
    pub fn link(frame: PhysicalPage) -> Self {
        Self::new()
            .with_present(true)
            .with_writable(true)
            .with_frame(frame)
    }

    /// A present 4 KiB leaf for `frame`.
    #[inline]
    #[must_use]
    pub fn leaf(frame: PhysicalPage, writable: bool) -> Self {
        Self::new()
            .with_present(true)
            .with_writable(writable)
            .with_frame(frame)
    }

    #[inline]
    #[must_use]
    pub fn with_frame(self, frame: PhysicalPage) -> Self {
        self.with_frame_51_12(frame.base().as_u64() >> 12)
    }

    /// The frame this entry refers to (next-level table or mapped page).
    #[inline]
    #[must_use]
    pub fn frame(self) -> PhysicalPage {
        PhysicalPage::containing(PhysicalAddress::new(self.frame_51_12() << 12))
    }
}

/// One 4 KiB-aligned table of 512 entries.
#[repr(C, align(4096))]
pub struct PageTable {
    entries: [PageTableEntry; ENTRIES_PER_TABLE],
}

impl PageTable {
    /// Clear every entry.
    #[inline]
    pub fn zero(&mut self) {
        self.entries.fill(PageTableEntry::new());
    }

    #[inline]
    #[must_use]
    pub fn entry(&self, index: TableIndex) -> PageTableEntry {
        self.entries[index.as_usize()]
    }

    #[inline]
    pub fn entry_mut(&mut self, index: TableIndex) -> &mut PageTableEntry {
        &mut self.entries[index.as_usize()]
    }
}

/// Index into one table level, always `< 512`.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TableIndex(u16);

impl TableIndex {
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    const fn from_bits(va: VirtualAddress, shift: u32) -> Self {
        Self(((va.as_u64() >> shift) & 0x1ff) as u16)
    }

    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// The four table indices a virtual address selects, root first.
#[inline]
#[must_use]
pub const fn split_indices(va: VirtualAddress) -> [TableIndex; 4] {
    [
        TableIndex::from_bits(va, 39), // PML4
        TableIndex::from_bits(va, 30), // PDPT
        TableIndex::from_bits(va, 21), // PD
        TableIndex::from_bits(va, 12), // PT
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_of_the_direct_map_base() {
        // 0x80_0400_0000 = 512 GiB + 64 MiB
        let [i4, i3, i2, i1] = split_indices(VirtualAddress::new(0x0000_0080_0400_0000));
        assert_eq!(i4.as_usize(), 1);
        assert_eq!(i3.as_usize(), 0);
        assert_eq!(i2.as_usize(), 32);
        assert_eq!(i1.as_usize(), 0);
    }

    #[test]
    fn leaf_encoding_keeps_frame_and_permissions() {
        let frame = PhysicalPage::containing(PhysicalAddress::new(0x0030_0000));
        let ro = PageTableEntry::leaf(frame, false);
        assert_eq!(ro.into_bits(), 0x0030_0001);
        assert_eq!(ro.frame(), frame);

        let rw = PageTableEntry::leaf(frame, true);
        assert_eq!(rw.into_bits(), 0x0030_0003);
        assert!(!rw.large_page());
    }

    #[test]
    fn zeroed_table_has_no_present_entries() {
        let mut table = PageTable {
            entries: [PageTableEntry::leaf(PhysicalPage::containing(PhysicalAddress::zero()), true);
                ENTRIES_PER_TABLE],
        };
        assert!(table.entries.iter().all(|e| e.present()));
        table.zero();
        assert!(table.entries.iter().all(|e| e.into_bits() == 0));
    }
}
