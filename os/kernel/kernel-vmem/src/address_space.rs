//! # Address Space (x86-64, PML4-rooted)
//!
//! Handle to one tree of page tables rooted at a PML4 frame.
//!
//! - [`AddressSpace::walk_create`] finds the last-level table for a virtual
//!   address, allocating and zeroing missing intermediate tables.
//! - [`AddressSpace::map_4k`] installs one 4 KiB leaf.
//! - [`AddressSpace::translate`] walks the tree without modifying it.
//! - [`AddressSpace::activate`] loads CR3 with the root.
//!
//! Intermediate links are created present and writable; the leaf alone decides
//! whether a page may be written. Tables are reached through the caller's
//! [`PhysMapper`], which keeps all `unsafe` dereferences in one place.

use crate::page_table::{PageTable, PageTableEntry, split_indices};
use crate::{FrameAlloc, PhysMapper, VmemError};
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage, VirtualAddress};

/// Handle to a single, concrete address space.
pub struct AddressSpace<'m, M: PhysMapper> {
    root: PhysicalPage,
    mapper: &'m M,
}

/// Result of walking the tables for one virtual address.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Translation {
    /// Physical address the virtual address resolves to (offset included).
    pub phys: PhysicalAddress,
    /// Whether every level along the walk permits writes.
    pub writable: bool,
}

impl<'m, M: PhysMapper> AddressSpace<'m, M> {
    /// Allocate a zeroed root table and wrap it.
    ///
    /// # Errors
    /// [`VmemError::NoRootFrame`] if the allocator is empty.
    pub fn new_empty<A: FrameAlloc>(mapper: &'m M, alloc: &mut A) -> Result<Self, VmemError> {
        let root = alloc.alloc_4k().ok_or(VmemError::NoRootFrame)?;
        let space = Self::from_root(mapper, root);
        unsafe { space.table_mut(root) }.zero();
        Ok(space)
    }

    /// Wrap an existing root frame.
    #[inline]
    pub const fn from_root(mapper: &'m M, root: PhysicalPage) -> Self {
        Self { root, mapper }
    }

    /// Physical frame of the PML4.
    #[inline]
    pub const fn root_page(&self) -> PhysicalPage {
        self.root
    }

    /// View the table stored in `frame`.
    ///
    /// # Safety
    /// `frame` must hold a page table reachable through the mapper, and no
    /// other reference to that table may be live.
    #[inline]
    unsafe fn table_mut<'t>(&self, frame: PhysicalPage) -> &'t mut PageTable {
        unsafe { self.mapper.phys_to_mut::<PageTable>(frame.base()) }
    }

    /// Return the page table (last level) covering `va`, creating
    /// intermediate tables on demand.
    ///
    /// # Errors
    /// [`VmemError::OutOfFrames`] when an intermediate table cannot be allocated.
    pub fn walk_create<A: FrameAlloc>(
        &self,
        alloc: &mut A,
        va: VirtualAddress,
    ) -> Result<PhysicalPage, VmemError> {
        let [i4, i3, i2, _] = split_indices(va);

        let mut frame = self.root;
        for index in [i4, i3, i2] {
            let table = unsafe { self.table_mut(frame) };
            let entry = table.entry_mut(index);
            if !entry.present() {
                let next = alloc.alloc_4k().ok_or(VmemError::OutOfFrames(va))?;
                unsafe { self.table_mut(next) }.zero();
                *entry = PageTableEntry::link(next);
            }
            frame = entry.frame();
        }

        Ok(frame)
    }

    /// Map the 4 KiB page at `va` to `pa`.
    ///
    /// # Errors
    /// - [`VmemError::Unaligned`] if either address is not page aligned.
    /// - Allocation failures from [`walk_create`](Self::walk_create).
    pub fn map_4k<A: FrameAlloc>(
        &self,
        alloc: &mut A,
        va: VirtualAddress,
        pa: PhysicalAddress,
        writable: bool,
    ) -> Result<(), VmemError> {
        if !va.is_page_aligned() {
            return Err(VmemError::Unaligned(va.as_u64()));
        }
        if !pa.is_page_aligned() {
            return Err(VmemError::Unaligned(pa.as_u64()));
        }

        let [.., i1] = split_indices(va);
        let pt = self.walk_create(alloc, va)?;
        *unsafe { self.table_mut(pt) }.entry_mut(i1) = PageTableEntry::leaf(pa.page(), writable);
        Ok(())
    }

    /// Translate `va` if it is mapped.
    #[must_use]
    pub fn translate(&self, va: VirtualAddress) -> Option<Translation> {
        let mut frame = self.root;
        let mut writable = true;
        for index in split_indices(va) {
            let entry = unsafe { self.table_mut(frame) }.entry(index);
            if !entry.present() {
                return None;
            }
            writable &= entry.writable();
            frame = entry.frame();
        }

        Some(Translation {
            phys: frame.base() + va.page_offset(),
            writable,
        })
    }

    /// Load CR3 with this address space's root.
    ///
    /// # Safety
    /// The tree must map the currently executing code, the current stack and
    /// every structure the caller touches next; the switch takes effect on
    /// the next instruction.
    #[cfg(target_arch = "x86_64")]
    #[inline]
    pub unsafe fn activate(&self) {
        use kernel_registers::StoreRegisterUnsafe;
        use kernel_registers::cr3::Cr3;

        unsafe { Cr3::from_pml4(self.root).store_unsafe() };
    }
}
