//! # Kernel Direct Map
//!
//! Builds the first address space the kernel runs on: every physical page
//! below the top of RAM appears at `KERN_BASE + pa`, writable except for the
//! pages holding kernel text.

use crate::address_space::AddressSpace;
use crate::{FrameAlloc, PhysMapper, VmemError};
use core::ops::Range;
use kernel_info::memory::ptov;
use kernel_memory_addresses::{PAGE_SIZE, PhysicalAddress, VirtualAddress};
use log::debug;

/// What the builder needs to know about the running kernel.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KernelLayout {
    /// First byte past usable physical memory.
    pub memory_top: PhysicalAddress,
    /// Virtual range of the kernel's executable code.
    pub text: Range<VirtualAddress>,
}

/// Counters reported after a successful build.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct DirectMapStats {
    pub pages: u64,
    pub read_only_pages: u64,
}

/// Allocate a root table and map all of `[0, memory_top)` through the direct map.
///
/// The space is returned unactivated.
///
/// # Errors
/// - [`VmemError::NoRootFrame`] if not even the root table can be allocated.
/// - [`VmemError::OutOfFrames`] if an intermediate table runs the allocator dry.
pub fn build_direct_map<'m, M, A>(
    mapper: &'m M,
    alloc: &mut A,
    layout: &KernelLayout,
) -> Result<(AddressSpace<'m, M>, DirectMapStats), VmemError>
where
    M: PhysMapper,
    A: FrameAlloc,
{
    let space = AddressSpace::new_empty(mapper, alloc)?;
    let mut stats = DirectMapStats::default();

    let mut pa = PhysicalAddress::zero();
    while pa < layout.memory_top {
        let va = ptov(pa);
        let writable = !va.is_within(&layout.text);
        space.map_4k(alloc, va, pa, writable)?;

        stats.pages += 1;
        if !writable {
            stats.read_only_pages += 1;
        }
        pa += PAGE_SIZE;
    }

    debug!(
        "Direct map rooted at {}: {} pages below {}, {} read-only",
        space.root_page(),
        stats.pages,
        layout.memory_top,
        stats.read_only_pages
    );
    Ok((space, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{BumpAlloc, TestPhys};
    use kernel_info::memory::KERN_BASE;

    const MIB: u64 = 1024 * 1024;

    fn layout(top: u64, text_pa: Range<u64>) -> KernelLayout {
        KernelLayout {
            memory_top: PhysicalAddress::new(top),
            text: ptov(PhysicalAddress::new(text_pa.start))..ptov(PhysicalAddress::new(text_pa.end)),
        }
    }

    #[test]
    fn text_pages_are_read_only_and_everything_else_is_writable() {
        let phys = TestPhys::with_frames(16);
        let mut alloc = BumpAlloc::new(0, 16);
        let layout = layout(4 * MIB, 0x20_0000..0x20_5000);

        let (space, stats) = build_direct_map(&phys, &mut alloc, &layout).expect("build");
        assert_eq!(stats.pages, 1024);
        assert_eq!(stats.read_only_pages, 5);

        let mut pa = 0;
        while pa < 4 * MIB {
            let va = VirtualAddress::new(KERN_BASE + pa);
            let t = space.translate(va).expect("every page below the top is mapped");
            assert_eq!(t.phys.as_u64(), pa);
            let in_text = (0x20_0000..0x20_5000).contains(&pa);
            assert_eq!(t.writable, !in_text, "page {pa:#x}");
            pa += PAGE_SIZE;
        }
    }

    #[test]
    fn nothing_at_or_above_the_top_is_mapped() {
        let phys = TestPhys::with_frames(8);
        let mut alloc = BumpAlloc::new(0, 8);
        let layout = layout(2 * MIB, 0..0);

        let (space, _) = build_direct_map(&phys, &mut alloc, &layout).expect("build");
        assert!(space.translate(VirtualAddress::new(KERN_BASE + 2 * MIB)).is_none());
        assert!(space.translate(VirtualAddress::new(0)).is_none());
    }

    #[test]
    fn uses_one_table_per_level_for_a_small_machine() {
        let phys = TestPhys::with_frames(8);
        let mut alloc = BumpAlloc::new(0, 8);
        build_direct_map(&phys, &mut alloc, &layout(2 * MIB, 0..0)).expect("build");
        // PML4 + PDPT + PD + PT
        assert_eq!(alloc.allocated(), 4);
    }

    #[test]
    fn missing_root_frame_is_reported() {
        let phys = TestPhys::with_frames(1);
        let mut alloc = BumpAlloc::new(0, 0);
        let err = build_direct_map(&phys, &mut alloc, &layout(MIB, 0..0)).err();
        assert_eq!(err, Some(VmemError::NoRootFrame));
    }

    #[test]
    fn running_out_of_table_frames_names_the_failing_address() {
        let phys = TestPhys::with_frames(3);
        let mut alloc = BumpAlloc::new(0, 3);
        let err = build_direct_map(&phys, &mut alloc, &layout(MIB, 0..0)).err();
        assert_eq!(
            err,
            Some(VmemError::OutOfFrames(VirtualAddress::new(KERN_BASE)))
        );
    }
}
