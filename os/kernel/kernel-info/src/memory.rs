//! # Memory Layout

use kernel_memory_addresses::{PhysicalAddress, VirtualAddress};

pub use kernel_memory_addresses::PAGE_SIZE;

/// Base of the kernel's direct map: physical address `pa` is visible at
/// virtual address `KERN_BASE + pa`.
pub const KERN_BASE: u64 = 0x0000_0080_0400_0000;

/// Physical address the loader places the kernel image at.
///
/// # Kernel Build
/// Sourced by the kernel's `build.rs` to configure the linker.
pub const LOADER_PHYS_BASE: u64 = 0x0020_0000; // 2 MiB

/// Virtual address the kernel image executes at.
pub const KERNEL_VMA: u64 = KERN_BASE + LOADER_PHYS_BASE;

/// Size of the stack the entry stub switches to before calling into Rust.
pub const BOOT_STACK_SIZE: usize = 16 * 1024;

/// Physical to virtual, through the direct map.
#[inline]
#[must_use]
pub const fn ptov(pa: PhysicalAddress) -> VirtualAddress {
    VirtualAddress::new(pa.as_u64() + KERN_BASE)
}

/// Virtual to physical, for addresses inside the direct map.
///
/// Returns `None` for addresses below [`KERN_BASE`].
#[inline]
#[must_use]
pub const fn vtop(va: VirtualAddress) -> Option<PhysicalAddress> {
    match va.as_u64().checked_sub(KERN_BASE) {
        Some(pa) => Some(PhysicalAddress::new(pa)),
        None => None,
    }
}

const _: () = {
    assert!(KERN_BASE.is_multiple_of(1 << 21));
    assert!(LOADER_PHYS_BASE.is_multiple_of(PAGE_SIZE));
    assert!(BOOT_STACK_SIZE.is_multiple_of(16));
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_map_round_trips() {
        let pa = PhysicalAddress::new(0x7d3e);
        let va = ptov(pa);
        assert_eq!(va.as_u64(), KERN_BASE + 0x7d3e);
        assert_eq!(vtop(va), Some(pa));
    }

    #[test]
    fn vtop_rejects_addresses_below_the_direct_map() {
        assert_eq!(vtop(VirtualAddress::new(0x1000)), None);
    }
}
