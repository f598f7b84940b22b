use bitfield_struct::bitfield;
use kernel_memory_addresses::PhysicalPage;

#[cfg(all(feature = "asm", target_arch = "x86_64"))]
use crate::StoreRegisterUnsafe;

/// CR3 — Page-Map Level-4 Base Register (IA-32e, PCID disabled).
///
/// Holds the physical frame of the PML4 and the cache-control flags used for
/// the first step of every walk.
#[bitfield(u64)]
pub struct Cr3 {
    /// Bits 0–2 — Reserved (must be 0).
    #[bits(3)]
    pub reserved0: u8,

    /// Bit 3 — PWT: Page-level Write-Through for PML4.
    pub pwt: bool,

    /// Bit 4 — PCD: Page-level Cache Disable for PML4.
    pub pcd: bool,

    /// Bits 5–11 — Reserved (must be 0 when written).
    #[bits(7)]
    pub reserved1: u8,

    /// Bits 12–51 — PML4 physical base >> 12.
    #[bits(40)]
    pml4_base_4k: u64,

    /// Bits 52–63 — Reserved.
    #[bits(12)]
    pub reserved2: u16,
}

impl Cr3 {
    /// CR3 value selecting `pml4` with write-back caching.
    #[must_use]
    pub fn from_pml4(pml4: PhysicalPage) -> Self {
        Self::new().with_pml4_base_4k(pml4.base().as_u64() >> 12)
    }
}

#[cfg(all(feature = "asm", target_arch = "x86_64"))]
impl StoreRegisterUnsafe for Cr3 {
    unsafe fn store_unsafe(self) {
        let cr3 = self.into_bits();
        unsafe {
            core::arch::asm!("mov cr3, {}", in(reg) cr3, options(nostack, preserves_flags));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_memory_addresses::PhysicalAddress;

    #[test]
    fn pml4_frame_lands_in_the_base_field() {
        let frame = PhysicalPage::containing(PhysicalAddress::new(0x0012_3000));
        let cr3 = Cr3::from_pml4(frame);
        assert_eq!(cr3.into_bits(), 0x0012_3000);
        assert_eq!(cr3.pml4_base_4k(), 0x123);
        assert!(!cr3.pwt());
        assert!(!cr3.pcd());
    }
}
