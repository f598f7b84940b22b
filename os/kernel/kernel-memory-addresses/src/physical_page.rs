use crate::{PAGE_MASK, PhysicalAddress};
use core::fmt;

/// A 4 KiB physical frame, identified by its page-aligned base.
///
/// ### Invariants
/// - The low 12 bits of the base are always zero.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysicalPage(PhysicalAddress);

impl PhysicalPage {
    /// Frame that contains `addr` (aligns down).
    #[inline]
    #[must_use]
    pub const fn containing(addr: PhysicalAddress) -> Self {
        Self(PhysicalAddress::new(addr.as_u64() & !PAGE_MASK))
    }

    /// Frame at an address that must already be aligned.
    /// Panics in debug if unaligned.
    #[inline]
    #[must_use]
    pub fn from_aligned(addr: PhysicalAddress) -> Self {
        debug_assert!(addr.is_page_aligned(), "unaligned frame address {addr}");
        Self::containing(addr)
    }

    #[inline]
    #[must_use]
    pub const fn base(self) -> PhysicalAddress {
        self.0
    }
}

impl fmt::Display for PhysicalPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}/4K", self.0.as_u64())
    }
}

impl fmt::Debug for PhysicalPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PhysicalPage({:#018X})", self.0.as_u64())
    }
}
