//! # x86 I/O Port Access
//!
//! Thin wrappers around the `in`/`out` instructions for the legacy 16-bit port
//! space. On targets without a port bus the writes are discarded.
//!
//! # Safety
//! Every function here talks to hardware directly. Callers must run at CPL0
//! (or hold I/O permission for the port), address the intended device, and
//! serialize multi-step device protocols themselves. `in`/`out` order with
//! other port accesses but are **not** memory fences.

/// Write one byte to an I/O port. Uses `out dx, al`.
///
/// # Safety
/// See the [module documentation](self).
#[inline]
pub unsafe fn outb(port: u16, val: u8) {
    #[cfg(target_arch = "x86_64")]
    unsafe {
        core::arch::asm!("out dx, al", in("dx") port, in("al") val, options(nomem, nostack, preserves_flags));
    }
    #[cfg(not(target_arch = "x86_64"))]
    let _ = (port, val);
}

/// Write one 16-bit word to an I/O port. Uses `out dx, ax`.
///
/// # Safety
/// See the [module documentation](self).
#[inline]
pub unsafe fn outw(port: u16, val: u16) {
    #[cfg(target_arch = "x86_64")]
    unsafe {
        core::arch::asm!("out dx, ax", in("dx") port, in("ax") val, options(nomem, nostack, preserves_flags));
    }
    #[cfg(not(target_arch = "x86_64"))]
    let _ = (port, val);
}
