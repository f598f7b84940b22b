//! # Typed `X86_64` Control Registers
//!
//! Only the registers the boot path touches are modelled. Raw access lives
//! behind the `asm` feature so the bit layouts stay testable on the host.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

#[cfg(feature = "cr3")]
pub mod cr3;

pub trait StoreRegisterUnsafe {
    /// # Safety
    /// The caller must uphold the implementation-specific safety requirements.
    /// Writing a translation root in particular changes every mapping at once.
    unsafe fn store_unsafe(self);
}
