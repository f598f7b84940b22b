//! # Kernel Layout and Loader Contract
//!
//! Compile-time constants shared by the boot path, the page-table builder and
//! the kernel binary's linker configuration.
//!
//! ## Modules
//!
//! ### Memory Layout ([`memory`])
//! The kernel sees all of physical memory through a single **offset mapping**:
//!
//! ```text
//! virtual = physical + KERN_BASE
//!
//! 0x0000_0000_0000            ┌──────────────────────────────┐
//!                             │   user space / unmapped      │
//! KERN_BASE (0x80_0400_0000)  ├──────────────────────────────┤ ← physical 0
//!                             │   direct map of all RAM      │
//! KERN_BASE + LOADER_PHYS_BASE├──────────────────────────────┤ ← kernel image
//!                             │   kernel text (read-only)    │
//!                             │   data / bss                 │
//! KERN_BASE + memory top      └──────────────────────────────┘
//! ```
//!
//! ### Loader Window ([`boot`])
//! The boot sector leaves the kernel command line at a fixed physical location
//! just below its partition table. [`boot::BootArgsWindow`] names that region;
//! the kernel reads it through the direct map and never writes to it.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod boot;
pub mod memory;
