//! # QEMU Platform Support
//!
//! Debug output, logging and power control for kernels running under QEMU.
//!
//! ## Output Mechanism
//! ```text
//! Kernel Code
//!     ↓
//! qemu_trace! / log::info! / DebugConsole
//!     ↓
//! port::outb() → I/O port 0x402
//!     ↓
//! QEMU -debugcon
//! ```
//!
//! ## Core Components
//!
//! ### Debug Console ([`DebugConsole`])
//! A `core::fmt::Write` sink writing byte-by-byte to QEMU's debug port. The
//! boot sequence prints its user-facing messages through it.
//!
//! ### QEMU Logger ([`QemuLogger`])
//! A `log::Log` implementation that routes records to the same port, prefixed
//! with level and target.
//!
//! ### Power Control ([`power_off`])
//! Writes the ACPI shutdown command QEMU's PIIX4 power-management block
//! listens for, then parks the CPU.
//!
//! ## Feature System
//!
//! With the `enabled` feature (default) all output reaches port `0x402`.
//! Without it, the console and trace macro compile to no-ops. Power-off is
//! always available.
//!
//! ## Host-Side Configuration
//! ```bash
//! qemu-system-x86_64 -kernel kernel.bin -debugcon stdio
//! qemu-system-x86_64 -kernel kernel.bin -debugcon file:debug.log
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use kernel_qemu::QemuLogger;
//! use log::{LevelFilter, info};
//!
//! QemuLogger::new(LevelFilter::Debug).init().expect("logger initialization");
//! info!("Kernel subsystem initialized");
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod console;
mod logger;
pub mod port;
mod power;

pub use console::DebugConsole;
pub use logger::QemuLogger;
pub use power::{POWER_OFF_COMMAND, POWER_OFF_PORT, power_off};

/// The port number for QEMU's debug port.
pub const QEMU_DEBUG_PORT: u16 = 0x402;

#[cfg(feature = "enabled")]
#[doc(hidden)]
pub mod qemu_fmt {
    use core::fmt;

    /// Write a single character to QEMU's debug port.
    #[allow(clippy::inline_always)]
    #[inline(always)]
    pub fn dbg_putc(c: u8) {
        unsafe { crate::port::outb(crate::QEMU_DEBUG_PORT, c) }
    }

    #[doc(hidden)]
    #[inline(always)]
    #[allow(clippy::inline_always)]
    pub fn qemu_write(args: fmt::Arguments) {
        // Ignore errors; this is best-effort debug output.
        let _ = fmt::write(&mut crate::DebugConsole, args);
    }
}

#[cfg(not(feature = "enabled"))]
#[doc(hidden)]
pub mod qemu_fmt {
    use core::fmt;

    #[doc(hidden)]
    #[inline(always)]
    #[allow(clippy::inline_always)]
    pub const fn dbg_putc(_: u8) {}

    #[doc(hidden)]
    #[inline(always)]
    #[allow(clippy::inline_always)]
    pub fn qemu_write(_: fmt::Arguments) {
        // no-op when feature disabled
    }
}

/// Formats directly to the debug port, bypassing the logger.
#[macro_export]
macro_rules! qemu_trace {
    ($($arg:tt)*) => {{
        // No allocation: `format_args!` builds a lightweight `Arguments`.
        $crate::qemu_fmt::qemu_write(core::format_args!($($arg)*));
    }};
}
