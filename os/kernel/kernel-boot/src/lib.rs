//! # Kernel Boot Orchestration
//!
//! Runs once on the boot CPU, before the scheduler or heap exist:
//!
//! 1. [`bss::clear_region`] zeroes uninitialized statics.
//! 2. [`cmdline::read_command_line`] splits the loader's argument window.
//! 3. [`options::parse_options`] turns leading `-flags` into a [`BootConfiguration`].
//! 4. [`sequence::boot`] starts the [`Subsystems`] and builds the kernel page tables.
//! 5. [`actions::run_actions`] executes the remaining tokens as a script.
//! 6. [`shutdown::power_off`] reports statistics and turns the machine off.
//!
//! All failures are [`BootError`] values resolved in [`kernel_main`].
//!
//! ## Features
//! - `filesys`: `-f`, the `ls`/`cat`/`rm`/`put`/`get` actions, disk start-up and statistics.
//! - `userprog`: `-ul`, `-threads-tests`, TSS/GDT/exception/syscall start-up, user programs for `run`.
//! - `vm`: virtual-memory start-up.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

/// Best-effort formatted output on the subsystems' console.
macro_rules! kprint {
    ($subsystems:expr, $($arg:tt)*) => {{
        let _ = core::fmt::Write::write_fmt($subsystems.console(), format_args!($($arg)*));
    }};
}

pub mod actions;
pub mod bss;
pub mod cmdline;
mod error;
pub mod options;
pub mod sequence;
pub mod shutdown;
mod subsystems;

pub use crate::cmdline::{Arg, ArgVector};
pub use crate::error::BootError;
pub use crate::options::{BootConfiguration, SchedulerPolicy};
pub use crate::sequence::{base_pml4, boot, kernel_main, pml4_handle};
pub use crate::subsystems::{Subsystem, Subsystems, Tid};
