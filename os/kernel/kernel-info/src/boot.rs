//! # Loader Window
//!
//! Fixed physical locations populated by the boot sector before it jumps into
//! the kernel. The layout mirrors the tail of the 512-byte boot sector:
//!
//! ```text
//! LOADER_BASE   0x7c00 ┌──────────────────────────────┐
//!                      │ loader code                  │
//! LOADER_ARG_CNT 0x7d3a├──────────────────────────────┤ u32 element count
//! LOADER_ARGS    0x7d3e├──────────────────────────────┤ packed NUL-terminated args
//! LOADER_PARTS   0x7dbe├──────────────────────────────┤ partition table
//! LOADER_SIG     0x7dfe├──────────────────────────────┤ 0x55 0xaa
//! LOADER_END     0x7e00└──────────────────────────────┘
//! ```

use kernel_memory_addresses::PhysicalAddress;

/// Physical address of the boot sector.
pub const LOADER_BASE: u64 = 0x7c00;

/// One past the last byte of the boot sector.
pub const LOADER_END: u64 = 0x7e00;

pub const LOADER_SIG_LEN: u64 = 2;
pub const LOADER_PARTS_LEN: u64 = 64;

/// Size of the command-line byte buffer.
pub const LOADER_ARGS_LEN: u32 = 128;

/// Size of the element-count field.
pub const LOADER_ARG_CNT_LEN: u64 = 4;

/// Boot sector signature (`0x55 0xaa`).
pub const LOADER_SIG: u64 = LOADER_END - LOADER_SIG_LEN;

/// Partition table.
pub const LOADER_PARTS: u64 = LOADER_SIG - LOADER_PARTS_LEN;

/// Packed command-line arguments.
pub const LOADER_ARGS: u64 = LOADER_PARTS - LOADER_ARGS_LEN as u64;

/// Number of command-line arguments, as a little-endian `u32`.
pub const LOADER_ARG_CNT: u64 = LOADER_ARGS - LOADER_ARG_CNT_LEN;

/// Upper bound on the number of arguments the window can hold: every
/// argument needs at least one character and one terminator.
pub const MAX_BOOT_ARGS: usize = LOADER_ARGS_LEN as usize / 2;

/// Where the loader left the command line.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BootArgsWindow {
    /// First byte of the packed argument strings.
    pub args: PhysicalAddress,
    /// Total size of the argument buffer in bytes.
    pub args_len: u32,
    /// Location of the `u32` element count.
    pub count: PhysicalAddress,
}

impl BootArgsWindow {
    /// The window as laid out by the boot sector.
    #[must_use]
    pub const fn loader() -> Self {
        Self {
            args: PhysicalAddress::new(LOADER_ARGS),
            args_len: LOADER_ARGS_LEN,
            count: PhysicalAddress::new(LOADER_ARG_CNT),
        }
    }
}

const _: () = {
    assert!(LOADER_ARGS == 0x7d3e);
    assert!(LOADER_ARG_CNT == 0x7d3a);
    assert!(LOADER_ARG_CNT >= LOADER_BASE);
};
