//! # Kernel Collaborators
//!
//! The boot sequence drives subsystems it does not implement: threads,
//! interrupts, devices, the file system and user processes. [`Subsystems`]
//! is the seam between the two. The kernel binary implements it over the
//! real entry points; tests implement it with a recorder.

use crate::cmdline::Arg;
use crate::options::SchedulerPolicy;
use core::fmt::Write;
use core::ops::Range;
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage, VirtualAddress};
use kernel_vmem::{FrameAlloc, PhysMapper};

/// Thread identifier as handed out by the process collaborator.
pub type Tid = i32;

/// Subsystems that report statistics at shutdown.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Subsystem {
    Timer,
    Thread,
    #[cfg(feature = "filesys")]
    Disk,
    Console,
    Keyboard,
    #[cfg(feature = "userprog")]
    Exception,
}

/// Entry points of everything the boot sequence starts or calls into.
///
/// Methods are listed in the order the boot sequence calls them.
pub trait Subsystems {
    type Console: Write;
    type Mapper: PhysMapper;
    type Frames: FrameAlloc;

    /// Text output for user-facing messages.
    fn console(&mut self) -> &mut Self::Console;

    fn random_init(&mut self, seed: i32);
    fn set_scheduler(&mut self, policy: SchedulerPolicy);
    #[cfg(feature = "userprog")]
    fn set_user_page_limit(&mut self, pages: usize);

    fn thread_init(&mut self);
    fn console_init(&mut self);

    /// Bring up the page allocator and return the first byte past usable RAM.
    fn palloc_init(&mut self) -> PhysicalAddress;
    fn malloc_init(&mut self);

    /// Virtual range of the kernel's executable code.
    fn kernel_text(&self) -> Range<VirtualAddress>;

    /// Mapper and frame source for building the kernel page tables.
    fn page_table_frames(&mut self) -> (&Self::Mapper, &mut Self::Frames);

    /// Publish `root` as the kernel's base page tables, then load it into CR3.
    ///
    /// Implementations that expose the root to other subsystems do so through
    /// [`pml4_handle`](crate::pml4_handle) before the switch.
    fn activate_page_tables(&mut self, root: PhysicalPage);

    #[cfg(feature = "userprog")]
    fn tss_init(&mut self);
    #[cfg(feature = "userprog")]
    fn gdt_init(&mut self);

    fn intr_init(&mut self);
    fn timer_init(&mut self);
    fn kbd_init(&mut self);
    fn input_init(&mut self);

    #[cfg(feature = "userprog")]
    fn exception_init(&mut self);
    #[cfg(feature = "userprog")]
    fn syscall_init(&mut self);

    fn thread_start(&mut self);
    fn serial_init_queue(&mut self);
    fn timer_calibrate(&mut self);

    #[cfg(feature = "filesys")]
    fn disk_init(&mut self);
    #[cfg(feature = "filesys")]
    fn filesys_init(&mut self, format: bool);

    #[cfg(feature = "vm")]
    fn vm_init(&mut self);

    /// Run the kernel self-test called `name`.
    fn run_test(&mut self, name: Arg<'_>);

    /// Start the first user process from `cmd_line`.
    #[cfg(feature = "userprog")]
    fn process_create_initd(&mut self, cmd_line: Arg<'_>) -> Tid;
    /// Wait for `tid` to exit and return its status.
    #[cfg(feature = "userprog")]
    fn process_wait(&mut self, tid: Tid) -> i32;

    #[cfg(feature = "filesys")]
    fn fsutil_ls(&mut self);
    #[cfg(feature = "filesys")]
    fn fsutil_cat(&mut self, file: Arg<'_>);
    #[cfg(feature = "filesys")]
    fn fsutil_rm(&mut self, file: Arg<'_>);
    #[cfg(feature = "filesys")]
    fn fsutil_put(&mut self, file: Arg<'_>);
    #[cfg(feature = "filesys")]
    fn fsutil_get(&mut self, file: Arg<'_>);

    #[cfg(feature = "filesys")]
    fn filesys_done(&mut self);
    fn print_stats(&mut self, subsystem: Subsystem);

    /// Hand the boot thread to the scheduler.
    fn thread_exit(&mut self) -> !;

    /// Turn the machine off.
    fn halt(&mut self) -> !;
}
