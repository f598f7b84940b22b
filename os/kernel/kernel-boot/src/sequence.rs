//! # Boot Sequence
//!
//! Carries the machine from the kernel entry stub to a running system:
//!
//! ```text
//! read_command_line → parse_options → thread/console/palloc/malloc
//!   → paging_init → [tss, gdt] → interrupts, timer, keyboard, input
//!   → [exceptions, syscalls] → thread_start → serial, calibrate
//!   → [disk, filesys] → [vm] → "Boot complete." → run_actions
//! ```
//!
//! Bracketed steps depend on the `userprog`, `filesys` and `vm` features.
//! [`kernel_main`] resolves the outcome: power off, hand over to the scheduler,
//! or report a fatal error and power off.

use crate::actions::run_actions;
use crate::cmdline::{echo_command_line, read_command_line};
use crate::error::BootError;
use crate::options::{BootConfiguration, parse_options, write_usage};
use crate::shutdown;
use crate::subsystems::Subsystems;
use kernel_info::memory::ptov;
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage};
use kernel_sync::SyncOnceCell;
use kernel_vmem::bootstrap::{KernelLayout, build_direct_map};
use log::{error, info};

/// Root of the kernel page tables, set once by [`kernel_main`].
static BASE_PML4: SyncOnceCell<PhysicalPage> = SyncOnceCell::new();

/// The kernel's PML4 frame, once paging is up.
#[must_use]
pub fn base_pml4() -> Option<PhysicalPage> {
    BASE_PML4.get().copied()
}

/// Kernel-virtual pointer to the PML4 in `root`, as published to the C side.
#[must_use]
pub fn pml4_handle(root: PhysicalPage) -> *mut u64 {
    ptov(root.base()).as_mut_ptr()
}

/// Run the boot sequence up to and including the action script.
///
/// `window` and `count` are the loader's argument buffer and element count.
/// The page-table root is recorded in `root`. Returns the frozen
/// configuration so the caller can decide how to finish.
///
/// # Errors
/// Any [`BootError`]; steps before the failing one have taken effect.
pub fn boot<'a, S: Subsystems>(
    subsystems: &mut S,
    window: &'a [u8],
    count: u32,
    root: &SyncOnceCell<PhysicalPage>,
) -> Result<BootConfiguration, BootError<'a>> {
    let args = read_command_line(window, count)?;
    let _ = echo_command_line(&args, subsystems.console());

    let (config, actions) = parse_options(args.as_slice())?;
    forward_configuration(&config, subsystems);

    subsystems.thread_init();
    subsystems.console_init();

    let memory_top = subsystems.palloc_init();
    subsystems.malloc_init();
    paging_init(subsystems, memory_top, root)?;

    #[cfg(feature = "userprog")]
    {
        subsystems.tss_init();
        subsystems.gdt_init();
    }

    subsystems.intr_init();
    subsystems.timer_init();
    subsystems.kbd_init();
    subsystems.input_init();

    #[cfg(feature = "userprog")]
    {
        subsystems.exception_init();
        subsystems.syscall_init();
    }

    subsystems.thread_start();
    subsystems.serial_init_queue();
    subsystems.timer_calibrate();

    #[cfg(feature = "filesys")]
    {
        subsystems.disk_init();
        subsystems.filesys_init(config.format_filesystem);
    }

    #[cfg(feature = "vm")]
    subsystems.vm_init();

    kprint!(subsystems, "Boot complete.\n");
    info!("Boot complete; running {} action token(s)", actions.len());

    run_actions(actions, &config, subsystems)?;
    Ok(config)
}

/// Hand option side effects to the subsystems that own them.
fn forward_configuration<S: Subsystems>(config: &BootConfiguration, subsystems: &mut S) {
    if let Some(seed) = config.random_seed {
        subsystems.random_init(seed);
    }
    subsystems.set_scheduler(config.scheduler);
    #[cfg(feature = "userprog")]
    if let Some(pages) = config.user_page_limit {
        subsystems.set_user_page_limit(pages);
    }
}

/// Build the direct map over `[0, memory_top)`, activate it and record its root.
///
/// # Errors
/// - [`BootError::PagingAlreadyActive`] if `root` is already set.
/// - [`BootError::PageTables`] if the frame source runs dry.
pub fn paging_init<'a, S: Subsystems>(
    subsystems: &mut S,
    memory_top: PhysicalAddress,
    root: &SyncOnceCell<PhysicalPage>,
) -> Result<PhysicalPage, BootError<'a>> {
    if root.is_set() {
        return Err(BootError::PagingAlreadyActive);
    }

    let layout = KernelLayout {
        memory_top,
        text: subsystems.kernel_text(),
    };
    let (mapper, frames) = subsystems.page_table_frames();
    let (space, stats) = build_direct_map(mapper, frames, &layout)?;
    let pml4 = space.root_page();

    subsystems.activate_page_tables(pml4);
    root.set(pml4).map_err(|_| BootError::PagingAlreadyActive)?;
    info!(
        "Paging active: PML4 at {pml4}, {} pages mapped ({} read-only)",
        stats.pages, stats.read_only_pages
    );
    Ok(pml4)
}

/// Boot the kernel from the loader's command line. Never returns.
///
/// Fatal errors print `Kernel PANIC: <message>` and power off; `-h` prints
/// the usage text and powers off.
pub fn kernel_main<S: Subsystems>(subsystems: &mut S, window: &[u8], count: u32) -> ! {
    match boot(subsystems, window, count, &BASE_PML4) {
        Ok(config) if config.power_off_when_done => shutdown::power_off(subsystems),
        Ok(_) => subsystems.thread_exit(),
        Err(BootError::HelpRequested) => {
            let _ = write_usage(subsystems.console());
            shutdown::power_off(subsystems)
        }
        Err(err) => {
            error!("Boot failed: {err}");
            kprint!(subsystems, "Kernel PANIC: {err}\n");
            shutdown::power_off(subsystems)
        }
    }
}
