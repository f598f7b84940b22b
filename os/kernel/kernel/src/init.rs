use crate::platform::QemuPlatform;
use kernel_boot::bss::clear_region;
use kernel_boot::cmdline::loader_window;
use kernel_info::memory::BOOT_STACK_SIZE;
use kernel_qemu::QemuLogger;
use log::{LevelFilter, info};

/// A byte buffer with a **guaranteed 16-byte alignment**, backing the boot stack.
#[repr(align(16))]
struct Aligned16<const N: usize>([u8; N]);

/// Stack the entry stub switches to before calling into Rust.
///
/// Lives in `.bss.boot`, which the linker script keeps outside
/// `[_start_bss, _end_bss)` so clearing BSS does not wipe the running stack.
#[unsafe(link_section = ".bss.boot")]
#[unsafe(no_mangle)]
static mut BOOT_STACK: Aligned16<BOOT_STACK_SIZE> = Aligned16([0; BOOT_STACK_SIZE]);

unsafe extern "C" {
    static _start_bss: u8;
    static _end_bss: u8;
}

/// The kernel entry point.
///
/// The loader jumps here with interrupts in an unknown state and a stack it
/// owns.
///
/// # Naked function & Stack
/// This is a naked function in order to set up the stack ourselves. Without
/// the `naked` attribute (and the [`naked_asm`](core::arch::naked_asm) instruction), Rust
/// compiler would apply its own assumptions based on the C ABI about the stack
/// it inherits from the loader.
#[unsafe(no_mangle)]
#[unsafe(naked)]
#[unsafe(link_section = ".text.boot")]
pub extern "C" fn _start_kernel() {
    core::arch::naked_asm!(
        "cli",
        // Build our own kernel stack and establish a valid call frame
        "lea rax, [rip + {stack_sym}]",
        "add rax, {stack_size}",
        // Align down to 16
        "and rax, -16",
        "mov rsp, rax",
        // Emulate a CALL by pushing a dummy return address (so RSP % 16 == 8 at entry)
        "push 0",
        "xor rbp, rbp",
        // Jump to Rust entry and never return
        "jmp {rust_entry}",
        stack_sym = sym BOOT_STACK,
        stack_size = const BOOT_STACK_SIZE,
        rust_entry = sym kernel_entry_on_boot_stack,
    );
}

/// Kernel entry running on the boot stack ([`BOOT_STACK`]).
///
/// Nothing before [`clear_region`] may touch a zero-initialized static.
#[unsafe(no_mangle)]
pub extern "C" fn kernel_entry_on_boot_stack() -> ! {
    unsafe {
        clear_region(
            (&raw const _start_bss).cast_mut(),
            (&raw const _end_bss).cast_mut(),
        );
    }

    // Only fails if a logger is already installed.
    let _ = QemuLogger::new(LevelFilter::Debug).init();
    info!("Kernel reporting to QEMU!");

    let (window, count) = unsafe { loader_window() };
    let mut platform = QemuPlatform::default();
    kernel_boot::kernel_main(&mut platform, window, count)
}
