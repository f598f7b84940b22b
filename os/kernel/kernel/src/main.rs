//! # Kernel Entry Point
//!
//! Freestanding builds (`target_os = "none"`) link [`init::_start_kernel`] as
//! the image entry and run the boot sequence from `kernel-boot` on the QEMU
//! platform. Hosted builds only provide an empty `main` so the workspace can be
//! tested on the development machine.

#![cfg_attr(target_os = "none", no_std, no_main)]
#![allow(unsafe_code)]

#[cfg(target_os = "none")]
mod init;
#[cfg(target_os = "none")]
mod platform;

#[cfg(target_os = "none")]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    use core::fmt::Write;

    let _ = writeln!(kernel_qemu::DebugConsole, "Kernel PANIC: {}", info.message());
    if let Some(location) = info.location() {
        log::error!("Panic at {location}");
    }
    kernel_qemu::power_off()
}

#[cfg(not(target_os = "none"))]
fn main() {}
