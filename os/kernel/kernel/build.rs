use kernel_info::memory;
use std::{env, path::PathBuf};

fn main() {
    // Hosted builds (tests, tooling) link normally.
    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("none") {
        return;
    }

    // Point to the linker script
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("set by cargo"));
    let ld = manifest_dir.join("kernel.ld");

    // Sanity checks (fail fast during build)
    let kernel_vma = memory::KERNEL_VMA;
    let phys_base = memory::LOADER_PHYS_BASE;
    assert_eq!(
        kernel_vma & 0xfff,
        0,
        "KERNEL_VMA must be 4 KiB aligned (got {kernel_vma:#x})"
    );
    assert_eq!(
        kernel_vma - memory::KERN_BASE,
        phys_base,
        "the kernel image must sit in the direct map"
    );

    // Rebuild when inputs change
    println!("cargo:rerun-if-changed={}", ld.display());

    // Linker script
    println!("cargo:rustc-link-arg-bins=-T{}", ld.display());

    // Provide symbols to the linker script
    println!("cargo:rustc-link-arg-bins=--defsym=KERNEL_VMA={kernel_vma:#x}");
    println!("cargo:rustc-link-arg-bins=--defsym=LOADER_PHYS_BASE={phys_base:#x}");
}
