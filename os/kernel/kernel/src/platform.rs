//! # QEMU Platform
//!
//! Binds the boot sequence to the kernel's C-ABI subsystems. Every external
//! entry point is declared here; the boot crate only sees [`Subsystems`].

use core::ffi::{c_char, c_void};
use core::ops::Range;
use core::ptr;
use kernel_boot::{Arg, SchedulerPolicy, Subsystem, Subsystems, Tid};
use kernel_info::boot::LOADER_ARGS_LEN;
use kernel_info::memory::{ptov, vtop};
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage, VirtualAddress};
use kernel_qemu::DebugConsole;
use kernel_vmem::{AddressSpace, FrameAlloc, PhysMapper};

unsafe extern "C" {
    #[link_name = "start"]
    static KERNEL_TEXT_START: u8;
    #[link_name = "_end_kernel_text"]
    static KERNEL_TEXT_END: u8;

    static mut thread_mlfqs: bool;
    #[cfg(feature = "userprog")]
    static mut user_page_limit: usize;

    fn random_init(seed: u32);

    fn thread_init();
    fn console_init();
    fn palloc_init() -> u64;
    fn palloc_get_page(flags: u32) -> *mut c_void;
    fn malloc_init();

    #[cfg(feature = "userprog")]
    fn tss_init();
    #[cfg(feature = "userprog")]
    fn gdt_init();

    fn intr_init();
    fn timer_init();
    fn kbd_init();
    fn input_init();

    #[cfg(feature = "userprog")]
    fn exception_init();
    #[cfg(feature = "userprog")]
    fn syscall_init();

    fn thread_start();
    fn serial_init_queue();
    fn timer_calibrate();

    #[cfg(feature = "filesys")]
    fn disk_init();
    #[cfg(feature = "filesys")]
    fn filesys_init(format: bool);
    #[cfg(feature = "vm")]
    fn vm_init();

    fn run_test(name: *const c_char);
    #[cfg(feature = "userprog")]
    fn process_create_initd(cmd_line: *const c_char) -> Tid;
    #[cfg(feature = "userprog")]
    fn process_wait(tid: Tid) -> i32;

    #[cfg(feature = "filesys")]
    fn fsutil_ls(argv: *mut *mut c_char);
    #[cfg(feature = "filesys")]
    fn fsutil_cat(argv: *mut *mut c_char);
    #[cfg(feature = "filesys")]
    fn fsutil_rm(argv: *mut *mut c_char);
    #[cfg(feature = "filesys")]
    fn fsutil_put(argv: *mut *mut c_char);
    #[cfg(feature = "filesys")]
    fn fsutil_get(argv: *mut *mut c_char);
    #[cfg(feature = "filesys")]
    fn filesys_done();

    fn timer_print_stats();
    fn thread_print_stats();
    #[cfg(feature = "filesys")]
    fn disk_print_stats();
    fn console_print_stats();
    fn kbd_print_stats();
    #[cfg(feature = "userprog")]
    fn exception_print_stats();

    fn thread_exit() -> !;
}

/// Kernel PML4 as seen by the C side (`uint64_t *base_pml4`).
///
/// Process page tables are cloned from it and `pml4_activate(NULL)` loads it.
#[unsafe(no_mangle)]
#[allow(non_upper_case_globals)]
static mut base_pml4: *mut u64 = ptr::null_mut();

/// Physical memory reached through the direct map at `KERN_BASE`.
///
/// The loader's initial tables already cover the frames the page allocator
/// hands out, so this works before and after the kernel map is activated.
#[derive(Default)]
pub struct DirectMapper;

impl PhysMapper for DirectMapper {
    unsafe fn phys_to_mut<'a, T>(&self, pa: PhysicalAddress) -> &'a mut T {
        unsafe { &mut *ptov(pa).as_mut_ptr::<T>() }
    }
}

/// Page-table frames from the kernel page pool.
#[derive(Default)]
pub struct PallocFrames;

impl FrameAlloc for PallocFrames {
    fn alloc_4k(&mut self) -> Option<PhysicalPage> {
        let page = unsafe { palloc_get_page(0) };
        if page.is_null() {
            return None;
        }
        vtop(VirtualAddress::from_ptr(page)).map(PhysicalPage::from_aligned)
    }
}

/// The machine as QEMU presents it, with the C subsystems linked in.
#[derive(Default)]
pub struct QemuPlatform {
    console: DebugConsole,
    mapper: DirectMapper,
    frames: PallocFrames,
}

/// Call `f` with `arg` as a NUL-terminated C string on the stack.
fn with_c_str<R>(arg: Arg<'_>, f: impl FnOnce(*const c_char) -> R) -> R {
    let mut buf = [0u8; LOADER_ARGS_LEN as usize + 1];
    let bytes = arg.as_bytes();
    let len = bytes.len().min(buf.len() - 1);
    buf[..len].copy_from_slice(&bytes[..len]);
    f(buf.as_ptr().cast())
}

/// Call a `fsutil_*` entry point with `argv = { name, file, NULL }`.
#[cfg(feature = "filesys")]
fn fsutil_with_file(
    name: &core::ffi::CStr,
    file: Arg<'_>,
    f: unsafe extern "C" fn(*mut *mut c_char),
) {
    with_c_str(file, |file| {
        let mut argv = [name.as_ptr().cast_mut(), file.cast_mut(), ptr::null_mut()];
        unsafe { f(argv.as_mut_ptr()) };
    });
}

impl Subsystems for QemuPlatform {
    type Console = DebugConsole;
    type Mapper = DirectMapper;
    type Frames = PallocFrames;

    fn console(&mut self) -> &mut DebugConsole {
        &mut self.console
    }

    fn random_init(&mut self, seed: i32) {
        unsafe { random_init(seed.cast_unsigned()) };
    }

    fn set_scheduler(&mut self, policy: SchedulerPolicy) {
        unsafe { thread_mlfqs = policy == SchedulerPolicy::MultiLevelFeedbackQueue };
    }

    #[cfg(feature = "userprog")]
    fn set_user_page_limit(&mut self, pages: usize) {
        unsafe { user_page_limit = pages };
    }

    fn thread_init(&mut self) {
        unsafe { thread_init() };
    }

    fn console_init(&mut self) {
        unsafe { console_init() };
    }

    fn palloc_init(&mut self) -> PhysicalAddress {
        PhysicalAddress::new(unsafe { palloc_init() })
    }

    fn malloc_init(&mut self) {
        unsafe { malloc_init() };
    }

    fn kernel_text(&self) -> Range<VirtualAddress> {
        VirtualAddress::from_ptr(&raw const KERNEL_TEXT_START)
            ..VirtualAddress::from_ptr(&raw const KERNEL_TEXT_END)
    }

    fn page_table_frames(&mut self) -> (&DirectMapper, &mut PallocFrames) {
        (&self.mapper, &mut self.frames)
    }

    fn activate_page_tables(&mut self, root: PhysicalPage) {
        unsafe { base_pml4 = kernel_boot::pml4_handle(root) };
        // The direct map covers this code, the boot stack and the loader window.
        unsafe { AddressSpace::from_root(&self.mapper, root).activate() };
    }

    #[cfg(feature = "userprog")]
    fn tss_init(&mut self) {
        unsafe { tss_init() };
    }

    #[cfg(feature = "userprog")]
    fn gdt_init(&mut self) {
        unsafe { gdt_init() };
    }

    fn intr_init(&mut self) {
        unsafe { intr_init() };
    }

    fn timer_init(&mut self) {
        unsafe { timer_init() };
    }

    fn kbd_init(&mut self) {
        unsafe { kbd_init() };
    }

    fn input_init(&mut self) {
        unsafe { input_init() };
    }

    #[cfg(feature = "userprog")]
    fn exception_init(&mut self) {
        unsafe { exception_init() };
    }

    #[cfg(feature = "userprog")]
    fn syscall_init(&mut self) {
        unsafe { syscall_init() };
    }

    fn thread_start(&mut self) {
        unsafe { thread_start() };
    }

    fn serial_init_queue(&mut self) {
        unsafe { serial_init_queue() };
    }

    fn timer_calibrate(&mut self) {
        unsafe { timer_calibrate() };
    }

    #[cfg(feature = "filesys")]
    fn disk_init(&mut self) {
        unsafe { disk_init() };
    }

    #[cfg(feature = "filesys")]
    fn filesys_init(&mut self, format: bool) {
        unsafe { filesys_init(format) };
    }

    #[cfg(feature = "vm")]
    fn vm_init(&mut self) {
        unsafe { vm_init() };
    }

    fn run_test(&mut self, name: Arg<'_>) {
        with_c_str(name, |name| unsafe { run_test(name) });
    }

    #[cfg(feature = "userprog")]
    fn process_create_initd(&mut self, cmd_line: Arg<'_>) -> Tid {
        with_c_str(cmd_line, |cmd_line| unsafe { process_create_initd(cmd_line) })
    }

    #[cfg(feature = "userprog")]
    fn process_wait(&mut self, tid: Tid) -> i32 {
        unsafe { process_wait(tid) }
    }

    #[cfg(feature = "filesys")]
    fn fsutil_ls(&mut self) {
        let mut argv = [c"ls".as_ptr().cast_mut(), ptr::null_mut()];
        unsafe { fsutil_ls(argv.as_mut_ptr()) };
    }

    #[cfg(feature = "filesys")]
    fn fsutil_cat(&mut self, file: Arg<'_>) {
        fsutil_with_file(c"cat", file, fsutil_cat);
    }

    #[cfg(feature = "filesys")]
    fn fsutil_rm(&mut self, file: Arg<'_>) {
        fsutil_with_file(c"rm", file, fsutil_rm);
    }

    #[cfg(feature = "filesys")]
    fn fsutil_put(&mut self, file: Arg<'_>) {
        fsutil_with_file(c"put", file, fsutil_put);
    }

    #[cfg(feature = "filesys")]
    fn fsutil_get(&mut self, file: Arg<'_>) {
        fsutil_with_file(c"get", file, fsutil_get);
    }

    #[cfg(feature = "filesys")]
    fn filesys_done(&mut self) {
        unsafe { filesys_done() };
    }

    fn print_stats(&mut self, subsystem: Subsystem) {
        unsafe {
            match subsystem {
                Subsystem::Timer => timer_print_stats(),
                Subsystem::Thread => thread_print_stats(),
                #[cfg(feature = "filesys")]
                Subsystem::Disk => disk_print_stats(),
                Subsystem::Console => console_print_stats(),
                Subsystem::Keyboard => kbd_print_stats(),
                #[cfg(feature = "userprog")]
                Subsystem::Exception => exception_print_stats(),
            }
        }
    }

    fn thread_exit(&mut self) -> ! {
        unsafe { thread_exit() }
    }

    fn halt(&mut self) -> ! {
        kernel_qemu::power_off()
    }
}
