#![cfg(all(feature = "filesys", feature = "userprog", feature = "vm"))]
#![allow(dead_code)]

use std::cell::UnsafeCell;
use std::ops::Range;

use kernel_boot::{Arg, SchedulerPolicy, Subsystem, Subsystems, Tid};
use kernel_info::memory::{KERN_BASE, LOADER_PHYS_BASE};
use kernel_memory_addresses::{PhysicalAddress, PhysicalPage, VirtualAddress};
use kernel_vmem::{FrameAlloc, PhysMapper};

pub const MIB: u64 = 1024 * 1024;

#[repr(align(4096))]
struct Frame([u8; 4096]);

/// Simulated physical memory for page tables: address `n * 4096` is frame `n`.
pub struct Arena {
    frames: Vec<UnsafeCell<Frame>>,
}

impl Arena {
    fn with_frames(n: usize) -> Self {
        Self {
            frames: (0..n).map(|_| UnsafeCell::new(Frame([0x5a; 4096]))).collect(),
        }
    }
}

impl PhysMapper for Arena {
    unsafe fn phys_to_mut<'a, T>(&self, pa: PhysicalAddress) -> &'a mut T {
        let idx = usize::try_from(pa.as_u64() >> 12).expect("frame index");
        unsafe { &mut *self.frames[idx].get().cast::<T>() }
    }
}

pub struct Bump {
    next: u64,
    end: u64,
}

impl FrameAlloc for Bump {
    fn alloc_4k(&mut self) -> Option<PhysicalPage> {
        if self.next == self.end {
            return None;
        }
        let page = PhysicalPage::containing(PhysicalAddress::new(self.next << 12));
        self.next += 1;
        Some(page)
    }
}

/// Records every call; console output goes to a `String`.
pub struct Recorder {
    pub calls: Vec<String>,
    pub console: String,
    pub arena: Arena,
    frames: Bump,
    pub memory_top: u64,
    pub text: Range<VirtualAddress>,
    pub activated: Option<PhysicalPage>,
    pub published: *mut u64,
    next_tid: Tid,
}

impl Recorder {
    /// 4 MiB of RAM; kernel text is the five pages at 2 MiB.
    pub fn new() -> Self {
        Self::with_table_frames(16)
    }

    pub fn with_table_frames(n: u64) -> Self {
        let text_start = KERN_BASE + LOADER_PHYS_BASE;
        Self {
            calls: Vec::new(),
            console: String::new(),
            arena: Arena::with_frames(16),
            frames: Bump { next: 0, end: n },
            memory_top: 4 * MIB,
            text: VirtualAddress::new(text_start)..VirtualAddress::new(text_start + 5 * 4096),
            activated: None,
            published: std::ptr::null_mut(),
            next_tid: 3,
        }
    }

    fn record(&mut self, call: impl Into<String>) {
        self.calls.push(call.into());
    }

    pub fn called(&self, call: &str) -> bool {
        self.calls.iter().any(|c| c == call)
    }
}

impl Subsystems for Recorder {
    type Console = String;
    type Mapper = Arena;
    type Frames = Bump;

    fn console(&mut self) -> &mut String {
        &mut self.console
    }

    fn random_init(&mut self, seed: i32) {
        self.record(format!("random_init {seed}"));
    }

    fn set_scheduler(&mut self, policy: SchedulerPolicy) {
        self.record(format!("set_scheduler {policy:?}"));
    }

    fn set_user_page_limit(&mut self, pages: usize) {
        self.record(format!("set_user_page_limit {pages}"));
    }

    fn thread_init(&mut self) {
        self.record("thread_init");
    }

    fn console_init(&mut self) {
        self.record("console_init");
    }

    fn palloc_init(&mut self) -> PhysicalAddress {
        self.record("palloc_init");
        PhysicalAddress::new(self.memory_top)
    }

    fn malloc_init(&mut self) {
        self.record("malloc_init");
    }

    fn kernel_text(&self) -> Range<VirtualAddress> {
        self.text.clone()
    }

    fn page_table_frames(&mut self) -> (&Arena, &mut Bump) {
        (&self.arena, &mut self.frames)
    }

    fn activate_page_tables(&mut self, root: PhysicalPage) {
        self.record("activate_page_tables");
        self.published = kernel_boot::pml4_handle(root);
        self.activated = Some(root);
    }

    fn tss_init(&mut self) {
        self.record("tss_init");
    }

    fn gdt_init(&mut self) {
        self.record("gdt_init");
    }

    fn intr_init(&mut self) {
        self.record("intr_init");
    }

    fn timer_init(&mut self) {
        self.record("timer_init");
    }

    fn kbd_init(&mut self) {
        self.record("kbd_init");
    }

    fn input_init(&mut self) {
        self.record("input_init");
    }

    fn exception_init(&mut self) {
        self.record("exception_init");
    }

    fn syscall_init(&mut self) {
        self.record("syscall_init");
    }

    fn thread_start(&mut self) {
        self.record("thread_start");
    }

    fn serial_init_queue(&mut self) {
        self.record("serial_init_queue");
    }

    fn timer_calibrate(&mut self) {
        self.record("timer_calibrate");
    }

    fn disk_init(&mut self) {
        self.record("disk_init");
    }

    fn filesys_init(&mut self, format: bool) {
        self.record(format!("filesys_init {format}"));
    }

    fn vm_init(&mut self) {
        self.record("vm_init");
    }

    fn run_test(&mut self, name: Arg<'_>) {
        self.record(format!("run_test {name}"));
    }

    fn process_create_initd(&mut self, cmd_line: Arg<'_>) -> Tid {
        self.record(format!("process_create_initd {cmd_line}"));
        let tid = self.next_tid;
        self.next_tid += 1;
        tid
    }

    fn process_wait(&mut self, tid: Tid) -> i32 {
        self.record(format!("process_wait {tid}"));
        0
    }

    fn fsutil_ls(&mut self) {
        self.record("fsutil_ls");
    }

    fn fsutil_cat(&mut self, file: Arg<'_>) {
        self.record(format!("fsutil_cat {file}"));
    }

    fn fsutil_rm(&mut self, file: Arg<'_>) {
        self.record(format!("fsutil_rm {file}"));
    }

    fn fsutil_put(&mut self, file: Arg<'_>) {
        self.record(format!("fsutil_put {file}"));
    }

    fn fsutil_get(&mut self, file: Arg<'_>) {
        self.record(format!("fsutil_get {file}"));
    }

    fn filesys_done(&mut self) {
        self.record("filesys_done");
    }

    fn print_stats(&mut self, subsystem: Subsystem) {
        self.record(format!("print_stats {subsystem:?}"));
    }

    fn thread_exit(&mut self) -> ! {
        self.record("thread_exit");
        panic!("thread_exit");
    }

    fn halt(&mut self) -> ! {
        self.record("halt");
        panic!("halt");
    }
}

/// Pack `tokens` the way the loader does.
pub fn window(tokens: &[&str]) -> (Vec<u8>, u32) {
    let mut bytes = Vec::new();
    for token in tokens {
        bytes.extend_from_slice(token.as_bytes());
        bytes.push(0);
    }
    bytes.resize(bytes.len().max(128), 0);
    (bytes, u32::try_from(tokens.len()).expect("count"))
}

pub fn args<'a>(tokens: &[&'a str]) -> Vec<Arg<'a>> {
    tokens.iter().map(|t| Arg::new(t.as_bytes())).collect()
}
