//! Zeroing of uninitialized static storage.

/// Zero every byte in `[start, end)`. An empty or inverted range does nothing.
///
/// # Safety
/// - The range must be writable memory owned by the caller.
/// - Nothing may read a static in the range before this returns, and no
///   reference into the range may be live.
pub unsafe fn clear_region(start: *mut u8, end: *mut u8) {
    let len = end.addr().saturating_sub(start.addr());
    if len == 0 {
        return;
    }
    unsafe { core::ptr::write_bytes(start, 0, len) };
}
