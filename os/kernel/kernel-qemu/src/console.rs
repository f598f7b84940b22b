use core::fmt::{self, Write};

/// Byte sink on QEMU's debug port.
///
/// Stateless; any number of instances may exist. Output from several
/// writers interleaves at byte granularity.
#[derive(Debug, Default, Copy, Clone)]
pub struct DebugConsole;

impl Write for DebugConsole {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for b in s.bytes() {
            crate::qemu_fmt::dbg_putc(b);
        }
        Ok(())
    }

    #[inline]
    fn write_char(&mut self, c: char) -> fmt::Result {
        // UTF-8 encode without allocation.
        let mut buf = [0u8; 4];
        let s = c.encode_utf8(&mut buf);
        self.write_str(s)
    }
}
