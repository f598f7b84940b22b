//! # Boot Arguments
//!
//! The loader leaves the kernel command line in a fixed window of the boot
//! sector: a `u32` element count followed by a 128-byte buffer of packed,
//! NUL-terminated strings. Nothing guarantees the two agree, so every read is
//! bounded by the window.
//!
//! ```text
//!  count = 3
//!  ┌───┬───┬───┬───┬───┬───┬───┬───┬───┬───┬───┬─ ─ ─┐
//!  │ - │ q │ \0│ r │ u │ n │ \0│ a │ \0│ ? │ ? │     │
//!  └───┴───┴───┴───┴───┴───┴───┴───┴───┴───┴───┴─ ─ ─┘
//!    argv[0]     argv[1]         argv[2]
//! ```
//!
//! Tokens are borrowed from the window and never copied.

use crate::error::BootError;
use core::fmt::{self, Write};
use kernel_info::boot::{BootArgsWindow, LOADER_ARGS_LEN, MAX_BOOT_ARGS};
use kernel_info::memory::ptov;

/// One command-line token, borrowed from the loader window.
///
/// The bytes are not required to be UTF-8; [`Display`](fmt::Display)
/// substitutes `U+FFFD` for invalid sequences.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Arg<'a>(&'a [u8]);

impl<'a> Arg<'a> {
    #[inline]
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self(bytes)
    }

    #[inline]
    #[must_use]
    pub const fn as_bytes(self) -> &'a [u8] {
        self.0
    }

    /// Whether the token is an option, i.e. starts with `-`.
    #[inline]
    #[must_use]
    pub fn is_option(self) -> bool {
        self.0.first() == Some(&b'-')
    }

    /// Split `name=value` at the first `=`.
    ///
    /// An empty value counts as missing.
    #[must_use]
    pub fn split_value(self) -> (Self, Option<Self>) {
        match self.0.iter().position(|&b| b == b'=') {
            Some(eq) => {
                let (name, value) = self.0.split_at(eq);
                let value = &value[1..];
                (Self(name), (!value.is_empty()).then_some(Self(value)))
            }
            None => (self, None),
        }
    }

    #[inline]
    #[must_use]
    pub fn contains_space(self) -> bool {
        self.0.contains(&b' ')
    }
}

impl PartialEq<str> for Arg<'_> {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for Arg<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Display for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.0.utf8_chunks() {
            f.write_str(chunk.valid())?;
            if !chunk.invalid().is_empty() {
                f.write_char(char::REPLACEMENT_CHARACTER)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Arg(\"{self}\")")
    }
}

/// The tokens of the command line, in order.
///
/// Holds at most [`MAX_BOOT_ARGS`] entries; the terminator sits at
/// [`len`](Self::len).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ArgVector<'a> {
    args: heapless::Vec<Arg<'a>, MAX_BOOT_ARGS>,
}

impl<'a> ArgVector<'a> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            args: heapless::Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Token at `index`, or `None` at and past the terminator.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Arg<'a>> {
        self.args.get(index).copied()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Arg<'a>] {
        self.args.as_slice()
    }

    pub fn tokens(&self) -> impl Iterator<Item = Arg<'a>> + '_ {
        self.args.iter().copied()
    }
}

/// Split `count` NUL-terminated strings off the front of `window`.
///
/// Scanning never leaves `window`. A string whose terminator would lie past
/// the last byte is an overflow, as is a string starting at the end.
///
/// # Errors
/// - [`BootError::TooManyArguments`] if `count` exceeds [`MAX_BOOT_ARGS`].
/// - [`BootError::ArgumentsOverflow`] if the strings do not fit the window.
pub fn read_command_line(window: &[u8], count: u32) -> Result<ArgVector<'_>, BootError<'_>> {
    if count > LOADER_ARGS_LEN / 2 {
        return Err(BootError::TooManyArguments(count));
    }

    let mut args = ArgVector::new();
    let mut rest = window;
    for _ in 0..count {
        if rest.is_empty() {
            return Err(BootError::ArgumentsOverflow);
        }
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(BootError::ArgumentsOverflow)?;
        let (token, tail) = rest.split_at(len);
        args.args
            .push(Arg(token))
            .map_err(|_| BootError::TooManyArguments(count))?;
        rest = &tail[1..];
    }

    log::trace!(
        "Read {count} boot arguments, {} of {} window bytes used",
        window.len() - rest.len(),
        window.len()
    );
    Ok(args)
}

/// Print `Kernel command line: ...`, quoting tokens that contain spaces.
///
/// # Errors
/// Propagates failures of `out`.
pub fn echo_command_line<W: Write + ?Sized>(args: &ArgVector<'_>, out: &mut W) -> fmt::Result {
    out.write_str("Kernel command line:")?;
    for arg in args.tokens() {
        if arg.contains_space() {
            write!(out, " '{arg}'")?;
        } else {
            write!(out, " {arg}")?;
        }
    }
    out.write_char('\n')
}

/// The loader's argument buffer and declared count, read through the direct map.
///
/// # Safety
/// The boot sector must still be mapped at `KERN_BASE + pa` and must not be
/// overwritten while the returned slice is alive.
#[must_use]
pub unsafe fn loader_window<'a>() -> (&'a [u8], u32) {
    let window = BootArgsWindow::loader();
    let count = unsafe { ptov(window.count).as_ptr::<u32>().read_unaligned() };
    let bytes = unsafe {
        core::slice::from_raw_parts(ptov(window.args).as_ptr::<u8>(), window.args_len as usize)
    };
    (bytes, u32::from_le(count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_packed_strings() {
        let window = b"-q\0run\0alarm-single\0\0\0";
        let args = read_command_line(window, 3).expect("fits");
        assert_eq!(args.len(), 3);
        assert_eq!(args.get(0), Some(Arg::new(b"-q")));
        assert_eq!(args.get(2), Some(Arg::new(b"alarm-single")));
        assert_eq!(args.get(3), None);
    }

    #[test]
    fn last_terminator_on_final_byte_fits() {
        let window = b"ab\0cd\0ef\0";
        assert_eq!(read_command_line(window, 3).map(|a| a.len()), Ok(3));
    }

    #[test]
    fn one_byte_short_overflows() {
        let window = b"ab\0cd\0ef";
        assert_eq!(read_command_line(window, 3), Err(BootError::ArgumentsOverflow));
    }

    #[test]
    fn cursor_at_window_end_overflows() {
        let window = b"ab\0cd\0";
        assert_eq!(read_command_line(window, 3), Err(BootError::ArgumentsOverflow));
    }

    #[test]
    fn count_zero_yields_no_tokens() {
        let args = read_command_line(b"garbage", 0).expect("empty");
        assert!(args.is_empty());
    }

    #[test]
    fn empty_strings_are_tokens() {
        let args = read_command_line(b"\0\0x\0", 3).expect("fits");
        assert_eq!(args.get(0), Some(Arg::new(b"")));
        assert_eq!(args.get(2), Some(Arg::new(b"x")));
    }

    #[test]
    fn count_above_capacity_is_rejected() {
        let window = [0u8; LOADER_ARGS_LEN as usize];
        assert_eq!(
            read_command_line(&window, 65),
            Err(BootError::TooManyArguments(65))
        );
        assert_eq!(read_command_line(&window, 64).map(|a| a.len()), Ok(64));
    }

    #[test]
    fn echo_quotes_tokens_with_spaces() {
        let args = read_command_line(b"-q\0run\0echo x\0", 3).expect("fits");
        let mut out = String::new();
        echo_command_line(&args, &mut out).expect("string");
        assert_eq!(out, "Kernel command line: -q run 'echo x'\n");
    }

    #[test]
    fn echo_of_empty_command_line() {
        let mut out = String::new();
        echo_command_line(&ArgVector::new(), &mut out).expect("string");
        assert_eq!(out, "Kernel command line:\n");
    }

    #[test]
    fn split_value_at_first_equals() {
        let (name, value) = Arg::new(b"-rs=12=3").split_value();
        assert_eq!(name, "-rs");
        assert_eq!(value, Some(Arg::new(b"12=3")));

        let (name, value) = Arg::new(b"-ul=").split_value();
        assert_eq!(name, "-ul");
        assert_eq!(value, None);

        assert_eq!(Arg::new(b"-q").split_value(), (Arg::new(b"-q"), None));
    }

    #[test]
    fn invalid_utf8_displays_lossily() {
        assert_eq!(Arg::new(b"a\xffb").to_string(), "a\u{fffd}b");
    }
}
