//! # Boot Options
//!
//! Leading `-name[=value]` tokens configure the kernel before any subsystem
//! starts. Parsing stops at the first token that is not an option; the rest of
//! the command line is the action script.

use crate::cmdline::Arg;
use crate::error::BootError;
use core::fmt::{self, Write};
use log::debug;

/// Thread scheduler selected with `-mlfqs`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum SchedulerPolicy {
    #[default]
    RoundRobin,
    MultiLevelFeedbackQueue,
}

/// Run-time configuration produced by [`parse_options`].
///
/// Frozen once parsing finishes; later stages only read it.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct BootConfiguration {
    /// `-q`: power off after the last action instead of idling.
    pub power_off_when_done: bool,
    /// `-f`: format the file system disk during start-up.
    pub format_filesystem: bool,
    /// `-rs=SEED`
    pub random_seed: Option<i32>,
    pub scheduler: SchedulerPolicy,
    /// `-ul=COUNT`: cap on pages handed to user processes.
    pub user_page_limit: Option<usize>,
    /// `-threads-tests`: `run` executes kernel self-tests, not programs.
    pub thread_tests: bool,
}

/// Consume the leading options of `args`.
///
/// Returns the configuration and the remaining tokens. A repeated option
/// overwrites the earlier value.
///
/// # Errors
/// - [`BootError::HelpRequested`] on `-h`.
/// - [`BootError::UnknownOption`] for any other unrecognized name.
pub fn parse_options<'v, 'a>(
    args: &'v [Arg<'a>],
) -> Result<(BootConfiguration, &'v [Arg<'a>]), BootError<'a>> {
    let mut config = BootConfiguration::default();
    let mut rest = args;

    while let Some((&token, tail)) = rest.split_first() {
        if !token.is_option() {
            break;
        }

        let (name, value) = token.split_value();
        match name.as_bytes() {
            b"-h" => return Err(BootError::HelpRequested),
            b"-q" => config.power_off_when_done = true,
            #[cfg(feature = "filesys")]
            b"-f" => config.format_filesystem = true,
            b"-rs" => config.random_seed = Some(atoi(value)),
            b"-mlfqs" => config.scheduler = SchedulerPolicy::MultiLevelFeedbackQueue,
            #[cfg(feature = "userprog")]
            b"-ul" => config.user_page_limit = Some(usize::try_from(atoi(value)).unwrap_or(usize::MAX)),
            #[cfg(feature = "userprog")]
            b"-threads-tests" => config.thread_tests = true,
            _ => return Err(BootError::UnknownOption(name)),
        }
        debug!("Applied boot option {token}");
        rest = tail;
    }

    Ok((config, rest))
}

/// Decimal conversion with C `atoi` leniency.
///
/// Skips leading whitespace, takes an optional sign and then digits up to the
/// first non-digit. No digits (or no value at all) gives `0`; overflow wraps.
#[must_use]
pub fn atoi(value: Option<Arg<'_>>) -> i32 {
    let Some(value) = value else {
        return 0;
    };

    let mut bytes = value.as_bytes();
    while let Some((&(b' ' | b'\t'..=b'\r'), tail)) = bytes.split_first() {
        bytes = tail;
    }

    let negative = match bytes.split_first() {
        Some((&b'-', tail)) => {
            bytes = tail;
            true
        }
        Some((&b'+', tail)) => {
            bytes = tail;
            false
        }
        _ => false,
    };

    let magnitude = bytes
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0i32, |n, &d| n.wrapping_mul(10).wrapping_add(i32::from(d - b'0')));

    if negative { magnitude.wrapping_neg() } else { magnitude }
}

/// Print the command-line help.
///
/// # Errors
/// Propagates failures of `out`.
pub fn write_usage<W: Write + ?Sized>(out: &mut W) -> fmt::Result {
    out.write_str(
        "\nCommand line syntax: [OPTION...] [ACTION...]\n\
         Options must precede actions.\n\
         Actions are executed in the order specified.\n\
         \nAvailable actions:\n",
    )?;
    #[cfg(feature = "userprog")]
    out.write_str("  run 'PROG [ARG...]' Run PROG and wait for it to complete.\n")?;
    #[cfg(not(feature = "userprog"))]
    out.write_str("  run TEST           Run TEST.\n")?;
    #[cfg(feature = "filesys")]
    out.write_str(
        "  ls                 List files in the root directory.\n  \
         cat FILE           Print FILE to the console.\n  \
         rm FILE            Delete FILE.\n\
         Use these actions indirectly via `pintos' -g and -p options:\n  \
         put FILE           Put FILE into file system from scratch disk.\n  \
         get FILE           Get FILE from file system into scratch disk.\n",
    )?;
    out.write_str(
        "\nOptions:\n  \
         -h                 Print this help message and power off.\n  \
         -q                 Power off VM after actions or on panic.\n  \
         -f                 Format file system disk during startup.\n  \
         -rs=SEED           Set random number seed to SEED.\n  \
         -mlfqs             Use multi-level feedback queue scheduler.\n",
    )?;
    #[cfg(feature = "userprog")]
    out.write_str("  -ul=COUNT          Limit user memory to COUNT pages.\n")?;
    Ok(())
}
