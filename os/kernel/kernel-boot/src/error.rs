use crate::cmdline::Arg;
use kernel_vmem::VmemError;

/// Everything that stops the machine during boot.
///
/// Variants borrow the offending token straight out of the loader window.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum BootError<'a> {
    /// An argument starts at or runs past the end of the window.
    #[error("command line arguments overflow")]
    ArgumentsOverflow,

    /// The loader declared more arguments than the window can hold.
    #[error("too many command line arguments")]
    TooManyArguments(u32),

    #[error("unknown option `{0}' (use -h for help)")]
    UnknownOption(Arg<'a>),

    #[error("unknown action `{0}' (use -h for help)")]
    UnknownAction(Arg<'a>),

    #[error("action `{name}' requires {required} argument(s)")]
    MissingArguments { name: Arg<'a>, required: usize },

    /// `-h` was given; the caller prints the usage text and powers off.
    #[error("help requested")]
    HelpRequested,

    /// The kernel page tables were already built and activated once.
    #[error("kernel page tables are already active")]
    PagingAlreadyActive,

    #[error(transparent)]
    PageTables(#[from] VmemError),
}
