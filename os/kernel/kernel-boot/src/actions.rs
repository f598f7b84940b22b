//! # Action Script
//!
//! After the options, the command line is a sequence of actions, each a name
//! followed by a fixed number of operands. Actions run left to right; the first
//! malformed one stops the script, leaving earlier actions' effects in place.

use crate::cmdline::Arg;
use crate::error::BootError;
use crate::options::BootConfiguration;
use crate::subsystems::Subsystems;
use log::{debug, info};

/// What an action does.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActionKind {
    /// `run TASK`
    Run,
    #[cfg(feature = "filesys")]
    Ls,
    #[cfg(feature = "filesys")]
    Cat,
    #[cfg(feature = "filesys")]
    Rm,
    #[cfg(feature = "filesys")]
    Put,
    #[cfg(feature = "filesys")]
    Get,
}

/// One entry of the action table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ActionDescriptor {
    pub name: &'static str,
    /// Token count including the name itself.
    pub arity: usize,
    pub kind: ActionKind,
}

impl ActionDescriptor {
    const fn new(name: &'static str, arity: usize, kind: ActionKind) -> Self {
        Self { name, arity, kind }
    }

    /// Operands that must follow the name.
    #[inline]
    #[must_use]
    pub const fn operands(&self) -> usize {
        self.arity - 1
    }
}

const RUN: ActionDescriptor = ActionDescriptor::new("run", 2, ActionKind::Run);

/// Recognized actions, searched in order.
#[cfg(feature = "filesys")]
pub const ACTIONS: &[ActionDescriptor] = &[
    RUN,
    ActionDescriptor::new("ls", 1, ActionKind::Ls),
    ActionDescriptor::new("cat", 2, ActionKind::Cat),
    ActionDescriptor::new("rm", 2, ActionKind::Rm),
    ActionDescriptor::new("put", 2, ActionKind::Put),
    ActionDescriptor::new("get", 2, ActionKind::Get),
];

/// Recognized actions, searched in order.
#[cfg(not(feature = "filesys"))]
pub const ACTIONS: &[ActionDescriptor] = &[RUN];

/// Find the table entry for `name`.
#[must_use]
pub fn lookup(name: Arg<'_>) -> Option<&'static ActionDescriptor> {
    ACTIONS.iter().find(|action| name == action.name)
}

/// Execute the action script `queue`.
///
/// # Errors
/// - [`BootError::UnknownAction`] if a name is not in [`ACTIONS`].
/// - [`BootError::MissingArguments`] if the script ends before an action's
///   operands do.
pub fn run_actions<'a, S: Subsystems>(
    queue: &[Arg<'a>],
    config: &BootConfiguration,
    subsystems: &mut S,
) -> Result<(), BootError<'a>> {
    let mut queue = queue;
    while let Some((&name, rest)) = queue.split_first() {
        let action = lookup(name).ok_or(BootError::UnknownAction(name))?;
        if rest.len() < action.operands() {
            return Err(BootError::MissingArguments {
                name,
                required: action.operands(),
            });
        }

        let (operands, remaining) = rest.split_at(action.operands());
        debug!("Dispatching action `{name}' with {} operand(s)", operands.len());
        perform(action.kind, operands, config, subsystems);
        queue = remaining;
    }
    Ok(())
}

fn perform<S: Subsystems>(
    kind: ActionKind,
    operands: &[Arg<'_>],
    config: &BootConfiguration,
    subsystems: &mut S,
) {
    match (kind, operands) {
        (ActionKind::Run, &[task]) => run_task(task, config, subsystems),
        #[cfg(feature = "filesys")]
        (ActionKind::Ls, &[]) => subsystems.fsutil_ls(),
        #[cfg(feature = "filesys")]
        (ActionKind::Cat, &[file]) => subsystems.fsutil_cat(file),
        #[cfg(feature = "filesys")]
        (ActionKind::Rm, &[file]) => subsystems.fsutil_rm(file),
        #[cfg(feature = "filesys")]
        (ActionKind::Put, &[file]) => subsystems.fsutil_put(file),
        #[cfg(feature = "filesys")]
        (ActionKind::Get, &[file]) => subsystems.fsutil_get(file),
        _ => unreachable!("`run_actions` slices exactly `operands()` tokens for {kind:?}"),
    }
}

/// `run TASK`: a kernel self-test, or a user program when those are built in.
fn run_task<S: Subsystems>(task: Arg<'_>, config: &BootConfiguration, subsystems: &mut S) {
    kprint!(subsystems, "Executing '{task}':\n");

    #[cfg(feature = "userprog")]
    if config.thread_tests {
        subsystems.run_test(task);
    } else {
        let tid = subsystems.process_create_initd(task);
        let status = subsystems.process_wait(tid);
        info!("Initial process {tid} for '{task}' exited with status {status}");
    }

    #[cfg(not(feature = "userprog"))]
    {
        let _ = config;
        subsystems.run_test(task);
        info!("Self-test '{task}' returned");
    }

    kprint!(subsystems, "Execution of '{task}' complete.\n");
}
