//! # Shutdown
//!
//! Flushes the file system, prints per-subsystem statistics and powers the
//! machine off.

use crate::subsystems::{Subsystem, Subsystems};

/// Subsystems whose statistics are printed, in order.
#[must_use]
pub fn stats_order() -> impl Iterator<Item = Subsystem> {
    [
        Subsystem::Timer,
        Subsystem::Thread,
        #[cfg(feature = "filesys")]
        Subsystem::Disk,
        Subsystem::Console,
        Subsystem::Keyboard,
        #[cfg(feature = "userprog")]
        Subsystem::Exception,
    ]
    .into_iter()
}

/// Everything up to, but not including, the power-off itself.
pub fn finalize<S: Subsystems>(subsystems: &mut S) {
    #[cfg(feature = "filesys")]
    {
        log::info!("Flushing file system");
        subsystems.filesys_done();
    }

    for subsystem in stats_order() {
        subsystems.print_stats(subsystem);
    }

    kprint!(subsystems, "Powering off...\n");
}

/// Finalize and turn the machine off.
pub fn power_off<S: Subsystems>(subsystems: &mut S) -> ! {
    finalize(subsystems);
    subsystems.halt()
}
