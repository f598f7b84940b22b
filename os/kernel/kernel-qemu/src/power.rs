//! Machine power-off under QEMU.

/// PIIX4 PM1a control block as wired by QEMU's `pc` machine.
pub const POWER_OFF_PORT: u16 = 0x604;

/// `SLP_EN` with sleep type S5.
pub const POWER_OFF_COMMAND: u16 = 0x2000;

/// Ask the emulator to turn the machine off.
///
/// Never returns: on hardware (or an emulator) that ignores the request, the
/// CPU spins here forever.
pub fn power_off() -> ! {
    unsafe { crate::port::outw(POWER_OFF_PORT, POWER_OFF_COMMAND) };
    loop {
        core::hint::spin_loop();
    }
}
