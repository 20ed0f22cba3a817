// src/common/timing.rs

use core::time::Duration;

// Nominal values. These are fixed blocking waits, not polling timeouts.

// === STC31-C ===

/// Wait after the last configuration write of `initialize`.
pub const STC31C_POST_INIT_SETTLE: Duration = Duration::from_millis(50);
/// Wait after enabling/disabling automatic self-calibration.
pub const STC31C_ASC_SETTLE: Duration = Duration::from_millis(10);
/// Wait after a forced recalibration.
pub const STC31C_FRC_SETTLE: Duration = Duration::from_millis(10);

// === SHTC3 ===

/// Reboot time after a soft reset.
pub const SHTC3_SOFT_RESET_SETTLE: Duration = Duration::from_millis(50);

// === SPS30 ===

/// The SPS30 buffers its first measurement roughly one second after
/// `start_measurement`; reads before that report "not enough data".
pub const SPS30_MEASUREMENT_SETTLE: Duration = Duration::from_millis(1100);

/// Blocks for `duration` on any `DelayNs`.
pub(crate) fn settle<D: embedded_hal::delay::DelayNs>(delay: &mut D, duration: Duration) {
    delay.delay_ms(duration.as_millis() as u32);
}
