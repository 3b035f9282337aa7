//! Build-time constants for the Latchkey access controller.
//!
//! This module centralizes every fixed number the controller depends on:
//! the persisted layout of the credential region, credential width bounds,
//! and the default timings of the polling loop.
//!
//! # Persisted Layout
//!
//! ```text
//! offset 0          marker byte (STORE_MARKER)
//! offset 1          live credential count
//! offset 2 ..       N slots of W bytes each, packed contiguously
//! ```
//!
//! # Usage
//!
//! ```
//! use latchkey_core::constants::*;
//!
//! // A store with the default capacity and width fits the default region.
//! assert!(layout_len(DEFAULT_CAPACITY, DEFAULT_CREDENTIAL_WIDTH) <= DEFAULT_REGION_SIZE);
//! ```

// ============================================================================
// Persisted Layout
// ============================================================================

/// Marker written at offset 0 once the region has been formatted.
///
/// Any other value at offset 0 means the region was never initialized and
/// must be erased before use.
pub const STORE_MARKER: u8 = 100;

/// Offset of the marker byte.
pub const MARKER_OFFSET: usize = 0;

/// Offset of the persisted live credential count.
pub const COUNT_OFFSET: usize = 1;

/// Offset of the first credential slot.
pub const SLOTS_OFFSET: usize = 2;

/// Default size of the nonvolatile region in bytes (ATmega328 EEPROM).
pub const DEFAULT_REGION_SIZE: usize = 1024;

/// Bytes occupied by a store of `capacity` slots of `width` bytes.
///
/// # Examples
///
/// ```
/// use latchkey_core::constants::layout_len;
///
/// assert_eq!(layout_len(3, 8), 26);
/// ```
#[must_use]
pub const fn layout_len(capacity: usize, width: usize) -> usize {
    SLOTS_OFFSET + capacity * width
}

// ============================================================================
// Credential Geometry
// ============================================================================

/// Minimum credential width in bytes (4-byte RFID UID).
pub const MIN_CREDENTIAL_WIDTH: usize = 4;

/// Maximum credential width in bytes (8-byte 1-Wire ROM code).
pub const MAX_CREDENTIAL_WIDTH: usize = 8;

/// Default slot width. Wide enough for both 4- and 7-byte RFID UIDs and
/// 1-Wire ROM codes.
pub const DEFAULT_CREDENTIAL_WIDTH: usize = 8;

/// Default number of credential slots.
pub const DEFAULT_CAPACITY: usize = 3;

/// Largest capacity representable by the single-byte persisted count.
pub const MAX_CAPACITY: usize = u8::MAX as usize;

// ============================================================================
// Timing (milliseconds)
// ============================================================================

/// Quiescence timeout before auto-relock, and the minimum gap between
/// credential actuations under the manual toggle policy.
pub const DEFAULT_LOCK_TIMEOUT_MS: u32 = 1000;

/// Interval of the unconditional reader re-arm, and the minimum gap between
/// two evaluations of a continuously presented credential.
pub const DEFAULT_REARM_INTERVAL_MS: u32 = 500;

/// Time the button must be held at boot to request a full erase.
pub const DEFAULT_RESET_HOLD_MS: u32 = 3000;

/// Time the lock actuator is driven before holding power is released.
pub const DEFAULT_SETTLE_MS: u32 = 1000;

/// Default polling period of the control loop.
pub const DEFAULT_TICK_MS: u32 = 10;

// ============================================================================
// Actuator Calibration
// ============================================================================

/// Servo angle of the locked position, in degrees.
pub const DEFAULT_LOCKED_ANGLE: u8 = 170;

/// Servo angle of the unlocked position, in degrees.
pub const DEFAULT_UNLOCKED_ANGLE: u8 = 10;

/// Wraparound-safe elapsed time between two millisecond timestamps.
///
/// Timestamps are `u32` milliseconds since boot and wrap after ~49 days;
/// unsigned wrapping subtraction keeps comparisons correct across the wrap.
///
/// # Examples
///
/// ```
/// use latchkey_core::constants::elapsed_ms;
///
/// assert_eq!(elapsed_ms(1500, 1000), 500);
/// assert_eq!(elapsed_ms(5, u32::MAX - 4), 10);
/// ```
#[inline]
#[must_use]
pub const fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_fits_region() {
        assert!(layout_len(DEFAULT_CAPACITY, DEFAULT_CREDENTIAL_WIDTH) <= DEFAULT_REGION_SIZE);
        assert!(layout_len(MAX_CAPACITY, MAX_CREDENTIAL_WIDTH) <= DEFAULT_REGION_SIZE * 3);
    }

    #[test]
    fn test_elapsed_across_wrap() {
        assert_eq!(elapsed_ms(0, u32::MAX), 1);
        assert_eq!(elapsed_ms(499, u32::MAX - 500), 1000);
    }

    #[test]
    fn test_default_widths_in_bounds() {
        assert!((MIN_CREDENTIAL_WIDTH..=MAX_CREDENTIAL_WIDTH).contains(&DEFAULT_CREDENTIAL_WIDTH));
        assert!(DEFAULT_CAPACITY <= MAX_CAPACITY);
    }
}
