//! Capability trait definitions.
//!
//! These traits establish the contract between the access controller and the
//! peripherals of a single door: the credential reader, the lock actuator,
//! the LED/buzzer feedback, the nonvolatile credential region, and the
//! button/door-sensor panel. Drivers for real hardware implement them outside
//! the controller, which depends only on these interfaces.
//!
//! All methods are synchronous and, apart from [`LockActuator::set_position`],
//! non-blocking: the controller runs a single cooperative polling loop.

use crate::error::Result;
use crate::types::PanelSnapshot;
use latchkey_core::{Credential, IndicatorColor, LockState, Outcome};

/// Credential reader abstraction (RFID or 1-Wire).
///
/// The reader owns its bus protocol and integrity checking (UID BCC, 1-Wire
/// CRC8). A read that fails the integrity check is reported exactly like an
/// empty reader: `Ok(None)`.
///
/// # Examples
///
/// ```
/// use latchkey_hardware::traits::CredentialReader;
/// use latchkey_hardware::error::Result;
///
/// fn poll_once<R: CredentialReader<8>>(reader: &mut R) -> Result<Option<String>> {
///     Ok(reader.try_read()?.map(|key| key.to_hex()))
/// }
/// ```
pub trait CredentialReader<const W: usize> {
    /// Poll the reader without blocking.
    ///
    /// Returns `Some` only if a credential is presented and passes the
    /// reader's integrity check.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader cannot be reached at all. Integrity
    /// failures are not errors.
    fn try_read(&mut self) -> Result<Option<Credential<W>>>;

    /// Reset and reinitialize the reader hardware.
    ///
    /// Called on a fixed interval regardless of activity to recover from a
    /// stalled bus or radio.
    ///
    /// # Errors
    ///
    /// Returns an error if reinitialization fails.
    fn rearm(&mut self) -> Result<()>;
}

/// Two-position lock actuator.
pub trait LockActuator {
    /// Drive the lock to `position`, wait the settle duration, then release
    /// holding drive.
    ///
    /// There is no position feedback: the full drive cycle runs even if the
    /// lock is believed to already be in `position`.
    ///
    /// # Errors
    ///
    /// Returns an error if the drive cannot be engaged or released.
    fn set_position(&mut self, position: LockState) -> Result<()>;
}

/// LED and buzzer feedback.
///
/// Implementations render the [`Signal`](latchkey_core::Signal) returned by
/// [`Outcome::signal`]; the mapping itself is fixed by the core crate.
pub trait FeedbackSink {
    /// Render an outcome: switch the indicator to its color and play its
    /// buzzer pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the indicator or buzzer cannot be driven.
    fn indicate(&mut self, outcome: Outcome) -> Result<()>;

    /// Switch the indicator to `color` silently.
    ///
    /// # Errors
    ///
    /// Returns an error if the indicator cannot be driven.
    fn show(&mut self, color: IndicatorColor) -> Result<()>;
}

/// Byte-addressable nonvolatile region (EEPROM, flash page, image file).
///
/// Every successful `write` must be durable before it returns.
pub trait NonvolatileStore {
    /// Region size in bytes.
    fn size(&self) -> usize;

    /// Fill `buf` from `offset`.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::OutOfRange` if the range exceeds the region.
    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<()>;

    /// Write `data` at `offset` and make it durable.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::OutOfRange` if the range exceeds the region,
    /// or an I/O error if the write cannot be persisted.
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<()>;

    /// Read a single byte.
    ///
    /// # Errors
    ///
    /// See [`NonvolatileStore::read`].
    fn read_byte(&self, offset: usize) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read(offset, &mut buf)?;
        Ok(buf[0])
    }

    /// Write a single byte.
    ///
    /// # Errors
    ///
    /// See [`NonvolatileStore::write`].
    fn write_byte(&mut self, offset: usize, value: u8) -> Result<()> {
        self.write(offset, &[value])
    }

    /// Zero the entire region.
    ///
    /// # Errors
    ///
    /// See [`NonvolatileStore::write`].
    fn erase(&mut self) -> Result<()> {
        let zeros = vec![0u8; self.size()];
        self.write(0, &zeros)
    }
}

/// Button and optional door-open sensor.
pub trait InputPanel {
    /// Sample the current input levels.
    fn sample(&mut self) -> PanelSnapshot;
}

/// Monotonic millisecond clock. Wraps after `u32::MAX`.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// Blocking delay used for bounded waits (actuator settle).
pub trait Delay {
    fn delay_ms(&mut self, ms: u32);
}

/// Hobby-servo PWM channel.
pub trait ServoDriver {
    /// Start generating the control pulse.
    ///
    /// # Errors
    ///
    /// Returns an error if the PWM channel cannot be claimed.
    fn attach(&mut self) -> Result<()>;

    /// Command the servo to `degrees` (0-180).
    ///
    /// # Errors
    ///
    /// Returns an error if the servo is not attached.
    fn write_angle(&mut self, degrees: u8) -> Result<()>;

    /// Stop the control pulse so the servo releases torque.
    ///
    /// # Errors
    ///
    /// Returns an error if the PWM channel cannot be released.
    fn detach(&mut self) -> Result<()>;
}
