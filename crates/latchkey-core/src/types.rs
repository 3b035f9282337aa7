use crate::{
    Result,
    constants::{MAX_CREDENTIAL_WIDTH, MIN_CREDENTIAL_WIDTH},
    error::Error,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use subtle::ConstantTimeEq;

/// Fixed-width credential read from a physical key (RFID UID or 1-Wire ROM).
///
/// `W` is the slot width of the credential store. Raw reads shorter than `W`
/// are zero-padded; reads longer than `W` are rejected. A width outside
/// `MIN_CREDENTIAL_WIDTH..=MAX_CREDENTIAL_WIDTH` fails to compile.
///
/// # Security
/// Equality is evaluated in constant time so that lookup duration does not
/// leak how many leading bytes of a presented key matched an enrolled one.
///
/// # Examples
///
/// ```
/// use latchkey_core::Credential;
///
/// let key = Credential::<8>::from_slice(&[0x04, 0xAB, 0xCD, 0xEF]).unwrap();
/// assert_eq!(key.to_hex(), "04ABCDEF00000000");
/// ```
#[derive(Clone, Copy, Eq)]
pub struct Credential<const W: usize>([u8; W]);

impl<const W: usize> Credential<W> {
    const VALID_WIDTH: () = assert!(
        W >= MIN_CREDENTIAL_WIDTH && W <= MAX_CREDENTIAL_WIDTH,
        "credential width must be between 4 and 8 bytes"
    );

    /// Build a credential from a full-width byte array.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; W]) -> Self {
        let () = Self::VALID_WIDTH;
        Credential(bytes)
    }

    /// Build a credential from a raw read, zero-padding it to `W` bytes.
    ///
    /// # Errors
    /// Returns `Error::InvalidCredentialLength` if the read is shorter than
    /// `MIN_CREDENTIAL_WIDTH` or longer than `W`.
    pub fn from_slice(raw: &[u8]) -> Result<Self> {
        let () = Self::VALID_WIDTH;

        if !(MIN_CREDENTIAL_WIDTH..=W).contains(&raw.len()) {
            return Err(Error::InvalidCredentialLength {
                min: MIN_CREDENTIAL_WIDTH,
                max: W,
                actual: raw.len(),
            });
        }

        let mut bytes = [0u8; W];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Credential(bytes))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; W] {
        &self.0
    }

    /// Uppercase hexadecimal rendering of all `W` bytes.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02X}")).collect()
    }
}

impl<const W: usize> PartialEq for Credential<W> {
    fn eq(&self, other: &Self) -> bool {
        self.0[..].ct_eq(&other.0[..]).into()
    }
}

impl<const W: usize> std::hash::Hash for Credential<W> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<const W: usize> fmt::Debug for Credential<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self.to_hex())
    }
}

impl<const W: usize> fmt::Display for Credential<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl<const W: usize> std::str::FromStr for Credential<W> {
    type Err = Error;

    /// Parse a hexadecimal credential such as `04ABCDEF` or `04:ab:cd:ef`.
    fn from_str(s: &str) -> Result<Self> {
        let digits: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ':' | '-' | ' '))
            .collect();

        if digits.len() % 2 != 0 || !digits.is_ascii() {
            return Err(Error::InvalidCredentialFormat(format!(
                "expected an even number of hex digits, got {s:?}"
            )));
        }

        let raw = (0..digits.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&digits[i..i + 2], 16))
            .collect::<std::result::Result<Vec<u8>, _>>()
            .map_err(|_| Error::InvalidCredentialFormat(format!("not hexadecimal: {s:?}")))?;

        Credential::from_slice(&raw)
    }
}

impl<const W: usize> Serialize for Credential<W> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de, const W: usize> Deserialize<'de> for Credential<W> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        hex.parse().map_err(serde::de::Error::custom)
    }
}

/// Commanded position of the lock actuator.
///
/// Tracked independently of any door sensor: the lock may be `Unlocked`
/// while the door is still closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    Locked,
    Unlocked,
}

impl LockState {
    /// The opposite position.
    #[inline]
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            LockState::Locked => LockState::Unlocked,
            LockState::Unlocked => LockState::Locked,
        }
    }

    /// Steady-state indicator color for this position.
    #[inline]
    #[must_use]
    pub fn indicator(self) -> IndicatorColor {
        match self {
            LockState::Locked => IndicatorColor::Red,
            LockState::Unlocked => IndicatorColor::Green,
        }
    }
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LockState::Locked => write!(f, "Locked"),
            LockState::Unlocked => write!(f, "Unlocked"),
        }
    }
}

/// Physical door state reported by the optional door-open sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorSensorState {
    Open,
    Closed,
}

impl DoorSensorState {
    #[inline]
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, DoorSensorState::Open)
    }
}

/// User-visible outcome of a controller decision.
///
/// This is a closed set: every decision the controller reports to the user
/// maps to exactly one of these, and each maps to a distinct [`Signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Access refused or enrollment rejected.
    Decline,
    /// Access granted.
    Success,
    /// A new credential was enrolled.
    Saved,
    /// A credential was revoked, or the store was erased.
    Deleted,
}

impl Outcome {
    /// Light and sound rendering of this outcome.
    ///
    /// # Examples
    ///
    /// ```
    /// use latchkey_core::{IndicatorColor, Outcome};
    ///
    /// assert_eq!(Outcome::Decline.signal().color, IndicatorColor::Red);
    /// assert_eq!(Outcome::Deleted.signal().pattern.repeats, 3);
    /// ```
    #[must_use]
    pub const fn signal(self) -> Signal {
        match self {
            Outcome::Decline => Signal {
                color: IndicatorColor::Red,
                pattern: BuzzerPattern::new(100, 300, 100, 2),
            },
            Outcome::Success => Signal {
                color: IndicatorColor::Green,
                pattern: BuzzerPattern::new(890, 330, 0, 1),
            },
            Outcome::Saved => Signal {
                color: IndicatorColor::Green,
                pattern: BuzzerPattern::new(890, 330, 100, 2),
            },
            Outcome::Deleted => Signal {
                color: IndicatorColor::Green,
                pattern: BuzzerPattern::new(890, 330, 100, 3),
            },
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Outcome::Decline => write!(f, "DECLINE"),
            Outcome::Success => write!(f, "SUCCESS"),
            Outcome::Saved => write!(f, "SAVED"),
            Outcome::Deleted => write!(f, "DELETED"),
        }
    }
}

/// Color of the binary two-color status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorColor {
    Red,
    Green,
}

/// Buzzer tone train: `repeats` beeps of `frequency_hz`, each sounding for
/// `on_ms` and followed by `off_ms` of silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuzzerPattern {
    pub frequency_hz: u16,
    pub on_ms: u16,
    pub off_ms: u16,
    pub repeats: u8,
}

impl BuzzerPattern {
    #[must_use]
    pub const fn new(frequency_hz: u16, on_ms: u16, off_ms: u16, repeats: u8) -> Self {
        Self {
            frequency_hz,
            on_ms,
            off_ms,
            repeats,
        }
    }

    /// Total time the pattern occupies the buzzer.
    #[must_use]
    pub const fn duration_ms(&self) -> u32 {
        (self.on_ms as u32 + self.off_ms as u32) * self.repeats as u32
    }
}

/// Indicator color plus buzzer pattern for one [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signal {
    pub color: IndicatorColor,
    pub pattern: BuzzerPattern,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    type Key = Credential<8>;

    #[rstest]
    #[case(&[0x04, 0xAB, 0xCD, 0xEF], "04ABCDEF00000000")]
    #[case(&[0x04, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66], "0411223344556600")]
    #[case(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08], "0102030405060708")]
    fn test_credential_from_slice_pads(#[case] raw: &[u8], #[case] expected: &str) {
        let key = Key::from_slice(raw).unwrap();
        assert_eq!(key.to_hex(), expected);
    }

    #[rstest]
    #[case(&[])]
    #[case(&[0x01, 0x02, 0x03])]
    #[case(&[0; 9])]
    fn test_credential_rejects_bad_length(#[case] raw: &[u8]) {
        let result = Key::from_slice(raw);
        assert!(matches!(
            result,
            Err(Error::InvalidCredentialLength { min: 4, max: 8, .. })
        ));
    }

    #[test]
    fn test_credential_narrow_width_rejects_long_read() {
        let result = Credential::<4>::from_slice(&[1, 2, 3, 4, 5]);
        assert!(result.is_err());
        assert!(Credential::<4>::from_slice(&[1, 2, 3, 4]).is_ok());
    }

    #[rstest]
    #[case("04ABCDEF")]
    #[case("04:ab:cd:ef")]
    #[case(" 04-AB-CD-EF ")]
    fn test_credential_parse_hex(#[case] input: &str) {
        let key: Key = input.parse().unwrap();
        assert_eq!(key, Key::from_slice(&[0x04, 0xAB, 0xCD, 0xEF]).unwrap());
    }

    #[rstest]
    #[case("04ABCDE")]
    #[case("ZZABCDEF")]
    #[case("01")]
    fn test_credential_parse_invalid(#[case] input: &str) {
        assert!(input.parse::<Key>().is_err());
    }

    #[test]
    fn test_credential_equality_and_hash() {
        let a = Key::from_bytes([1, 2, 3, 4, 5, 6, 7, 8]);
        let b = Key::from_bytes([1, 2, 3, 4, 5, 6, 7, 8]);
        let c = Key::from_bytes([1, 2, 3, 4, 5, 6, 7, 9]);

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<Key> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_credential_serde_as_hex() {
        let key = Key::from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"DEADBEEF00000000\"");

        let back: Key = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_lock_state_toggle_and_indicator() {
        assert_eq!(LockState::Locked.toggled(), LockState::Unlocked);
        assert_eq!(LockState::Unlocked.toggled(), LockState::Locked);
        assert_eq!(LockState::Locked.indicator(), IndicatorColor::Red);
        assert_eq!(LockState::Unlocked.indicator(), IndicatorColor::Green);
    }

    #[test]
    fn test_outcome_signals_are_distinct() {
        let outcomes = [
            Outcome::Decline,
            Outcome::Success,
            Outcome::Saved,
            Outcome::Deleted,
        ];
        let signals: HashSet<Signal> = outcomes.iter().map(|o| o.signal()).collect();
        assert_eq!(signals.len(), outcomes.len());
    }

    #[rstest]
    #[case(Outcome::Decline, IndicatorColor::Red, 100, 2)]
    #[case(Outcome::Success, IndicatorColor::Green, 890, 1)]
    #[case(Outcome::Saved, IndicatorColor::Green, 890, 2)]
    #[case(Outcome::Deleted, IndicatorColor::Green, 890, 3)]
    fn test_outcome_signal_mapping(
        #[case] outcome: Outcome,
        #[case] color: IndicatorColor,
        #[case] frequency_hz: u16,
        #[case] repeats: u8,
    ) {
        let signal = outcome.signal();
        assert_eq!(signal.color, color);
        assert_eq!(signal.pattern.frequency_hz, frequency_hz);
        assert_eq!(signal.pattern.repeats, repeats);
    }

    #[test]
    fn test_buzzer_pattern_duration() {
        assert_eq!(Outcome::Decline.signal().pattern.duration_ms(), 800);
        assert_eq!(Outcome::Success.signal().pattern.duration_ms(), 330);
    }
}
