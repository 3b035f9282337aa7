//! Persisted layout of the credential region.
//!
//! ```text
//! ┌────────┬───────┬──────────┬──────────┬─────┬────────────┐
//! │ marker │ count │ slot 0   │ slot 1   │ ... │ slot N-1   │
//! │ 1 byte │ 1 byte│ W bytes  │ W bytes  │     │ W bytes    │
//! └────────┴───────┴──────────┴──────────┴─────┴────────────┘
//! ```
//!
//! Slots `[0, count)` are live and contiguous. Slots `[count, N)` are zero
//! right after an erase and after a revoke has cleared them.

use latchkey_core::constants::{
    COUNT_OFFSET, MARKER_OFFSET, MAX_CAPACITY, MAX_CREDENTIAL_WIDTH, MIN_CREDENTIAL_WIDTH,
    SLOTS_OFFSET, layout_len,
};

/// Compile-time description of a store with `N` slots of `W` bytes.
///
/// Referencing [`StoreLayout::VALID`] with an out-of-range `N` or `W` is a
/// build error, so a capacity or width mismatch can never reach runtime.
///
/// # Examples
///
/// ```
/// use latchkey_storage::layout::StoreLayout;
///
/// assert_eq!(StoreLayout::<3, 8>::LEN, 26);
/// assert_eq!(StoreLayout::<3, 8>::slot_offset(2), 18);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StoreLayout<const N: usize, const W: usize>;

impl<const N: usize, const W: usize> StoreLayout<N, W> {
    /// Evaluates to `()` for a valid geometry and fails the build otherwise.
    pub const VALID: () = {
        assert!(N >= 1, "credential store capacity must be at least 1");
        assert!(
            N <= MAX_CAPACITY,
            "credential store capacity must fit the one-byte count"
        );
        assert!(
            W >= MIN_CREDENTIAL_WIDTH && W <= MAX_CREDENTIAL_WIDTH,
            "credential width must be between 4 and 8 bytes"
        );
    };

    /// Bytes the layout occupies from offset 0.
    pub const LEN: usize = layout_len(N, W);

    pub const MARKER: usize = MARKER_OFFSET;

    pub const COUNT: usize = COUNT_OFFSET;

    /// Offset of the first byte of `slot`.
    #[must_use]
    pub const fn slot_offset(slot: usize) -> usize {
        SLOTS_OFFSET + slot * W
    }
}
