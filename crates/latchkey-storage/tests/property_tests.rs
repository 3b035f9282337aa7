//! Property-based tests for the credential store.
//!
//! Random sequences of toggle presentations are replayed against both the
//! store and a plain `Vec` model; the two must agree after every step.

use latchkey_core::Credential;
use latchkey_hardware::MemoryNvs;
use latchkey_storage::{CredentialRepository, CredentialStore, EnrollOutcome, RejectReason};
use proptest::prelude::*;

const CAPACITY: usize = 4;

type Store = CredentialStore<MemoryNvs, CAPACITY, 8>;

/// Strategy drawing from a small pool so that repeats (revocations) are common.
fn presentation() -> impl Strategy<Value = Credential<8>> {
    (0u8..8).prop_map(|id| Credential::from_bytes([0x04, 0xC0, 0xFF, 0xEE, id, 0, 0, 0]))
}

/// Reference model: slot-ordered list with swap-delete.
fn model_toggle(model: &mut Vec<Credential<8>>, key: Credential<8>) -> EnrollOutcome {
    if let Some(slot) = model.iter().position(|k| *k == key) {
        model.swap_remove(slot);
        EnrollOutcome::Revoked
    } else if model.len() == CAPACITY {
        EnrollOutcome::Rejected(RejectReason::StoreFull)
    } else {
        model.push(key);
        EnrollOutcome::Enrolled
    }
}

proptest! {
    /// Property: the store behaves exactly like the swap-delete model.
    #[test]
    fn prop_store_matches_model(keys in prop::collection::vec(presentation(), 0..64)) {
        let mut store = Store::initialize(MemoryNvs::new(64), false).unwrap();
        let mut model = Vec::new();

        for key in keys {
            let expected = model_toggle(&mut model, key);
            prop_assert_eq!(store.toggle_enroll(&key).unwrap(), expected);
            prop_assert_eq!(store.credentials().unwrap(), model.clone());
        }
    }

    /// Property: count stays within capacity, no duplicates, free slots are zero.
    #[test]
    fn prop_layout_invariants(keys in prop::collection::vec(presentation(), 0..64)) {
        let mut store = Store::initialize(MemoryNvs::new(64), false).unwrap();

        for key in keys {
            store.toggle_enroll(&key).unwrap();

            let count = store.count();
            prop_assert!(count <= CAPACITY);

            let live = store.credentials().unwrap();
            for (i, a) in live.iter().enumerate() {
                prop_assert!(!live[i + 1..].contains(a));
            }

            let bytes = store.nvs().as_bytes();
            prop_assert_eq!(usize::from(bytes[1]), count);
            prop_assert!(bytes[2 + count * 8..2 + CAPACITY * 8].iter().all(|&b| b == 0));
        }
    }

    /// Property: reopening the region yields the same membership.
    #[test]
    fn prop_reload_preserves_membership(keys in prop::collection::vec(presentation(), 0..32)) {
        let mut store = Store::initialize(MemoryNvs::new(64), false).unwrap();
        for key in &keys {
            store.toggle_enroll(key).unwrap();
        }
        let before = store.credentials().unwrap();

        let reloaded = Store::initialize(store.into_inner(), false).unwrap();
        prop_assert_eq!(reloaded.credentials().unwrap(), before);
    }
}
