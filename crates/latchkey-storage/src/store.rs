use crate::error::{StorageError, StorageResult};
use crate::layout::StoreLayout;
use crate::repository::{CredentialRepository, EnrollOutcome, RejectReason};
use latchkey_core::Credential;
use latchkey_core::constants::STORE_MARKER;
use latchkey_hardware::NonvolatileStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Why the region was formatted during initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatReason {
    /// The marker byte was missing: first boot on this region.
    FirstBoot,
    /// The operator held the reset button through boot.
    ResetRequested,
    /// The persisted count exceeded the capacity.
    CorruptCount,
}

/// What [`CredentialStore::initialize`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Initialization {
    /// An initialized region was loaded with `count` live credentials.
    Loaded { count: usize },
    /// The region was erased and re-marked.
    Formatted(FormatReason),
}

/// Bounded, duplicate-free, persistent credential store.
///
/// Holds at most `N` credentials of `W` bytes in a nonvolatile region using
/// the [`StoreLayout`]. Every mutation is written through to the region
/// before the call returns; the in-memory `count` is updated only after the
/// persisted count has been written.
///
/// # Examples
///
/// ```
/// use latchkey_core::Credential;
/// use latchkey_hardware::MemoryNvs;
/// use latchkey_storage::{CredentialRepository, CredentialStore, EnrollOutcome};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = CredentialStore::<_, 3, 8>::initialize(MemoryNvs::new(64), false)?;
/// let key = Credential::from_slice(&[0x04, 0xAB, 0xCD, 0xEF])?;
///
/// assert_eq!(store.toggle_enroll(&key)?, EnrollOutcome::Enrolled);
/// assert_eq!(store.lookup(&key)?, Some(0));
/// assert_eq!(store.toggle_enroll(&key)?, EnrollOutcome::Revoked);
/// assert!(store.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CredentialStore<S, const N: usize, const W: usize> {
    nvs: S,
    count: usize,
    initialization: Initialization,
}

impl<S: NonvolatileStore, const N: usize, const W: usize> CredentialStore<S, N, W> {
    /// Prepare the region and load the store.
    ///
    /// The region is erased to zero and re-marked when the marker byte is
    /// absent, when `reset_requested` is set, or when the persisted count is
    /// larger than `N`. Otherwise the persisted count is loaded.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::RegionTooSmall` if the region cannot hold the
    /// layout, or a hardware error if the region cannot be read or written.
    pub fn initialize(mut nvs: S, reset_requested: bool) -> StorageResult<Self> {
        let () = StoreLayout::<N, W>::VALID;

        let needed = StoreLayout::<N, W>::LEN;
        if nvs.size() < needed {
            return Err(StorageError::RegionTooSmall {
                needed,
                size: nvs.size(),
            });
        }

        let marker = nvs.read_byte(StoreLayout::<N, W>::MARKER)?;
        let reason = if reset_requested {
            Some(FormatReason::ResetRequested)
        } else if marker != STORE_MARKER {
            Some(FormatReason::FirstBoot)
        } else {
            None
        };

        let initialization = match reason {
            Some(reason) => Self::format(&mut nvs, reason)?,
            None => {
                let count = usize::from(nvs.read_byte(StoreLayout::<N, W>::COUNT)?);
                if count > N {
                    warn!(count, capacity = N, "persisted count exceeds capacity");
                    Self::format(&mut nvs, FormatReason::CorruptCount)?
                } else {
                    info!(count, capacity = N, "credential store loaded");
                    Initialization::Loaded { count }
                }
            }
        };

        let count = match initialization {
            Initialization::Loaded { count } => count,
            Initialization::Formatted(_) => 0,
        };

        Ok(Self {
            nvs,
            count,
            initialization,
        })
    }

    fn format(nvs: &mut S, reason: FormatReason) -> StorageResult<Initialization> {
        nvs.erase()?;
        nvs.write_byte(StoreLayout::<N, W>::MARKER, STORE_MARKER)?;
        info!(?reason, size = nvs.size(), "credential region formatted");
        Ok(Initialization::Formatted(reason))
    }

    /// What initialization found.
    pub fn initialization(&self) -> Initialization {
        self.initialization
    }

    pub fn is_full(&self) -> bool {
        self.count >= N
    }

    /// Credential in `slot`, or `None` if the slot is not live.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::SlotOutOfRange` if `slot >= N`.
    pub fn get(&self, slot: usize) -> StorageResult<Option<Credential<W>>> {
        if slot >= N {
            return Err(StorageError::SlotOutOfRange { slot, capacity: N });
        }
        if slot >= self.count {
            return Ok(None);
        }
        self.read_slot(slot).map(Some)
    }

    /// Live credentials in slot order.
    pub fn credentials(&self) -> StorageResult<Vec<Credential<W>>> {
        (0..self.count).map(|slot| self.read_slot(slot)).collect()
    }

    /// Borrow the underlying region.
    pub fn nvs(&self) -> &S {
        &self.nvs
    }

    /// Release the underlying region.
    pub fn into_inner(self) -> S {
        self.nvs
    }

    fn read_slot(&self, slot: usize) -> StorageResult<Credential<W>> {
        let mut bytes = [0u8; W];
        self.nvs
            .read(StoreLayout::<N, W>::slot_offset(slot), &mut bytes)?;
        Ok(Credential::from_bytes(bytes))
    }

    fn write_slot(&mut self, slot: usize, bytes: &[u8; W]) -> StorageResult<()> {
        self.nvs
            .write(StoreLayout::<N, W>::slot_offset(slot), bytes)?;
        Ok(())
    }

    fn persist_count(&mut self, count: usize) -> StorageResult<()> {
        // count <= N <= u8::MAX by StoreLayout::VALID
        self.nvs
            .write_byte(StoreLayout::<N, W>::COUNT, count as u8)?;
        self.count = count;
        Ok(())
    }

    /// Swap-delete: fill `slot` from the last live slot, clear the last live
    /// slot, then decrement the count.
    fn revoke_at(&mut self, slot: usize) -> StorageResult<()> {
        let last = self.count - 1;
        if slot != last {
            let moved = self.read_slot(last)?;
            self.write_slot(slot, moved.as_bytes())?;
        }
        self.write_slot(last, &[0u8; W])?;
        self.persist_count(last)
    }
}

impl<S: NonvolatileStore, const N: usize, const W: usize> CredentialRepository<W>
    for CredentialStore<S, N, W>
{
    fn lookup(&self, credential: &Credential<W>) -> StorageResult<Option<usize>> {
        for slot in 0..self.count {
            if self.read_slot(slot)? == *credential {
                return Ok(Some(slot));
            }
        }
        Ok(None)
    }

    fn toggle_enroll(&mut self, credential: &Credential<W>) -> StorageResult<EnrollOutcome> {
        if let Some(slot) = self.lookup(credential)? {
            self.revoke_at(slot)?;
            info!(%credential, slot, count = self.count, "credential revoked");
            return Ok(EnrollOutcome::Revoked);
        }

        if self.is_full() {
            debug!(%credential, capacity = N, "enrollment rejected, store full");
            return Ok(EnrollOutcome::Rejected(RejectReason::StoreFull));
        }

        let slot = self.count;
        self.write_slot(slot, credential.as_bytes())?;
        self.persist_count(slot + 1)?;
        info!(%credential, slot, count = self.count, "credential enrolled");
        Ok(EnrollOutcome::Enrolled)
    }

    fn count(&self) -> usize {
        self.count
    }

    fn capacity(&self) -> usize {
        N
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_hardware::MemoryNvs;

    type Store = CredentialStore<MemoryNvs, 3, 8>;

    fn key(id: u8) -> Credential<8> {
        Credential::from_slice(&[0x04, 0x10, 0x20, id]).unwrap()
    }

    fn fresh() -> Store {
        Store::initialize(MemoryNvs::new(64), false).unwrap()
    }

    #[test]
    fn test_first_boot_formats_region() {
        let store = fresh();

        assert_eq!(
            store.initialization(),
            Initialization::Formatted(FormatReason::FirstBoot)
        );
        assert_eq!(store.count(), 0);
        let bytes = store.nvs().as_bytes();
        assert_eq!(bytes[0], STORE_MARKER);
        assert!(bytes[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_reload_keeps_credentials() {
        let mut store = fresh();
        store.toggle_enroll(&key(1)).unwrap();
        store.toggle_enroll(&key(2)).unwrap();

        let reloaded = Store::initialize(store.into_inner(), false).unwrap();
        assert_eq!(reloaded.initialization(), Initialization::Loaded { count: 2 });
        assert_eq!(reloaded.credentials().unwrap(), vec![key(1), key(2)]);
    }

    #[test]
    fn test_reset_request_erases() {
        let mut store = fresh();
        store.toggle_enroll(&key(1)).unwrap();

        let reset = Store::initialize(store.into_inner(), true).unwrap();
        assert_eq!(
            reset.initialization(),
            Initialization::Formatted(FormatReason::ResetRequested)
        );
        assert!(reset.is_empty());
        assert_eq!(reset.lookup(&key(1)).unwrap(), None);
    }

    #[test]
    fn test_corrupt_count_reformats() {
        let mut bytes = vec![0u8; 64];
        bytes[0] = STORE_MARKER;
        bytes[1] = 9;

        let store = Store::initialize(MemoryNvs::from_bytes(bytes), false).unwrap();
        assert_eq!(
            store.initialization(),
            Initialization::Formatted(FormatReason::CorruptCount)
        );
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_region_too_small() {
        let result = Store::initialize(MemoryNvs::new(25), false);
        assert!(matches!(
            result,
            Err(StorageError::RegionTooSmall { needed: 26, size: 25 })
        ));
    }

    #[test]
    fn test_enroll_writes_slot_and_count() {
        let mut store = fresh();
        store.toggle_enroll(&key(7)).unwrap();

        let bytes = store.nvs().as_bytes();
        assert_eq!(bytes[1], 1);
        assert_eq!(&bytes[2..10], key(7).as_bytes());
    }

    #[test]
    fn test_lookup_first_match_in_slot_order() {
        let mut store = fresh();
        for id in 1..=3 {
            store.toggle_enroll(&key(id)).unwrap();
        }

        assert_eq!(store.lookup(&key(1)).unwrap(), Some(0));
        assert_eq!(store.lookup(&key(3)).unwrap(), Some(2));
        assert_eq!(store.lookup(&key(9)).unwrap(), None);
    }

    #[test]
    fn test_revoke_middle_swaps_last_in() {
        let mut store = fresh();
        for id in 1..=3 {
            store.toggle_enroll(&key(id)).unwrap();
        }

        assert_eq!(store.toggle_enroll(&key(2)).unwrap(), EnrollOutcome::Revoked);

        assert_eq!(store.credentials().unwrap(), vec![key(1), key(3)]);
        let bytes = store.nvs().as_bytes();
        assert_eq!(bytes[1], 2);
        assert!(bytes[18..26].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_revoke_last_slot_only_clears() {
        let mut store = fresh();
        store.toggle_enroll(&key(1)).unwrap();
        store.toggle_enroll(&key(2)).unwrap();

        store.toggle_enroll(&key(2)).unwrap();

        assert_eq!(store.credentials().unwrap(), vec![key(1)]);
        assert!(store.nvs().as_bytes()[10..18].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_full_store_rejects_without_writing() {
        let mut store = fresh();
        for id in 1..=3 {
            store.toggle_enroll(&key(id)).unwrap();
        }
        let before = store.nvs().as_bytes().to_vec();
        let writes = store.nvs().write_ops();

        let outcome = store.toggle_enroll(&key(4)).unwrap();

        assert_eq!(outcome, EnrollOutcome::Rejected(RejectReason::StoreFull));
        assert_eq!(store.nvs().as_bytes(), before.as_slice());
        assert_eq!(store.nvs().write_ops(), writes);
        assert!(store.is_full());
    }

    #[test]
    fn test_full_store_still_revokes() {
        let mut store = fresh();
        for id in 1..=3 {
            store.toggle_enroll(&key(id)).unwrap();
        }

        assert_eq!(store.toggle_enroll(&key(1)).unwrap(), EnrollOutcome::Revoked);
        assert_eq!(store.credentials().unwrap(), vec![key(3), key(2)]);
    }

    #[test]
    fn test_failed_write_keeps_count() {
        let mut store = fresh();
        store.toggle_enroll(&key(1)).unwrap();

        let mut nvs = store.into_inner();
        nvs.set_fail_writes(true);
        let mut store = Store::initialize(nvs, false).unwrap();

        assert!(store.toggle_enroll(&key(2)).is_err());
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_get_slot_bounds() {
        let mut store = fresh();
        store.toggle_enroll(&key(1)).unwrap();

        assert_eq!(store.get(0).unwrap(), Some(key(1)));
        assert_eq!(store.get(1).unwrap(), None);
        assert!(matches!(
            store.get(3),
            Err(StorageError::SlotOutOfRange { slot: 3, capacity: 3 })
        ));
    }
}
