use crate::error::StorageResult;
use latchkey_core::{Credential, Outcome};
use serde::{Deserialize, Serialize};

/// Why an enrollment was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Every slot is live; nothing was written.
    StoreFull,
}

/// Result of presenting a credential to the enrollment path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollOutcome {
    /// The credential was absent and has been added.
    Enrolled,
    /// The credential was present and has been removed.
    Revoked,
    /// The credential was absent and could not be added.
    Rejected(RejectReason),
}

impl EnrollOutcome {
    /// Feedback rendered for this outcome.
    ///
    /// # Examples
    ///
    /// ```
    /// use latchkey_core::Outcome;
    /// use latchkey_storage::{EnrollOutcome, RejectReason};
    ///
    /// assert_eq!(EnrollOutcome::Enrolled.feedback(), Outcome::Saved);
    /// assert_eq!(EnrollOutcome::Rejected(RejectReason::StoreFull).feedback(), Outcome::Decline);
    /// ```
    #[must_use]
    pub fn feedback(self) -> Outcome {
        match self {
            EnrollOutcome::Enrolled => Outcome::Saved,
            EnrollOutcome::Revoked => Outcome::Deleted,
            EnrollOutcome::Rejected(_) => Outcome::Decline,
        }
    }

    #[must_use]
    pub fn is_rejected(self) -> bool {
        matches!(self, EnrollOutcome::Rejected(_))
    }
}

/// Repository trait for enrolled credentials
///
/// This trait is the contract the access controller consults each tick:
/// membership lookup and the toggle enrollment path. [`CredentialStore`]
/// implements it over a nonvolatile region; tests may substitute their own.
///
/// [`CredentialStore`]: crate::CredentialStore
pub trait CredentialRepository<const W: usize> {
    /// Slot holding `credential`, if enrolled.
    fn lookup(&self, credential: &Credential<W>) -> StorageResult<Option<usize>>;

    /// Revoke `credential` if enrolled, otherwise enroll it if there is room.
    fn toggle_enroll(&mut self, credential: &Credential<W>) -> StorageResult<EnrollOutcome>;

    /// Number of live credentials.
    fn count(&self) -> usize;

    /// Maximum number of credentials.
    fn capacity(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.count() == 0
    }

    fn contains(&self, credential: &Credential<W>) -> StorageResult<bool> {
        Ok(self.lookup(credential)?.is_some())
    }
}
