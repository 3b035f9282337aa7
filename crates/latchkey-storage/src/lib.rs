//! Persistent credential store for the Latchkey access controller.
//!
//! Credentials live in a small nonvolatile region (an EEPROM on the device,
//! an image file in simulation) behind the
//! [`NonvolatileStore`](latchkey_hardware::NonvolatileStore) trait.
//!
//! # Architecture
//!
//! - [`layout`] - byte layout of the region, checked at compile time
//! - [`CredentialRepository`] - the lookup and toggle-enrollment contract the
//!   controller depends on
//! - [`CredentialStore`] - the write-through implementation over a region
//!
//! # Core Concepts
//!
//! ## Toggle Enrollment
//!
//! There is a single enrollment operation. Presenting an enrolled credential
//! revokes it, presenting an unknown one enrolls it, and presenting an
//! unknown one to a full store is rejected without touching the region.
//!
//! ## Contiguous Slots
//!
//! Live credentials always occupy slots `0..count`. Revocation moves the last
//! live credential into the vacated slot and clears the old last slot, so no
//! holes ever appear and lookups are a plain linear scan.
//!
//! # Examples
//!
//! ```
//! use latchkey_core::Credential;
//! use latchkey_hardware::MemoryNvs;
//! use latchkey_storage::{CredentialRepository, CredentialStore, EnrollOutcome, RejectReason};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = CredentialStore::<_, 2, 4>::initialize(MemoryNvs::new(1024), false)?;
//!
//! let a: Credential<4> = "01:02:03:04".parse()?;
//! let b: Credential<4> = "05:06:07:08".parse()?;
//! let c: Credential<4> = "09:0A:0B:0C".parse()?;
//!
//! store.toggle_enroll(&a)?;
//! store.toggle_enroll(&b)?;
//! assert_eq!(
//!     store.toggle_enroll(&c)?,
//!     EnrollOutcome::Rejected(RejectReason::StoreFull)
//! );
//! assert!(store.contains(&b)?);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod layout;
pub mod repository;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use layout::StoreLayout;
pub use repository::{CredentialRepository, EnrollOutcome, RejectReason};
pub use store::{CredentialStore, FormatReason, Initialization};
