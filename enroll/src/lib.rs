//! Voice enrollment and identification.
//!
//! A [`Registry`] ties a [`VoiceprintModel`](voxgate_voiceprint::VoiceprintModel)
//! to an [`EnrollmentStore`]:
//!
//! - [`Registry::enroll`] extracts an embedding and stores it under a user id,
//!   replacing any earlier one.
//! - [`Registry::identify`] extracts an embedding and scans every enrolled
//!   user for the most similar one, accepting it when the score reaches the
//!   threshold.
//!
//! # Stores
//!
//! | Store | Persistence | Notes |
//! |---|---|---|
//! | [`MemoryStore`] | none | tests and ephemeral use |
//! | [`FileStore`] | one `<user_id>.emb` file per user | atomic rename writes |
//! | [`RedbStore`] | single redb file | transactional writes |
//!
//! All stores enumerate users in ascending id order. Combined with the
//! strict-greater scan in [`best_match`], equal scores resolve to the
//! smallest user id.

mod codec;
mod error;
mod file;
mod matcher;
mod redb;
mod registry;
mod store;

pub use codec::{decode, encode};
pub use error::{EnrollError, FormatError, StoreError};
pub use file::FileStore;
pub use matcher::{Identification, NO_MATCH_SCORE, best_match, check_threshold};
pub use self::redb::RedbStore;
pub use registry::{Config, DEFAULT_THRESHOLD, Registry};
pub use store::{EnrollmentStore, MAX_USER_ID_LEN, MemoryStore, check_user_id};
