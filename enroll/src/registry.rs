use std::sync::Arc;

use voxgate_voiceprint::{Embedding, Pcm16, VoiceprintModel};

use crate::error::EnrollError;
use crate::matcher::{Identification, best_match, check_threshold};
use crate::store::{EnrollmentStore, MemoryStore, check_user_id};

/// Default acceptance threshold for [`Registry::identify`].
pub const DEFAULT_THRESHOLD: f32 = 0.75;

/// Registry configuration.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Minimum similarity for a match, in `[-1, 1]` (default: 0.75).
    pub threshold: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Enrolls users by voice and identifies speakers against them.
///
/// The registry owns no global state: the extractor and the store are
/// handed in at construction. It is `Send + Sync` and can be shared
/// across threads behind an `Arc`.
///
/// # Example
///
/// ```ignore
/// let registry = Registry::new(Config::default(), model, Box::new(store))?;
/// registry.enroll("alice", &enrollment_audio)?;
///
/// let result = registry.identify(&login_audio)?;
/// if result.matched {
///     println!("welcome back, {}", result.user_id.unwrap());
/// }
/// ```
pub struct Registry {
    cfg: Config,
    model: Arc<dyn VoiceprintModel>,
    store: Box<dyn EnrollmentStore>,
}

impl Registry {
    /// Creates a registry. Fails if the configured threshold is outside
    /// `[-1, 1]`.
    pub fn new(
        cfg: Config,
        model: Arc<dyn VoiceprintModel>,
        store: Box<dyn EnrollmentStore>,
    ) -> Result<Self, EnrollError> {
        check_threshold(cfg.threshold)?;
        Ok(Self { cfg, model, store })
    }

    /// Creates a registry with default config and an in-memory store.
    pub fn with_memory_store(model: Arc<dyn VoiceprintModel>) -> Self {
        Self {
            cfg: Config::default(),
            model,
            store: Box::new(MemoryStore::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Extracts an embedding from `audio` and stores it under `user_id`,
    /// replacing any earlier enrollment. Returns the stored embedding.
    pub fn enroll(&self, user_id: &str, audio: &Pcm16) -> Result<Embedding, EnrollError> {
        validate_user_id(user_id)?;
        let embedding = self.model.extract(audio)?;
        self.enroll_embedding(user_id, embedding)
    }

    /// Stores an already extracted embedding under `user_id`.
    ///
    /// The embedding must have the model's dimension.
    pub fn enroll_embedding(
        &self,
        user_id: &str,
        embedding: Embedding,
    ) -> Result<Embedding, EnrollError> {
        validate_user_id(user_id)?;
        let expected = self.model.dimension();
        if embedding.dim() != expected {
            return Err(EnrollError::DimensionMismatch {
                user_id: user_id.to_string(),
                expected,
                got: embedding.dim(),
            });
        }

        self.store.put(user_id, &embedding)?;
        tracing::debug!(user_id, dim = embedding.dim(), "enroll: stored embedding");
        Ok(embedding)
    }

    /// Identifies the speaker of `audio` using the configured threshold.
    pub fn identify(&self, audio: &Pcm16) -> Result<Identification, EnrollError> {
        self.identify_with_threshold(audio, self.cfg.threshold)
    }

    /// Identifies the speaker of `audio` against every enrolled user.
    ///
    /// A rejection is not an error: it returns `matched == false` with the
    /// best score found.
    pub fn identify_with_threshold(
        &self,
        audio: &Pcm16,
        threshold: f32,
    ) -> Result<Identification, EnrollError> {
        check_threshold(threshold)?;
        let embedding = self.model.extract(audio)?;
        self.identify_embedding(&embedding, threshold)
    }

    /// Matches an already extracted embedding against every enrolled user.
    pub fn identify_embedding(
        &self,
        embedding: &Embedding,
        threshold: f32,
    ) -> Result<Identification, EnrollError> {
        let records = self.store.all()?;
        let result = best_match(
            embedding,
            records.iter().map(|(k, v)| (k.as_str(), v)),
            threshold,
        )?;

        tracing::debug!(
            candidates = records.len(),
            best = ?result.candidate,
            score = result.score,
            threshold,
            matched = result.matched,
            "enroll: identification"
        );
        Ok(result)
    }

    /// Returns the enrolled user ids in ascending order.
    pub fn users(&self) -> Result<Vec<String>, EnrollError> {
        Ok(self.store.all()?.into_iter().map(|(k, _)| k).collect())
    }
}

fn validate_user_id(user_id: &str) -> Result<(), EnrollError> {
    check_user_id(user_id).map_err(|reason| EnrollError::InvalidUserId {
        user_id: user_id.to_string(),
        reason,
    })
}
