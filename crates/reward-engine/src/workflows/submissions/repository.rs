use serde::{Deserialize, Serialize};

use super::domain::{MonsterId, RecipientRef, SubmissionId, TrainerId, UserId};

/// Stored trainer row; `level` is bounded to `[0, 100]` by the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerRecord {
    pub id: TrainerId,
    pub name: String,
    pub owner: UserId,
    pub level: u32,
}

/// Stored monster row; always owned through a trainer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterRecord {
    pub id: MonsterId,
    pub name: String,
    pub trainer_id: TrainerId,
    pub level: u32,
}

/// Storage abstraction over the recipients tables so the engine can be
/// exercised against in-memory doubles.
pub trait RecipientRepository: Send + Sync {
    fn trainer(&self, id: TrainerId) -> Result<Option<TrainerRecord>, RepositoryError>;
    fn monster(&self, id: MonsterId) -> Result<Option<MonsterRecord>, RepositoryError>;
    fn add_levels(&self, recipient: &RecipientRef, levels: u32) -> Result<(), RepositoryError>;
    fn credit_coins(&self, trainer: TrainerId, coins: u32) -> Result<(), RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Secondary progress produced by one finalized submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub submission: SubmissionId,
    pub user: UserId,
    pub garden_points: u32,
    pub mission_progress: u32,
    pub boss_damage: u32,
}

/// Outbound hook toward the garden/mission/boss subsystems; the engine only
/// hands them their share and never owns their logic.
pub trait ProgressSink: Send + Sync {
    fn record(&self, update: ProgressUpdate) -> Result<(), ProgressError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("progress transport unavailable: {0}")]
    Transport(String),
}
