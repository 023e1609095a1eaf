//! Reward computation and level allocation for creative submissions.
//!
//! Scoring and cap enforcement are pure; the allocation ledger is the only
//! stateful piece and guards every pool with conservation and eligibility
//! invariants. Persistence and the secondary-reward subsystems sit behind
//! traits so the whole workflow runs against in-memory doubles in tests.

pub mod cap;
pub mod domain;
pub mod ledger;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod secondary;
pub mod service;

#[cfg(test)]
mod tests;

pub use cap::{CapOutcome, CapPolicy};
pub use domain::{
    AppearanceKind, ArtAttributes, ArtQuality, BackgroundKind, BackgroundSet, CharacterEntry,
    ComplexityTier, ExternalArtAttributes, ExternalCharacter, ExternalWritingAttributes,
    MonsterId, NpcAppearance, PromptAttributes, PromptBonus, RecipientRef, ReferenceAttributes,
    ReferenceEntry, RewardBundle, RewardLine, SecondaryDetail, SecondaryReward, SecondaryRewards,
    SubmissionAttributes, SubmissionId, SubmissionKind, TrainerId, UserId, WritingAttributes,
};
pub use ledger::{
    AllocationLedger, AllocationPool, AllocationRecord, LedgerError, PoolId, PoolKind,
    PoolSnapshot, PoolStatus,
};
pub use repository::{
    MonsterRecord, ProgressError, ProgressSink, ProgressUpdate, RecipientRepository,
    RepositoryError, TrainerRecord,
};
pub use router::reward_router;
pub use scoring::{
    InvalidAttributes, RawScore, RecipientSnapshot, RecipientState, ScoringConfig, ScoringEngine,
};
pub use secondary::{FixedRateSecondary, SecondaryRewardProvider, SecondaryValue};
pub use service::{
    FinalizeOutcome, PoolOpening, RecipientKind, RewardService, RewardServiceError,
    SubmissionContext,
};
