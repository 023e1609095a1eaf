mod config;
mod rules;

pub use config::ScoringConfig;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::{
    MonsterId, RecipientRef, SecondaryReward, SecondaryRewards, SubmissionAttributes, TrainerId,
};
use super::secondary::SecondaryRewardProvider;

/// Snapshot of one recipient taken when the scoring request was assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientState {
    pub current_level: u32,
    pub owned_by_submitter: bool,
}

/// Immutable view of every recipient a submission names, resolved once by
/// the caller so scoring itself performs no I/O.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientSnapshot {
    entries: BTreeMap<RecipientRef, RecipientState>,
}

impl RecipientSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, recipient: RecipientRef, state: RecipientState) {
        self.entries.insert(recipient, state);
    }

    pub fn state(&self, recipient: &RecipientRef) -> Option<&RecipientState> {
        self.entries.get(recipient)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RecipientRef, &RecipientState)> {
        self.entries.iter()
    }
}

/// Malformed or unscoreable submission input. Rejected before any reward is
/// computed; never silently defaulted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAttributes {
    #[error("writing submission must name at least one participant")]
    NoParticipants,
    #[error("reference submission must include at least one entry")]
    NoReferenceEntries,
    #[error("custom level override must be positive")]
    ZeroCustomLevels,
    #[error("reference submission names {0} more than once")]
    DuplicateRecipient(RecipientRef),
    #[error("unknown trainer {0}")]
    UnknownTrainer(TrainerId),
    #[error("unknown monster {0}")]
    UnknownMonster(MonsterId),
    #[error("monster {monster} belongs to trainer {actual}, not {declared}")]
    MismatchedOwner {
        monster: MonsterId,
        declared: TrainerId,
        actual: TrainerId,
    },
    #[error("{0} was not resolved into the scoring snapshot")]
    UnscoredRecipient(RecipientRef),
}

/// How a recipient's coin share is derived once the cap has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinRule {
    /// Coins follow applied levels at a fixed rate.
    PerAppliedLevel(u32),
    /// Coins were fixed at scoring time (word shares, baseline payouts).
    Fixed(u32),
}

impl CoinRule {
    pub fn coins_for(&self, applied_levels: u32) -> u32 {
        match self {
            CoinRule::PerAppliedLevel(rate) => applied_levels * rate,
            CoinRule::Fixed(coins) => *coins,
        }
    }
}

/// Per-recipient score before cap enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityScore {
    pub levels: u32,
    pub coins: CoinRule,
}

/// Scorer output: the raw reward shape of one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct RawScore {
    pub overall_levels: u32,
    pub per_entity: BTreeMap<RecipientRef, EntityScore>,
    /// Preview coin total assuming no level is capped.
    pub coins: u32,
    /// Levels designated for the gift pool: shares earned by recipients the
    /// submitter does not own, NPC appearances, and external totals.
    pub gift_levels: u32,
    pub secondary: SecondaryRewards,
}

/// Stateless scorer applying the balance table to submission attributes.
pub struct ScoringEngine {
    config: ScoringConfig,
    secondary: Arc<dyn SecondaryRewardProvider>,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig, secondary: Arc<dyn SecondaryRewardProvider>) -> Self {
        Self { config, secondary }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score a submission against a pre-resolved recipient snapshot.
    ///
    /// Pure and total for well-formed input: no side effects, no I/O, and
    /// identical inputs always produce identical scores.
    pub fn score(
        &self,
        attrs: &SubmissionAttributes,
        snapshot: &RecipientSnapshot,
    ) -> Result<RawScore, InvalidAttributes> {
        let kind_score = match attrs {
            SubmissionAttributes::Art(art) => rules::score_art(art, snapshot, &self.config)?,
            SubmissionAttributes::ExternalArt(art) => {
                rules::score_external_art(art, &self.config)?
            }
            SubmissionAttributes::Writing(writing) => {
                rules::score_writing(writing, snapshot, &self.config)?
            }
            SubmissionAttributes::ExternalWriting(writing) => {
                rules::score_external_writing(writing, &self.config)?
            }
            SubmissionAttributes::Reference(reference) => {
                rules::score_reference(reference, snapshot, &self.config)?
            }
            SubmissionAttributes::Prompt(prompt) => rules::score_prompt(prompt, snapshot)?,
        };

        let secondary = self.secondary_rewards(kind_score.overall_levels, attrs.is_external());

        let coins = kind_score
            .entities
            .values()
            .map(|score| score.coins.coins_for(score.levels))
            .sum();

        Ok(RawScore {
            overall_levels: kind_score.overall_levels,
            per_entity: kind_score.entities,
            coins,
            gift_levels: kind_score.gift_levels,
            secondary,
        })
    }

    fn secondary_rewards(&self, overall_levels: u32, external: bool) -> SecondaryRewards {
        let normalize = |reward: SecondaryReward| {
            if external {
                SecondaryReward {
                    amount: reward.amount / self.config.external_secondary_divisor.max(1),
                    detail: reward.detail,
                }
            } else {
                reward
            }
        };

        SecondaryRewards {
            garden_points: normalize(self.secondary.garden_points(overall_levels).into()),
            mission_progress: normalize(self.secondary.mission_progress(overall_levels).into()),
            boss_damage: normalize(self.secondary.boss_damage(overall_levels).into()),
        }
    }
}
