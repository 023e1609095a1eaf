use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::cap::CapPolicy;
use super::domain::{
    RecipientRef, RewardBundle, RewardLine, SubmissionAttributes, SubmissionId, UserId,
};
use super::ledger::{
    AllocationLedger, AllocationRecord, LedgerError, PoolId, PoolKind, PoolSnapshot,
};
use super::repository::{
    ProgressError, ProgressSink, ProgressUpdate, RecipientRepository, RepositoryError,
};
use super::scoring::{
    InvalidAttributes, RecipientSnapshot, RecipientState, ScoringConfig, ScoringEngine,
};
use super::secondary::{FixedRateSecondary, SecondaryRewardProvider};

/// Per-call submitter context; passed explicitly so the engine never reads
/// ambient session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionContext {
    pub submitter: UserId,
}

/// Handle returned for each pool opened during finalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolOpening {
    pub pool_id: PoolId,
    pub kind: PoolKind,
    pub total_units: u32,
    pub remaining: u32,
    pub coin_per_unit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeOutcome {
    pub submission_id: SubmissionId,
    pub pools: Vec<PoolOpening>,
}

/// Error raised by the reward service facade.
#[derive(Debug, thiserror::Error)]
pub enum RewardServiceError {
    #[error(transparent)]
    Invalid(#[from] InvalidAttributes),
    #[error("finalize rejected: {0}")]
    InvalidBundle(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

/// Facade composing the scorer, cap policy, ledger, and the persistence
/// collaborators behind one calculate/finalize/allocate surface.
pub struct RewardService<R, P> {
    engine: ScoringEngine,
    cap: CapPolicy,
    repository: Arc<R>,
    progress: Arc<P>,
    ledger: AllocationLedger,
}

impl<R, P> RewardService<R, P>
where
    R: RecipientRepository + 'static,
    P: ProgressSink + 'static,
{
    pub fn new(repository: Arc<R>, progress: Arc<P>, config: ScoringConfig) -> Self {
        Self::with_secondary(
            repository,
            progress,
            config,
            Arc::new(FixedRateSecondary::default()),
        )
    }

    pub fn with_secondary(
        repository: Arc<R>,
        progress: Arc<P>,
        config: ScoringConfig,
        secondary: Arc<dyn SecondaryRewardProvider>,
    ) -> Self {
        Self {
            engine: ScoringEngine::new(config, secondary),
            cap: CapPolicy::default(),
            repository,
            progress,
            ledger: AllocationLedger::new(),
        }
    }

    pub fn scoring_config(&self) -> &ScoringConfig {
        self.engine.config()
    }

    pub fn cap_policy(&self) -> &CapPolicy {
        &self.cap
    }

    /// Compute a reward preview. Performs no writes; calling it repeatedly
    /// with identical attributes and recipient state yields identical
    /// bundles.
    pub fn calculate(
        &self,
        ctx: &SubmissionContext,
        attrs: &SubmissionAttributes,
    ) -> Result<RewardBundle, RewardServiceError> {
        let snapshot = self.snapshot_for(&ctx.submitter, attrs)?;
        let raw = self.engine.score(attrs, &snapshot)?;

        let mut lines = Vec::new();
        let mut redistributable_pool = 0;

        for (recipient, score) in &raw.per_entity {
            let current_level = snapshot
                .state(recipient)
                .map(|state| state.current_level)
                .unwrap_or(0);

            let outcome = self.cap.apply(current_level, score.levels);
            let coins = score.coins.coins_for(outcome.levels_applied);

            if score.levels == 0 && coins == 0 {
                continue;
            }

            redistributable_pool += self.cap.redistributable_units(outcome.excess_levels);
            lines.push(RewardLine {
                recipient: recipient.clone(),
                levels_requested: score.levels,
                levels_applied: outcome.levels_applied,
                excess_levels: outcome.excess_levels,
                coins,
            });
        }

        let total_coins = lines.iter().map(|line| line.coins).sum();

        Ok(RewardBundle {
            kind: attrs.kind(),
            overall_levels: raw.overall_levels,
            lines,
            total_coins,
            redistributable_pool,
            gift_pool: raw.gift_levels,
            secondary: raw.secondary,
        })
    }

    /// Make an accepted bundle durable: commit per-entity grants, emit
    /// secondary progress, and lazily open at most one pool per kind with a
    /// nonzero budget.
    pub fn finalize(
        &self,
        ctx: &SubmissionContext,
        submission_id: SubmissionId,
        bundle: &RewardBundle,
    ) -> Result<FinalizeOutcome, RewardServiceError> {
        self.validate_bundle(bundle)?;

        for line in &bundle.lines {
            if line.levels_applied > 0 {
                self.repository
                    .add_levels(&line.recipient, line.levels_applied)?;
            }
            if line.coins > 0 {
                self.repository
                    .credit_coins(trainer_of(&line.recipient), line.coins)?;
            }
        }

        self.progress.record(ProgressUpdate {
            submission: submission_id.clone(),
            user: ctx.submitter.clone(),
            garden_points: bundle.secondary.garden_points.amount,
            mission_progress: bundle.secondary.mission_progress.amount,
            boss_damage: bundle.secondary.boss_damage.amount,
        })?;

        let mut pools = Vec::new();
        if bundle.gift_pool > 0 {
            let pool = self.ledger.open_pool(
                PoolKind::Gift,
                bundle.gift_pool,
                self.engine.config().coins_per_level,
                submission_id.clone(),
                ctx.submitter.clone(),
            )?;
            pools.push(opening_of(pool));
        }
        if bundle.redistributable_pool > 0 {
            let pool = self.ledger.open_pool(
                PoolKind::Capped,
                bundle.redistributable_pool,
                0,
                submission_id.clone(),
                ctx.submitter.clone(),
            )?;
            pools.push(opening_of(pool));
        }

        Ok(FinalizeOutcome {
            submission_id,
            pools,
        })
    }

    /// Spend pool units on one recipient; levels and derived coins are
    /// committed only after the ledger accepts the draw.
    pub fn allocate(
        &self,
        pool_id: &PoolId,
        recipient: RecipientRef,
        units: u32,
    ) -> Result<AllocationRecord, RewardServiceError> {
        let owner = self.owner_of(&recipient)?;
        let record = self
            .ledger
            .allocate(pool_id, recipient, units, owner.as_ref())?;

        self.repository
            .add_levels(&record.recipient, record.units)?;
        if record.coins_awarded > 0 {
            self.repository
                .credit_coins(trainer_of(&record.recipient), record.coins_awarded)?;
        }

        Ok(record)
    }

    pub fn pool_status(&self, pool_id: &PoolId) -> Result<PoolSnapshot, RewardServiceError> {
        Ok(self.ledger.snapshot(pool_id)?)
    }

    pub fn close_pool(&self, pool_id: &PoolId) -> Result<PoolSnapshot, RewardServiceError> {
        Ok(self.ledger.close(pool_id)?)
    }

    /// Resolve a wire-level recipient reference against the repository.
    pub fn resolve_recipient(
        &self,
        kind: RecipientKind,
        id: i64,
    ) -> Result<RecipientRef, RewardServiceError> {
        match kind {
            RecipientKind::Trainer => {
                let trainer = self
                    .repository
                    .trainer(super::domain::TrainerId(id))?
                    .ok_or(InvalidAttributes::UnknownTrainer(super::domain::TrainerId(
                        id,
                    )))?;
                Ok(RecipientRef::Trainer { id: trainer.id })
            }
            RecipientKind::Monster => {
                let monster = self
                    .repository
                    .monster(super::domain::MonsterId(id))?
                    .ok_or(InvalidAttributes::UnknownMonster(super::domain::MonsterId(
                        id,
                    )))?;
                Ok(RecipientRef::Monster {
                    id: monster.id,
                    trainer_id: monster.trainer_id,
                })
            }
        }
    }

    fn snapshot_for(
        &self,
        submitter: &UserId,
        attrs: &SubmissionAttributes,
    ) -> Result<RecipientSnapshot, RewardServiceError> {
        let mut snapshot = RecipientSnapshot::new();

        for recipient in attrs.recipients() {
            let state = match &recipient {
                RecipientRef::Trainer { id } => {
                    let trainer = self
                        .repository
                        .trainer(*id)?
                        .ok_or(InvalidAttributes::UnknownTrainer(*id))?;
                    RecipientState {
                        current_level: trainer.level,
                        owned_by_submitter: trainer.owner == *submitter,
                    }
                }
                RecipientRef::Monster { id, trainer_id } => {
                    let monster = self
                        .repository
                        .monster(*id)?
                        .ok_or(InvalidAttributes::UnknownMonster(*id))?;
                    if monster.trainer_id != *trainer_id {
                        return Err(InvalidAttributes::MismatchedOwner {
                            monster: *id,
                            declared: *trainer_id,
                            actual: monster.trainer_id,
                        }
                        .into());
                    }
                    let trainer = self
                        .repository
                        .trainer(monster.trainer_id)?
                        .ok_or(InvalidAttributes::UnknownTrainer(monster.trainer_id))?;
                    RecipientState {
                        current_level: monster.level,
                        owned_by_submitter: trainer.owner == *submitter,
                    }
                }
            };
            snapshot.insert(recipient, state);
        }

        Ok(snapshot)
    }

    fn owner_of(&self, recipient: &RecipientRef) -> Result<Option<UserId>, RewardServiceError> {
        let trainer_id = match recipient {
            RecipientRef::Trainer { id } => *id,
            RecipientRef::Monster { id, .. } => {
                let monster = self
                    .repository
                    .monster(*id)?
                    .ok_or(InvalidAttributes::UnknownMonster(*id))?;
                monster.trainer_id
            }
        };

        Ok(self
            .repository
            .trainer(trainer_id)?
            .map(|trainer| trainer.owner))
    }

    fn validate_bundle(&self, bundle: &RewardBundle) -> Result<(), RewardServiceError> {
        let mut expected_pool = 0;
        for line in &bundle.lines {
            if line.levels_applied + line.excess_levels != line.levels_requested {
                return Err(RewardServiceError::InvalidBundle(format!(
                    "line for {} does not balance: {} applied + {} excess != {} requested",
                    line.recipient, line.levels_applied, line.excess_levels, line.levels_requested
                )));
            }
            expected_pool += self.cap.redistributable_units(line.excess_levels);
        }

        if bundle.redistributable_pool != expected_pool {
            return Err(RewardServiceError::InvalidBundle(format!(
                "redistributable pool {} does not match the per-line excess total {}",
                bundle.redistributable_pool, expected_pool
            )));
        }

        Ok(())
    }
}

/// Recipient kind as it arrives on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecipientKind {
    Trainer,
    Monster,
}

fn trainer_of(recipient: &RecipientRef) -> super::domain::TrainerId {
    match recipient {
        RecipientRef::Trainer { id } => *id,
        RecipientRef::Monster { trainer_id, .. } => *trainer_id,
    }
}

fn opening_of(pool: super::ledger::AllocationPool) -> PoolOpening {
    PoolOpening {
        remaining: pool.total_units,
        pool_id: pool.pool_id,
        kind: pool.kind,
        total_units: pool.total_units,
        coin_per_unit: pool.coin_per_unit,
    }
}
