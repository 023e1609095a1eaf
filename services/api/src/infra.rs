use metrics_exporter_prometheus::PrometheusHandle;
use reward_engine::workflows::submissions::{
    MonsterId, MonsterRecord, ProgressError, ProgressSink, ProgressUpdate, RecipientRef,
    RecipientRepository, RepositoryError, ScoringConfig, TrainerId, TrainerRecord, UserId,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory recipients store. Levels clamp at the schema bound of 100;
/// coin balances accumulate per trainer.
#[derive(Default)]
pub(crate) struct InMemoryRoster {
    trainers: Mutex<HashMap<TrainerId, TrainerRecord>>,
    monsters: Mutex<HashMap<MonsterId, MonsterRecord>>,
    coin_balances: Mutex<HashMap<TrainerId, u64>>,
}

impl InMemoryRoster {
    pub(crate) fn insert_trainer(&self, id: i64, name: &str, owner: &str, level: u32) {
        let mut guard = self.trainers.lock().expect("trainer mutex poisoned");
        guard.insert(
            TrainerId(id),
            TrainerRecord {
                id: TrainerId(id),
                name: name.to_string(),
                owner: UserId(owner.to_string()),
                level,
            },
        );
    }

    pub(crate) fn insert_monster(&self, id: i64, name: &str, trainer_id: i64, level: u32) {
        let mut guard = self.monsters.lock().expect("monster mutex poisoned");
        guard.insert(
            MonsterId(id),
            MonsterRecord {
                id: MonsterId(id),
                name: name.to_string(),
                trainer_id: TrainerId(trainer_id),
                level,
            },
        );
    }

    pub(crate) fn level_of(&self, recipient: &RecipientRef) -> Option<u32> {
        match recipient {
            RecipientRef::Trainer { id } => self
                .trainers
                .lock()
                .expect("trainer mutex poisoned")
                .get(id)
                .map(|record| record.level),
            RecipientRef::Monster { id, .. } => self
                .monsters
                .lock()
                .expect("monster mutex poisoned")
                .get(id)
                .map(|record| record.level),
        }
    }

    pub(crate) fn coin_balance(&self, trainer: TrainerId) -> u64 {
        self.coin_balances
            .lock()
            .expect("coin mutex poisoned")
            .get(&trainer)
            .copied()
            .unwrap_or(0)
    }
}

impl RecipientRepository for InMemoryRoster {
    fn trainer(&self, id: TrainerId) -> Result<Option<TrainerRecord>, RepositoryError> {
        let guard = self.trainers.lock().expect("trainer mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn monster(&self, id: MonsterId) -> Result<Option<MonsterRecord>, RepositoryError> {
        let guard = self.monsters.lock().expect("monster mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn add_levels(&self, recipient: &RecipientRef, levels: u32) -> Result<(), RepositoryError> {
        match recipient {
            RecipientRef::Trainer { id } => {
                let mut guard = self.trainers.lock().expect("trainer mutex poisoned");
                let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
                record.level = (record.level + levels).min(100);
            }
            RecipientRef::Monster { id, .. } => {
                let mut guard = self.monsters.lock().expect("monster mutex poisoned");
                let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
                record.level = (record.level + levels).min(100);
            }
        }
        Ok(())
    }

    fn credit_coins(&self, trainer: TrainerId, coins: u32) -> Result<(), RepositoryError> {
        let mut guard = self.coin_balances.lock().expect("coin mutex poisoned");
        *guard.entry(trainer).or_insert(0) += u64::from(coins);
        Ok(())
    }
}

/// Progress sink that forwards garden/mission/boss shares to the log.
#[derive(Default)]
pub(crate) struct LoggingProgressSink {
    updates: Mutex<Vec<ProgressUpdate>>,
}

impl LoggingProgressSink {
    pub(crate) fn updates(&self) -> Vec<ProgressUpdate> {
        self.updates.lock().expect("progress mutex poisoned").clone()
    }
}

impl ProgressSink for LoggingProgressSink {
    fn record(&self, update: ProgressUpdate) -> Result<(), ProgressError> {
        tracing::info!(
            submission = %update.submission,
            garden_points = update.garden_points,
            mission_progress = update.mission_progress,
            boss_damage = update.boss_damage,
            "recorded secondary progress"
        );
        self.updates
            .lock()
            .expect("progress mutex poisoned")
            .push(update);
        Ok(())
    }
}

pub(crate) fn default_scoring_config() -> ScoringConfig {
    ScoringConfig::default()
}

/// Sample roster used by the serve and demo commands.
pub(crate) fn seed_roster(roster: &InMemoryRoster) {
    roster.insert_trainer(1, "Rowan", "user-ash", 10);
    roster.insert_trainer(2, "Marnie", "user-rival", 20);
    roster.insert_monster(10, "Ember", 1, 12);
    roster.insert_monster(11, "Basalt", 1, 98);
    roster.insert_monster(20, "Gale", 2, 30);
}
