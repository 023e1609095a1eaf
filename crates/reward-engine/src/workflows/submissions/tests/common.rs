use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::workflows::submissions::domain::{
    AppearanceKind, ArtAttributes, ArtQuality, BackgroundKind, BackgroundSet, CharacterEntry,
    ComplexityTier, MonsterId, RecipientRef, SubmissionAttributes, SubmissionId, TrainerId,
    UserId, WritingAttributes,
};
use crate::workflows::submissions::repository::{
    MonsterRecord, ProgressError, ProgressSink, ProgressUpdate, RecipientRepository,
    RepositoryError, TrainerRecord,
};
use crate::workflows::submissions::reward_router;
use crate::workflows::submissions::scoring::ScoringConfig;
use crate::workflows::submissions::service::{RewardService, SubmissionContext};

pub(super) fn submitter() -> UserId {
    UserId("user-ash".to_string())
}

pub(super) fn rival() -> UserId {
    UserId("user-rival".to_string())
}

pub(super) fn ctx() -> SubmissionContext {
    SubmissionContext {
        submitter: submitter(),
    }
}

pub(super) fn submission_id(suffix: &str) -> SubmissionId {
    SubmissionId(format!("sub-{suffix}"))
}

pub(super) fn scoring_config() -> ScoringConfig {
    ScoringConfig::default()
}

/// In-memory recipients table. Stored levels clamp at the 100 bound of the
/// schema; every grant and coin credit is logged for assertions.
#[derive(Default)]
pub(super) struct MemoryRoster {
    trainers: Mutex<HashMap<TrainerId, TrainerRecord>>,
    monsters: Mutex<HashMap<MonsterId, MonsterRecord>>,
    level_grants: Mutex<Vec<(RecipientRef, u32)>>,
    coin_credits: Mutex<Vec<(TrainerId, u32)>>,
}

impl MemoryRoster {
    pub(super) fn insert_trainer(&self, id: i64, name: &str, owner: UserId, level: u32) {
        let mut guard = self.trainers.lock().expect("trainer mutex poisoned");
        guard.insert(
            TrainerId(id),
            TrainerRecord {
                id: TrainerId(id),
                name: name.to_string(),
                owner,
                level,
            },
        );
    }

    pub(super) fn insert_monster(&self, id: i64, name: &str, trainer_id: i64, level: u32) {
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

    pub(super) fn level_of(&self, recipient: &RecipientRef) -> u32 {
        match recipient {
            RecipientRef::Trainer { id } => self
                .trainers
                .lock()
                .expect("trainer mutex poisoned")
                .get(id)
                .map(|record| record.level)
                .unwrap_or(0),
            RecipientRef::Monster { id, .. } => self
                .monsters
                .lock()
                .expect("monster mutex poisoned")
                .get(id)
                .map(|record| record.level)
                .unwrap_or(0),
        }
    }

    pub(super) fn level_grants(&self) -> Vec<(RecipientRef, u32)> {
        self.level_grants
            .lock()
            .expect("grant mutex poisoned")
            .clone()
    }

    pub(super) fn coins_credited_to(&self, trainer: i64) -> u32 {
        self.coin_credits
            .lock()
            .expect("credit mutex poisoned")
            .iter()
            .filter(|(id, _)| *id == TrainerId(trainer))
            .map(|(_, coins)| coins)
            .sum()
    }
}

impl RecipientRepository for MemoryRoster {
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
        self.level_grants
            .lock()
            .expect("grant mutex poisoned")
            .push((recipient.clone(), levels));
        Ok(())
    }

    fn credit_coins(&self, trainer: TrainerId, coins: u32) -> Result<(), RepositoryError> {
        self.coin_credits
            .lock()
            .expect("credit mutex poisoned")
            .push((trainer, coins));
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryProgress {
    updates: Mutex<Vec<ProgressUpdate>>,
}

impl MemoryProgress {
    pub(super) fn updates(&self) -> Vec<ProgressUpdate> {
        self.updates.lock().expect("progress mutex poisoned").clone()
    }
}

impl ProgressSink for MemoryProgress {
    fn record(&self, update: ProgressUpdate) -> Result<(), ProgressError> {
        self.updates
            .lock()
            .expect("progress mutex poisoned")
            .push(update);
        Ok(())
    }
}

/// Roster shared by most scenarios: two accounts, one monster one level
/// short of nothing and one already brushing the cap.
pub(super) fn seeded_roster() -> Arc<MemoryRoster> {
    let roster = Arc::new(MemoryRoster::default());
    roster.insert_trainer(1, "Rowan", submitter(), 10);
    roster.insert_trainer(2, "Marnie", rival(), 20);
    roster.insert_monster(10, "Ember", 1, 12);
    roster.insert_monster(11, "Basalt", 1, 98);
    roster.insert_monster(20, "Gale", 2, 30);
    roster
}

pub(super) fn build_service() -> (
    Arc<RewardService<MemoryRoster, MemoryProgress>>,
    Arc<MemoryRoster>,
    Arc<MemoryProgress>,
) {
    let roster = seeded_roster();
    let progress = Arc::new(MemoryProgress::default());
    let service = Arc::new(RewardService::new(
        roster.clone(),
        progress.clone(),
        scoring_config(),
    ));
    (service, roster, progress)
}

pub(super) fn build_router() -> (
    axum::Router,
    Arc<MemoryRoster>,
    Arc<MemoryProgress>,
    Arc<RewardService<MemoryRoster, MemoryProgress>>,
) {
    let (service, roster, progress) = build_service();
    (reward_router(service.clone()), roster, progress, service)
}

/// Rendered piece with a simple background: overall 7 + 3 = 10; the trainer
/// earns 10 + 3 (full body) + 3 (presence) and the monster 10 + 2 + 3.
pub(super) fn art_attributes() -> SubmissionAttributes {
    SubmissionAttributes::Art(ArtAttributes {
        quality: ArtQuality::Rendered,
        backgrounds: BackgroundSet::from_kinds(&[BackgroundKind::Simple]),
        uniquely_difficult: false,
        characters: vec![
            CharacterEntry {
                recipient: RecipientRef::trainer(1),
                appearance: AppearanceKind::FullBody,
                complexity: None,
                custom_levels: None,
            },
            CharacterEntry {
                recipient: RecipientRef::monster(10, 1),
                appearance: AppearanceKind::HalfBody,
                complexity: Some(ComplexityTier::Average),
                custom_levels: None,
            },
        ],
        npcs: Vec::new(),
    })
}

/// Five requested levels against the level-98 monster: 2 apply, 3 overflow,
/// one redistributable unit.
pub(super) fn capped_art_attributes() -> SubmissionAttributes {
    SubmissionAttributes::Art(ArtAttributes {
        quality: ArtQuality::LineArt,
        backgrounds: BackgroundSet::none(),
        uniquely_difficult: false,
        characters: vec![CharacterEntry {
            recipient: RecipientRef::monster(11, 1),
            appearance: AppearanceKind::Bust,
            complexity: None,
            custom_levels: Some(5),
        }],
        npcs: Vec::new(),
    })
}

/// Piece starring the rival's trainer only; everything lands in the gift
/// pool.
pub(super) fn gift_art_attributes() -> SubmissionAttributes {
    SubmissionAttributes::Art(ArtAttributes {
        quality: ArtQuality::Rendered,
        backgrounds: BackgroundSet::from_kinds(&[BackgroundKind::Simple]),
        uniquely_difficult: false,
        characters: vec![CharacterEntry {
            recipient: RecipientRef::trainer(2),
            appearance: AppearanceKind::FullBody,
            complexity: None,
            custom_levels: None,
        }],
        npcs: Vec::new(),
    })
}

pub(super) fn writing_attributes(word_count: u32) -> SubmissionAttributes {
    SubmissionAttributes::Writing(WritingAttributes {
        word_count,
        participants: vec![RecipientRef::trainer(1), RecipientRef::monster(10, 1)],
        npcs: Vec::new(),
    })
}
