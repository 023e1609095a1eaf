use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Identifier wrapper for site accounts that submit creative work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrainerId(pub i64);

impl fmt::Display for TrainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonsterId(pub i64);

impl fmt::Display for MonsterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Entity eligible to receive levels and coins.
///
/// Identity is the `(kind, id)` pair; the owning trainer carried by a monster
/// reference is context for eligibility checks, not part of equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RecipientRef {
    Trainer { id: TrainerId },
    Monster { id: MonsterId, trainer_id: TrainerId },
}

impl RecipientRef {
    pub fn trainer(id: i64) -> Self {
        Self::Trainer { id: TrainerId(id) }
    }

    pub fn monster(id: i64, trainer_id: i64) -> Self {
        Self::Monster {
            id: MonsterId(id),
            trainer_id: TrainerId(trainer_id),
        }
    }

    fn identity(&self) -> (u8, i64) {
        match self {
            RecipientRef::Trainer { id } => (0, id.0),
            RecipientRef::Monster { id, .. } => (1, id.0),
        }
    }

    pub const fn kind_label(&self) -> &'static str {
        match self {
            RecipientRef::Trainer { .. } => "trainer",
            RecipientRef::Monster { .. } => "monster",
        }
    }
}

impl PartialEq for RecipientRef {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for RecipientRef {}

impl PartialOrd for RecipientRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RecipientRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}

impl Hash for RecipientRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Display for RecipientRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipientRef::Trainer { id } => write!(f, "trainer {id}"),
            RecipientRef::Monster { id, .. } => write!(f, "monster {id}"),
        }
    }
}

/// Finish quality tiers for art submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArtQuality {
    Sketch,
    SketchSet,
    LineArt,
    FlatColor,
    Rendered,
    Polished,
}

impl ArtQuality {
    pub const fn base_levels(self) -> u32 {
        match self {
            ArtQuality::Sketch => 2,
            ArtQuality::SketchSet => 3,
            ArtQuality::LineArt => 4,
            ArtQuality::FlatColor => 5,
            ArtQuality::Rendered => 7,
            ArtQuality::Polished => 9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BackgroundKind {
    None,
    Simple,
    Complex,
}

impl BackgroundKind {
    pub const fn bonus_levels(self) -> u32 {
        match self {
            BackgroundKind::None => 0,
            BackgroundKind::Simple => 3,
            BackgroundKind::Complex => 6,
        }
    }
}

/// Ordered background list edited by wholesale replacement.
///
/// A `none` entry stands in for "no backgrounds" and never coexists with real
/// entries: adding a background drops it, and removing the last background
/// restores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackgroundSet(Vec<BackgroundKind>);

impl BackgroundSet {
    pub fn none() -> Self {
        Self(vec![BackgroundKind::None])
    }

    pub fn from_kinds(kinds: &[BackgroundKind]) -> Self {
        kinds
            .iter()
            .fold(Self::none(), |set, kind| set.add(*kind))
    }

    pub fn add(&self, kind: BackgroundKind) -> Self {
        if kind == BackgroundKind::None {
            return self.clone();
        }
        let mut entries: Vec<BackgroundKind> = self
            .0
            .iter()
            .copied()
            .filter(|entry| *entry != BackgroundKind::None)
            .collect();
        entries.push(kind);
        Self(entries)
    }

    pub fn remove(&self, index: usize) -> Self {
        let mut entries = self.0.clone();
        if index < entries.len() {
            entries.remove(index);
        }
        entries.retain(|entry| *entry != BackgroundKind::None);
        if entries.is_empty() {
            entries.push(BackgroundKind::None);
        }
        Self(entries)
    }

    pub fn entries(&self) -> &[BackgroundKind] {
        &self.0
    }

    pub fn bonus_levels(&self) -> u32 {
        self.0.iter().map(|entry| entry.bonus_levels()).sum()
    }
}

impl Default for BackgroundSet {
    fn default() -> Self {
        Self::none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AppearanceKind {
    Bust,
    HalfBody,
    FullBody,
}

impl AppearanceKind {
    pub const fn bonus_levels(self) -> u32 {
        match self {
            AppearanceKind::Bust => 1,
            AppearanceKind::HalfBody => 2,
            AppearanceKind::FullBody => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComplexityTier {
    Simple,
    Average,
    Complex,
    Extravagant,
}

impl ComplexityTier {
    pub const fn bonus_levels(self) -> u32 {
        match self {
            ComplexityTier::Simple => 1,
            ComplexityTier::Average => 3,
            ComplexityTier::Complex => 5,
            ComplexityTier::Extravagant => 7,
        }
    }
}

/// One drawn appearance of a tracked trainer or monster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterEntry {
    pub recipient: RecipientRef,
    pub appearance: AppearanceKind,
    #[serde(default)]
    pub complexity: Option<ComplexityTier>,
    #[serde(default)]
    pub custom_levels: Option<u32>,
}

/// Character in an externally hosted piece; not linked to a tracked entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalCharacter {
    pub name: String,
    pub appearance: AppearanceKind,
    pub complexity: ComplexityTier,
}

/// NPC appearance; NPC levels always land in the gift pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcAppearance {
    pub name: String,
    pub levels: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtAttributes {
    pub quality: ArtQuality,
    #[serde(default)]
    pub backgrounds: BackgroundSet,
    #[serde(default)]
    pub uniquely_difficult: bool,
    #[serde(default)]
    pub characters: Vec<CharacterEntry>,
    #[serde(default)]
    pub npcs: Vec<NpcAppearance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalArtAttributes {
    pub quality: ArtQuality,
    #[serde(default)]
    pub backgrounds: BackgroundSet,
    #[serde(default)]
    pub characters: Vec<ExternalCharacter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WritingAttributes {
    pub word_count: u32,
    #[serde(default)]
    pub participants: Vec<RecipientRef>,
    #[serde(default)]
    pub npcs: Vec<NpcAppearance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalWritingAttributes {
    pub word_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub recipient: RecipientRef,
    #[serde(default)]
    pub custom_levels: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceAttributes {
    pub entries: Vec<ReferenceEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptBonus {
    pub quality_threshold: u32,
    #[serde(default)]
    pub bonus_levels: u32,
    #[serde(default)]
    pub bonus_coins: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptAttributes {
    pub recipient: RecipientRef,
    pub levels: u32,
    pub coins: u32,
    #[serde(default)]
    pub quality: Option<u32>,
    #[serde(default)]
    pub bonus: Option<PromptBonus>,
}

/// Declared attributes of one creative submission; immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SubmissionAttributes {
    Art(ArtAttributes),
    ExternalArt(ExternalArtAttributes),
    Writing(WritingAttributes),
    ExternalWriting(ExternalWritingAttributes),
    Reference(ReferenceAttributes),
    Prompt(PromptAttributes),
}

impl SubmissionAttributes {
    pub const fn kind(&self) -> SubmissionKind {
        match self {
            SubmissionAttributes::Art(_) => SubmissionKind::Art,
            SubmissionAttributes::ExternalArt(_) => SubmissionKind::ExternalArt,
            SubmissionAttributes::Writing(_) => SubmissionKind::Writing,
            SubmissionAttributes::ExternalWriting(_) => SubmissionKind::ExternalWriting,
            SubmissionAttributes::Reference(_) => SubmissionKind::Reference,
            SubmissionAttributes::Prompt(_) => SubmissionKind::Prompt,
        }
    }

    pub const fn is_external(&self) -> bool {
        matches!(
            self,
            SubmissionAttributes::ExternalArt(_) | SubmissionAttributes::ExternalWriting(_)
        )
    }

    /// Tracked recipients named by the submission, in declaration order.
    pub fn recipients(&self) -> Vec<RecipientRef> {
        match self {
            SubmissionAttributes::Art(art) => art
                .characters
                .iter()
                .map(|character| character.recipient.clone())
                .collect(),
            SubmissionAttributes::ExternalArt(_) | SubmissionAttributes::ExternalWriting(_) => {
                Vec::new()
            }
            SubmissionAttributes::Writing(writing) => writing.participants.clone(),
            SubmissionAttributes::Reference(reference) => reference
                .entries
                .iter()
                .map(|entry| entry.recipient.clone())
                .collect(),
            SubmissionAttributes::Prompt(prompt) => vec![prompt.recipient.clone()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubmissionKind {
    Art,
    ExternalArt,
    Writing,
    ExternalWriting,
    Reference,
    Prompt,
}

impl SubmissionKind {
    pub const fn label(self) -> &'static str {
        match self {
            SubmissionKind::Art => "art",
            SubmissionKind::ExternalArt => "externalArt",
            SubmissionKind::Writing => "writing",
            SubmissionKind::ExternalWriting => "externalWriting",
            SubmissionKind::Reference => "reference",
            SubmissionKind::Prompt => "prompt",
        }
    }
}

/// Extra context attached to a secondary reward by its producing subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryDetail {
    pub message: String,
}

/// Normalized secondary reward value; providers may hand back a bare amount
/// or an amount with commentary, and both collapse into this shape at the
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryReward {
    pub amount: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<SecondaryDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryRewards {
    pub garden_points: SecondaryReward,
    pub mission_progress: SecondaryReward,
    pub boss_damage: SecondaryReward,
}

/// Per-recipient slice of a computed reward bundle.
///
/// `levels_applied + excess_levels == levels_requested` always; the applied
/// share is what the persistence collaborator commits to the recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardLine {
    pub recipient: RecipientRef,
    pub levels_requested: u32,
    pub levels_applied: u32,
    pub excess_levels: u32,
    pub coins: u32,
}

/// Full result of scoring one submission. Recomputed freely before
/// finalization; durable only once the submission is finalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardBundle {
    pub kind: SubmissionKind,
    pub overall_levels: u32,
    pub lines: Vec<RewardLine>,
    pub total_coins: u32,
    pub redistributable_pool: u32,
    pub gift_pool: u32,
    pub secondary: SecondaryRewards,
}
