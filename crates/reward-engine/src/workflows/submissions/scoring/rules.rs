use std::collections::BTreeMap;

use super::super::domain::{
    ArtAttributes, ExternalArtAttributes, ExternalWritingAttributes, PromptAttributes,
    RecipientRef, ReferenceAttributes, WritingAttributes,
};
use super::config::ScoringConfig;
use super::{CoinRule, EntityScore, InvalidAttributes, RecipientSnapshot};

/// Raw per-kind outcome before secondary rewards are merged in.
pub(crate) struct KindScore {
    pub overall_levels: u32,
    pub entities: BTreeMap<RecipientRef, EntityScore>,
    pub gift_levels: u32,
}

fn merge_entity(
    entities: &mut BTreeMap<RecipientRef, EntityScore>,
    recipient: RecipientRef,
    levels: u32,
    coins: CoinRule,
) {
    entities
        .entry(recipient)
        .and_modify(|score| {
            score.levels += levels;
            if let (CoinRule::Fixed(total), CoinRule::Fixed(extra)) = (&mut score.coins, &coins) {
                *total += extra;
            }
        })
        .or_insert(EntityScore { levels, coins });
}

fn custom_override(custom_levels: Option<u32>) -> Result<Option<u32>, InvalidAttributes> {
    match custom_levels {
        Some(0) => Err(InvalidAttributes::ZeroCustomLevels),
        other => Ok(other),
    }
}

pub(crate) fn score_art(
    attrs: &ArtAttributes,
    snapshot: &RecipientSnapshot,
    config: &ScoringConfig,
) -> Result<KindScore, InvalidAttributes> {
    let difficulty_bonus = if attrs.uniquely_difficult {
        config.uniquely_difficult_bonus
    } else {
        0
    };
    let overall_levels =
        attrs.quality.base_levels() + attrs.backgrounds.bonus_levels() + difficulty_bonus;

    let mut entities = BTreeMap::new();
    let mut gift_levels = 0;

    for character in &attrs.characters {
        let state = snapshot
            .state(&character.recipient)
            .ok_or_else(|| InvalidAttributes::UnscoredRecipient(character.recipient.clone()))?;

        let levels = match custom_override(character.custom_levels)? {
            Some(custom) => custom,
            None => {
                let presence_bonus = match &character.recipient {
                    RecipientRef::Trainer { .. } => config.trainer_presence_bonus,
                    RecipientRef::Monster { .. } => character
                        .complexity
                        .map(|tier| tier.bonus_levels())
                        .unwrap_or(0),
                };
                overall_levels + character.appearance.bonus_levels() + presence_bonus
            }
        };

        if state.owned_by_submitter {
            merge_entity(
                &mut entities,
                character.recipient.clone(),
                levels,
                CoinRule::PerAppliedLevel(config.coins_per_level),
            );
        } else {
            gift_levels += levels;
        }
    }

    for npc in &attrs.npcs {
        gift_levels += npc.levels;
    }

    Ok(KindScore {
        overall_levels,
        entities,
        gift_levels,
    })
}

pub(crate) fn score_external_art(
    attrs: &ExternalArtAttributes,
    config: &ScoringConfig,
) -> Result<KindScore, InvalidAttributes> {
    let character_levels: u32 = attrs
        .characters
        .iter()
        .map(|character| {
            character.appearance.bonus_levels() + character.complexity.bonus_levels()
        })
        .sum();

    let summed = attrs.quality.base_levels() + attrs.backgrounds.bonus_levels() + character_levels;
    // Reduced-trust weighting: one floor halving over the summed total.
    let overall_levels = summed / config.external_level_divisor;

    Ok(KindScore {
        overall_levels,
        entities: BTreeMap::new(),
        gift_levels: overall_levels,
    })
}

pub(crate) fn score_writing(
    attrs: &WritingAttributes,
    snapshot: &RecipientSnapshot,
    config: &ScoringConfig,
) -> Result<KindScore, InvalidAttributes> {
    let participant_count = attrs.participants.len() + attrs.npcs.len();
    if participant_count == 0 {
        return Err(InvalidAttributes::NoParticipants);
    }
    let participant_count = participant_count as u32;

    let total_levels = attrs.word_count / config.words_per_level;
    let total_coins = attrs.word_count / config.words_per_coin.max(1);

    let levels_each = total_levels / participant_count;
    let coins_each = total_coins / participant_count;
    let remainder_levels = total_levels % participant_count;
    let remainder_coins = total_coins % participant_count;

    // Earlier participants absorb the remainders, in declaration order.
    let share = |index: u32| {
        let levels = levels_each + u32::from(index < remainder_levels);
        let coins = coins_each + u32::from(index < remainder_coins);
        (levels, coins)
    };

    let mut entities = BTreeMap::new();
    let mut gift_levels = 0;

    for (index, participant) in attrs.participants.iter().enumerate() {
        let state = snapshot
            .state(participant)
            .ok_or_else(|| InvalidAttributes::UnscoredRecipient(participant.clone()))?;
        let (levels, coins) = share(index as u32);

        if state.owned_by_submitter {
            merge_entity(
                &mut entities,
                participant.clone(),
                levels,
                CoinRule::Fixed(coins),
            );
        } else {
            gift_levels += levels;
        }
    }

    for npc_index in 0..attrs.npcs.len() {
        let (levels, _) = share((attrs.participants.len() + npc_index) as u32);
        gift_levels += levels;
    }

    Ok(KindScore {
        overall_levels: total_levels,
        entities,
        gift_levels,
    })
}

pub(crate) fn score_external_writing(
    attrs: &ExternalWritingAttributes,
    config: &ScoringConfig,
) -> Result<KindScore, InvalidAttributes> {
    let total_levels = attrs.word_count / config.words_per_level;
    let overall_levels = total_levels / config.external_level_divisor;

    Ok(KindScore {
        overall_levels,
        entities: BTreeMap::new(),
        gift_levels: overall_levels,
    })
}

pub(crate) fn score_reference(
    attrs: &ReferenceAttributes,
    snapshot: &RecipientSnapshot,
    config: &ScoringConfig,
) -> Result<KindScore, InvalidAttributes> {
    if attrs.entries.is_empty() {
        return Err(InvalidAttributes::NoReferenceEntries);
    }

    let mut entities = BTreeMap::new();
    let mut gift_levels = 0;
    let mut overall_levels = 0;

    for entry in &attrs.entries {
        let state = snapshot
            .state(&entry.recipient)
            .ok_or_else(|| InvalidAttributes::UnscoredRecipient(entry.recipient.clone()))?;

        let (levels, coins) = match custom_override(entry.custom_levels)? {
            Some(custom) => (custom, CoinRule::PerAppliedLevel(config.coins_per_level)),
            None => (
                config.reference_base_levels,
                CoinRule::Fixed(config.reference_base_coins),
            ),
        };
        overall_levels += levels;

        if state.owned_by_submitter {
            if entities.contains_key(&entry.recipient) {
                return Err(InvalidAttributes::DuplicateRecipient(
                    entry.recipient.clone(),
                ));
            }
            merge_entity(&mut entities, entry.recipient.clone(), levels, coins);
        } else {
            gift_levels += levels;
        }
    }

    Ok(KindScore {
        overall_levels,
        entities,
        gift_levels,
    })
}

pub(crate) fn score_prompt(
    attrs: &PromptAttributes,
    snapshot: &RecipientSnapshot,
) -> Result<KindScore, InvalidAttributes> {
    let state = snapshot
        .state(&attrs.recipient)
        .ok_or_else(|| InvalidAttributes::UnscoredRecipient(attrs.recipient.clone()))?;

    let mut levels = attrs.levels;
    let mut coins = attrs.coins;

    if let (Some(quality), Some(bonus)) = (attrs.quality, &attrs.bonus) {
        if quality >= bonus.quality_threshold {
            levels += bonus.bonus_levels;
            coins += bonus.bonus_coins;
        }
    }

    let mut entities = BTreeMap::new();
    let mut gift_levels = 0;

    if state.owned_by_submitter {
        merge_entity(
            &mut entities,
            attrs.recipient.clone(),
            levels,
            CoinRule::Fixed(coins),
        );
    } else {
        gift_levels += levels;
    }

    Ok(KindScore {
        overall_levels: levels,
        entities,
        gift_levels,
    })
}
