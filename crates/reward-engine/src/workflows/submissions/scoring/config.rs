use serde::{Deserialize, Serialize};

/// Balance-table rates consumed by the scorer. Passed in as an immutable
/// value so scoring stays pure and testable; tier lookups for quality,
/// background, appearance, and complexity live on their enums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Coins granted per applied level; also the payout rate of gift pools.
    pub coins_per_level: u32,
    pub words_per_level: u32,
    pub words_per_coin: u32,
    pub uniquely_difficult_bonus: u32,
    /// Flat bonus a trainer earns for appearing in a piece.
    pub trainer_presence_bonus: u32,
    pub reference_base_levels: u32,
    pub reference_base_coins: u32,
    /// External content is weighted down by this divisor, applied once to
    /// the summed level total.
    pub external_level_divisor: u32,
    pub external_secondary_divisor: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            coins_per_level: 50,
            words_per_level: 50,
            words_per_coin: 1,
            uniquely_difficult_bonus: 3,
            trainer_presence_bonus: 3,
            reference_base_levels: 6,
            reference_base_coins: 200,
            external_level_divisor: 2,
            external_secondary_divisor: 2,
        }
    }
}
