use super::domain::{SecondaryDetail, SecondaryReward};

/// Raw value handed back by a delegated reward subsystem. Some report a bare
/// amount, others attach commentary; both are normalized immediately so the
/// core never branches on shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecondaryValue {
    Amount(u32),
    Detailed { amount: u32, message: String },
}

impl From<SecondaryValue> for SecondaryReward {
    fn from(value: SecondaryValue) -> Self {
        match value {
            SecondaryValue::Amount(amount) => SecondaryReward {
                amount,
                detail: None,
            },
            SecondaryValue::Detailed { amount, message } => SecondaryReward {
                amount,
                detail: Some(SecondaryDetail { message }),
            },
        }
    }
}

/// Seam toward the garden, mission, and boss subsystems.
///
/// Implementations must be deterministic in `overall_levels`: reward previews
/// are recomputed freely and identical inputs must produce identical bundles.
pub trait SecondaryRewardProvider: Send + Sync {
    fn garden_points(&self, overall_levels: u32) -> SecondaryValue;
    fn mission_progress(&self, overall_levels: u32) -> SecondaryValue;
    fn boss_damage(&self, overall_levels: u32) -> SecondaryValue;
}

const DEFAULT_GARDEN_DIVISOR: u32 = 3;
const DEFAULT_MISSION_DIVISOR: u32 = 3;
const DEFAULT_BOSS_DIVISOR: u32 = 2;

/// Deterministic default: each track earns a fixed fraction of the overall
/// level count plus a floor of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRateSecondary {
    pub garden_divisor: u32,
    pub mission_divisor: u32,
    pub boss_divisor: u32,
}

impl FixedRateSecondary {
    fn rate(overall_levels: u32, divisor: u32) -> u32 {
        overall_levels / divisor.max(1) + 1
    }
}

impl Default for FixedRateSecondary {
    fn default() -> Self {
        Self {
            garden_divisor: DEFAULT_GARDEN_DIVISOR,
            mission_divisor: DEFAULT_MISSION_DIVISOR,
            boss_divisor: DEFAULT_BOSS_DIVISOR,
        }
    }
}

impl SecondaryRewardProvider for FixedRateSecondary {
    fn garden_points(&self, overall_levels: u32) -> SecondaryValue {
        SecondaryValue::Amount(Self::rate(overall_levels, self.garden_divisor))
    }

    fn mission_progress(&self, overall_levels: u32) -> SecondaryValue {
        SecondaryValue::Amount(Self::rate(overall_levels, self.mission_divisor))
    }

    fn boss_damage(&self, overall_levels: u32) -> SecondaryValue {
        SecondaryValue::Detailed {
            amount: Self::rate(overall_levels, self.boss_divisor),
            message: format!(
                "dealt {} damage to the active boss",
                Self::rate(overall_levels, self.boss_divisor)
            ),
        }
    }
}
