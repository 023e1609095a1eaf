use serde::{Deserialize, Serialize};

const DEFAULT_LEVEL_CAP: u32 = 100;
const DEFAULT_REDISTRIBUTION_DIVISOR: u32 = 2;

/// Split of one requested level delta into the applied share and the
/// overflow beyond the recipient's cap headroom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapOutcome {
    pub levels_applied: u32,
    pub excess_levels: u32,
}

/// Level-cap policy: the hard per-recipient ceiling and the excess-to-pool
/// conversion ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapPolicy {
    level_cap: u32,
    redistribution_divisor: u32,
}

impl CapPolicy {
    pub fn new(level_cap: u32, redistribution_divisor: u32) -> Self {
        let divisor = if redistribution_divisor == 0 {
            DEFAULT_REDISTRIBUTION_DIVISOR
        } else {
            redistribution_divisor
        };

        Self {
            level_cap,
            redistribution_divisor: divisor,
        }
    }

    pub const fn level_cap(&self) -> u32 {
        self.level_cap
    }

    pub fn headroom(&self, current_level: u32) -> u32 {
        self.level_cap.saturating_sub(current_level)
    }

    /// Split a requested delta against the recipient's current level.
    ///
    /// Never mutates recipient state; committing the applied share is the
    /// caller's responsibility.
    pub fn apply(&self, current_level: u32, levels_requested: u32) -> CapOutcome {
        let levels_applied = levels_requested.min(self.headroom(current_level));
        CapOutcome {
            levels_applied,
            excess_levels: levels_requested - levels_applied,
        }
    }

    /// Redistributable units earned from one recipient's excess.
    ///
    /// The floor is taken per recipient, before any summation: remainders
    /// are lost independently per capped recipient, never pooled first.
    pub fn redistributable_units(&self, excess_levels: u32) -> u32 {
        excess_levels / self.redistribution_divisor
    }
}

impl Default for CapPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL_CAP, DEFAULT_REDISTRIBUTION_DIVISOR)
    }
}
