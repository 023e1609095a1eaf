use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{RecipientRef, SubmissionId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoolId(pub String);

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PoolKind {
    Gift,
    Capped,
}

impl PoolKind {
    pub const fn label(self) -> &'static str {
        match self {
            PoolKind::Gift => "gift",
            PoolKind::Capped => "capped",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PoolStatus {
    Open,
    Closed,
}

impl PoolStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PoolStatus::Open => "open",
            PoolStatus::Closed => "closed",
        }
    }
}

/// Bounded, named reward pool created once per finalized submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPool {
    pub pool_id: PoolId,
    pub kind: PoolKind,
    pub total_units: u32,
    pub coin_per_unit: u32,
    pub source_submission: SubmissionId,
    pub opened_for: UserId,
}

impl AllocationPool {
    /// Pools are denominated in levels; coins are derived, never pooled.
    pub const fn unit_kind(&self) -> &'static str {
        "level"
    }
}

/// Immutable record of one successful draw against a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub pool_id: PoolId,
    pub recipient: RecipientRef,
    pub units: u32,
    pub coins_awarded: u32,
    pub created_at: DateTime<Utc>,
}

/// Read view of a pool: status, remaining budget, and allocation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub pool: AllocationPool,
    pub status: PoolStatus,
    pub remaining: u32,
    pub records: Vec<AllocationRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("pool {0} not found")]
    PoolNotFound(PoolId),
    #[error("pool {0} is closed")]
    PoolClosed(PoolId),
    #[error("pool must be opened with at least one unit")]
    EmptyPool,
    #[error("requested {requested} unit(s) but pool {pool_id} has {remaining} remaining")]
    InsufficientPool {
        pool_id: PoolId,
        requested: u32,
        remaining: u32,
    },
    #[error("{recipient} is not eligible to draw from pool {pool_id}")]
    IneligibleRecipient {
        pool_id: PoolId,
        recipient: RecipientRef,
    },
    #[error("concurrent ledger update detected; retry the allocation")]
    ConcurrencyConflict,
}

struct PoolState {
    pool: AllocationPool,
    status: PoolStatus,
    remaining: u32,
    records: Vec<AllocationRecord>,
}

static POOL_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_pool_id() -> PoolId {
    let id = POOL_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    PoolId(format!("pool-{id:06}"))
}

/// Transactional record of bounded reward pools being spent.
///
/// All pool state sits behind one mutex, so allocate calls against a pool
/// are serialized and either fully apply or leave nothing behind. Records
/// are append-only; a pool closes automatically when drained and can be
/// cancelled explicitly, forfeiting whatever remains.
#[derive(Default)]
pub struct AllocationLedger {
    pools: Mutex<BTreeMap<PoolId, PoolState>>,
}

impl AllocationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_pool(
        &self,
        kind: PoolKind,
        total_units: u32,
        coin_per_unit: u32,
        source_submission: SubmissionId,
        opened_for: UserId,
    ) -> Result<AllocationPool, LedgerError> {
        if total_units == 0 {
            return Err(LedgerError::EmptyPool);
        }

        let pool = AllocationPool {
            pool_id: next_pool_id(),
            kind,
            total_units,
            coin_per_unit,
            source_submission,
            opened_for,
        };

        let mut pools = self.lock()?;
        pools.insert(
            pool.pool_id.clone(),
            PoolState {
                pool: pool.clone(),
                status: PoolStatus::Open,
                remaining: total_units,
                records: Vec::new(),
            },
        );

        Ok(pool)
    }

    /// Draw `units` from a pool for one recipient.
    ///
    /// `recipient_owner` is the resolved owning user of the recipient; a
    /// pool only funds entities belonging to the user it was opened for.
    /// The call either appends a record and decrements the remainder, or
    /// fails without any effect; requests are never partially fulfilled.
    pub fn allocate(
        &self,
        pool_id: &PoolId,
        recipient: RecipientRef,
        units: u32,
        recipient_owner: Option<&UserId>,
    ) -> Result<AllocationRecord, LedgerError> {
        let mut pools = self.lock()?;
        let state = pools
            .get_mut(pool_id)
            .ok_or_else(|| LedgerError::PoolNotFound(pool_id.clone()))?;

        if state.status == PoolStatus::Closed {
            return Err(LedgerError::PoolClosed(pool_id.clone()));
        }

        // Eligibility outranks budget checks: an ineligible recipient is
        // rejected regardless of how many units remain.
        if recipient_owner != Some(&state.pool.opened_for) {
            return Err(LedgerError::IneligibleRecipient {
                pool_id: pool_id.clone(),
                recipient,
            });
        }

        if units == 0 || units > state.remaining {
            return Err(LedgerError::InsufficientPool {
                pool_id: pool_id.clone(),
                requested: units,
                remaining: state.remaining,
            });
        }

        let record = AllocationRecord {
            pool_id: pool_id.clone(),
            recipient,
            units,
            coins_awarded: units * state.pool.coin_per_unit,
            created_at: Utc::now(),
        };

        state.remaining -= units;
        state.records.push(record.clone());
        if state.remaining == 0 {
            state.status = PoolStatus::Closed;
        }

        Ok(record)
    }

    /// Explicitly cancel an open pool; the remaining units are forfeited
    /// and never returned to the submission.
    pub fn close(&self, pool_id: &PoolId) -> Result<PoolSnapshot, LedgerError> {
        let mut pools = self.lock()?;
        let state = pools
            .get_mut(pool_id)
            .ok_or_else(|| LedgerError::PoolNotFound(pool_id.clone()))?;

        if state.status == PoolStatus::Closed {
            return Err(LedgerError::PoolClosed(pool_id.clone()));
        }

        state.status = PoolStatus::Closed;
        Ok(snapshot_of(state))
    }

    pub fn snapshot(&self, pool_id: &PoolId) -> Result<PoolSnapshot, LedgerError> {
        let pools = self.lock()?;
        let state = pools
            .get(pool_id)
            .ok_or_else(|| LedgerError::PoolNotFound(pool_id.clone()))?;
        Ok(snapshot_of(state))
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<PoolId, PoolState>>, LedgerError> {
        self.pools.lock().map_err(|_| LedgerError::ConcurrencyConflict)
    }
}

fn snapshot_of(state: &PoolState) -> PoolSnapshot {
    PoolSnapshot {
        pool: state.pool.clone(),
        status: state.status,
        remaining: state.remaining,
        records: state.records.clone(),
    }
}
