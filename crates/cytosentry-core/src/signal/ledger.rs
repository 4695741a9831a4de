use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, TransactionBehavior, params};

use crate::error::{EngineError, Result};

pub const WINDOW_SECS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerDecision {
    Granted,
    Denied { retry_after_secs: u64 },
}

/// Shared outbound-request budget over a rolling 60-second window. The ledger
/// is the single mutable resource of the signal path; it is injected into the
/// source explicitly so no call site can bypass it with a local counter.
///
/// `MemoryLedger` covers a single process; deployments spanning multiple
/// processes share a [`SqliteLedger`] on a common path instead, so the budget
/// counts true outbound rate rather than per-process rate.
pub trait RateLedger: Send + Sync {
    fn try_acquire_at(&self, now: DateTime<Utc>) -> Result<LedgerDecision>;

    fn try_acquire(&self) -> Result<LedgerDecision> {
        self.try_acquire_at(Utc::now())
    }

    /// Acquires one slot or fails with a typed `RateLimited` error carrying
    /// retry-after guidance.
    fn acquire_or_fail(&self) -> Result<()> {
        match self.try_acquire()? {
            LedgerDecision::Granted => Ok(()),
            LedgerDecision::Denied { retry_after_secs } => {
                Err(EngineError::RateLimited { retry_after_secs })
            }
        }
    }
}

/// In-process ledger: a mutex-guarded timestamp window.
pub struct MemoryLedger {
    budget: u32,
    window: Mutex<VecDeque<DateTime<Utc>>>,
}

impl std::fmt::Debug for MemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLedger")
            .field("budget", &self.budget)
            .finish_non_exhaustive()
    }
}

impl MemoryLedger {
    pub fn new(budget: u32) -> Result<Self> {
        if budget == 0 {
            return Err(EngineError::InvalidInput(
                "rate budget must be positive".to_string(),
            ));
        }
        Ok(Self {
            budget,
            window: Mutex::new(VecDeque::new()),
        })
    }
}

impl RateLedger for MemoryLedger {
    fn try_acquire_at(&self, now: DateTime<Utc>) -> Result<LedgerDecision> {
        let cutoff = now - Duration::seconds(WINDOW_SECS);
        let mut window = self
            .window
            .lock()
            .map_err(|_| EngineError::mutex_poisoned("rate ledger"))?;

        while window.front().is_some_and(|t| *t <= cutoff) {
            window.pop_front();
        }

        if window.len() < self.budget as usize {
            window.push_back(now);
            return Ok(LedgerDecision::Granted);
        }

        let retry_after_secs = window
            .front()
            .map(|oldest| {
                let free_at = *oldest + Duration::seconds(WINDOW_SECS);
                (free_at - now).num_seconds().max(1)
            })
            .unwrap_or(1);
        #[allow(clippy::cast_sign_loss, reason = "clamped to >= 1 above")]
        Ok(LedgerDecision::Denied {
            retry_after_secs: retry_after_secs as u64,
        })
    }
}

/// Cross-process ledger backed by a shared sqlite file. Acquisition runs in
/// an immediate transaction, so concurrent workers serialize on the database
/// write lock and the count-then-insert step is atomic per deployment unit.
#[derive(Clone)]
pub struct SqliteLedger {
    budget: u32,
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteLedger")
            .field("budget", &self.budget)
            .finish_non_exhaustive()
    }
}

impl SqliteLedger {
    pub fn open(path: &Path, budget: u32) -> Result<Self> {
        if budget == 0 {
            return Err(EngineError::InvalidInput(
                "rate budget must be positive".to_string(),
            ));
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "busy_timeout", 5_000)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS signal_requests (
                acquired_at_ms INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_signal_requests_at
                ON signal_requests (acquired_at_ms);",
        )?;
        Ok(Self {
            budget,
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl RateLedger for SqliteLedger {
    fn try_acquire_at(&self, now: DateTime<Utc>) -> Result<LedgerDecision> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| EngineError::mutex_poisoned("sqlite rate ledger"))?;
        let now_ms = now.timestamp_millis();
        let cutoff_ms = now_ms - WINDOW_SECS * 1_000;

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "DELETE FROM signal_requests WHERE acquired_at_ms <= ?1",
            params![cutoff_ms],
        )?;
        let in_window: u32 = tx.query_row(
            "SELECT COUNT(*) FROM signal_requests",
            [],
            |row| row.get(0),
        )?;

        if in_window < self.budget {
            tx.execute(
                "INSERT INTO signal_requests (acquired_at_ms) VALUES (?1)",
                params![now_ms],
            )?;
            tx.commit()?;
            return Ok(LedgerDecision::Granted);
        }

        let oldest_ms: i64 = tx.query_row(
            "SELECT MIN(acquired_at_ms) FROM signal_requests",
            [],
            |row| row.get(0),
        )?;
        tx.commit()?;
        let retry_after_secs = ((oldest_ms + WINDOW_SECS * 1_000 - now_ms) / 1_000).max(1);
        #[allow(clippy::cast_sign_loss, reason = "clamped to >= 1 above")]
        Ok(LedgerDecision::Denied {
            retry_after_secs: retry_after_secs as u64,
        })
    }
}
