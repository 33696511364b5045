//! In-memory credit ledger implementation.
//!
//! All state lives behind one async mutex; every operation is a quick
//! in-memory mutation, so the lock is never held across provider or storage
//! I/O. Each transition is appended to a journal before the call returns,
//! standing in for the durable write a database-backed implementation
//! performs.

use crate::{ChargeState, CreditCharge, CreditLedger};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use taleforge_core::{RequestId, ReservationId, UserId};
use taleforge_error::{LedgerError, LedgerErrorKind, TaleForgeResult};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Default)]
struct LedgerState {
    /// Available balance per user; reserved amounts are already subtracted
    balances: HashMap<UserId, u32>,
    /// Live view of every reservation ever taken
    reservations: HashMap<ReservationId, CreditCharge>,
    /// Append-only transition record
    journal: Vec<CreditCharge>,
}

/// In-memory ledger for tests, local development, and single-process
/// deployments.
///
/// # Examples
///
/// ```
/// use taleforge_core::{RequestId, UserId};
/// use taleforge_ledger::{CreditLedger, InMemoryCreditLedger};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> taleforge_error::TaleForgeResult<()> {
/// let ledger = InMemoryCreditLedger::new();
/// let user = UserId::generate();
/// ledger.grant(user, 10).await?;
///
/// let hold = ledger.reserve(user, 4, RequestId::generate()).await?;
/// assert_eq!(ledger.balance(user).await?, 6);
///
/// ledger.release(hold).await?;
/// assert_eq!(ledger.balance(user).await?, 10);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryCreditLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl InMemoryCreditLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CreditLedger for InMemoryCreditLedger {
    #[instrument(skip(self))]
    async fn grant(&self, user: UserId, amount: u32) -> TaleForgeResult<()> {
        let mut state = self.state.lock().await;
        let balance = state.balances.entry(user).or_insert(0);
        *balance = balance.saturating_add(amount);
        debug!(%user, amount, balance = *balance, "Granted credits");
        Ok(())
    }

    async fn balance(&self, user: UserId) -> TaleForgeResult<u32> {
        let state = self.state.lock().await;
        state
            .balances
            .get(&user)
            .copied()
            .ok_or_else(|| LedgerError::new(LedgerErrorKind::UnknownAccount(user.to_string())).into())
    }

    #[instrument(skip(self))]
    async fn reserve(
        &self,
        user: UserId,
        amount: u32,
        request: RequestId,
    ) -> TaleForgeResult<ReservationId> {
        let mut state = self.state.lock().await;
        let available = state.balances.get(&user).copied().unwrap_or(0);
        if available < amount {
            debug!(%user, amount, available, "Reservation refused");
            return Err(LedgerError::new(LedgerErrorKind::InsufficientCredits {
                needed: amount,
                available,
            }))?;
        }

        let id = ReservationId::generate();
        let charge = CreditCharge::reserve(id, user, amount, request);
        state.balances.insert(user, available - amount);
        state.journal.push(charge.clone());
        state.reservations.insert(id, charge);
        info!(%user, amount, reservation = %id, "Reserved credits");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn commit(&self, reservation: ReservationId) -> TaleForgeResult<()> {
        let mut state = self.state.lock().await;
        let snapshot = match state.reservations.get_mut(&reservation) {
            Some(charge) if *charge.state() == ChargeState::Reserved => {
                charge.finalize(ChargeState::Committed);
                info!(%reservation, "Committed reservation");
                Some(charge.clone())
            }
            Some(charge) => {
                // Idempotent: a repeat commit must not double-charge.
                debug!(%reservation, state = %charge.state(), "Commit on finalized reservation is a no-op");
                None
            }
            None => {
                warn!(%reservation, "Commit on unknown reservation ignored");
                None
            }
        };
        if let Some(snapshot) = snapshot {
            state.journal.push(snapshot);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn release(&self, reservation: ReservationId) -> TaleForgeResult<()> {
        let mut state = self.state.lock().await;
        let snapshot = match state.reservations.get_mut(&reservation) {
            Some(charge) if *charge.state() == ChargeState::Reserved => {
                charge.finalize(ChargeState::Released);
                info!(%reservation, user = %charge.user_id(), amount = charge.amount(), "Released reservation");
                Some(charge.clone())
            }
            Some(charge) => {
                debug!(%reservation, state = %charge.state(), "Release on finalized reservation is a no-op");
                None
            }
            None => {
                warn!(%reservation, "Release on unknown reservation ignored");
                None
            }
        };
        if let Some(snapshot) = snapshot {
            let (user, amount) = (*snapshot.user_id(), *snapshot.amount());
            state.journal.push(snapshot);
            let balance = state.balances.entry(user).or_insert(0);
            *balance = balance.saturating_add(amount);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn sweep_abandoned(&self, max_age: Duration) -> TaleForgeResult<usize> {
        let cutoff = chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX);
        let now = Utc::now();

        let mut state = self.state.lock().await;
        let abandoned: Vec<ReservationId> = state
            .reservations
            .values()
            .filter(|c| *c.state() == ChargeState::Reserved && c.age(now) > cutoff)
            .map(|c| *c.reservation_id())
            .collect();

        for id in &abandoned {
            let snapshot = state.reservations.get_mut(id).map(|charge| {
                charge.finalize(ChargeState::Released);
                charge.clone()
            });
            if let Some(snapshot) = snapshot {
                let (user, amount) = (*snapshot.user_id(), *snapshot.amount());
                state.journal.push(snapshot);
                let balance = state.balances.entry(user).or_insert(0);
                *balance = balance.saturating_add(amount);
                warn!(reservation = %id, %user, amount, "Swept abandoned reservation");
            }
        }

        if !abandoned.is_empty() {
            info!(count = abandoned.len(), "Reservation sweep released holds");
        }
        Ok(abandoned.len())
    }

    async fn charges(&self, user: UserId) -> TaleForgeResult<Vec<CreditCharge>> {
        let state = self.state.lock().await;
        Ok(state
            .journal
            .iter()
            .filter(|c| *c.user_id() == user)
            .cloned()
            .collect())
    }
}
