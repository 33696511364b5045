//! Credit ledger trait definition.

use crate::CreditCharge;
use std::time::Duration;
use taleforge_core::{RequestId, ReservationId, UserId};
use taleforge_error::TaleForgeResult;

/// Trait for pluggable credit ledger backends.
///
/// Implementations must make `reserve` safe under concurrent reservations
/// for the same user: no two reservations may jointly overdraw the balance.
/// Every state transition must be durably recorded before it is
/// acknowledged. The per-user serialization must never be held across slow
/// I/O; reserve/commit/release are quick atomic operations.
#[async_trait::async_trait]
pub trait CreditLedger: Send + Sync {
    /// Add spendable credits to a user's balance, creating the account if
    /// needed. Used by the billing collaborator, and by tests.
    async fn grant(&self, user: UserId, amount: u32) -> TaleForgeResult<()>;

    /// Current available balance (excludes reserved amounts).
    async fn balance(&self, user: UserId) -> TaleForgeResult<u32>;

    /// Atomically check `balance >= amount`, hold `amount` out of the
    /// available balance, and record a pending reservation.
    ///
    /// # Errors
    ///
    /// `InsufficientCredits` if the available balance cannot cover the
    /// amount; the caller must not proceed with generation.
    async fn reserve(
        &self,
        user: UserId,
        amount: u32,
        request: RequestId,
    ) -> TaleForgeResult<ReservationId>;

    /// Convert a pending reservation into a permanent charge.
    ///
    /// Idempotent: committing an already-committed reservation is a no-op,
    /// never a double charge. Unknown ids are logged and ignored so that
    /// caller retries stay safe.
    async fn commit(&self, reservation: ReservationId) -> TaleForgeResult<()>;

    /// Return a reserved amount to the available balance.
    ///
    /// Idempotent, with the same unknown-id tolerance as `commit`. Used on
    /// artifact failure and request cancellation.
    async fn release(&self, reservation: ReservationId) -> TaleForgeResult<()>;

    /// Release every reservation still pending after `max_age`.
    ///
    /// A reservation with no terminal record past the timeout is treated as
    /// abandoned (e.g. an orchestrator crash); sweeping it restores the
    /// user's balance exactly. Returns the number of reservations released.
    async fn sweep_abandoned(&self, max_age: Duration) -> TaleForgeResult<usize>;

    /// Snapshot of all charges recorded for a user, newest last.
    async fn charges(&self, user: UserId) -> TaleForgeResult<Vec<CreditCharge>>;
}
