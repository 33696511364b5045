//! Ledger entries tying credit debits to generation attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taleforge_core::{RequestId, ReservationId, UserId};

/// State of one credit charge.
///
/// Transitions only forward: `Reserved → Committed` or `Reserved → Released`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChargeState {
    /// The amount is held out of the available balance
    Reserved,
    /// The hold became a permanent charge
    Committed,
    /// The hold was returned to the available balance
    Released,
}

impl ChargeState {
    /// Whether no further transition is allowed.
    pub fn is_final(&self) -> bool {
        !matches!(self, ChargeState::Reserved)
    }
}

/// A ledger entry tying a credit debit to one artifact generation attempt.
///
/// Owned exclusively by the ledger; the orchestrator only requests
/// reserve/commit/release transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct CreditCharge {
    /// The reservation this charge belongs to
    reservation_id: ReservationId,
    /// Charged user
    user_id: UserId,
    /// Positive credit amount
    amount: u32,
    /// Generation request that caused the charge
    request_id: RequestId,
    /// Current state
    state: ChargeState,
    /// When the reservation was taken
    reserved_at: DateTime<Utc>,
    /// When the charge reached its final state, if it has
    finalized_at: Option<DateTime<Utc>>,
}

impl CreditCharge {
    pub(crate) fn reserve(
        reservation_id: ReservationId,
        user_id: UserId,
        amount: u32,
        request_id: RequestId,
    ) -> Self {
        Self {
            reservation_id,
            user_id,
            amount,
            request_id,
            state: ChargeState::Reserved,
            reserved_at: Utc::now(),
            finalized_at: None,
        }
    }

    pub(crate) fn finalize(&mut self, state: ChargeState) {
        debug_assert!(state.is_final());
        self.state = state;
        self.finalized_at = Some(Utc::now());
    }

    /// Age of the reservation relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.reserved_at
    }
}
