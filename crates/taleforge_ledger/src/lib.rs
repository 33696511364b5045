//! Credit ledger for the Tale Forge segment pipeline.
//!
//! Balances are never incremented or decremented directly by callers.
//! Every artifact generation attempt holds a *reservation* that must resolve
//! to commit (on success) or release (on failure or cancellation), making
//! partial-failure accounting provable. Reservations that are never
//! finalized — a crashed orchestrator, for example — are bounded by a
//! timeout and swept back into the balance.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod charge;
mod ledger;
mod memory;
mod sweeper;

pub use charge::{ChargeState, CreditCharge};
pub use ledger::CreditLedger;
pub use memory::InMemoryCreditLedger;
pub use sweeper::ReservationSweeper;
