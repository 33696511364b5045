//! Background sweep of abandoned reservations.

use crate::CreditLedger;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

/// Periodically releases reservations that were never finalized.
///
/// A reservation older than `max_age` with no commit or release record is
/// treated as abandoned (e.g. the owning orchestrator crashed mid-request)
/// and returned to the user's balance, bounding credit leakage.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use taleforge_ledger::{InMemoryCreditLedger, ReservationSweeper};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let ledger = Arc::new(InMemoryCreditLedger::new());
/// let sweeper = ReservationSweeper::new(
///     ledger,
///     Duration::from_secs(60),
///     Duration::from_secs(600),
/// );
/// let handle = sweeper.spawn();
/// # handle.abort();
/// # }
/// ```
pub struct ReservationSweeper {
    ledger: Arc<dyn CreditLedger>,
    interval: Duration,
    max_age: Duration,
}

impl ReservationSweeper {
    /// Create a sweeper over the given ledger.
    pub fn new(ledger: Arc<dyn CreditLedger>, interval: Duration, max_age: Duration) -> Self {
        Self {
            ledger,
            interval,
            max_age,
        }
    }

    /// Run one sweep pass immediately.
    #[instrument(skip(self))]
    pub async fn sweep_once(&self) -> usize {
        match self.ledger.sweep_abandoned(self.max_age).await {
            Ok(released) => released,
            Err(e) => {
                error!(error = %e, "Reservation sweep failed");
                0
            }
        }
    }

    /// Spawn the periodic sweep loop.
    ///
    /// The task runs until aborted; each tick performs one sweep pass.
    pub fn spawn(self) -> JoinHandle<()> {
        info!(
            interval_secs = self.interval.as_secs(),
            max_age_secs = self.max_age.as_secs(),
            "Starting reservation sweeper"
        );
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.sweep_once().await;
            }
        })
    }
}
