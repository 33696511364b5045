//! Deadline enforcement for provider calls.

use std::future::Future;
use taleforge_error::{ProviderError, ProviderErrorKind};
use tokio::time::Instant;
use tracing::warn;

/// Run a provider future, guaranteeing termination by `deadline`.
///
/// An elapsed deadline is surfaced as a classified `Timeout`, never a hang;
/// the underlying call is dropped at that point.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use taleforge_error::ProviderErrorKind;
/// use taleforge_providers::run_with_deadline;
/// use tokio::time::Instant;
///
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// let deadline = Instant::now() + Duration::from_millis(10);
/// let result: Result<(), _> = run_with_deadline("image", deadline, async {
///     tokio::time::sleep(Duration::from_secs(60)).await;
///     Ok(())
/// })
/// .await;
/// assert!(matches!(result.unwrap_err().kind, ProviderErrorKind::Timeout(_)));
/// # }
/// ```
pub async fn run_with_deadline<T, F>(
    label: &str,
    deadline: Instant,
    fut: F,
) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout_at(deadline, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(label, "Provider call exceeded its deadline");
            Err(ProviderError::new(ProviderErrorKind::Timeout(
                label.to_string(),
            )))
        }
    }
}
