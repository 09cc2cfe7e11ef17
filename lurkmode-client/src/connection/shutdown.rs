//! Graceful shutdown of the ingest session

use std::time::Duration;

use super::ingest::SessionControl;

/// Pause between rejected disconnect attempts
pub const DEFAULT_DISCONNECT_BACKOFF: Duration = Duration::from_millis(100);

/// Keep requesting a disconnect until the session accepts it
///
/// A session that is still connecting rejects the request, so this retries
/// with a fixed backoff and never gives up. Returns the number of attempts.
pub async fn disconnect_with_retry<C>(control: &C, backoff: Duration) -> u32
where
    C: SessionControl + ?Sized,
{
    let mut attempts = 0;
    loop {
        attempts += 1;
        match control.disconnect() {
            Ok(()) => {
                tracing::info!(attempts, "Disconnect accepted");
                return attempts;
            }
            Err(e) if e.is_retryable() => {
                tracing::debug!(attempts, "Disconnect rejected: {}", e);
                tokio::time::sleep(backoff).await;
            }
            Err(e) => {
                tracing::warn!(attempts, "Disconnect failed, still retrying: {}", e);
                tokio::time::sleep(backoff).await;
            }
        }
    }
}
