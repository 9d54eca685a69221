//! Drives an [`AutoModeCountdown`] on the tokio clock.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::auto_mode::{AutoModeCountdown, Tick};

/// Runs `countdown` with one tick per `period` until it expires or `cancel`
/// fires.
///
/// Cancellation is how the owner reports that auto-mode was switched off, so
/// it is observed at every tick boundary and turns into [`Tick::Aborted`].
pub async fn run_auto_mode_countdown(
    mut countdown: AutoModeCountdown,
    period: Duration,
    cancel: CancellationToken,
) -> Tick {
    loop {
        tokio::select! {
            () = cancel.cancelled() => return Tick::Aborted,
            () = tokio::time::sleep(period) => {}
        }
        match countdown.tick(!cancel.is_cancelled()) {
            Tick::Continue { remaining } => debug!(remaining, "auto-mode tick"),
            outcome => return outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_countdown_expires_after_ticks_times_period() {
        // Arrange
        let started = tokio::time::Instant::now();

        // Act
        let outcome = run_auto_mode_countdown(
            AutoModeCountdown::new(5),
            Duration::from_secs(1),
            CancellationToken::new(),
        )
        .await;

        // Assert
        assert_eq!(outcome, Tick::Expired);
        assert_eq!(started.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_countdown_aborts_before_expiry() {
        // Arrange
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_auto_mode_countdown(
            AutoModeCountdown::new(5),
            Duration::from_secs(1),
            cancel.clone(),
        ));

        // Act
        tokio::time::sleep(Duration::from_millis(2500)).await;
        cancel.cancel();
        let outcome = task.await.unwrap();

        // Assert
        assert_eq!(outcome, Tick::Aborted);
    }
}
