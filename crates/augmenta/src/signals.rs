//! Termination signals.
//!
//! The first signal starts a graceful stop: the receive loop releases every
//! tracked object so subscribers see a leave for each. A second signal is
//! handled by the application as an immediate exit.

use augmenta_event_system::ShutdownState;
use std::fmt;
use tokio::signal;
use tracing::info;

/// Signal that asked the receiver to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    /// SIGINT, or Ctrl+C on Windows
    Interrupt,
    /// SIGTERM
    Terminate,
}

impl fmt::Display for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopSignal::Interrupt => write!(f, "interrupt"),
            StopSignal::Terminate => write!(f, "terminate"),
        }
    }
}

/// Waits for the next stop signal without logging it.
pub async fn wait_for_stop_signal() -> std::io::Result<StopSignal> {
    #[cfg(unix)]
    {
        use signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => Ok(StopSignal::Interrupt),
            _ = sigterm.recv() => Ok(StopSignal::Terminate),
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        Ok(StopSignal::Interrupt)
    }
}

/// Waits for a stop signal and returns a shutdown state already initiated.
///
/// ```no_run
/// use lib_augmenta::signals::shutdown_on_signal;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let shutdown_state = shutdown_on_signal().await?;
///     assert!(shutdown_state.is_shutdown_initiated());
///     Ok(())
/// }
/// ```
pub async fn shutdown_on_signal() -> Result<ShutdownState, Box<dyn std::error::Error>> {
    let received = wait_for_stop_signal().await?;
    info!("📡 Received {received} signal - releasing tracked objects");

    let shutdown_state = ShutdownState::new();
    shutdown_state.initiate_shutdown();
    Ok(shutdown_state)
}
