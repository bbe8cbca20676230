//! Connectivity prechecks
//!
//! Run once per job before any table is touched. Any failure here aborts
//! the whole batch:
//!
//! 1. Identity session, with a device-code login and a bounded wait if none
//!    is active
//! 2. Storage account
//! 3. Database (`SELECT 1`)

use crate::adapters::traits::IdentityProvider;
use crate::adapters::Collaborators;
use crate::config::IdentityConfig;
use crate::domain::{Result, ShuttleError, StorageError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Timing of the wait for a login to complete
///
/// The pause between session checks starts at `initial_interval` and is
/// multiplied by `multiplier` after each check, capped at `max_interval`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginWait {
    /// Overall limit
    pub timeout: Duration,
    /// First pause
    pub initial_interval: Duration,
    /// Largest pause
    pub max_interval: Duration,
    /// Growth factor between pauses
    pub multiplier: f64,
}

impl From<&IdentityConfig> for LoginWait {
    fn from(config: &IdentityConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.login_timeout_seconds),
            initial_interval: Duration::from_millis(config.initial_poll_interval_ms),
            max_interval: Duration::from_millis(config.max_poll_interval_ms),
            multiplier: config.backoff_multiplier,
        }
    }
}

impl LoginWait {
    /// Pause that follows `current`
    pub fn next_interval(&self, current: Duration) -> Duration {
        current.mul_f64(self.multiplier).min(self.max_interval)
    }
}

/// Sleeps for `pause`; returns `true` if shutdown was requested meanwhile
async fn pause_unless_shutdown(pause: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return true;
    }
    let sleep = tokio::time::sleep(pause);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return false,
            changed = shutdown.changed() => match changed {
                Ok(()) if *shutdown.borrow() => return true,
                Ok(()) => continue,
                // Sender gone: nobody can ask for shutdown any more
                Err(_) => {
                    (&mut sleep).await;
                    return false;
                }
            },
        }
    }
}

/// Makes sure an identity session is active
///
/// If none is, starts a device-code login (when `login_if_missing`) and
/// polls until the session appears, the wait times out, or shutdown is
/// requested.
///
/// # Errors
///
/// - `StorageError::AuthenticationFailed` if no session and login is disabled
/// - `StorageError::LoginTimeout` if the login does not complete in time
/// - `ShuttleError::Interrupted` if shutdown is requested during the wait
pub async fn ensure_identity(
    identity: &dyn IdentityProvider,
    wait: &LoginWait,
    login_if_missing: bool,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<()> {
    if identity.has_active_session().await? {
        tracing::info!("Identity session is active");
        return Ok(());
    }

    if !login_if_missing {
        return Err(StorageError::AuthenticationFailed(
            "no active session; run 'az login' first".to_string(),
        )
        .into());
    }

    tracing::warn!(
        timeout_secs = wait.timeout.as_secs(),
        "No active identity session; waiting for device-code login"
    );
    identity.start_login().await?;

    let deadline = Instant::now() + wait.timeout;
    let mut interval = wait.initial_interval;
    let mut polls = 0u32;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            tracing::error!(polls, "Timed out waiting for login");
            return Err(StorageError::LoginTimeout(wait.timeout.as_secs()).into());
        }

        if pause_unless_shutdown(interval.min(remaining), shutdown).await {
            tracing::warn!("Shutdown requested while waiting for login");
            return Err(ShuttleError::Interrupted(
                "shutdown requested while waiting for login".to_string(),
            ));
        }

        polls += 1;
        if identity.has_active_session().await? {
            tracing::info!(polls, "Login completed");
            return Ok(());
        }
        tracing::debug!(polls, next_interval_ms = interval.as_millis() as u64, "Login still pending");
        interval = wait.next_interval(interval);
    }
}

/// Runs every precheck in order, stopping at the first failure
///
/// In dry-run mode each check is only logged.
pub async fn run_prechecks(
    collaborators: &Collaborators,
    identity_config: &IdentityConfig,
    dry_run: bool,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<()> {
    if dry_run {
        tracing::info!("[dry-run] would check the identity session");
        tracing::info!("[dry-run] would check the storage account");
        tracing::info!("[dry-run] would test the database connection");
        return Ok(());
    }

    let wait = LoginWait::from(identity_config);
    ensure_identity(
        collaborators.identity.as_ref(),
        &wait,
        identity_config.login_if_missing,
        shutdown,
    )
    .await
    .inspect_err(|e| tracing::error!(error = %e, "Identity precheck failed"))?;

    collaborators
        .blobs
        .check_account()
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Storage account precheck failed"))?;
    tracing::info!("Storage account is reachable");

    collaborators
        .database
        .test_connection()
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Database precheck failed"))?;
    tracing::info!("Database connection test successful");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reports a session after `ready_after` checks
    struct SlowLogin {
        ready_after: usize,
        checks: AtomicUsize,
        logins: AtomicUsize,
    }

    impl SlowLogin {
        fn new(ready_after: usize) -> Self {
            Self {
                ready_after,
                checks: AtomicUsize::new(0),
                logins: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for SlowLogin {
        async fn has_active_session(&self) -> Result<bool> {
            let n = self.checks.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(n > self.ready_after)
        }

        async fn start_login(&self) -> Result<()> {
            self.logins.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn fast_wait(timeout_ms: u64) -> LoginWait {
        LoginWait {
            timeout: Duration::from_millis(timeout_ms),
            initial_interval: Duration::from_millis(1),
            max_interval: Duration::from_millis(4),
            multiplier: 2.0,
        }
    }

    #[test]
    fn test_backoff_is_capped() {
        let wait = fast_wait(100);
        let mut interval = wait.initial_interval;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(interval.as_millis());
            interval = wait.next_interval(interval);
        }
        assert_eq!(seen, vec![1, 2, 4, 4]);
    }

    #[test]
    fn test_login_wait_from_config() {
        let wait = LoginWait::from(&IdentityConfig::default());
        assert_eq!(wait.timeout, Duration::from_secs(600));
        assert_eq!(wait.initial_interval, Duration::from_millis(5_000));
        assert_eq!(wait.max_interval, Duration::from_millis(30_000));
    }

    #[tokio::test]
    async fn test_active_session_needs_no_login() {
        let identity = SlowLogin::new(0);
        let (_tx, mut rx) = watch::channel(false);

        ensure_identity(&identity, &fast_wait(100), true, &mut rx)
            .await
            .unwrap();

        assert_eq!(identity.logins.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_login_completes_after_polling() {
        let identity = SlowLogin::new(3);
        let (_tx, mut rx) = watch::channel(false);

        ensure_identity(&identity, &fast_wait(5_000), true, &mut rx)
            .await
            .unwrap();

        assert_eq!(identity.logins.load(Ordering::SeqCst), 1);
        assert_eq!(identity.checks.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_login_times_out() {
        let identity = SlowLogin::new(usize::MAX);
        let (_tx, mut rx) = watch::channel(false);

        let err = ensure_identity(&identity, &fast_wait(30), true, &mut rx)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ShuttleError::Storage(StorageError::LoginTimeout(_))
        ));
        assert_eq!(err.kind(), ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_login_disabled() {
        let identity = SlowLogin::new(usize::MAX);
        let (_tx, mut rx) = watch::channel(false);

        let err = ensure_identity(&identity, &fast_wait(30), false, &mut rx)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(identity.logins.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_wait() {
        let identity = SlowLogin::new(usize::MAX);
        let (tx, mut rx) = watch::channel(false);
        let wait = LoginWait {
            timeout: Duration::from_secs(60),
            initial_interval: Duration::from_secs(30),
            max_interval: Duration::from_secs(30),
            multiplier: 1.0,
        };

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let _ = tx.send(true);
        });

        let started = std::time::Instant::now();
        let err = ensure_identity(&identity, &wait, true, &mut rx)
            .await
            .unwrap_err();

        assert!(matches!(err, ShuttleError::Interrupted(_)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
