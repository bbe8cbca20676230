//! Azure CLI identity session

use crate::adapters::process::ToolCommand;
use crate::adapters::traits::IdentityProvider;
use crate::domain::{Result, StorageError};
use async_trait::async_trait;
use tokio::process::Child;
use tokio::sync::Mutex;

/// Identity provider backed by `az account show` / `az login`
///
/// The device-code login runs as a child process that stays alive while the
/// operator completes the flow in a browser. At most one login child is kept;
/// it is killed when the provider is dropped.
pub struct AzureCliIdentity {
    az: String,
    login_child: Mutex<Option<Child>>,
}

impl AzureCliIdentity {
    /// Creates a provider that runs the given `az` executable
    pub fn new(az: impl Into<String>) -> Self {
        Self {
            az: az.into(),
            login_child: Mutex::new(None),
        }
    }
}

#[async_trait]
impl IdentityProvider for AzureCliIdentity {
    async fn has_active_session(&self) -> Result<bool> {
        let output = ToolCommand::new(&self.az)
            .args(["account", "show", "--output", "none"])
            .run()
            .await?;

        if !output.success() {
            tracing::debug!(
                diagnostics = %output.diagnostics(),
                "No active Azure CLI session"
            );
        }
        Ok(output.success())
    }

    async fn start_login(&self) -> Result<()> {
        let mut slot = self.login_child.lock().await;

        if let Some(child) = slot.as_mut() {
            match child.try_wait() {
                Ok(None) => {
                    tracing::debug!("Device-code login already in progress");
                    return Ok(());
                }
                Ok(Some(status)) => {
                    tracing::debug!(status = %status, "Previous login process finished");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Could not query previous login process");
                }
            }
        }

        tracing::info!("Starting Azure CLI device-code login; follow the instructions below");
        let child = ToolCommand::new(&self.az)
            .args(["login", "--use-device-code", "--output", "none"])
            .spawn()
            .map_err(|e| StorageError::AuthenticationFailed(e.to_string()))?;
        *slot = Some(child);
        Ok(())
    }
}
