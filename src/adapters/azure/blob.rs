//! Azure CLI blob store

use super::classify::{classify_account_failure, classify_storage_failure};
use crate::adapters::process::ToolCommand;
use crate::adapters::traits::{BlobStore, WriteMode};
use crate::config::StorageConfig;
use crate::domain::{ContainerName, Result, StorageError};
use async_trait::async_trait;
use std::path::Path;

/// Blob store backed by `az storage blob ...`
pub struct AzureCliBlobStore {
    az: String,
    account_name: String,
    auth_mode: String,
}

impl AzureCliBlobStore {
    /// Creates a blob store for the configured account
    pub fn new(az: impl Into<String>, storage: &StorageConfig) -> Self {
        Self {
            az: az.into(),
            account_name: storage.account_name.clone(),
            auth_mode: storage.auth_mode.clone(),
        }
    }

    fn blob_command(&self, verb: &str, container: &ContainerName, blob_name: &str) -> ToolCommand {
        ToolCommand::new(&self.az)
            .args(["storage", "blob", verb])
            .args(["--account-name", self.account_name.as_str()])
            .args(["--auth-mode", self.auth_mode.as_str()])
            .args(["--container-name", container.as_str()])
            .args(["--name", blob_name])
            .arg("--only-show-errors")
    }

    /// Upload command line, without running it
    pub fn upload_command(
        &self,
        container: &ContainerName,
        blob_name: &str,
        file: &Path,
        mode: WriteMode,
    ) -> ToolCommand {
        let overwrite = match mode {
            WriteMode::Overwrite => "true",
            WriteMode::CreateNew => "false",
        };
        self.blob_command("upload", container, blob_name)
            .arg("--file")
            .arg(file.to_string_lossy())
            .args(["--overwrite", overwrite])
            .args(["--output", "none"])
    }
}

fn subject(container: &ContainerName, blob_name: &str) -> String {
    format!("{container}/{blob_name}")
}

#[async_trait]
impl BlobStore for AzureCliBlobStore {
    async fn check_account(&self) -> Result<()> {
        let output = ToolCommand::new(&self.az)
            .args(["storage", "account", "show"])
            .args(["--name", self.account_name.as_str()])
            .args(["--query", "name", "--output", "tsv"])
            .run()
            .await?;

        if output.success() {
            Ok(())
        } else {
            Err(classify_account_failure(&output, &self.account_name).into())
        }
    }

    async fn upload(
        &self,
        container: &ContainerName,
        blob_name: &str,
        file: &Path,
        mode: WriteMode,
    ) -> Result<()> {
        let output = self
            .upload_command(container, blob_name, file, mode)
            .run()
            .await?;
        if output.success() {
            return Ok(());
        }

        let err = classify_storage_failure(&output, &subject(container, blob_name));
        if mode == WriteMode::CreateNew && matches!(err, StorageError::TransferFailed(_)) {
            // Older CLI builds report the refused conditional write without the service code
            match self.exists(container, blob_name).await {
                Ok(true) => {
                    return Err(StorageError::BlobAlreadyExists(subject(container, blob_name)).into())
                }
                Ok(false) => {}
                Err(e) => tracing::debug!(error = %e, "Existence check after failed upload failed"),
            }
        }
        Err(err.into())
    }

    async fn download(
        &self,
        container: &ContainerName,
        blob_name: &str,
        file: &Path,
    ) -> Result<()> {
        let output = self
            .blob_command("download", container, blob_name)
            .arg("--file")
            .arg(file.to_string_lossy())
            .args(["--output", "none"])
            .run()
            .await?;

        if output.success() {
            Ok(())
        } else {
            Err(classify_storage_failure(&output, &subject(container, blob_name)).into())
        }
    }

    async fn exists(&self, container: &ContainerName, blob_name: &str) -> Result<bool> {
        let output = self
            .blob_command("exists", container, blob_name)
            .args(["--query", "exists", "--output", "tsv"])
            .run()
            .await?;

        if !output.success() {
            return Err(classify_storage_failure(&output, &subject(container, blob_name)).into());
        }
        match output.stdout.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(StorageError::TransferFailed(format!(
                "{}: unexpected exists output '{}'",
                subject(container, blob_name),
                other
            ))
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn store() -> AzureCliBlobStore {
        AzureCliBlobStore::new(
            "az",
            &StorageConfig {
                account_name: "acct".to_string(),
                auth_mode: "login".to_string(),
            },
        )
    }

    #[test]
    fn test_upload_command_create_new() {
        let container = ContainerName::new("backups").unwrap();
        let cmd = store().upload_command(
            &container,
            "nightly/Orders.tsv.gz",
            &PathBuf::from("/tmp/Orders.tsv.gz"),
            WriteMode::CreateNew,
        );
        assert_eq!(
            cmd.display(),
            "az storage blob upload --account-name acct --auth-mode login \
             --container-name backups --name nightly/Orders.tsv.gz --only-show-errors \
             --file /tmp/Orders.tsv.gz --overwrite false --output none"
        );
    }

    #[test]
    fn test_upload_command_overwrite() {
        let container = ContainerName::new("backups").unwrap();
        let cmd = store().upload_command(
            &container,
            "p/a.tsv",
            &PathBuf::from("a.tsv"),
            WriteMode::Overwrite,
        );
        assert!(cmd.display().contains("--overwrite true"));
    }
}
