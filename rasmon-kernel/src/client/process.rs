use super::{RacClient, RacCommand, RacError};
use crate::config::Settings;
use crate::mapping::{map_records, Entity};
use crate::models::{Cluster, Connection, Infobase, License, Lock, Process, Session};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command as AsyncCommand;
use tracing::{debug, warn};

/// Client qui invoque le binaire rac, une invocation par liste, chacune bornée par `timeout`.
#[derive(Debug, Clone)]
pub struct ProcessClient {
    rac_path: PathBuf,
    ras_address: String,
    timeout: Duration,
}

impl ProcessClient {
    pub fn new(rac_path: impl Into<PathBuf>, ras_address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            rac_path: rac_path.into(),
            ras_address: ras_address.into(),
            timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.rac_path, settings.ras_address(), settings.timeout())
    }

    pub fn rac_path(&self) -> &Path {
        &self.rac_path
    }

    /// Vecteur d'arguments complet : `[tokens..., flags..., host:port]`.
    pub fn command_args(&self, command: &RacCommand) -> Vec<String> {
        let mut args = command.args();
        args.push(self.ras_address.clone());
        args
    }

    /// Lance rac et renvoie sa sortie standard. Le processus est tué s'il dépasse le timeout.
    async fn run(&self, command: &RacCommand) -> Result<String, RacError> {
        let args = self.command_args(command);
        let start_time = Instant::now();

        let mut line = vec![self.rac_path.display().to_string()];
        line.extend(args.iter().cloned());
        debug!(command = %shell_words::join(&line), timeout = ?self.timeout, "invoking rac");

        let child = AsyncCommand::new(&self.rac_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => RacError::BinaryNotFound {
                    path: self.rac_path.clone(),
                },
                _ => RacError::Io(e),
            })?;

        // à l'expiration, la future est abandonnée et kill_on_drop tue le fils
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| RacError::TimedOut { timeout: self.timeout })??;

        let execution_time_ms = start_time.elapsed().as_millis() as u64;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(code, %stderr, execution_time_ms, tokens = ?command.tokens(), "rac command failed");
            return Err(RacError::CommandFailed { code, stderr });
        }

        debug!(execution_time_ms, bytes = output.stdout.len(), "rac command completed");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn list<E: Entity>(&self, command: RacCommand) -> Result<Vec<E>, RacError> {
        let output = self.run(&command).await?;
        Ok(map_records(&output)?)
    }
}

impl RacClient for ProcessClient {
    async fn list_clusters(&self) -> Result<Vec<Cluster>, RacError> {
        self.list(RacCommand::cluster_list()).await
    }

    async fn list_infobases(&self, cluster: &str) -> Result<Vec<Infobase>, RacError> {
        self.list(RacCommand::infobase_list(cluster)).await
    }

    async fn list_sessions(&self, cluster: &str) -> Result<Vec<Session>, RacError> {
        self.list(RacCommand::session_list(cluster)).await
    }

    async fn list_processes(&self, cluster: &str) -> Result<Vec<Process>, RacError> {
        self.list(RacCommand::process_list(cluster)).await
    }

    async fn list_connections(&self, cluster: &str) -> Result<Vec<Connection>, RacError> {
        self.list(RacCommand::connection_list(cluster)).await
    }

    async fn list_locks(&self, cluster: &str) -> Result<Vec<Lock>, RacError> {
        self.list(RacCommand::lock_list(cluster)).await
    }

    async fn list_licenses(&self, cluster: &str) -> Result<Vec<License>, RacError> {
        self.list(RacCommand::license_list(cluster)).await
    }
}
