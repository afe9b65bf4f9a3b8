/*!
 * CLIENTS RAC - Interface commune d'acquisition des listes du cluster
 *
 * RÔLE :
 * `RacClient` expose les sept opérations de liste consommées par le snapshot.
 * Deux implémentations indépendantes, qui ne diffèrent que par l'acquisition du texte :
 * - `ProcessClient` : lance le vrai binaire rac avec un timeout par invocation
 * - `FixtureClient` : relit des captures texte depuis un dossier (mode rejeu)
 *
 * Le choix se fait une fois, à la configuration ; aucun des deux ne connaît l'autre.
 */

mod fixture;
mod process;

pub use fixture::FixtureClient;
pub use process::ProcessClient;

use crate::mapping::MappingError;
use crate::models::{Cluster, Connection, Infobase, License, Lock, Process, Session};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

/// Erreurs d'acquisition (binaire, fixture, timeout, code retour) et de validation.
#[derive(Debug, thiserror::Error)]
pub enum RacError {
    #[error("rac binary not found at {}", .path.display())]
    BinaryNotFound { path: PathBuf },
    #[error("fake data file {file} not found in {}", .dir.display())]
    FixtureNotFound { file: String, dir: PathBuf },
    #[error("rac command timed out after {timeout:?}")]
    TimedOut { timeout: Duration },
    #[error("rac command failed ({code}): {stderr}")]
    CommandFailed { code: i32, stderr: String },
    #[error("rac I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid rac output: {0}")]
    Mapping(#[from] MappingError),
}

impl RacError {
    /// Vrai pour une sortie acquise mais non conforme (champ requis absent, nombre illisible).
    pub fn is_validation(&self) -> bool {
        matches!(self, RacError::Mapping(_))
    }
}

const CLUSTER_LIST: &[&str] = &["cluster", "list"];
const INFOBASE_LIST: &[&str] = &["infobase", "summary", "list"];
const SESSION_LIST: &[&str] = &["session", "list"];
const PROCESS_LIST: &[&str] = &["process", "list"];
const CONNECTION_LIST: &[&str] = &["connection", "list"];
const LOCK_LIST: &[&str] = &["lock", "list"];

/// Une invocation rac : commande + sous-commande, sélecteur de cluster, option `--licenses`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RacCommand {
    tokens: &'static [&'static str],
    cluster: Option<String>,
    licenses: bool,
}

impl RacCommand {
    fn scoped(tokens: &'static [&'static str], cluster: &str) -> Self {
        Self {
            tokens,
            cluster: Some(cluster.to_string()),
            licenses: false,
        }
    }

    pub fn cluster_list() -> Self {
        Self {
            tokens: CLUSTER_LIST,
            cluster: None,
            licenses: false,
        }
    }

    pub fn infobase_list(cluster: &str) -> Self {
        Self::scoped(INFOBASE_LIST, cluster)
    }

    pub fn session_list(cluster: &str) -> Self {
        Self::scoped(SESSION_LIST, cluster)
    }

    pub fn process_list(cluster: &str) -> Self {
        Self::scoped(PROCESS_LIST, cluster)
    }

    pub fn connection_list(cluster: &str) -> Self {
        Self::scoped(CONNECTION_LIST, cluster)
    }

    pub fn lock_list(cluster: &str) -> Self {
        Self::scoped(LOCK_LIST, cluster)
    }

    /// `session list --cluster <uuid> --licenses`
    pub fn license_list(cluster: &str) -> Self {
        Self {
            licenses: true,
            ..Self::scoped(SESSION_LIST, cluster)
        }
    }

    pub fn tokens(&self) -> &'static [&'static str] {
        self.tokens
    }

    /// Arguments sans l'adresse RAS : `[tokens..., --cluster, <uuid>, --licenses]`.
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = self.tokens.iter().map(|t| t.to_string()).collect();
        if let Some(cluster) = &self.cluster {
            args.push("--cluster".into());
            args.push(cluster.clone());
        }
        if self.licenses {
            args.push("--licenses".into());
        }
        args
    }

    /// Nom de fichier de rejeu : tokens joints par `_`, suffixe `_licenses` si demandé.
    /// Le sélecteur de cluster n'entre pas dans le nom.
    pub fn fixture_name(&self) -> String {
        let mut name = self.tokens.join("_");
        if self.licenses {
            name.push_str("_licenses");
        }
        name.push_str(".txt");
        name
    }
}

/// Les sept listes du cluster. Les futures sont `Send` pour être servies par axum.
pub trait RacClient: Send + Sync {
    fn list_clusters(&self) -> impl Future<Output = Result<Vec<Cluster>, RacError>> + Send;

    fn list_infobases(&self, cluster: &str) -> impl Future<Output = Result<Vec<Infobase>, RacError>> + Send;

    fn list_sessions(&self, cluster: &str) -> impl Future<Output = Result<Vec<Session>, RacError>> + Send;

    fn list_processes(&self, cluster: &str) -> impl Future<Output = Result<Vec<Process>, RacError>> + Send;

    fn list_connections(&self, cluster: &str) -> impl Future<Output = Result<Vec<Connection>, RacError>> + Send;

    fn list_locks(&self, cluster: &str) -> impl Future<Output = Result<Vec<Lock>, RacError>> + Send;

    fn list_licenses(&self, cluster: &str) -> impl Future<Output = Result<Vec<License>, RacError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_name_with_licenses() {
        let cmd = RacCommand::license_list("0b8f6e3a-1111-2222-3333-444455556666");
        assert_eq!(cmd.tokens(), &["session", "list"]);
        assert_eq!(cmd.fixture_name(), "session_list_licenses.txt");
    }

    #[test]
    fn test_fixture_name_without_licenses() {
        assert_eq!(RacCommand::session_list("uuid").fixture_name(), "session_list.txt");
        assert_eq!(RacCommand::infobase_list("uuid").fixture_name(), "infobase_summary_list.txt");
        assert_eq!(RacCommand::cluster_list().fixture_name(), "cluster_list.txt");
    }

    #[test]
    fn test_args_order() {
        assert_eq!(RacCommand::cluster_list().args(), vec!["cluster", "list"]);
        assert_eq!(
            RacCommand::license_list("c1").args(),
            vec!["session", "list", "--cluster", "c1", "--licenses"]
        );
        assert_eq!(
            RacCommand::lock_list("c1").args(),
            vec!["lock", "list", "--cluster", "c1"]
        );
    }

    #[test]
    fn test_error_messages() {
        let err = RacError::TimedOut { timeout: Duration::from_secs(10) };
        assert_eq!(err.to_string(), "rac command timed out after 10s");

        let err = RacError::CommandFailed { code: 255, stderr: "Cluster not found".into() };
        assert_eq!(err.to_string(), "rac command failed (255): Cluster not found");

        let err = RacError::BinaryNotFound { path: PathBuf::from("/opt/rac") };
        assert_eq!(err.to_string(), "rac binary not found at /opt/rac");
        assert!(!err.is_validation());
    }
}
