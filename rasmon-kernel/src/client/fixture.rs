use super::{RacClient, RacCommand, RacError};
use crate::mapping::{map_records, Entity};
use crate::models::{Cluster, Connection, Infobase, License, Lock, Process, Session};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

/// Client de rejeu : lit `<dir>/<commande>.txt` au lieu de lancer rac.
/// Même parsing et même mapping que `ProcessClient`.
#[derive(Debug, Clone)]
pub struct FixtureClient {
    data_dir: PathBuf,
}

impl FixtureClient {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    async fn read(&self, command: &RacCommand) -> Result<String, RacError> {
        let file = command.fixture_name();
        let path = self.data_dir.join(&file);
        debug!(path = %path.display(), "reading fixture");

        let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => RacError::FixtureNotFound {
                file,
                dir: self.data_dir.clone(),
            },
            _ => RacError::Io(e),
        })?;
        // même décodage que la sortie standard de rac
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn list<E: Entity>(&self, command: RacCommand) -> Result<Vec<E>, RacError> {
        let text = self.read(&command).await?;
        Ok(map_records(&text)?)
    }
}

impl RacClient for FixtureClient {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coercion::Flag;
    use rasmon_devkit::{FixtureSet, RacOutputBuilder};

    #[tokio::test]
    async fn test_missing_fixture_names_file_and_dir() {
        let fixtures = FixtureSet::new().unwrap();
        let client = FixtureClient::new(fixtures.path());

        let err = client.list_clusters().await.unwrap_err();
        match &err {
            RacError::FixtureNotFound { file, dir } => {
                assert_eq!(file, "cluster_list.txt");
                assert_eq!(dir, fixtures.path());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("cluster_list.txt"));
    }

    #[tokio::test]
    async fn test_reads_each_list_from_its_file() {
        let fixtures = FixtureSet::new().unwrap();
        fixtures
            .write(
                "process_list.txt",
                &RacOutputBuilder::new()
                    .record()
                    .field("process", "p1")
                    .field("host", "srv1c")
                    .field("port", "1560")
                    .field("pid", "3120")
                    .field("running", "yes")
                    .build(),
            )
            .unwrap();
        fixtures
            .write(
                "session_list_licenses.txt",
                &RacOutputBuilder::new()
                    .record()
                    .field("session", "s1")
                    .field("full-presentation", "\"Сервер, 1 шт.\"")
                    .build(),
            )
            .unwrap();

        let client = FixtureClient::new(fixtures.path());
        let processes = client.list_processes("any-cluster").await.unwrap();
        assert_eq!(processes[0].running, Some(Flag::Bool(true)));

        let licenses = client.list_licenses("any-cluster").await.unwrap();
        assert_eq!(licenses[0].full_presentation.as_deref(), Some("Сервер, 1 шт."));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_decoded_lossily() {
        let fixtures = FixtureSet::new().unwrap();
        std::fs::write(
            fixtures.path().join("infobase_summary_list.txt"),
            b"infobase : ib1\nname : caf\xe9\n\n",
        )
        .unwrap();

        let client = FixtureClient::new(fixtures.path());
        let infobases = client.list_infobases("any-cluster").await.unwrap();
        assert_eq!(infobases[0].name, "caf\u{FFFD}");
    }
}
