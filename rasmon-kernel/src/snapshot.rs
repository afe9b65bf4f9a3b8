/*!
 * SNAPSHOT - Orchestration d'un cycle de polling
 *
 * FONCTIONNEMENT (strictement séquentiel, sans retry) :
 * 1. Résolution du cluster : uuid configuré, sinon premier de `cluster list`
 * 2. Relecture de `cluster list` et recherche de l'entrée correspondante
 * 3. Six listes dans l'ordre : infobases, sessions, connexions, processus, verrous, licences
 * 4. Assemblage du `Snapshot`
 *
 * La première erreur interrompt tout : jamais de snapshot partiel.
 */

use crate::client::{RacClient, RacError};
use crate::config::Settings;
use crate::models::Snapshot;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("No clusters found")]
    NoClusters,
    #[error("Cluster not found: {0}")]
    ClusterNotFound(String),
    #[error(transparent)]
    Upstream(#[from] RacError),
}

/// Classe d'échec, indépendante du transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// aucun cluster, ou cluster demandé absent
    NotFound,
    /// sortie rac acquise mais non conforme
    Validation,
    /// binaire ou fixture manquant, timeout, code retour non nul
    Upstream,
}

impl SnapshotError {
    pub fn class(&self) -> FailureClass {
        match self {
            SnapshotError::NoClusters | SnapshotError::ClusterNotFound(_) => FailureClass::NotFound,
            SnapshotError::Upstream(e) if e.is_validation() => FailureClass::Validation,
            SnapshotError::Upstream(_) => FailureClass::Upstream,
        }
    }
}

/// Collecteur de snapshots au-dessus d'un `RacClient` choisi à la configuration.
#[derive(Debug, Clone)]
pub struct SnapshotCollector<C> {
    client: C,
    preferred_cluster: Option<String>,
}

impl<C: RacClient> SnapshotCollector<C> {
    pub fn new(client: C, preferred_cluster: Option<String>) -> Self {
        Self {
            client,
            preferred_cluster,
        }
    }

    pub fn from_settings(client: C, settings: &Settings) -> Self {
        Self::new(client, settings.cluster_uuid.clone())
    }

    /// Étape 1 : uuid configuré, sinon premier cluster listé.
    pub async fn resolve_cluster_uuid(&self) -> Result<String, SnapshotError> {
        if let Some(uuid) = &self.preferred_cluster {
            return Ok(uuid.clone());
        }
        let clusters = self.client.list_clusters().await?;
        clusters
            .into_iter()
            .next()
            .map(|c| c.uuid)
            .ok_or(SnapshotError::NoClusters)
    }

    /// Cycle complet. Chaque appel produit un snapshot neuf, rien n'est mis en cache.
    pub async fn collect(&self) -> Result<Snapshot, SnapshotError> {
        let span = tracing::info_span!("snapshot", request_id = %Uuid::new_v4());
        self.collect_inner().instrument(span).await
    }

    async fn collect_inner(&self) -> Result<Snapshot, SnapshotError> {
        let cluster_uuid = self.resolve_cluster_uuid().await?;
        debug!(%cluster_uuid, "cluster resolved");

        let cluster = self
            .client
            .list_clusters()
            .await?
            .into_iter()
            .find(|c| c.uuid == cluster_uuid)
            .ok_or_else(|| SnapshotError::ClusterNotFound(cluster_uuid.clone()))?;

        let lists = self.fetch_lists(&cluster_uuid).await;
        let snapshot = match lists {
            Ok(snapshot) => Snapshot {
                cluster: Some(cluster),
                ..snapshot
            },
            Err(e) => {
                warn!(%cluster_uuid, error = %e, "snapshot aborted");
                return Err(e.into());
            }
        };

        info!(
            %cluster_uuid,
            infobases = snapshot.infobases.len(),
            sessions = snapshot.sessions.len(),
            connections = snapshot.connections.len(),
            processes = snapshot.processes.len(),
            locks = snapshot.locks.len(),
            licenses = snapshot.licenses.len(),
            "snapshot collected"
        );
        Ok(snapshot)
    }

    /// Étape 3 : les six listes, dans l'ordre ; la première erreur abandonne les suivantes.
    async fn fetch_lists(&self, cluster: &str) -> Result<Snapshot, RacError> {
        let infobases = self.client.list_infobases(cluster).await?;
        let sessions = self.client.list_sessions(cluster).await?;
        let connections = self.client.list_connections(cluster).await?;
        let processes = self.client.list_processes(cluster).await?;
        let locks = self.client.list_locks(cluster).await?;
        let licenses = self.client.list_licenses(cluster).await?;

        Ok(Snapshot {
            cluster: None,
            infobases,
            sessions,
            connections,
            processes,
            locks,
            licenses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FixtureClient;
    use crate::mapping::MappingError;
    use crate::models::{Cluster, Connection, Infobase, License, Lock, Process, Session};
    use parking_lot::Mutex;
    use rasmon_devkit::TestHarness;
    use std::sync::Arc;

    /// Client scripté : enregistre chaque appel et échoue sur l'opération demandée.
    #[derive(Clone, Default)]
    struct ScriptedClient {
        clusters: Vec<Cluster>,
        fail_on: Option<&'static str>,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl ScriptedClient {
        fn with_clusters(uuids: &[&str]) -> Self {
            Self {
                clusters: uuids.iter().map(|u| cluster(u)).collect(),
                ..Self::default()
            }
        }

        fn failing_on(mut self, op: &'static str) -> Self {
            self.fail_on = Some(op);
            self
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().clone()
        }

        fn record<T>(&self, op: &'static str, value: Vec<T>) -> Result<Vec<T>, RacError> {
            self.calls.lock().push(op);
            if self.fail_on == Some(op) {
                return Err(RacError::CommandFailed {
                    code: 1,
                    stderr: format!("{op} exploded"),
                });
            }
            Ok(value)
        }
    }

    fn cluster(uuid: &str) -> Cluster {
        Cluster {
            uuid: uuid.into(),
            host: "srv1c".into(),
            port: 1541,
            name: format!("cluster {uuid}"),
            load_balancing_mode: None,
        }
    }

    impl RacClient for ScriptedClient {
        async fn list_clusters(&self) -> Result<Vec<Cluster>, RacError> {
            self.record("clusters", self.clusters.clone())
        }

        async fn list_infobases(&self, _cluster: &str) -> Result<Vec<Infobase>, RacError> {
            let ib = Infobase {
                uuid: "ib1".into(),
                name: "erp".into(),
                descr: None,
            };
            self.record("infobases", vec![ib])
        }

        async fn list_sessions(&self, _cluster: &str) -> Result<Vec<Session>, RacError> {
            self.record("sessions", Vec::new())
        }

        async fn list_connections(&self, _cluster: &str) -> Result<Vec<Connection>, RacError> {
            self.record("connections", Vec::new())
        }

        async fn list_processes(&self, _cluster: &str) -> Result<Vec<Process>, RacError> {
            self.record("processes", Vec::new())
        }

        async fn list_locks(&self, _cluster: &str) -> Result<Vec<Lock>, RacError> {
            self.record("locks", Vec::new())
        }

        async fn list_licenses(&self, _cluster: &str) -> Result<Vec<License>, RacError> {
            self.record("licenses", Vec::new())
        }
    }

    #[tokio::test]
    async fn test_resolution_with_empty_list_is_not_found() {
        let collector = SnapshotCollector::new(ScriptedClient::default(), None);
        let err = collector.resolve_cluster_uuid().await.unwrap_err();
        assert!(matches!(err, SnapshotError::NoClusters));
        assert_eq!(err.class(), FailureClass::NotFound);
    }

    #[tokio::test]
    async fn test_resolution_takes_first_cluster() {
        let collector = SnapshotCollector::new(ScriptedClient::with_clusters(&["c1", "c2"]), None);
        assert_eq!(collector.resolve_cluster_uuid().await.unwrap(), "c1");
    }

    #[tokio::test]
    async fn test_preferred_cluster_skips_listing() {
        let client = ScriptedClient::with_clusters(&["c1", "c2"]);
        let collector = SnapshotCollector::new(client.clone(), Some("c2".into()));
        assert_eq!(collector.resolve_cluster_uuid().await.unwrap(), "c2");
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_full_sequence_order() {
        let client = ScriptedClient::with_clusters(&["c1"]);
        let snapshot = SnapshotCollector::new(client.clone(), None).collect().await.unwrap();

        assert_eq!(snapshot.cluster.unwrap().uuid, "c1");
        assert_eq!(snapshot.infobases.len(), 1);
        assert_eq!(
            client.calls(),
            vec![
                "clusters",
                "clusters",
                "infobases",
                "sessions",
                "connections",
                "processes",
                "locks",
                "licenses"
            ]
        );
    }

    #[tokio::test]
    async fn test_preferred_cluster_not_in_list() {
        let client = ScriptedClient::with_clusters(&["c1"]);
        let err = SnapshotCollector::new(client.clone(), Some("zz".into()))
            .collect()
            .await
            .unwrap_err();
        assert!(matches!(err, SnapshotError::ClusterNotFound(ref u) if u == "zz"));
        assert_eq!(err.class(), FailureClass::NotFound);
        assert_eq!(client.calls(), vec!["clusters"]);
    }

    #[tokio::test]
    async fn test_fourth_fetch_failure_aborts_remaining() {
        let client = ScriptedClient::with_clusters(&["c1"]).failing_on("processes");
        let err = SnapshotCollector::new(client.clone(), None)
            .collect()
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "rac command failed (1): processes exploded");
        assert_eq!(err.class(), FailureClass::Upstream);
        let calls = client.calls();
        assert_eq!(calls.last(), Some(&"processes"));
        assert!(!calls.contains(&"locks"));
        assert!(!calls.contains(&"licenses"));
    }

    #[tokio::test]
    async fn test_cluster_listing_failure_is_upstream() {
        let client = ScriptedClient::with_clusters(&["c1"]).failing_on("clusters");
        let err = SnapshotCollector::new(client, Some("c1".into()))
            .collect()
            .await
            .unwrap_err();
        assert!(matches!(err, SnapshotError::Upstream(_)));
        assert_eq!(err.class(), FailureClass::Upstream);
    }

    #[test]
    fn test_validation_errors_have_their_own_class() {
        let err = SnapshotError::from(RacError::from(MappingError::MissingField {
            shape: "Session",
            field: "infobase",
        }));
        assert_eq!(err.class(), FailureClass::Validation);
    }

    #[tokio::test]
    async fn test_fixture_snapshot_is_idempotent() {
        let harness = TestHarness::with_sample_cluster().unwrap();
        let collector = SnapshotCollector::new(FixtureClient::new(harness.fixtures_dir()), None);

        let first = collector.collect().await.unwrap();
        let second = collector.collect().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.cluster.as_ref().map(|c| c.uuid.as_str()),
            Some(TestHarness::SAMPLE_CLUSTER)
        );
        assert!(!first.sessions.is_empty());
        assert!(!first.licenses.is_empty());
    }

    #[tokio::test]
    async fn test_fixture_missing_list_fails_whole_snapshot() {
        let harness = TestHarness::with_sample_cluster().unwrap();
        harness.remove_fixture("lock_list.txt").unwrap();
        let collector = SnapshotCollector::new(FixtureClient::new(harness.fixtures_dir()), None);

        let err = collector.collect().await.unwrap_err();
        assert!(matches!(
            err,
            SnapshotError::Upstream(RacError::FixtureNotFound { ref file, .. }) if file == "lock_list.txt"
        ));
    }
}
