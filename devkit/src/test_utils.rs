/*!
Test Harness pour le kernel RASMON

Facilite l'écriture de tests avec:
- Un jeu de fixtures temporaire pré-rempli (cluster d'exemple cohérent)
- Suppression / remplacement de fichiers pour simuler des pannes partielles
*/

use crate::fixture_helpers::{
    FixtureSet, CLUSTER_LIST, CONNECTION_LIST, INFOBASE_LIST, LICENSE_LIST, LOCK_LIST,
    PROCESS_LIST, SESSION_LIST,
};
use crate::rac_stub::RacOutputBuilder;
use anyhow::Result;
use chrono::{Duration, Utc};
use std::path::Path;

/// Harness de test : un dossier de fixtures prêt pour `FixtureClient`
pub struct TestHarness {
    fixtures: FixtureSet,
}

impl TestHarness {
    pub const SAMPLE_CLUSTER: &'static str = "0b5a1c2e-7d2f-11ee-8a4c-0242ac120002";
    pub const SECOND_CLUSTER: &'static str = "5c6d7e8f-7d2f-11ee-8a4c-0242ac120003";
    pub const SAMPLE_INFOBASE: &'static str = "6f1a2b3c-7d30-11ee-9b1d-0242ac120002";
    pub const SAMPLE_PROCESS: &'static str = "9e8d7c6b-7d30-11ee-9b1d-0242ac120002";
    pub const SAMPLE_SESSION: &'static str = "a1b2c3d4-7d31-11ee-9b1d-0242ac120002";
    pub const SAMPLE_CONNECTION: &'static str = "d4c3b2a1-7d31-11ee-9b1d-0242ac120002";

    /// Harness vide (aucune fixture)
    pub fn new() -> Result<Self> {
        env_logger::try_init().ok(); // Init logging pour tests

        Ok(Self {
            fixtures: FixtureSet::new()?,
        })
    }

    /// Harness avec les sept fixtures d'un cluster d'exemple
    pub fn with_sample_cluster() -> Result<Self> {
        let harness = Self::new()?;
        for (name, content) in sample_outputs() {
            harness.fixtures.write(name, &content)?;
        }
        log::info!("🏗️ sample cluster fixtures ready in {}", harness.fixtures_dir().display());
        Ok(harness)
    }

    pub fn fixtures(&self) -> &FixtureSet {
        &self.fixtures
    }

    pub fn fixtures_dir(&self) -> &Path {
        self.fixtures.path()
    }

    /// Supprime une fixture pour simuler l'échec d'une commande
    pub fn remove_fixture(&self, name: &str) -> Result<()> {
        self.fixtures.remove(name)
    }

    /// Remplace le contenu d'une fixture
    pub fn replace_fixture(&self, name: &str, content: &str) -> Result<()> {
        self.fixtures.write(name, content).map(|_| ())
    }
}

/// Sortie rac d'exemple : deux clusters, une base, deux sessions, un processus...
pub fn sample_outputs() -> Vec<(&'static str, String)> {
    let now = Utc::now().naive_utc();
    let started = RacOutputBuilder::timestamp(now - Duration::hours(2));
    let active = RacOutputBuilder::timestamp(now - Duration::minutes(1));

    let clusters = RacOutputBuilder::new()
        .cluster(TestHarness::SAMPLE_CLUSTER, "srv1c", 1541, "Главный кластер")
        .field("load-balancing-mode", "performance")
        .cluster(TestHarness::SECOND_CLUSTER, "srv1c-test", 1641, "Test");

    let infobases = RacOutputBuilder::new().infobase(
        TestHarness::SAMPLE_INFOBASE,
        "erp",
        "Бухгалтерия предприятия",
    );

    let sessions = RacOutputBuilder::new()
        .record()
        .field("session", TestHarness::SAMPLE_SESSION)
        .field("session-id", "1")
        .field("infobase", TestHarness::SAMPLE_INFOBASE)
        .field("connection", TestHarness::SAMPLE_CONNECTION)
        .field("process", TestHarness::SAMPLE_PROCESS)
        .field("user-name", "Администратор")
        .field("host", "ws-014")
        .field("app-id", "1CV8C")
        .field("started-at", started.as_str())
        .field("last-active-at", active.as_str())
        .field("bytes-all", "1048576")
        .field("calls-all", "312")
        .record()
        .field("session", "a1b2c3d5-7d31-11ee-9b1d-0242ac120002")
        .field("session-id", "2")
        .field("infobase", TestHarness::SAMPLE_INFOBASE)
        .field("user-name", "")
        .field("host", "srv1c")
        .field("app-id", "BackgroundJob")
        .field("started-at", started.as_str())
        .field("last-active-at", "")
        .field("bytes-all", "0")
        .field("calls-all", "0");

    let processes = RacOutputBuilder::new()
        .record()
        .field("process", TestHarness::SAMPLE_PROCESS)
        .field("host", "srv1c")
        .field("port", "1560")
        .field("pid", "4120")
        .field("turned-on", "yes")
        .field("running", "yes")
        .field("started-at", started.as_str())
        .field("available-perfomance", "187")
        .field("connections", "2");

    let connections = RacOutputBuilder::new()
        .record()
        .field("connection", TestHarness::SAMPLE_CONNECTION)
        .field("conn-id", "14")
        .field("host", "ws-014")
        .field("process", TestHarness::SAMPLE_PROCESS)
        .field("infobase", TestHarness::SAMPLE_INFOBASE)
        .field("application", "\"1CV8C\"")
        .field("connected-at", started.as_str())
        .field("session-number", "1");

    let locks = RacOutputBuilder::new()
        .record()
        .field("connection", TestHarness::SAMPLE_CONNECTION)
        .field("session", TestHarness::SAMPLE_SESSION)
        .field("object", "00000000-0000-0000-0000-000000000000")
        .field("locked", active.as_str())
        .field("descr", "\"БД(сеанс ,erp,разделяемая)\"");

    let licenses = RacOutputBuilder::new()
        .record()
        .field("session", TestHarness::SAMPLE_SESSION)
        .field("user-name", "Администратор")
        .field("host", "ws-014")
        .field("app-id", "1CV8C")
        .field("full-name", "")
        .field("series", "\"8100000000\"")
        .field("issued-by-server", "yes")
        .field("license-type", "soft")
        .field("net", "no")
        .field("full-presentation", "\"Сервер, 8100000000 10 4 2 1\"");

    vec![
        (CLUSTER_LIST, clusters.build()),
        (INFOBASE_LIST, infobases.build()),
        (SESSION_LIST, sessions.build()),
        (PROCESS_LIST, processes.build()),
        (CONNECTION_LIST, connections.build()),
        (LOCK_LIST, locks.build()),
        (LICENSE_LIST, licenses.build()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_cluster_has_every_fixture() {
        let harness = TestHarness::with_sample_cluster().unwrap();
        assert!(harness.fixtures().missing().is_empty());
    }

    #[test]
    fn test_remove_and_replace() {
        let harness = TestHarness::with_sample_cluster().unwrap();
        harness.remove_fixture(LOCK_LIST).unwrap();
        assert_eq!(harness.fixtures().missing(), vec![LOCK_LIST]);

        harness.replace_fixture(LOCK_LIST, "").unwrap();
        assert!(harness.fixtures().missing().is_empty());
    }

    #[test]
    fn test_sample_cluster_listed_first() {
        let (_, clusters) = &sample_outputs()[0];
        let first = clusters.lines().next().unwrap();
        assert!(first.starts_with("cluster"));
        assert!(first.ends_with(TestHarness::SAMPLE_CLUSTER));
    }
}
