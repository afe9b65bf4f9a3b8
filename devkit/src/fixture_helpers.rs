/*!
Helpers pour préparer des fixtures rac (mode rejeu)

Un jeu de fixtures est un dossier contenant un fichier texte par commande rac,
nommé `<tokens joints par _>[_licenses].txt` :
- cluster_list.txt, infobase_summary_list.txt, session_list.txt ...
- session_list_licenses.txt pour `session list --licenses`
*/

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const CLUSTER_LIST: &str = "cluster_list.txt";
pub const INFOBASE_LIST: &str = "infobase_summary_list.txt";
pub const SESSION_LIST: &str = "session_list.txt";
pub const PROCESS_LIST: &str = "process_list.txt";
pub const CONNECTION_LIST: &str = "connection_list.txt";
pub const LOCK_LIST: &str = "lock_list.txt";
pub const LICENSE_LIST: &str = "session_list_licenses.txt";

/// Les sept fichiers attendus par un snapshot complet
pub const ALL_FIXTURES: [&str; 7] = [
    CLUSTER_LIST,
    INFOBASE_LIST,
    SESSION_LIST,
    PROCESS_LIST,
    CONNECTION_LIST,
    LOCK_LIST,
    LICENSE_LIST,
];

/// Dossier temporaire de fixtures, supprimé à la destruction
pub struct FixtureSet {
    dir: TempDir,
}

impl FixtureSet {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("failed to create fixture dir")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Écrit (ou remplace) un fichier de fixture
    pub fn write(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write fixture {}", name))?;
        log::debug!("📄 fixture written: {}", name);
        Ok(path)
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        std::fs::remove_file(self.dir.path().join(name))
            .with_context(|| format!("failed to remove fixture {}", name))
    }

    /// Copie tous les `.txt` d'un dossier de captures existant
    pub fn copy_from<P: AsRef<Path>>(&self, captures: P) -> Result<usize> {
        let mut count = 0;
        for entry in std::fs::read_dir(captures.as_ref())? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("txt") {
                continue;
            }
            if let Some(name) = path.file_name() {
                std::fs::copy(&path, self.dir.path().join(name))?;
                count += 1;
            }
        }
        log::info!("📚 copied {} captures from {}", count, captures.as_ref().display());
        Ok(count)
    }

    /// Fixtures manquantes parmi les sept attendues
    pub fn missing(&self) -> Vec<&'static str> {
        ALL_FIXTURES
            .iter()
            .copied()
            .filter(|name| !self.dir.path().join(name).exists())
            .collect()
    }
}
