/*!
Faux binaire rac pour développement sans serveur RAS

Écrit un script shell exécutable dans un dossier temporaire. Le script enregistre
ses arguments, imprime une sortie préparée et sort avec le code demandé.
Permet de tester le client processus sans cluster 1C réel.
*/

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builder de sortie texte au format rac : blocs `clé : valeur` séparés par une ligne vide
#[derive(Debug, Clone, Default)]
pub struct RacOutputBuilder {
    records: Vec<Vec<(String, String)>>,
}

impl RacOutputBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ouvre un nouvel enregistrement
    pub fn record(mut self) -> Self {
        self.records.push(Vec::new());
        self
    }

    /// Ajoute un champ à l'enregistrement courant (en ouvre un si besoin)
    pub fn field<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        if self.records.is_empty() {
            self.records.push(Vec::new());
        }
        if let Some(current) = self.records.last_mut() {
            current.push((key.into(), value.into()));
        }
        self
    }

    /// Enregistrement `cluster list`
    pub fn cluster(self, uuid: &str, host: &str, port: u16, name: &str) -> Self {
        self.record()
            .field("cluster", uuid)
            .field("host", host)
            .field("port", port.to_string())
            .field("name", format!("\"{}\"", name))
            .field("expiration-timeout", "60")
            .field("lifetime-limit", "0")
    }

    /// Enregistrement `infobase summary list`
    pub fn infobase(self, uuid: &str, name: &str, descr: &str) -> Self {
        self.record()
            .field("infobase", uuid)
            .field("name", name)
            .field("descr", format!("\"{}\"", descr))
    }

    /// Formate un horodatage comme rac (ISO-8601 sans décalage)
    pub fn timestamp(at: chrono::NaiveDateTime) -> String {
        at.format("%Y-%m-%dT%H:%M:%S").to_string()
    }

    /// Texte final, clés alignées comme dans la vraie sortie de rac
    pub fn build(&self) -> String {
        let mut out = String::new();
        for record in self.records.iter().filter(|r| !r.is_empty()) {
            for (key, value) in record {
                out.push_str(&format!("{:<28}: {}\n", key, value));
            }
            out.push('\n');
        }
        out
    }
}

/// Script rac factice dans un dossier temporaire
pub struct RacStub {
    dir: TempDir,
    path: PathBuf,
}

impl RacStub {
    /// Stub qui imprime `stdout` et sort avec le code 0
    pub fn replying(stdout: &str) -> Result<Self> {
        Self::scripted(stdout, "", 0)
    }

    /// Stub qui écrit `stderr` et sort avec `code`
    pub fn failing(code: i32, stderr: &str) -> Result<Self> {
        Self::scripted("", stderr, code)
    }

    /// Stub qui ne répond pas avant `seconds` secondes
    pub fn sleeping(seconds: u64) -> Result<Self> {
        Self::create(&format!("#!/bin/sh\nexec sleep {}\n", seconds))
    }

    fn scripted(stdout: &str, stderr: &str, code: i32) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("stdout.txt"), stdout)?;
        std::fs::write(dir.path().join("stderr.txt"), stderr)?;

        let d = dir.path().display();
        let script = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$*\" > '{d}/args.txt'\ncat '{d}/stdout.txt'\ncat '{d}/stderr.txt' >&2\nexit {code}\n"
        );
        Self::install(dir, &script)
    }

    fn create(script: &str) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        Self::install(dir, script)
    }

    fn install(dir: TempDir, script: &str) -> Result<Self> {
        let path = dir.path().join("rac");
        std::fs::write(&path, script).context("failed to write rac stub")?;
        make_executable(&path)?;
        log::debug!("🧪 rac stub installed at {}", path.display());
        Ok(Self { dir, path })
    }

    /// Chemin du binaire factice, à passer comme `rac_path`
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Arguments de la dernière invocation, séparés par des espaces
    pub fn last_args(&self) -> Result<String> {
        let args = std::fs::read_to_string(self.dir.path().join("args.txt"))
            .context("rac stub was never invoked")?;
        Ok(args.trim_end().to_string())
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    anyhow::bail!("rac stub requires a unix shell")
}
