use crate::coercion::{Flag, Timestamp};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub uuid: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub load_balancing_mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Infobase {
    pub uuid: String,
    pub name: String,
    pub descr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub uuid: String,
    pub session_id: Option<i64>,
    pub infobase: String,
    pub user_name: Option<String>,
    pub host: Option<String>,
    pub app_id: Option<String>,
    pub started_at: Option<Timestamp>,
    pub last_active_at: Option<Timestamp>,
    pub bytes_all: Option<i64>,
    pub calls_all: Option<i64>,
}

/// Processus de travail (rphost) du cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Process {
    pub uuid: String,
    pub host: String,
    pub port: u16,
    pub pid: u32,
    pub turned_on: Option<Flag>,
    pub running: Option<Flag>,
    // orthographe de rac conservée
    pub available_perfomance: Option<i64>,
    pub connections: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    pub uuid: String,
    pub conn_id: Option<i64>,
    pub host: String,
    pub process: String,
    pub infobase: String,
    pub application: Option<String>,
    pub connected_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lock {
    pub connection: String,
    pub session: String,
    pub object: String,
    pub locked: Option<Timestamp>,
    pub descr: Option<String>,
}

/// Licence consommée par une session (`session list --licenses`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct License {
    pub session: String,
    pub user_name: Option<String>,
    pub host: Option<String>,
    pub app_id: Option<String>,
    pub series: Option<String>,
    pub license_type: Option<String>,
    pub issued_by_server: Option<Flag>,
    pub full_presentation: Option<String>,
}

/// Résultat agrégé d'un cycle de polling : un cluster + six listes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub cluster: Option<Cluster>,
    pub infobases: Vec<Infobase>,
    pub sessions: Vec<Session>,
    pub connections: Vec<Connection>,
    pub processes: Vec<Process>,
    pub locks: Vec<Lock>,
    pub licenses: Vec<License>,
}
