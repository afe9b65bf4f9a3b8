/*!
 * ENTITY MAPPER - Projection des enregistrements bruts sur les entités typées
 *
 * RÔLE :
 * Chaque entité déclare une table d'alias explicite : attribut canonique -> clé
 * brute émise par rac (`started-at`, `turned-on`...), avec le caractère requis.
 *
 * RÈGLES :
 * - Clé brute inconnue de la table = ignorée
 * - Clé requise absente = `MappingError::MissingField` (fatal pour la liste)
 * - Nombre illisible = `MappingError::InvalidNumber` (fatal aussi)
 * - Horodatage / booléen illisible = jamais d'erreur (voir `coercion`)
 */

use crate::coercion::{normalize_bool, parse_timestamp, Flag, Timestamp};
use crate::models::{Cluster, Connection, Infobase, License, Lock, Process, Session};
use crate::parser::{records, Record};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("{shape}: required field '{field}' is missing")]
    MissingField {
        shape: &'static str,
        field: &'static str,
    },
    #[error("{shape}: field '{field}' is not a valid number: {value:?}")]
    InvalidNumber {
        shape: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("{shape}: no alias declared for attribute '{attr}'")]
    UnknownAttribute {
        shape: &'static str,
        attr: &'static str,
    },
}

/// Attribut canonique -> clé brute rac.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alias {
    pub attr: &'static str,
    pub key: &'static str,
    pub required: bool,
}

const fn required(attr: &'static str, key: &'static str) -> Alias {
    Alias { attr, key, required: true }
}

const fn optional(attr: &'static str, key: &'static str) -> Alias {
    Alias { attr, key, required: false }
}

/// Table d'alias d'une forme d'entité.
#[derive(Debug)]
pub struct AliasTable {
    pub shape: &'static str,
    pub aliases: &'static [Alias],
}

impl AliasTable {
    pub fn alias(&self, attr: &str) -> Option<&Alias> {
        self.aliases.iter().find(|a| a.attr == attr)
    }

    pub fn required_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.aliases.iter().filter(|a| a.required).map(|a| a.key)
    }

    /// Vérifie la présence de toutes les clés requises, dans l'ordre de la table.
    pub fn check_required(&self, record: &Record) -> Result<(), MappingError> {
        match self.required_keys().find(|key| record.get(key).is_none()) {
            Some(field) => Err(MappingError::MissingField { shape: self.shape, field }),
            None => Ok(()),
        }
    }
}

pub const CLUSTER_ALIASES: AliasTable = AliasTable {
    shape: "Cluster",
    aliases: &[
        required("uuid", "cluster"),
        required("host", "host"),
        required("port", "port"),
        required("name", "name"),
        optional("load_balancing_mode", "load-balancing-mode"),
    ],
};

pub const INFOBASE_ALIASES: AliasTable = AliasTable {
    shape: "Infobase",
    aliases: &[
        required("uuid", "infobase"),
        required("name", "name"),
        optional("descr", "descr"),
    ],
};

pub const SESSION_ALIASES: AliasTable = AliasTable {
    shape: "Session",
    aliases: &[
        required("uuid", "session"),
        optional("session_id", "session-id"),
        required("infobase", "infobase"),
        optional("user_name", "user-name"),
        optional("host", "host"),
        optional("app_id", "app-id"),
        optional("started_at", "started-at"),
        optional("last_active_at", "last-active-at"),
        optional("bytes_all", "bytes-all"),
        optional("calls_all", "calls-all"),
    ],
};

pub const PROCESS_ALIASES: AliasTable = AliasTable {
    shape: "Process",
    aliases: &[
        required("uuid", "process"),
        required("host", "host"),
        required("port", "port"),
        required("pid", "pid"),
        optional("turned_on", "turned-on"),
        optional("running", "running"),
        optional("available_perfomance", "available-perfomance"),
        optional("connections", "connections"),
    ],
};

pub const CONNECTION_ALIASES: AliasTable = AliasTable {
    shape: "Connection",
    aliases: &[
        required("uuid", "connection"),
        optional("conn_id", "conn-id"),
        required("host", "host"),
        required("process", "process"),
        required("infobase", "infobase"),
        optional("application", "application"),
        optional("connected_at", "connected-at"),
    ],
};

pub const LOCK_ALIASES: AliasTable = AliasTable {
    shape: "Lock",
    aliases: &[
        required("connection", "connection"),
        required("session", "session"),
        required("object", "object"),
        optional("locked", "locked"),
        optional("descr", "descr"),
    ],
};

pub const LICENSE_ALIASES: AliasTable = AliasTable {
    shape: "License",
    aliases: &[
        required("session", "session"),
        optional("user_name", "user-name"),
        optional("host", "host"),
        optional("app_id", "app-id"),
        optional("series", "series"),
        optional("license_type", "license-type"),
        optional("issued_by_server", "issued-by-server"),
        optional("full_presentation", "full-presentation"),
    ],
};

/// Lecture d'un `Record` à travers la table d'alias d'une entité.
pub struct FieldReader<'a> {
    record: &'a Record,
    table: &'static AliasTable,
}

impl<'a> FieldReader<'a> {
    pub fn new(record: &'a Record, table: &'static AliasTable) -> Self {
        Self { record, table }
    }

    fn lookup(&self, attr: &'static str) -> Result<(&'static str, Option<&'a str>), MappingError> {
        let alias = self.table.alias(attr).ok_or(MappingError::UnknownAttribute {
            shape: self.table.shape,
            attr,
        })?;
        Ok((alias.key, self.record.get(alias.key)))
    }

    pub fn required(&self, attr: &'static str) -> Result<String, MappingError> {
        match self.lookup(attr)? {
            (_, Some(value)) => Ok(value.to_string()),
            (field, None) => Err(MappingError::MissingField { shape: self.table.shape, field }),
        }
    }

    pub fn optional(&self, attr: &'static str) -> Result<Option<String>, MappingError> {
        Ok(self.lookup(attr)?.1.map(str::to_string))
    }

    pub fn required_number<T: FromStr>(&self, attr: &'static str) -> Result<T, MappingError> {
        let value = self.required(attr)?;
        self.number(attr, &value)
    }

    /// Une valeur vide est traitée comme absente (rac imprime des compteurs vides).
    pub fn optional_number<T: FromStr>(&self, attr: &'static str) -> Result<Option<T>, MappingError> {
        match self.lookup(attr)?.1.filter(|v| !v.is_empty()) {
            Some(value) => self.number(attr, value).map(Some),
            None => Ok(None),
        }
    }

    pub fn optional_timestamp(&self, attr: &'static str) -> Result<Option<Timestamp>, MappingError> {
        Ok(parse_timestamp(self.lookup(attr)?.1))
    }

    pub fn optional_flag(&self, attr: &'static str) -> Result<Option<Flag>, MappingError> {
        Ok(self.lookup(attr)?.1.filter(|v| !v.is_empty()).map(normalize_bool))
    }

    fn number<T: FromStr>(&self, attr: &'static str, value: &str) -> Result<T, MappingError> {
        let (field, _) = self.lookup(attr)?;
        value.trim().parse().map_err(|_| MappingError::InvalidNumber {
            shape: self.table.shape,
            field,
            value: value.to_string(),
        })
    }
}

/// Forme d'entité : sa table d'alias et sa construction depuis un `FieldReader`.
pub trait Entity: Sized {
    const ALIASES: &'static AliasTable;

    fn from_fields(fields: &FieldReader<'_>) -> Result<Self, MappingError>;
}

pub fn map_record<E: Entity>(record: &Record) -> Result<E, MappingError> {
    E::ALIASES.check_required(record)?;
    E::from_fields(&FieldReader::new(record, E::ALIASES))
}

/// Parse `text` puis projette chaque enregistrement ; la première erreur interrompt tout.
pub fn map_records<E: Entity>(text: &str) -> Result<Vec<E>, MappingError> {
    records(text).map(|record| map_record(&record)).collect()
}

impl Entity for Cluster {
    const ALIASES: &'static AliasTable = &CLUSTER_ALIASES;

    fn from_fields(f: &FieldReader<'_>) -> Result<Self, MappingError> {
        Ok(Cluster {
            uuid: f.required("uuid")?,
            host: f.required("host")?,
            port: f.required_number("port")?,
            name: f.required("name")?,
            load_balancing_mode: f.optional("load_balancing_mode")?,
        })
    }
}

impl Entity for Infobase {
    const ALIASES: &'static AliasTable = &INFOBASE_ALIASES;

    fn from_fields(f: &FieldReader<'_>) -> Result<Self, MappingError> {
        Ok(Infobase {
            uuid: f.required("uuid")?,
            name: f.required("name")?,
            descr: f.optional("descr")?,
        })
    }
}

impl Entity for Session {
    const ALIASES: &'static AliasTable = &SESSION_ALIASES;

    fn from_fields(f: &FieldReader<'_>) -> Result<Self, MappingError> {
        Ok(Session {
            uuid: f.required("uuid")?,
            session_id: f.optional_number("session_id")?,
            infobase: f.required("infobase")?,
            user_name: f.optional("user_name")?,
            host: f.optional("host")?,
            app_id: f.optional("app_id")?,
            started_at: f.optional_timestamp("started_at")?,
            last_active_at: f.optional_timestamp("last_active_at")?,
            bytes_all: f.optional_number("bytes_all")?,
            calls_all: f.optional_number("calls_all")?,
        })
    }
}

impl Entity for Process {
    const ALIASES: &'static AliasTable = &PROCESS_ALIASES;

    fn from_fields(f: &FieldReader<'_>) -> Result<Self, MappingError> {
        Ok(Process {
            uuid: f.required("uuid")?,
            host: f.required("host")?,
            port: f.required_number("port")?,
            pid: f.required_number("pid")?,
            turned_on: f.optional_flag("turned_on")?,
            running: f.optional_flag("running")?,
            available_perfomance: f.optional_number("available_perfomance")?,
            connections: f.optional_number("connections")?,
        })
    }
}

impl Entity for Connection {
    const ALIASES: &'static AliasTable = &CONNECTION_ALIASES;

    fn from_fields(f: &FieldReader<'_>) -> Result<Self, MappingError> {
        Ok(Connection {
            uuid: f.required("uuid")?,
            conn_id: f.optional_number("conn_id")?,
            host: f.required("host")?,
            process: f.required("process")?,
            infobase: f.required("infobase")?,
            application: f.optional("application")?,
            connected_at: f.optional_timestamp("connected_at")?,
        })
    }
}

impl Entity for Lock {
    const ALIASES: &'static AliasTable = &LOCK_ALIASES;

    fn from_fields(f: &FieldReader<'_>) -> Result<Self, MappingError> {
        Ok(Lock {
            connection: f.required("connection")?,
            session: f.required("session")?,
            object: f.required("object")?,
            locked: f.optional_timestamp("locked")?,
            descr: f.optional("descr")?,
        })
    }
}

impl Entity for License {
    const ALIASES: &'static AliasTable = &LICENSE_ALIASES;

    fn from_fields(f: &FieldReader<'_>) -> Result<Self, MappingError> {
        Ok(License {
            session: f.required("session")?,
            user_name: f.optional("user_name")?,
            host: f.optional("host")?,
            app_id: f.optional("app_id")?,
            series: f.optional("series")?,
            license_type: f.optional("license_type")?,
            issued_by_server: f.optional_flag("issued_by_server")?,
            full_presentation: f.optional("full_presentation")?,
        })
    }
}
