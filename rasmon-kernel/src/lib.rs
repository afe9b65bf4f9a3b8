/*!
 * RASMON KERNEL - Supervision d'un cluster 1C via l'outil d'administration rac
 *
 * Chaîne de traitement : orchestrateur -> client -> parser -> coercion -> mapping -> snapshot.
 */

pub mod client;
pub mod coercion;
pub mod config;
pub mod http;
pub mod mapping;
pub mod models;
pub mod parser;
pub mod snapshot;
pub mod state;
