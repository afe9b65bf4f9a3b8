/*!
 * FIELD COERCION - Normalisation des valeurs brutes de rac
 *
 * Booléens et horodatages uniquement. Rien ici ne renvoie d'erreur :
 * un jeton inconnu repasse tel quel, une date illisible devient absente.
 */

use serde::{Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};
use tracing::debug;

/// Résultat de la normalisation booléenne.
/// `Raw` conserve un jeton que rac a émis mais qui n'est pas un booléen reconnu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Raw(String),
}

/// yes/true/1 -> true, no/false/0 -> false (insensible à la casse), le reste passe inchangé.
pub fn normalize_bool(value: &str) -> Flag {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" => Flag::Bool(true),
        "no" | "false" | "0" => Flag::Bool(false),
        _ => Flag::Raw(value.to_string()),
    }
}

/// Horodatage tel que rac l'a émis : avec décalage, ou local au serveur (sans décalage).
/// La forme naïve ressort sans suffixe, le client l'interprète en heure locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    Offset(OffsetDateTime),
    Naive(PrimitiveDateTime),
}

const NAIVE_SECONDS: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const NAIVE_FRACTION: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");

impl Timestamp {
    pub fn year(&self) -> i32 {
        match self {
            Timestamp::Offset(ts) => ts.year(),
            Timestamp::Naive(ts) => ts.year(),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let text = match self {
            Timestamp::Offset(ts) => ts.format(&Rfc3339),
            Timestamp::Naive(ts) if ts.nanosecond() == 0 => ts.format(NAIVE_SECONDS),
            Timestamp::Naive(ts) => ts.format(NAIVE_FRACTION),
        }
        .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

/// Parse un horodatage ISO-8601. `None` pour une entrée absente, vide ou illisible.
/// Les années hors de 0..=9999 sont rejetées : elles ne se sérialisent pas.
pub fn parse_timestamp(value: Option<&str>) -> Option<Timestamp> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;

    match parse_iso(value).filter(|ts| (0..=9999).contains(&ts.year())) {
        Some(ts) => Some(ts),
        None => {
            debug!(value, "unparseable timestamp, treating as absent");
            None
        }
    }
}

fn parse_iso(value: &str) -> Option<Timestamp> {
    if let Ok(ts) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(Timestamp::Offset(ts));
    }

    let naive = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
    ];
    if let Some(ts) = naive
        .iter()
        .find_map(|fmt| PrimitiveDateTime::parse(value, *fmt).ok())
    {
        return Some(Timestamp::Naive(ts));
    }

    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| Timestamp::Naive(date.midnight()))
}
