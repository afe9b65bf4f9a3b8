/*!
 * RECORD PARSER - Découpage de la sortie texte de rac en enregistrements
 *
 * RÔLE :
 * rac imprime ses listes sous forme de blocs `clé : valeur`, un bloc par objet,
 * séparés par une ou plusieurs lignes vides. Ce module transforme ce texte en
 * une suite ordonnée de `Record` (clé brute -> valeur brute).
 *
 * FONCTIONNEMENT :
 * - Ligne vide (après trim) = fin d'enregistrement, ignorée si rien n'est en cours
 * - Ligne sans `:` = ignorée (comptée dans `skipped_lines`, jamais d'échec global)
 * - Découpe sur le premier `:` seulement, trim clé et valeur
 * - Une seule paire de guillemets englobants est retirée de la valeur
 * - Le dernier enregistrement est émis même sans ligne vide finale
 */

use std::str::Lines;
use tracing::trace;

/// Un bloc `clé : valeur` de la sortie rac.
/// L'ordre d'insertion est conservé ; une clé répétée écrase la valeur précédente sur place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// Itérateur paresseux sur les enregistrements d'un texte.
/// Chaque appel à `records()` repart de zéro : aucun état n'est conservé entre deux parsings.
pub struct Records<'a> {
    lines: Lines<'a>,
    line_no: usize,
    skipped: usize,
}

/// Démarre un parsing paresseux de `text`.
pub fn records(text: &str) -> Records<'_> {
    Records {
        lines: text.lines(),
        line_no: 0,
        skipped: 0,
    }
}

/// Parsing complet en une fois.
pub fn parse_records(text: &str) -> Vec<Record> {
    records(text).collect()
}

impl Records<'_> {
    /// Nombre de lignes non vides ignorées faute de séparateur `:` jusqu'ici.
    pub fn skipped_lines(&self) -> usize {
        self.skipped
    }

    fn skip_line(&mut self, line: &str) {
        self.skipped += 1;
        trace!(line_no = self.line_no, line, "ignoring line without ':' separator");
    }
}

impl Iterator for Records<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        let mut current = Record::new();

        while let Some(line) = self.lines.next() {
            self.line_no += 1;

            if line.trim().is_empty() {
                if !current.is_empty() {
                    return Some(current);
                }
                continue;
            }

            let Some((key, value)) = split_field(line) else {
                self.skip_line(line);
                continue;
            };
            current.insert(key, value);
        }

        // fin du texte sans ligne vide finale
        (!current.is_empty()).then_some(current)
    }
}

/// Découpe `clé : valeur` sur le premier `:` et retire une couche de guillemets.
fn split_field(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    Some((key.trim(), strip_quotes(value.trim())))
}

fn strip_quotes(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
