/*!
# RASMON DevKit - Stubs et utilitaires pour développement

Bibliothèque facilitant les tests du kernel RASMON avec:
- Builder de sortie texte au format rac (`clé : valeur`)
- Faux binaire rac (script shell) pour tester l'invocation de processus
- Jeux de fixtures temporaires pour le mode rejeu
- Harness avec un cluster d'exemple complet et cohérent
*/

pub mod rac_stub;
pub mod fixture_helpers;
pub mod test_utils;

pub use rac_stub::{RacOutputBuilder, RacStub};
pub use fixture_helpers::FixtureSet;
pub use test_utils::TestHarness;
