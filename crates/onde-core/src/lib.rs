//! onde-core — modèle de termes + codec binaire (sans évaluateur)
//!
//! Fournit :
//! - [`Term`] : l'unique type récursif de valeur du langage (nombres, `nil`,
//!   paires, applications, applications partielles, primitives, références,
//!   charges modulées)
//! - [`Prim`] : l'ensemble clos des primitives, chacune d'arité fixe
//! - [`codec`] : `modulate`/`demodulate`, le format binaire auto-délimité
//!   utilisé sur le fil
//! - Erreurs `CodecError` + alias `CodecResult<T>`
//!
//! Ce crate ne dépend pas de l'évaluateur : le codec est une paire de
//! fonctions pures sur les termes transférables (nombres, `nil`, paires).
//!
//! Features :
//! - `serde` : derive (dé)sérialisation sur `Term` et `Prim`

#![deny(missing_docs)]

pub mod codec;
pub mod term;

pub use codec::{demodulate, demodulate_all, modulate, CodecError, CodecResult};
pub use term::{Prim, Term};

/// Prélude pratique pour importer les types/funcs clés du crate.
pub mod prelude {
    /// Réexports utiles pour une importation rapide.
    pub use super::{demodulate, demodulate_all, modulate, CodecError, CodecResult, Prim, Term};
}
