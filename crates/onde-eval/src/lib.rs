//! onde-eval — machine de réduction à pile pour les termes Onde
//!
//! Objectif : réduire un terme en **forme normale** (nombre, `nil` ou paire)
//! sur une pile de valeurs explicite. La machine implémente :
//! - la réduction des applications avec accumulation d'applications
//!   partielles jusqu'à saturation,
//! - les règles par primitive (contrat strict : une primitive d'arité N
//!   dépile exactement N opérandes et empile exactement un résultat),
//! - la résolution paresseuse des références vers l'environnement global
//!   (consulté à chaque usage, jamais inliné au chargement).
//!
//! La frontière réseau de la primitive `send` est un trait ([`Transport`]) :
//! le cœur ne connaît ni HTTP ni point d'échange, seulement « livrer une
//! charge modulée, rapporter la réponse brute ».
//!
//! Une évaluation possède sa pile ; l'environnement peut être partagé en
//! lecture seule entre évaluations une fois le chargement terminé.

use thiserror::Error;

use onde_core::CodecError;

mod env;
mod machine;
mod transport;

pub use env::Env;
pub use machine::Machine;
pub use transport::{NoTransport, Transport, TransportError};

/// Erreurs d'évaluation. Toutes sont fatales à l'évaluation en cours :
/// un graphe de termes mal formé ne se répare pas en pleine réduction.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Un opérateur a reçu un opérande de la mauvaise variante.
    #[error("`{op}`: expected {expected}, got `{found}`")]
    TypeMismatch {
        /// Opérateur en cours de réduction.
        op: &'static str,
        /// Variante attendue.
        expected: &'static str,
        /// Rendu du terme effectivement reçu.
        found: String,
    },
    /// La pile contenait moins de valeurs que l'arité ne l'exige.
    #[error("stack underflow while reducing `{op}`")]
    Underflow {
        /// Opérateur en cours de réduction.
        op: &'static str,
    },
    /// Référence vers un nom absent de l'environnement.
    #[error("unknown name `{0}`")]
    UnknownName(String),
    /// L'expression ne s'est pas réduite à une valeur unique.
    #[error("expression did not reduce to a single value ({left} left over)")]
    UnbalancedStack {
        /// Valeurs restées sur la pile après la réduction.
        left: usize,
    },
    /// Erreur du codec (`mod`, `dem`, `send`).
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// Échec du collaborateur transport (`send`).
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Alias résultat de l'évaluateur.
pub type EvalResult<T> = Result<T, EvalError>;
