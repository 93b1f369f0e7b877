//! Frontière transport de la primitive `send`.
//!
//! Le cœur ne transporte rien lui-même : il module son opérande, confie les
//! bits à un [`Transport`] et démodule la réponse. Les échecs de livraison
//! sont fatals à l'évaluation qui a invoqué `send` — les éventuels retries
//! appartiennent au collaborateur, pas à cette couche.

use thiserror::Error;

/// Erreurs de la couche transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Aucun transport n'est configuré pour cette évaluation.
    #[error("no transport configured for `send`")]
    Disabled,
    /// Échec de livraison ou de réception.
    #[error("exchange failed: {0}")]
    Exchange(String),
}

/// Collaborateur externe : livre une charge modulée, rapporte la réponse
/// brute (non décodée, espaces éventuels compris).
pub trait Transport {
    /// Envoie `bits` au pair distant et retourne le corps de la réponse.
    fn exchange(&self, bits: &str) -> Result<String, TransportError>;
}

/// Transport par défaut : refuse tout échange.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTransport;

impl Transport for NoTransport {
    fn exchange(&self, _bits: &str) -> Result<String, TransportError> {
        Err(TransportError::Disabled)
    }
}
