//! onde-net — transport HTTP des charges modulées
//!
//! Implémente la frontière [`Transport`] de l'évaluateur : la charge binaire
//! part en corps `text/plain` d'un POST vers le point d'échange, la clé d'API
//! voyage en paramètre de requête `apiKey`, et le corps de la réponse revient
//! brut (l'évaluateur le rogne puis le démodule).
//!
//! Client **bloquant** : l'évaluation est mono-thread et synchrone, `send`
//! bloque jusqu'à la réponse ou l'échec. Pas de retry ici — un échec de
//! transport est fatal à l'évaluation qui l'a provoqué.

use onde_eval::{Transport, TransportError};

/// Point d'échange historique.
pub const DEFAULT_ENDPOINT: &str = "https://icfpc2020-api.testkontur.ru/aliens/send";

/// Client HTTP bloquant vers le point d'échange distant.
#[derive(Debug, Clone)]
pub struct Client {
    endpoint: String,
    api_key: String,
    http: reqwest::blocking::Client,
}

impl Client {
    /// Construit un client vers `endpoint`, authentifié par `api_key`.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            http: reqwest::blocking::Client::new(),
        }
    }
}

impl Transport for Client {
    fn exchange(&self, bits: &str) -> Result<String, TransportError> {
        log::debug!("POST {} ({} bits)", self.endpoint, bits.len());
        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("apiKey", self.api_key.as_str())])
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(bits.to_owned())
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| TransportError::Exchange(e.to_string()))?;
        let body = response
            .text()
            .map_err(|e| TransportError::Exchange(e.to_string()))?;
        log::debug!("got {body:?} from the remote peer");
        Ok(body)
    }
}
