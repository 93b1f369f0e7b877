//! Environnement global : table nom → terme.
//!
//! Peuplé une fois par le chargeur, puis consulté en lecture seule pendant
//! toute l'évaluation. Les définitions peuvent se référencer mutuellement ;
//! la résolution a lieu à chaque usage, ce qui autorise la récursion.

use std::collections::HashMap;
use std::rc::Rc;

use onde_core::Term;

/// Table des définitions nommées.
#[derive(Debug, Default, Clone)]
pub struct Env {
    defs: HashMap<String, Rc<Term>>,
}

impl Env {
    /// Crée un environnement vide.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construit l'environnement depuis une table déjà chargée.
    pub fn from_defs(defs: HashMap<String, Rc<Term>>) -> Self {
        Self { defs }
    }

    /// Ajoute (ou remplace) une définition.
    pub fn define(&mut self, name: impl Into<String>, term: Rc<Term>) {
        self.defs.insert(name.into(), term);
    }

    /// Terme lié à `name`, s'il existe.
    pub fn lookup(&self, name: &str) -> Option<&Rc<Term>> {
        self.defs.get(name)
    }

    /// Nombre de définitions chargées.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Vrai si aucune définition n'est chargée.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
