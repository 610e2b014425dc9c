//! Resultado de análisis de un intervalo de tokens

use std::collections::BTreeMap;
use std::rc::Rc;

use super::rules::Rule;
use super::symbol::{SymbolId, SymbolTable};

/// Mapa de propiedades semánticas, ordenado por clave
///
/// El orden fijo hace que dos mapas iguales se serialicen igual, lo que
/// permite comparar derivaciones por su significado.
pub type Semantics = BTreeMap<String, String>;

/// Derivación inmutable: regla, hijos, semántica resuelta y puntuación
#[derive(Debug, Clone)]
pub struct Parse<'g> {
    rule: Option<&'g Rule>,
    children: Vec<Rc<Parse<'g>>>,
    semantics: Semantics,
    score: f64,
}

impl<'g> Parse<'g> {
    pub fn new(
        rule: &'g Rule,
        children: Vec<Rc<Parse<'g>>>,
        semantics: Semantics,
        score: f64,
    ) -> Self {
        Self {
            rule: Some(rule),
            children,
            semantics,
            score,
        }
    }

    /// Centinela "sin interpretación": sin regla ni semántica
    pub fn empty() -> Self {
        Self {
            rule: None,
            children: Vec::new(),
            semantics: Semantics::new(),
            score: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rule.is_none()
    }

    pub fn rule(&self) -> Option<&'g Rule> {
        self.rule
    }

    pub fn lhs(&self) -> Option<SymbolId> {
        self.rule.map(Rule::lhs)
    }

    pub fn children(&self) -> &[Rc<Parse<'g>>] {
        &self.children
    }

    pub fn semantics(&self) -> &Semantics {
        &self.semantics
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.semantics.get(key).map(String::as_str)
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// ¿Misma derivación? Mismo símbolo izquierdo y misma semántica;
    /// ni la puntuación ni la forma del árbol cuentan.
    pub fn same_derivation(&self, other: &Parse<'_>) -> bool {
        self.lhs() == other.lhs() && self.semantics == other.semantics
    }

    /// Semántica serializada como `clave=valor,...`
    pub fn semantics_display(&self) -> String {
        self.semantics
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Descripción legible para depuración
    pub fn describe(&self, symbols: &SymbolTable) -> String {
        let lhs = self.lhs().map_or("<vacío>", |id| symbols.name(id));
        format!(
            "{}[{}] score={:.4}",
            lhs,
            self.semantics_display(),
            self.score
        )
    }
}
