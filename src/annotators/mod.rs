//! Anotadores: reconocedores de hojas independientes de la gramática
//!
//! Cada anotador examina un intervalo de tokens (normalizados y originales) y,
//! si lo reconoce, propone un análisis terminal bajo su propio símbolo `$`.
//! Un fallo local (un número que no se puede leer, un nombre demasiado lejano)
//! simplemente no produce candidato.

pub mod column;
pub mod number;
pub mod operator;
pub mod vocabulary;

use std::fmt::Debug;

use crate::config::VALUE_KEY;
use crate::context::SchemaContext;
use crate::grammar::parse::Semantics;

pub use column::{AuxColumnAnnotator, ColumnAnnotator};
pub use number::{NumberAnnotator, NumberListAnnotator};
pub use operator::{AggregatedOperatorAnnotator, OperatorAnnotator};
pub use vocabulary::{
    LineFormatAnnotator, MarkerFormatAnnotator, PrecolorAnnotator, QuotedStringAnnotator,
};

/// Vista de un intervalo de la consulta
#[derive(Debug, Clone, Copy)]
pub struct SpanView<'q> {
    /// Tokens normalizados (minúsculas y raíz)
    pub tokens: &'q [String],
    /// Tokens originales
    pub raw: &'q [String],
}

impl<'q> SpanView<'q> {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Texto original unido por espacios
    pub fn raw_text(&self) -> String {
        self.raw.join(" ")
    }

    /// Formas candidatas de un token para las búsquedas en vocabulario:
    /// primero la normalizada, después la original en minúsculas
    pub(crate) fn forms(&self, index: usize) -> [String; 2] {
        [self.tokens[index].clone(), self.raw[index].to_lowercase()]
    }
}

/// Propuesta de un anotador
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub semantics: Semantics,
    pub score: f64,
}

impl Annotation {
    /// Anotación con puntuación 1 y la propiedad `Value`
    pub fn value(value: impl Into<String>) -> Self {
        let mut semantics = Semantics::new();
        semantics.insert(VALUE_KEY.to_string(), value.into());
        Self {
            semantics,
            score: 1.0,
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.semantics.insert(key.to_string(), value.into());
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.semantics.get(key).map(String::as_str)
    }
}

/// Reconocedor de hojas
pub trait Annotator: Send + Sync + Debug {
    /// Símbolo reservado bajo el que se insertan las anotaciones (`$nombre`)
    fn symbol(&self) -> &str;

    /// Examina un intervalo no vacío y propone, como mucho, una anotación
    fn annotate(&self, span: &SpanView<'_>, context: &SchemaContext) -> Option<Annotation>;
}

/// Conjunto de anotadores de la gramática de visualización
pub fn default_annotators() -> Vec<Box<dyn Annotator>> {
    vec![
        Box::new(NumberAnnotator),
        Box::new(NumberListAnnotator),
        Box::new(ColumnAnnotator::default()),
        Box::new(AuxColumnAnnotator::default()),
        Box::new(PrecolorAnnotator),
        Box::new(LineFormatAnnotator),
        Box::new(MarkerFormatAnnotator),
        Box::new(QuotedStringAnnotator),
        Box::new(OperatorAnnotator),
        Box::new(AggregatedOperatorAnnotator),
    ]
}
