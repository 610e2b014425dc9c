//! Gramática de visualización
//!
//! Reglas incluidas en el binario más el conjunto de anotadores por defecto.
//! Se construye una vez y se pasa por referencia a cada análisis.

use crate::annotators::default_annotators;
use crate::config::ParserConfig;
use crate::context::SchemaContext;
use crate::error::{GrammarResult, InterpretError};
use crate::grammar::{Grammar, Parse};
use crate::interpret::{interpret, PlotRequest};

/// Texto de reglas de la gramática de visualización
pub const VISUALIZATION_GRAMMAR: &str = include_str!("../data/visualization.grammar");

/// Gramática de visualización con sus anotadores
#[derive(Debug)]
pub struct VisualizationGrammar {
    grammar: Grammar,
}

impl VisualizationGrammar {
    pub fn new() -> GrammarResult<Self> {
        Self::from_spec(VISUALIZATION_GRAMMAR)
    }

    /// Reglas propias con los anotadores por defecto
    pub fn from_spec(spec: &str) -> GrammarResult<Self> {
        Self::with_config(spec, ParserConfig::default())
    }

    pub fn with_config(spec: &str, config: ParserConfig) -> GrammarResult<Self> {
        let grammar = Grammar::with_config(spec, default_annotators(), config)?;
        Ok(Self { grammar })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Mejor análisis de cada sentencia
    pub fn parse(&self, input: &str, context: &SchemaContext) -> Vec<Parse<'_>> {
        self.grammar.parse(input, context)
    }

    /// Análisis e interpretación de cada sentencia
    pub fn interpret(
        &self,
        input: &str,
        context: &SchemaContext,
    ) -> Vec<Result<PlotRequest, InterpretError>> {
        self.parse(input, context)
            .iter()
            .map(|parse| interpret(parse, context))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_grammar_compiles() {
        let viz = VisualizationGrammar::new().unwrap();
        let grammar = viz.grammar();
        assert!(grammar.symbols().lookup("Root").is_some());
        assert!(grammar.rules().iter().any(|r| r.lhs() == grammar.root()));
    }

    #[test]
    fn test_every_placeholder_has_an_annotator() {
        let viz = VisualizationGrammar::new().unwrap();
        let grammar = viz.grammar();
        let registered: Vec<&str> = grammar.annotators().map(|a| a.symbol()).collect();
        for (_, symbol) in grammar.symbols().iter() {
            if symbol.name.starts_with('$') {
                assert!(registered.contains(&symbol.name.as_str()), "{}", symbol.name);
            }
        }
    }

    #[test]
    fn test_interpret_overview() {
        let viz = VisualizationGrammar::new().unwrap();
        let context = SchemaContext::new("df", ["Age"]);
        let results = viz.interpret("", &context);
        assert_eq!(results.len(), 1);
        let plot = results[0].as_ref().unwrap();
        assert_eq!(plot.kind.as_str(), "overview");
    }
}
