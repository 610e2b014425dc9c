//! Motor de gramática
//!
//! Compila el texto de reglas y analiza consultas con una tabla por
//! intervalos tolerante a ruido. La gramática es inmutable una vez construida
//! y puede compartirse entre hilos; cada consulta usa su propia tabla.

pub mod chart;
pub mod parse;
pub mod rules;
pub mod spec;
pub mod symbol;
pub mod tokenizer;

use std::rc::Rc;
use std::str::FromStr;

use tracing::{debug, trace, warn};

use crate::annotators::{Annotator, SpanView};
use crate::config::ParserConfig;
use crate::context::SchemaContext;
use crate::error::{GrammarError, GrammarResult};

pub use chart::Chart;
pub use parse::{Parse, Semantics};
pub use rules::{Rule, SemanticAction, Shape, TemplateValue};
pub use symbol::{Symbol, SymbolId, SymbolKind, SymbolTable};
pub use tokenizer::{TokenizedQuery, Tokenizer};

/// Consulta que sustituye a una entrada vacía
pub const EMPTY_QUERY: &str = "overview";

/// Separador de sentencias en una consulta
const STATEMENT_SEPARATOR: char = ';';

/// Gramática compilada con sus anotadores
#[derive(Debug)]
pub struct Grammar {
    symbols: SymbolTable,
    rules: Vec<Rule>,
    annotators: Vec<(Rule, Box<dyn Annotator>)>,
    root: SymbolId,
    tokenizer: Tokenizer,
    config: ParserConfig,
}

impl Grammar {
    /// Compila una gramática con la configuración por defecto
    pub fn new(spec: &str, annotators: Vec<Box<dyn Annotator>>) -> GrammarResult<Self> {
        Self::with_config(spec, annotators, ParserConfig::default())
    }

    /// Compila una gramática con configuración propia
    pub fn with_config(
        spec: &str,
        annotators: Vec<Box<dyn Annotator>>,
        config: ParserConfig,
    ) -> GrammarResult<Self> {
        let tokenizer = Tokenizer::new();
        let compiled = spec::compile(spec, &tokenizer)?;
        let mut symbols = compiled.symbols;

        let mut registered: Vec<(Rule, Box<dyn Annotator>)> = Vec::with_capacity(annotators.len());
        for annotator in annotators {
            let id = symbols.intern(annotator.symbol(), SymbolKind::Placeholder);
            if registered.iter().any(|(rule, _)| rule.lhs() == id) {
                return Err(GrammarError::DuplicateAnnotator {
                    symbol: annotator.symbol().to_string(),
                });
            }
            registered.push((Rule::new(id, Shape::Annotator, None), annotator));
        }

        for placeholder in &compiled.placeholders {
            if !registered.iter().any(|(rule, _)| rule.lhs() == *placeholder) {
                warn!(
                    symbol = symbols.name(*placeholder),
                    "símbolo sin anotador registrado"
                );
            }
        }

        let root = symbols.intern(&config.root, SymbolKind::Nonterminal);
        if !compiled.rules.iter().any(|rule| rule.lhs() == root) {
            warn!(root = %config.root, "la gramática no define el símbolo raíz");
        }

        debug!(
            rules = compiled.rules.len(),
            symbols = symbols.len(),
            annotators = registered.len(),
            "gramática compilada"
        );

        Ok(Self {
            symbols,
            rules: compiled.rules,
            annotators: registered,
            root,
            tokenizer,
            config,
        })
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Reglas en orden de aplicación
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn annotators(&self) -> impl Iterator<Item = &dyn Annotator> {
        self.annotators.iter().map(|(_, a)| a.as_ref())
    }

    pub fn root(&self) -> SymbolId {
        self.root
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Analiza una consulta con varias sentencias separadas por `;`
    ///
    /// Devuelve el mejor análisis raíz de cada sentencia no vacía. Una
    /// entrada vacía se analiza como `overview`.
    pub fn parse(&self, input: &str, context: &SchemaContext) -> Vec<Parse<'_>> {
        let input = if input.trim().is_empty() {
            EMPTY_QUERY
        } else {
            input
        };
        input
            .split(STATEMENT_SEPARATOR)
            .map(str::trim)
            .filter(|statement| !statement.is_empty())
            .map(|statement| self.parse_single(statement, context))
            .collect()
    }

    /// Analiza una sola sentencia
    pub fn parse_single(&self, statement: &str, context: &SchemaContext) -> Parse<'_> {
        let query = self.tokenizer.tokenize(statement);
        self.parse_tokens(&query, context)
    }

    /// Analiza una consulta ya tokenizada
    ///
    /// Si ningún análisis cubre la consulta entera con el símbolo raíz se
    /// devuelve el centinela vacío.
    pub fn parse_tokens(&self, query: &TokenizedQuery, context: &SchemaContext) -> Parse<'_> {
        let chart = self.chart(query, context);
        match chart.best_root(self.root) {
            Some(best) => {
                debug!(score = best.score(), "{}", best.describe(&self.symbols));
                Rc::try_unwrap(best).unwrap_or_else(|shared| (*shared).clone())
            }
            None => {
                debug!(tokens = query.len(), "sin interpretación");
                Parse::empty()
            }
        }
    }

    /// Rellena la tabla de una consulta, intervalos cortos primero
    pub fn chart(&self, query: &TokenizedQuery, context: &SchemaContext) -> Chart<'_> {
        let n = query.len();
        debug!(tokens = n, raw = ?query.raw, "analizando");

        let mut chart = Chart::new(n);
        for len in 1..=n {
            for start in 0..=(n - len) {
                let end = start + len;
                self.annotate(&mut chart, query, context, start, end);
                for rule in &self.rules {
                    let found = rule.apply(&chart, query, start, end, &self.config);
                    chart.extend(start, end, found);
                }
                chart.prune(start, end, self.config.candidates_per_cell);
                trace!(start, end, candidates = chart.cell(start, end).len(), "celda");
            }
        }
        debug!(candidates = chart.total_candidates(), "tabla completa");
        chart
    }

    fn annotate<'g>(
        &'g self,
        chart: &mut Chart<'g>,
        query: &TokenizedQuery,
        context: &SchemaContext,
        start: usize,
        end: usize,
    ) {
        let span = SpanView {
            tokens: &query.normalized[start..end],
            raw: &query.raw[start..end],
        };
        let found: Vec<Parse<'g>> = self
            .annotators
            .iter()
            .filter_map(|(rule, annotator)| {
                annotator
                    .annotate(&span, context)
                    .map(|a| Parse::new(rule, Vec::new(), a.semantics, a.score))
            })
            .collect();
        chart.extend(start, end, found);
    }
}

impl FromStr for Grammar {
    type Err = GrammarError;

    /// Gramática sin anotadores
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        Grammar::new(spec, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotators::{ColumnAnnotator, NumberAnnotator};
    use pretty_assertions::assert_eq;

    const SPEC: &str = r#"
        Root := Plot ;
        Plot := Chart | Chart Column ;
        Chart := "histogram" {type : histogram} ;
        Column := $column
    "#;

    fn context() -> SchemaContext {
        SchemaContext::new("df", ["Age", "Income"])
    }

    fn grammar() -> Grammar {
        Grammar::new(SPEC, vec![Box::new(ColumnAnnotator::default())]).unwrap()
    }

    #[test]
    fn test_malformed_spec_fails() {
        assert!("Root Plot".parse::<Grammar>().is_err());
        assert!(Grammar::new("Root := A B C", Vec::new()).is_err());
    }

    #[test]
    fn test_duplicate_annotator() {
        let result = Grammar::new(
            SPEC,
            vec![Box::new(NumberAnnotator), Box::new(NumberAnnotator)],
        );
        assert!(matches!(
            result,
            Err(GrammarError::DuplicateAnnotator { .. })
        ));
    }

    #[test]
    fn test_exact_parse() {
        let grammar = grammar();
        let parse = grammar.parse_single("histogram Age", &context());
        assert!(!parse.is_empty());
        assert_eq!(parse.lhs(), Some(grammar.root()));
        assert_eq!(parse.get("type"), Some("histogram"));
        assert_eq!(parse.get("ColName"), Some("Age"));
        assert_eq!(parse.score(), 1.0);
    }

    #[test]
    fn test_noise_lowers_score() {
        let grammar = grammar();
        let exact = grammar.parse_single("histogram", &context());
        let noisy = grammar.parse_single("fancy histogram", &context());
        assert_eq!(noisy.get("type"), Some("histogram"));
        assert!(noisy.score() < exact.score());
        assert!(noisy.score() > 0.0);
    }

    #[test]
    fn test_literal_not_accepted_by_same_named_nonterminal() {
        let grammar = Grammar::new(
            "Root := \"step\" step ; step := $number",
            vec![Box::new(NumberAnnotator)],
        )
        .unwrap();
        assert_eq!(grammar.parse_single("step 5", &context()).score(), 1.0);
        assert!(grammar.parse_single("5 5", &context()).is_empty());
    }

    #[test]
    fn test_unary_noise_caps() {
        let grammar = Grammar::new("Root := $number", vec![Box::new(NumberAnnotator)]).unwrap();
        let context = context();
        let parses = |input: &str| !grammar.parse_single(input, &context).is_empty();

        // A la izquierda como mucho dos
        assert!(parses("qq rr 5"));
        assert!(!parses("qq rr ss 5"));
        // Tres en total
        assert!(parses("5 qq rr ss"));
        assert!(!parses("5 qq rr ss tt"));
        assert!(parses("qq 5 rr ss"));
        assert!(!parses("qq rr 5 ss tt"));
    }

    #[test]
    fn test_binary_noise_caps() {
        let grammar = Grammar::new(
            "Root := $number $column",
            vec![Box::new(NumberAnnotator), Box::new(ColumnAnnotator::default())],
        )
        .unwrap();
        let context = context();
        let parse = |input: &str| grammar.parse_single(input, &context);

        let gap = parse("5 qq rr ss Age");
        assert_eq!(gap.get("ColName"), Some("Age"));
        assert!(gap.score() > 0.0 && gap.score() < 1.0);
        assert!(parse("5 qq rr ss tt Age").is_empty());

        // Bordes y hueco suman
        assert!(!parse("qq 5 rr Age ss").is_empty());
        assert!(parse("qq 5 rr ss Age tt").is_empty());
    }

    #[test]
    fn test_no_interpretation_is_sentinel() {
        let grammar = grammar();
        let parse = grammar.parse_single("Age", &context());
        assert!(parse.is_empty());
        assert!(parse.semantics().is_empty());
    }

    #[test]
    fn test_multi_statement_and_blank_segments() {
        let grammar = grammar();
        let parses = grammar.parse("histogram Age; ; histogram Income", &context());
        assert_eq!(parses.len(), 2);
        assert_eq!(parses[1].get("ColName"), Some("Income"));
    }

    #[test]
    fn test_parse_tokens_bypasses_tokenizer() {
        let grammar = grammar();
        let query = TokenizedQuery::from_aligned(
            vec!["Histogram".to_string(), "Age".to_string()],
            vec!["histogram".to_string(), "age".to_string()],
        )
        .unwrap();
        let parse = grammar.parse_tokens(&query, &context());
        assert_eq!(parse.get("ColName"), Some("Age"));
    }

    #[test]
    fn test_chart_cells_are_pruned() {
        let grammar = grammar();
        let query = grammar.tokenizer().tokenize("histogram Age Income Age");
        let chart = grammar.chart(&query, &context());
        let mut total = 0;
        for start in 0..chart.len() {
            for end in (start + 1)..=chart.len() {
                assert!(chart.cell(start, end).len() <= 20);
                total += chart.cell(start, end).len();
            }
        }
        assert_eq!(chart.total_candidates(), total);
        assert!(total > 0);
    }

    #[test]
    fn test_config_root_and_cell_limit() {
        let spec = "Start := Plot ; Plot := Chart | Chart Column ; \
                    Chart := \"histogram\" {type : histogram} ; Column := $column";
        let build = |config: ParserConfig| {
            Grammar::with_config(spec, vec![Box::new(ColumnAnnotator::default())], config).unwrap()
        };

        let grammar = build(ParserConfig::default().with_root("Start"));
        assert_eq!(grammar.symbols().name(grammar.root()), "Start");
        let parse = grammar.parse_single("histogram Age", &context());
        assert_eq!(parse.lhs(), Some(grammar.root()));
        assert_eq!(parse.get("ColName"), Some("Age"));

        let narrow = build(
            ParserConfig::default()
                .with_root("Start")
                .with_candidates_per_cell(1),
        );
        let query = narrow.tokenizer().tokenize("histogram Age Income");
        let chart = narrow.chart(&query, &context());
        for start in 0..chart.len() {
            for end in (start + 1)..=chart.len() {
                assert!(chart.cell(start, end).len() <= 1);
            }
        }
    }

    #[test]
    fn test_from_str_without_annotators() {
        let grammar: Grammar = "Root := \"overview\" {type : overview}".parse().unwrap();
        let parse = grammar.parse_single("overview", &SchemaContext::default());
        assert_eq!(parse.get("type"), Some("overview"));
        assert_eq!(parse.get("Value"), Some("overview"));
    }
}
