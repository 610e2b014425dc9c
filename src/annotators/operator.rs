//! Operadores de comparación y de agregación

use super::{Annotation, Annotator, SpanView};
use crate::context::SchemaContext;

/// Clase de una palabra de comparación
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    Greater,
    Less,
    Equal,
    Not,
}

const COMPARISON_WORDS: &[(&str, Comparison)] = &[
    ("greater", Comparison::Greater),
    ("larger", Comparison::Greater),
    ("more", Comparison::Greater),
    ("smaller", Comparison::Less),
    ("less", Comparison::Less),
    ("equal", Comparison::Equal),
    ("=", Comparison::Equal),
    ("not", Comparison::Not),
];

/// Operadores que se reconocen literalmente
const VERBATIM_OPERATORS: &[&str] = &["<", "<=", ">", ">=", "==", "!="];

fn comparison(span: &SpanView<'_>, index: usize) -> Option<Comparison> {
    span.forms(index).iter().find_map(|form| {
        COMPARISON_WORDS
            .iter()
            .find(|(word, _)| word == form)
            .map(|(_, class)| *class)
    })
}

/// Operador resultante de combinar dos clases; un token solo se combina
/// consigo mismo
fn combine(first: Comparison, second: Comparison) -> Option<&'static str> {
    use Comparison::*;
    match (first, second) {
        (Not, Not) => None,
        (Greater, Greater) => Some(">"),
        (Less, Less) => Some("<"),
        (Equal, Equal) => Some("=="),
        (Not, Greater) => Some("<="),
        (Not, Less) => Some(">="),
        (Not, Equal) => Some("!="),
        (Greater, Equal) | (Equal, Greater) => Some(">="),
        (Less, Equal) | (Equal, Less) => Some("<="),
        _ => None,
    }
}

/// `$operator`: comparación de uno o dos tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct OperatorAnnotator;

impl Annotator for OperatorAnnotator {
    fn symbol(&self) -> &str {
        "$operator"
    }

    fn annotate(&self, span: &SpanView<'_>, _context: &SchemaContext) -> Option<Annotation> {
        match span.len() {
            1 => {
                let raw = span.raw[0].as_str();
                if let Some(op) = VERBATIM_OPERATORS.iter().find(|op| **op == raw) {
                    return Some(Annotation::value(*op));
                }
                let class = comparison(span, 0)?;
                combine(class, class).map(Annotation::value)
            }
            2 => {
                let first = comparison(span, 0)?;
                let second = comparison(span, 1)?;
                combine(first, second).map(Annotation::value)
            }
            _ => None,
        }
    }
}

/// Palabras de agregación (normalizadas o en minúsculas) y su función
const AGGREGATIONS: &[(&str, &str)] = &[
    ("mean", "mean"),
    ("averag", "mean"),
    ("average", "mean"),
    ("avg", "mean"),
    ("sum", "sum"),
    ("count", "count"),
    ("std", "std"),
    ("standard deviat", "std"),
    ("standard deviation", "std"),
    ("standard error", "std"),
    ("min", "min"),
    ("minimum", "min"),
    ("max", "max"),
    ("maximum", "max"),
];

/// `$aggreop`: función de agregación de uno o dos tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregatedOperatorAnnotator;

impl Annotator for AggregatedOperatorAnnotator {
    fn symbol(&self) -> &str {
        "$aggreop"
    }

    fn annotate(&self, span: &SpanView<'_>, _context: &SchemaContext) -> Option<Annotation> {
        if span.len() > 2 {
            return None;
        }
        let normalized = span.tokens.join(" ");
        let lowered = span.raw_text().to_lowercase();
        let function = [normalized, lowered].iter().find_map(|text| {
            AGGREGATIONS
                .iter()
                .find(|(word, _)| word == text)
                .map(|(_, function)| *function)
        })?;
        Some(Annotation::value(function))
    }
}
