//! Números sueltos y listas de números

use super::{Annotation, Annotator, SpanView};
use crate::context::SchemaContext;

/// Longitud mínima de una lista de números
const MIN_LIST_LEN: usize = 3;

/// Lee un token como número finito
fn parse_number(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// `$number`: un único token numérico
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberAnnotator;

impl Annotator for NumberAnnotator {
    fn symbol(&self) -> &str {
        "$number"
    }

    fn annotate(&self, span: &SpanView<'_>, _context: &SchemaContext) -> Option<Annotation> {
        if span.len() != 1 {
            return None;
        }
        let number = parse_number(&span.tokens[0])?;
        Some(Annotation::value(number.to_string()))
    }
}

/// `$number_list`: tres o más números, admitiendo un separador no numérico
///
/// Los extremos deben ser numéricos. La puntuación es la fracción de tokens
/// numéricos del intervalo.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberListAnnotator;

impl Annotator for NumberListAnnotator {
    fn symbol(&self) -> &str {
        "$number_list"
    }

    fn annotate(&self, span: &SpanView<'_>, _context: &SchemaContext) -> Option<Annotation> {
        let len = span.len();
        if len < MIN_LIST_LEN {
            return None;
        }
        parse_number(&span.tokens[0])?;
        parse_number(&span.tokens[len - 1])?;

        let mut numbers = Vec::with_capacity(len);
        let mut gaps = 0;
        for token in span.tokens {
            match parse_number(token) {
                Some(n) => numbers.push(n.to_string()),
                None => gaps += 1,
            }
        }
        if gaps > 1 || numbers.len() < MIN_LIST_LEN {
            return None;
        }

        let score = numbers.len() as f64 / len as f64;
        Some(Annotation::value(numbers.join(",")).with_score(score))
    }
}
