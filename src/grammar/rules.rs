//! Reglas de producción y su aplicación sobre la tabla
//!
//! Cada regla es una variante cerrada según su forma: léxica (solo literales),
//! unaria, binaria o marcador de anotador. La aplicación lee celdas ya
//! completas de la tabla y devuelve los análisis nuevos para el intervalo; el
//! llamador los añade a la celda.

use std::rc::Rc;

use super::chart::Chart;
use super::parse::{Parse, Semantics};
use super::symbol::SymbolId;
use super::tokenizer::TokenizedQuery;
use crate::config::{MergePolicy, ParserConfig, LIST_SEPARATOR, VALUE_KEY};

/// Valor de una plantilla semántica
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValue {
    /// Valor literal
    Literal(String),
    /// Copia de la propiedad `key` del hijo `index` (`$index.key`)
    Child { index: usize, key: String },
}

/// Asignación `{ clave : valor }` de una alternativa
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticAction {
    pub key: String,
    pub value: TemplateValue,
}

impl SemanticAction {
    pub fn literal(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: TemplateValue::Literal(value.to_string()),
        }
    }

    pub fn child(key: &str, index: usize, child_key: &str) -> Self {
        Self {
            key: key.to_string(),
            value: TemplateValue::Child {
                index,
                key: child_key.to_string(),
            },
        }
    }

    /// Resuelve el valor contra las semánticas de los hijos
    ///
    /// `None` si la referencia apunta a un hijo o propiedad inexistente.
    pub fn resolve(&self, children: &[&Semantics]) -> Option<String> {
        match &self.value {
            TemplateValue::Literal(value) => Some(value.clone()),
            TemplateValue::Child { index, key } => children.get(*index)?.get(key).cloned(),
        }
    }

    /// Aplica la asignación sobre `target`; `false` si no se pudo resolver
    fn apply_to(&self, target: &mut Semantics, children: &[&Semantics]) -> bool {
        match self.resolve(children) {
            Some(value) => {
                target.insert(self.key.clone(), value);
                true
            }
            None => false,
        }
    }
}

/// Forma de la parte derecha de una regla
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Secuencia de literales normalizados
    Lexical(Vec<String>),
    Unary(SymbolId),
    Binary(SymbolId, SymbolId),
    /// Símbolo producido por un anotador; nunca se aplica como regla
    Annotator,
}

/// Regla de producción compilada
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    lhs: SymbolId,
    shape: Shape,
    action: Option<SemanticAction>,
}

impl Rule {
    pub fn new(lhs: SymbolId, shape: Shape, action: Option<SemanticAction>) -> Self {
        Self { lhs, shape, action }
    }

    pub fn lhs(&self) -> SymbolId {
        self.lhs
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn action(&self) -> Option<&SemanticAction> {
        self.action.as_ref()
    }

    /// Aplica la regla al intervalo `[start, end)`
    pub fn apply<'g>(
        &'g self,
        chart: &Chart<'g>,
        query: &TokenizedQuery,
        start: usize,
        end: usize,
        config: &ParserConfig,
    ) -> Vec<Parse<'g>> {
        match &self.shape {
            Shape::Lexical(literals) => self.apply_lexical(literals, query, start, end),
            Shape::Unary(child) => self.apply_unary(*child, chart, query, start, end, config),
            Shape::Binary(left, right) => {
                self.apply_binary(*left, *right, chart, query, start, end, config)
            }
            Shape::Annotator => Vec::new(),
        }
    }

    fn apply_lexical<'g>(
        &'g self,
        literals: &[String],
        query: &TokenizedQuery,
        start: usize,
        end: usize,
    ) -> Vec<Parse<'g>> {
        if query.normalized[start..end] != *literals {
            return Vec::new();
        }

        let mut semantics = Semantics::new();
        semantics.insert(VALUE_KEY.to_string(), query.raw_text(start, end));
        if let Some(action) = &self.action {
            if !action.apply_to(&mut semantics, &[]) {
                return Vec::new();
            }
        }
        vec![Parse::new(self, Vec::new(), semantics, 1.0)]
    }

    fn apply_unary<'g>(
        &'g self,
        child: SymbolId,
        chart: &Chart<'g>,
        query: &TokenizedQuery,
        start: usize,
        end: usize,
        config: &ParserConfig,
    ) -> Vec<Parse<'g>> {
        let mut found = Vec::new();
        let max_left = config.max_leading_noise_unary.min(config.max_noise);

        for left in 0..=max_left {
            for right in 0..=(config.max_noise - left) {
                let inner_start = start + left;
                if inner_start + right >= end {
                    continue;
                }
                let inner_end = end - right;
                let noise = Noise {
                    tokens: left + right,
                    chars: query.char_len(start, inner_start) + query.char_len(inner_end, end),
                };

                for parse in chart.cell(inner_start, inner_end) {
                    if parse.lhs() != Some(child) {
                        continue;
                    }
                    let semantics = match &self.action {
                        None => parse.semantics().clone(),
                        Some(action) => {
                            let mut semantics = parse.semantics().clone();
                            if !action.apply_to(&mut semantics, &[parse.semantics()]) {
                                continue;
                            }
                            semantics
                        }
                    };
                    let score = decay(parse.score(), end - start, noise, config.noise_penalty);
                    found.push(Parse::new(self, vec![Rc::clone(parse)], semantics, score));
                }
            }
        }
        found
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_binary<'g>(
        &'g self,
        left_symbol: SymbolId,
        right_symbol: SymbolId,
        chart: &Chart<'g>,
        query: &TokenizedQuery,
        start: usize,
        end: usize,
        config: &ParserConfig,
    ) -> Vec<Parse<'g>> {
        let mut found = Vec::new();
        let cap = config.max_noise;

        for left in 0..=cap {
            for middle in 0..=(cap - left) {
                for right in 0..=(cap - left - middle) {
                    if start + left + middle + right >= end {
                        continue;
                    }
                    let inner_start = start + left;
                    let inner_end = end - right;
                    let edge_chars =
                        query.char_len(start, inner_start) + query.char_len(inner_end, end);

                    for split in (inner_start + 1)..inner_end {
                        if split + middle >= inner_end {
                            break;
                        }
                        let noise = Noise {
                            tokens: left + middle + right,
                            chars: edge_chars + query.char_len(split, split + middle),
                        };

                        for first in chart.cell(inner_start, split) {
                            if first.lhs() != Some(left_symbol) {
                                continue;
                            }
                            for second in chart.cell(split + middle, inner_end) {
                                if second.lhs() != Some(right_symbol) {
                                    continue;
                                }
                                let Some((semantics, penalty)) =
                                    self.combine(first, second, &config.merge)
                                else {
                                    continue;
                                };
                                let score = penalty
                                    * decay(
                                        first.score() * second.score(),
                                        end - start,
                                        noise,
                                        config.noise_penalty,
                                    );
                                found.push(Parse::new(
                                    self,
                                    vec![Rc::clone(first), Rc::clone(second)],
                                    semantics,
                                    score,
                                ));
                            }
                        }
                    }
                }
            }
        }
        found
    }

    /// Fusiona las semánticas de dos hijos y aplica la plantilla de la regla
    fn combine(
        &self,
        first: &Parse<'_>,
        second: &Parse<'_>,
        policy: &MergePolicy,
    ) -> Option<(Semantics, f64)> {
        let (mut semantics, penalty) = merge_semantics(first.semantics(), second.semantics(), policy);
        if let Some(action) = &self.action {
            if !action.apply_to(&mut semantics, &[first.semantics(), second.semantics()]) {
                return None;
            }
        }
        Some((semantics, penalty))
    }
}

/// Tokens y caracteres de ruido consumidos por una aplicación
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Noise {
    pub tokens: usize,
    pub chars: usize,
}

/// Puntuación tras descontar el ruido
///
/// `base × (L−e)/L × penalty^(e+chars)` con `L` la longitud del intervalo.
pub fn decay(base: f64, span_len: usize, noise: Noise, penalty: f64) -> f64 {
    if span_len == 0 {
        return base;
    }
    let kept = span_len.saturating_sub(noise.tokens) as f64 / span_len as f64;
    let exponent = (noise.tokens + noise.chars) as i32;
    base * kept * penalty.powi(exponent)
}

/// Fusiona la semántica derecha sobre la izquierda
///
/// Devuelve el mapa resultante y el factor de penalización por propiedades
/// que no deberían repetirse.
pub fn merge_semantics(left: &Semantics, right: &Semantics, policy: &MergePolicy) -> (Semantics, f64) {
    let mut merged = left.clone();
    let mut penalty = 1.0;

    for (key, value) in right {
        let present = merged.get(key);
        if present.is_some() && key != VALUE_KEY && policy.non_repeated.contains(key) {
            penalty *= policy.repeat_penalty;
        }
        let combined = match present {
            Some(current) if policy.union_keys.contains(key) => union_list(current, value),
            Some(current) if policy.concat_keys.contains(key) => {
                format!("{}{}{}", current, LIST_SEPARATOR, value)
            }
            _ => value.clone(),
        };
        merged.insert(key.clone(), combined);
    }
    (merged, penalty)
}

/// Unión de dos listas `;` en orden de primera aparición, sin duplicados
fn union_list(a: &str, b: &str) -> String {
    let mut items: Vec<&str> = Vec::new();
    for item in a.split(LIST_SEPARATOR).chain(b.split(LIST_SEPARATOR)) {
        if !items.contains(&item) {
            items.push(item);
        }
    }
    items.join(&LIST_SEPARATOR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn semantics(pairs: &[(&str, &str)]) -> Semantics {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_union_column_names() {
        let policy = MergePolicy::default();
        let (merged, penalty) = merge_semantics(
            &semantics(&[("ColName", "a")]),
            &semantics(&[("ColName", "b")]),
            &policy,
        );
        assert_eq!(merged, semantics(&[("ColName", "a;b")]));
        assert_eq!(penalty, 1.0);
    }

    #[test]
    fn test_union_column_names_without_duplicates() {
        let policy = MergePolicy::default();
        let (merged, _) = merge_semantics(
            &semantics(&[("ColName", "a")]),
            &semantics(&[("ColName", "a")]),
            &policy,
        );
        assert_eq!(merged, semantics(&[("ColName", "a")]));

        let (merged, _) = merge_semantics(
            &semantics(&[("group_col", "x;y")]),
            &semantics(&[("group_col", "y;z")]),
            &policy,
        );
        assert_eq!(merged, semantics(&[("group_col", "x;y;z")]));
    }

    #[test]
    fn test_filter_values_concatenate() {
        let policy = MergePolicy::default();
        let (merged, _) = merge_semantics(
            &semantics(&[("filter_op", ">"), ("filter_v", "5")]),
            &semantics(&[("filter_op", ">"), ("filter_v", "5")]),
            &policy,
        );
        assert_eq!(merged, semantics(&[("filter_op", ">;>"), ("filter_v", "5;5")]));
    }

    #[test]
    fn test_other_keys_overwritten_by_right() {
        let policy = MergePolicy::default();
        let (merged, penalty) = merge_semantics(
            &semantics(&[("Value", "histogram"), ("type", "histogram")]),
            &semantics(&[("Value", "Age"), ("type", "scatter")]),
            &policy,
        );
        assert_eq!(merged, semantics(&[("Value", "Age"), ("type", "scatter")]));
        assert_eq!(penalty, 1.0);
    }

    #[test]
    fn test_repeated_property_penalized() {
        let policy = MergePolicy::default();
        let (_, penalty) = merge_semantics(
            &semantics(&[("histobins", "true"), ("histolog", "true")]),
            &semantics(&[("histobins", "true"), ("histolog", "true")]),
            &policy,
        );
        assert!((penalty - 0.64).abs() < 1e-12);
    }

    #[test]
    fn test_decay_exact_match_unchanged() {
        assert_eq!(decay(0.7, 4, Noise::default(), 0.95), 0.7);
    }

    #[test]
    fn test_decay_with_noise() {
        // Un token de ruido de 3 caracteres en un intervalo de 2 tokens
        let score = decay(1.0, 2, Noise { tokens: 1, chars: 3 }, 0.95);
        let expected = 0.5 * 0.95f64.powi(4);
        assert!((score - expected).abs() < 1e-12);
        assert!(score > 0.0);
    }

    #[test]
    fn test_resolve_child_reference() {
        let action = SemanticAction::child("filter_col", 0, "Value");
        let child = semantics(&[("Value", "Age")]);
        assert_eq!(action.resolve(&[&child]), Some("Age".to_string()));

        let missing = SemanticAction::child("filter_col", 1, "Value");
        assert_eq!(missing.resolve(&[&child]), None);
        let missing_key = SemanticAction::child("filter_col", 0, "ColName");
        assert_eq!(missing_key.resolve(&[&child]), None);
    }
}
