//! Tabla de análisis por intervalos

use std::rc::Rc;

use super::parse::Parse;
use super::symbol::SymbolId;

/// Tabla cuadrada de candidatos indexada por intervalo `[start, end)`
#[derive(Debug, Clone)]
pub struct Chart<'g> {
    len: usize,
    cells: Vec<Vec<Rc<Parse<'g>>>>,
}

impl<'g> Chart<'g> {
    /// Tabla vacía para una consulta de `len` tokens
    pub fn new(len: usize) -> Self {
        let side = len + 1;
        Self {
            len,
            cells: vec![Vec::new(); side * side],
        }
    }

    /// Número de tokens de la consulta
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn offset(&self, start: usize, end: usize) -> usize {
        start * (self.len + 1) + end
    }

    /// Candidatos del intervalo `[start, end)`
    pub fn cell(&self, start: usize, end: usize) -> &[Rc<Parse<'g>>] {
        &self.cells[self.offset(start, end)]
    }

    /// Añade candidatos al intervalo
    pub fn extend<I>(&mut self, start: usize, end: usize, parses: I)
    where
        I: IntoIterator<Item = Parse<'g>>,
    {
        let offset = self.offset(start, end);
        self.cells[offset].extend(parses.into_iter().map(Rc::new));
    }

    /// Ordena el intervalo por puntuación, descarta derivaciones repetidas y
    /// conserva como mucho `limit` candidatos
    pub fn prune(&mut self, start: usize, end: usize, limit: usize) {
        let offset = self.offset(start, end);
        let cell = std::mem::take(&mut self.cells[offset]);
        self.cells[offset] = prune_candidates(cell, limit);
    }

    /// Mejor análisis del intervalo completo con símbolo izquierdo `root`
    pub fn best_root(&self, root: SymbolId) -> Option<Rc<Parse<'g>>> {
        self.cell(0, self.len)
            .iter()
            .filter(|p| p.lhs() == Some(root))
            .fold(None, |best: Option<&Rc<Parse<'g>>>, p| match best {
                Some(b) if b.score() >= p.score() => Some(b),
                _ => Some(p),
            })
            .cloned()
    }

    /// Total de candidatos en la tabla
    pub fn total_candidates(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }
}

/// Orden estable descendente por puntuación, deduplicación por
/// (símbolo izquierdo, semántica) y truncado a `limit`
pub fn prune_candidates<'g>(mut cell: Vec<Rc<Parse<'g>>>, limit: usize) -> Vec<Rc<Parse<'g>>> {
    cell.sort_by(|a, b| b.score().total_cmp(&a.score()));

    let mut kept: Vec<Rc<Parse<'g>>> = Vec::with_capacity(limit.min(cell.len()));
    for parse in cell {
        if kept.len() == limit {
            break;
        }
        if kept.iter().any(|k| k.same_derivation(&parse)) {
            continue;
        }
        kept.push(parse);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parse::Semantics;
    use crate::grammar::rules::{Rule, Shape};
    use crate::grammar::symbol::{SymbolKind, SymbolTable};

    fn candidate<'g>(rule: &'g Rule, value: usize, score: f64) -> Parse<'g> {
        let mut semantics = Semantics::new();
        semantics.insert("Value".to_string(), value.to_string());
        Parse::new(rule, Vec::new(), semantics, score)
    }

    #[test]
    fn test_prune_keeps_best_twenty_distinct() {
        let mut table = SymbolTable::new();
        let lhs = table.intern("Option", SymbolKind::Nonterminal);
        let rule = Rule::new(lhs, Shape::Annotator, None);

        let mut chart = Chart::new(1);
        chart.extend(
            0,
            1,
            (0..30).map(|i| candidate(&rule, i, (i + 1) as f64 / 30.0)),
        );
        chart.prune(0, 1, 20);

        let cell = chart.cell(0, 1);
        assert_eq!(cell.len(), 20);
        // Sobreviven los 20 mejores (valores 10..30), en orden descendente
        assert_eq!(cell[0].get("Value"), Some("29"));
        assert_eq!(cell[19].get("Value"), Some("10"));
        for (i, a) in cell.iter().enumerate() {
            for b in &cell[i + 1..] {
                assert!(!a.same_derivation(b));
                assert!(a.score() >= b.score());
            }
        }
    }

    #[test]
    fn test_prune_keeps_higher_scoring_duplicate() {
        let mut table = SymbolTable::new();
        let lhs = table.intern("Option", SymbolKind::Nonterminal);
        let rule = Rule::new(lhs, Shape::Annotator, None);

        let mut chart = Chart::new(1);
        chart.extend(0, 1, vec![candidate(&rule, 1, 0.4), candidate(&rule, 1, 0.9)]);
        chart.prune(0, 1, 20);

        let cell = chart.cell(0, 1);
        assert_eq!(cell.len(), 1);
        assert_eq!(cell[0].score(), 0.9);
    }

    #[test]
    fn test_prune_stable_on_ties() {
        let mut table = SymbolTable::new();
        let lhs = table.intern("Option", SymbolKind::Nonterminal);
        let rule = Rule::new(lhs, Shape::Annotator, None);

        let cell: Vec<_> = (0..3).map(|i| Rc::new(candidate(&rule, i, 0.5))).collect();
        let kept = prune_candidates(cell, 20);
        let values: Vec<_> = kept.iter().filter_map(|p| p.get("Value")).collect();
        assert_eq!(values, vec!["0", "1", "2"]);
    }

    #[test]
    fn test_best_root() {
        let mut table = SymbolTable::new();
        let root = table.intern("Root", SymbolKind::Nonterminal);
        let other = table.intern("Plot", SymbolKind::Nonterminal);
        let root_rule = Rule::new(root, Shape::Annotator, None);
        let other_rule = Rule::new(other, Shape::Annotator, None);

        let mut chart = Chart::new(2);
        chart.extend(
            0,
            2,
            vec![
                candidate(&other_rule, 1, 1.0),
                candidate(&root_rule, 2, 0.3),
                candidate(&root_rule, 3, 0.6),
            ],
        );
        let best = chart.best_root(root).map(|p| p.score());
        assert_eq!(best, Some(0.6));
        assert!(Chart::new(2).best_root(root).is_none());
    }
}
