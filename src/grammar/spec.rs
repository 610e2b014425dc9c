//! Compilador del texto de especificación de reglas
//!
//! Formato:
//!
//! ```text
//! # comentario hasta fin de línea
//! Root := Overview | Plot ;
//! Bins := "bin" BinSpec {histobins : true} | BinSpec "bin" {histobins : true} ;
//! BinRange := RangeFrom RangeTo? ;
//! RangeFrom := "from" $number {bin_pair_first : $1.Value}
//! ```
//!
//! Las producciones se separan con `;` y las alternativas con `|`. Cada
//! alternativa admite como mucho una asignación `{ clave : valor }`, donde el
//! valor es un literal o una referencia `$i.prop` a la propiedad `prop` del
//! hijo `i`. Un `?` final marca un símbolo opcional; la alternativa se expande
//! en todas las combinaciones de presencia y ausencia antes de crear las reglas.

use std::collections::HashSet;

use super::rules::{Rule, SemanticAction, Shape, TemplateValue};
use super::symbol::{SymbolId, SymbolKind, SymbolTable};
use super::tokenizer::Tokenizer;
use crate::error::{GrammarError, GrammarResult};

const PRODUCTION_SEPARATOR: char = ';';
const SIDE_SEPARATOR: &str = ":=";
const ALTERNATIVE_SEPARATOR: char = '|';
const SEMANTICS_OPEN: char = '{';
const SEMANTICS_CLOSE: char = '}';
const KEY_VALUE_SEPARATOR: char = ':';
const OPTIONAL_SUFFIX: char = '?';
const PLACEHOLDER_PREFIX: char = '$';
const COMMENT_PREFIX: char = '#';

/// Resultado de compilar una especificación
#[derive(Debug, Clone, Default)]
pub struct CompiledRules {
    pub symbols: SymbolTable,
    /// Reglas en orden de aplicación
    pub rules: Vec<Rule>,
    /// Símbolos `$` referenciados por las reglas
    pub placeholders: Vec<SymbolId>,
}

/// Símbolo de una alternativa antes de internarlo
#[derive(Debug, Clone, PartialEq, Eq)]
enum Term {
    Nonterminal(String),
    Literal(String),
    Placeholder(String),
}

impl Term {
    fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }
}

#[derive(Debug, Clone)]
struct Slot {
    term: Term,
    optional: bool,
}

/// Compila la especificación completa
///
/// Las producciones se aplican de abajo arriba: el texto se escribe con la
/// raíz primero y se recorre en orden inverso. Los literales usados dentro de
/// alternativas mixtas reciben una regla léxica implícita que va delante.
pub fn compile(text: &str, tokenizer: &Tokenizer) -> GrammarResult<CompiledRules> {
    let mut compiler = Compiler {
        tokenizer,
        symbols: SymbolTable::new(),
        implicit: Vec::new(),
        implicit_seen: HashSet::new(),
        placeholders: Vec::new(),
    };

    let source = strip_comments(text);
    let productions: Vec<&str> = source
        .split(PRODUCTION_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let mut rules = Vec::new();
    for production in productions.iter().rev() {
        rules.extend(compiler.production(production)?);
    }

    let mut ordered = std::mem::take(&mut compiler.implicit);
    ordered.extend(rules);

    Ok(CompiledRules {
        symbols: compiler.symbols,
        rules: ordered,
        placeholders: compiler.placeholders,
    })
}

fn strip_comments(text: &str) -> String {
    text.lines()
        .map(|line| match line.find(COMMENT_PREFIX) {
            Some(pos) => &line[..pos],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

struct Compiler<'t> {
    tokenizer: &'t Tokenizer,
    symbols: SymbolTable,
    implicit: Vec<Rule>,
    implicit_seen: HashSet<SymbolId>,
    placeholders: Vec<SymbolId>,
}

impl<'t> Compiler<'t> {
    fn production(&mut self, production: &str) -> GrammarResult<Vec<Rule>> {
        let sides: Vec<&str> = production.split(SIDE_SEPARATOR).map(str::trim).collect();
        let invalid = || GrammarError::InvalidProduction {
            production: production.to_string(),
        };
        if sides.len() != 2 || sides.iter().any(|s| s.is_empty()) {
            return Err(invalid());
        }
        let lhs_name = sides[0];
        if lhs_name.split_whitespace().count() != 1
            || lhs_name.starts_with('"')
            || lhs_name.starts_with(PLACEHOLDER_PREFIX)
        {
            return Err(invalid());
        }
        let lhs = self.symbols.intern(lhs_name, SymbolKind::Nonterminal);

        let mut rules = Vec::new();
        for alternative in sides[1].split(ALTERNATIVE_SEPARATOR) {
            rules.extend(self.alternative(lhs, alternative.trim(), production)?);
        }
        Ok(rules)
    }

    fn alternative(
        &mut self,
        lhs: SymbolId,
        alternative: &str,
        production: &str,
    ) -> GrammarResult<Vec<Rule>> {
        let (body, action) = parse_semantics(alternative, production)?;
        let slots = body
            .split_whitespace()
            .map(|word| self.slot(word, production))
            .collect::<GrammarResult<Vec<_>>>()?;

        if slots.is_empty() {
            return Err(GrammarError::EmptyAlternative {
                production: production.to_string(),
            });
        }
        if let Some(SemanticAction {
            value: TemplateValue::Child { index, key },
            ..
        }) = &action
        {
            if *index >= slots.len() {
                return Err(GrammarError::InvalidReference {
                    reference: format!("${}.{}", index, key),
                    production: production.to_string(),
                });
            }
        }

        let mut rules = Vec::new();
        for present in expansions(&slots) {
            let kept: Vec<&Slot> = slots
                .iter()
                .zip(&present)
                .filter_map(|(slot, &p)| p.then_some(slot))
                .collect();
            if kept.is_empty() {
                continue;
            }
            let action = action.as_ref().and_then(|a| reindex(a, &present));
            rules.push(self.rule(lhs, &kept, action, production)?);
        }
        Ok(rules)
    }

    fn slot(&self, word: &str, production: &str) -> GrammarResult<Slot> {
        let (name, optional) = match word.strip_suffix(OPTIONAL_SUFFIX) {
            Some(name) => (name, true),
            None => (word, false),
        };
        if name.is_empty() {
            return Err(GrammarError::BlankSymbol {
                production: production.to_string(),
            });
        }

        let term = if let Some(rest) = name.strip_prefix('"') {
            let inner = rest
                .strip_suffix('"')
                .filter(|inner| !inner.trim().is_empty())
                .ok_or_else(|| GrammarError::InvalidLiteral {
                    literal: name.to_string(),
                    production: production.to_string(),
                })?;
            Term::Literal(self.tokenizer.normalize(inner))
        } else if name.starts_with(PLACEHOLDER_PREFIX) {
            if name.len() == PLACEHOLDER_PREFIX.len_utf8() {
                return Err(GrammarError::BlankSymbol {
                    production: production.to_string(),
                });
            }
            Term::Placeholder(name.to_string())
        } else {
            Term::Nonterminal(name.to_string())
        };
        Ok(Slot { term, optional })
    }

    fn rule(
        &mut self,
        lhs: SymbolId,
        kept: &[&Slot],
        action: Option<SemanticAction>,
        production: &str,
    ) -> GrammarResult<Rule> {
        if kept.iter().all(|slot| slot.term.is_literal()) {
            if let Some(SemanticAction {
                value: TemplateValue::Child { index, key },
                ..
            }) = &action
            {
                return Err(GrammarError::InvalidReference {
                    reference: format!("${}.{}", index, key),
                    production: production.to_string(),
                });
            }
            let literals = kept
                .iter()
                .filter_map(|slot| match &slot.term {
                    Term::Literal(text) => Some(text.clone()),
                    _ => None,
                })
                .collect();
            return Ok(Rule::new(lhs, Shape::Lexical(literals), action));
        }

        let ids: Vec<SymbolId> = kept.iter().map(|slot| self.symbol(&slot.term)).collect();
        match ids.as_slice() {
            [child] => Ok(Rule::new(lhs, Shape::Unary(*child), action)),
            [left, right] => Ok(Rule::new(lhs, Shape::Binary(*left, *right), action)),
            _ => Err(GrammarError::ArityTooLarge {
                arity: ids.len(),
                production: production.to_string(),
            }),
        }
    }

    /// Interna el símbolo; los literales reciben su regla léxica implícita
    fn symbol(&mut self, term: &Term) -> SymbolId {
        match term {
            Term::Nonterminal(name) => self.symbols.intern(name, SymbolKind::Nonterminal),
            Term::Placeholder(name) => {
                let id = self.symbols.intern(name, SymbolKind::Placeholder);
                if !self.placeholders.contains(&id) {
                    self.placeholders.push(id);
                }
                id
            }
            Term::Literal(text) => {
                let id = self.symbols.intern(text, SymbolKind::Constant);
                if self.implicit_seen.insert(id) {
                    self.implicit
                        .push(Rule::new(id, Shape::Lexical(vec![text.clone()]), None));
                }
                id
            }
        }
    }
}

/// Separa los símbolos de la asignación `{ clave : valor }`
fn parse_semantics<'a>(
    alternative: &'a str,
    production: &str,
) -> GrammarResult<(&'a str, Option<SemanticAction>)> {
    let invalid = || GrammarError::InvalidSemantics {
        production: production.to_string(),
    };

    let mut parts = alternative.split(SEMANTICS_OPEN);
    let body = parts.next().unwrap_or_default();
    let clause = parts.next();
    if parts.next().is_some() || body.contains(SEMANTICS_CLOSE) {
        return Err(invalid());
    }
    let Some(clause) = clause else {
        return Ok((body, None));
    };

    let inner = clause
        .trim()
        .strip_suffix(SEMANTICS_CLOSE)
        .ok_or_else(invalid)?;
    let pair: Vec<&str> = inner.split(KEY_VALUE_SEPARATOR).map(str::trim).collect();
    if pair.len() != 2 || pair.iter().any(|s| s.is_empty()) {
        return Err(invalid());
    }
    let (key, value) = (pair[0], pair[1]);
    if key.split_whitespace().count() != 1 {
        return Err(invalid());
    }

    let action = match value.strip_prefix(PLACEHOLDER_PREFIX) {
        Some(reference) => {
            let (index, child_key) = reference.split_once('.').ok_or_else(invalid)?;
            let index: usize = index.parse().map_err(|_| invalid())?;
            if child_key.is_empty() || child_key.contains(char::is_whitespace) {
                return Err(invalid());
            }
            SemanticAction::child(key, index, child_key)
        }
        None => SemanticAction::literal(key, value),
    };
    Ok((body, Some(action)))
}

/// Combinaciones de presencia de los símbolos, ausentes primero
fn expansions(slots: &[Slot]) -> Vec<Vec<bool>> {
    let mut combos: Vec<Vec<bool>> = vec![Vec::new()];
    for slot in slots {
        let choices: &[bool] = if slot.optional { &[false, true] } else { &[true] };
        combos = combos
            .into_iter()
            .flat_map(|prefix| {
                choices.iter().map(move |&choice| {
                    let mut next = prefix.clone();
                    next.push(choice);
                    next
                })
            })
            .collect();
    }
    combos
}

/// Ajusta el índice de una referencia a los símbolos presentes
///
/// Si el símbolo referenciado no está presente la asignación desaparece.
fn reindex(action: &SemanticAction, present: &[bool]) -> Option<SemanticAction> {
    match &action.value {
        TemplateValue::Literal(_) => Some(action.clone()),
        TemplateValue::Child { index, key } => {
            if !present.get(*index).copied().unwrap_or(false) {
                return None;
            }
            let dropped = present[..*index].iter().filter(|p| !**p).count();
            Some(SemanticAction::child(&action.key, index - dropped, key))
        }
    }
}
