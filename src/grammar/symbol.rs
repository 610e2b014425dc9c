//! Tabla de símbolos
//!
//! Cada nombre se interna una sola vez durante la compilación de la
//! gramática; después la tabla queda congelada y se consulta sin bloqueo.

use std::collections::HashMap;
use std::fmt;

/// Identificador de un símbolo internado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Clase de símbolo según su primera aparición
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// No terminal ordinario
    Nonterminal,
    /// Literal entre comillas
    Constant,
    /// Salida de un anotador (`$nombre`)
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SymbolKind::Constant => write!(f, "\"{}\"", self.name),
            _ => f.write_str(&self.name),
        }
    }
}

/// Clave de búsqueda: los literales se guardan entre comillas para no
/// confundirse con un no terminal del mismo nombre
fn index_key(name: &str, kind: SymbolKind) -> String {
    match kind {
        SymbolKind::Constant => format!("\"{}\"", name),
        _ => name.to_string(),
    }
}

/// Arena de símbolos
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    index: HashMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Devuelve el símbolo con ese nombre, creándolo si no existe
    pub(crate) fn intern(&mut self, name: &str, kind: SymbolKind) -> SymbolId {
        let key = index_key(name, kind);
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            name: name.to_string(),
            kind,
        });
        self.index.insert(key, id);
        id
    }

    /// Busca por nombre; un literal se busca con sus comillas (`"step"`)
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.index.get(name).copied()
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn name(&self, id: SymbolId) -> &str {
        &self.get(id).name
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId(i as u32), s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_once_per_name() {
        let mut table = SymbolTable::new();
        let a = table.intern("Root", SymbolKind::Nonterminal);
        let b = table.intern("Root", SymbolKind::Nonterminal);
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_literal_and_nonterminal_are_distinct() {
        let mut table = SymbolTable::new();
        let constant = table.intern("bin", SymbolKind::Constant);
        let nonterminal = table.intern("bin", SymbolKind::Nonterminal);
        assert_ne!(constant, nonterminal);
        assert_eq!(table.get(constant).kind, SymbolKind::Constant);
        assert_eq!(table.get(nonterminal).kind, SymbolKind::Nonterminal);
        assert_eq!(table.intern("bin", SymbolKind::Constant), constant);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_lookup_and_display() {
        let mut table = SymbolTable::new();
        let id = table.intern("step", SymbolKind::Constant);
        assert_eq!(table.lookup("\"step\""), Some(id));
        assert_eq!(table.lookup("step"), None);
        assert_eq!(table.lookup("missing"), None);
        assert_eq!(table.get(id).to_string(), "\"step\"");
        assert_eq!(table.name(id), "step");
    }
}
