//! Tokenizador de consultas
//!
//! Produce dos secuencias alineadas: los tokens originales (para reconstruir
//! texto y comparar nombres de columna) y los tokens normalizados, en
//! minúsculas y reducidos a su raíz (para las reglas léxicas).

use rust_stemmers::{Algorithm, Stemmer};

/// Palabras vacías que se descartan antes del análisis
///
/// No incluye preposiciones con significado en la gramática
/// ("from", "to", "by", "for", "with", "where", "not", "than").
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "of", "me", "please", "show", "give", "draw", "make", "create",
    "generate", "display", "i", "want", "would", "like", "can", "could", "you", "let", "us",
    "is", "are", "be", "that", "this", "it", "its", "and", "using", "use",
];

/// Caracteres que separan tokens
const SEPARATORS: &[char] = &[' ', '\t', ','];

/// Consulta tokenizada: secuencias original y normalizada, de igual longitud
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizedQuery {
    pub raw: Vec<String>,
    pub normalized: Vec<String>,
}

impl TokenizedQuery {
    /// Construye una consulta a partir de un par ya alineado
    ///
    /// Devuelve `None` si las longitudes no coinciden.
    pub fn from_aligned(raw: Vec<String>, normalized: Vec<String>) -> Option<Self> {
        (raw.len() == normalized.len()).then_some(Self { raw, normalized })
    }

    pub fn len(&self) -> usize {
        self.normalized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Texto original del intervalo `[start, end)` unido por espacios
    pub fn raw_text(&self, start: usize, end: usize) -> String {
        self.raw[start..end].join(" ")
    }

    /// Número de caracteres normalizados del intervalo `[start, end)`
    pub fn char_len(&self, start: usize, end: usize) -> usize {
        self.normalized[start..end]
            .iter()
            .map(|t| t.chars().count())
            .sum()
    }
}

/// Tokenizador de consultas
pub struct Tokenizer {
    stemmer: Stemmer,
    stop_words: Vec<String>,
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer")
            .field("stop_words", &self.stop_words)
            .finish_non_exhaustive()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
            stop_words: STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Sustituye la lista de palabras vacías
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = words.into_iter().map(Into::into).collect();
        self
    }

    /// Normaliza una palabra: minúsculas y raíz
    pub fn normalize(&self, word: &str) -> String {
        let lower = word.to_lowercase();
        self.stemmer.stem(&lower).into_owned()
    }

    fn is_stop_word(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        self.stop_words.iter().any(|w| *w == lower)
    }

    /// Tokeniza una sentencia de la consulta (sin `;`)
    pub fn tokenize(&self, text: &str) -> TokenizedQuery {
        let trimmed = text.trim_end().trim_end_matches(&['.', '?'][..]);

        let raw: Vec<String> = trimmed
            .split(SEPARATORS)
            .filter(|t| !t.is_empty())
            .filter(|t| !self.is_stop_word(t))
            .map(str::to_string)
            .collect();
        let normalized = raw.iter().map(|t| self.normalize(t)).collect();

        TokenizedQuery { raw, normalized }
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}
