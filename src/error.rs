//! Errores de la biblioteca
//!
//! La compilación de gramáticas falla de forma inmediata e irrecuperable:
//! nunca se expone una gramática parcial.

use thiserror::Error;

/// Error al compilar el texto de especificación de reglas
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// La producción no tiene exactamente un `:=`
    #[error("Producción inválida (se esperaba `LHS := RHS`): {production}")]
    InvalidProduction { production: String },

    /// La cláusula `{ clave : valor }` está mal formada
    #[error("Semántica inválida en la producción: {production}")]
    InvalidSemantics { production: String },

    /// Una referencia `$i.prop` apunta fuera de la alternativa
    #[error("Referencia {reference} fuera de rango en la producción: {production}")]
    InvalidReference {
        reference: String,
        production: String,
    },

    /// Un símbolo vacío (por ejemplo un `?` suelto)
    #[error("Símbolo vacío en la producción: {production}")]
    BlankSymbol { production: String },

    /// Un literal entre comillas vacío o sin cerrar
    #[error("Literal vacío o sin cerrar {literal:?} en la producción: {production}")]
    InvalidLiteral { literal: String, production: String },

    /// Una alternativa sin ningún símbolo
    #[error("Alternativa vacía en la producción: {production}")]
    EmptyAlternative { production: String },

    /// Más de dos símbolos no literales en una alternativa
    #[error("La alternativa tiene {arity} símbolos (máximo 2): {production}")]
    ArityTooLarge { arity: usize, production: String },

    /// Dos anotadores registrados con el mismo símbolo
    #[error("Anotador duplicado: {symbol}")]
    DuplicateAnnotator { symbol: String },
}

/// Error al interpretar el resultado de un análisis
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpretError {
    /// El análisis es el centinela vacío
    #[error("No se encontró ninguna interpretación para la consulta")]
    NoInterpretation,

    /// El tipo de gráfico necesita más columnas de las reconocidas
    #[error("El gráfico {kind} necesita al menos {required} columna(s), se reconocieron {found}")]
    MissingColumns {
        kind: String,
        required: usize,
        found: usize,
    },
}

pub type GrammarResult<T> = Result<T, GrammarError>;
