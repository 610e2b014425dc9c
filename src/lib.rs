//! vizparse - Análisis de consultas en lenguaje natural para visualización
//!
//! Traduce una consulta libre sobre un conjunto de datos tabular en un
//! análisis puntuado con propiedades semánticas (tipo de gráfico, columnas,
//! agrupación, filtros...). El núcleo es un analizador por tabla de intervalos
//! tolerante a ruido que combina reglas de producción con anotadores difusos.

pub mod annotators;
pub mod config;
pub mod context;
pub mod error;
pub mod fuzzy;
pub mod grammar;
pub mod interpret;
pub mod visualization;

pub use config::{Config, MergePolicy, ParserConfig};
pub use context::SchemaContext;
pub use error::{GrammarError, InterpretError};
pub use grammar::{Grammar, Parse};
pub use interpret::{interpret, PlotKind, PlotRequest};
pub use visualization::VisualizationGrammar;
