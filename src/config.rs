//! Configuración del analizador y argumentos CLI

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::Parser;

/// Clave de semántica con el valor textual de un análisis
pub const VALUE_KEY: &str = "Value";

/// Separador de las propiedades con varios valores
pub const LIST_SEPARATOR: char = ';';

/// Política de fusión de semánticas en las reglas binarias
#[derive(Debug, Clone, PartialEq)]
pub struct MergePolicy {
    /// Propiedades que no deberían repetirse en una misma consulta
    pub non_repeated: BTreeSet<String>,
    /// Factor aplicado a la puntuación por cada propiedad repetida
    pub repeat_penalty: f64,
    /// Propiedades que se unen como conjunto ordenado (`a;b`, sin duplicados)
    pub union_keys: BTreeSet<String>,
    /// Propiedades que se concatenan por posición (`>;<`, con duplicados)
    pub concat_keys: BTreeSet<String>,
}

impl Default for MergePolicy {
    fn default() -> Self {
        let set = |keys: &[&str]| keys.iter().map(|k| k.to_string()).collect();
        Self {
            non_repeated: set(&[
                "histodens",
                "histobins",
                "histostack",
                "histolog",
                "scattermarker",
                "scattercolor",
            ]),
            repeat_penalty: 0.8,
            union_keys: set(&["ColName", "group_col"]),
            concat_keys: set(&["filter_v", "filter_op"]),
        }
    }
}

/// Parámetros del análisis por tabla (chart)
#[derive(Debug, Clone, PartialEq)]
pub struct ParserConfig {
    /// Símbolo raíz de la gramática
    pub root: String,
    /// Candidatos que sobreviven en cada celda tras la poda
    pub candidates_per_cell: usize,
    /// Tokens de ruido tolerados en total por aplicación de regla
    pub max_noise: usize,
    /// Tokens de ruido tolerados a la izquierda en reglas unarias
    pub max_leading_noise_unary: usize,
    /// Penalización por token y carácter de ruido
    pub noise_penalty: f64,
    pub merge: MergePolicy,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            root: "Root".to_string(),
            candidates_per_cell: 20,
            max_noise: 3,
            max_leading_noise_unary: 2,
            noise_penalty: 0.95,
            merge: MergePolicy::default(),
        }
    }
}

impl ParserConfig {
    pub fn with_root(mut self, root: &str) -> Self {
        self.root = root.to_string();
        self
    }

    pub fn with_candidates_per_cell(mut self, count: usize) -> Self {
        self.candidates_per_cell = count;
        self
    }
}

/// Argumentos de la línea de comandos
#[derive(Debug, Clone, Parser)]
#[command(
    name = "vizparse",
    version,
    about = "Traduce consultas en lenguaje natural a peticiones de visualización"
)]
pub struct Config {
    /// Consulta a analizar (varias sentencias separadas por `;`)
    pub query: Option<String>,

    /// Nombre del data frame
    #[arg(short, long, default_value = "df")]
    pub frame: String,

    /// Columnas del data frame, separadas por comas
    #[arg(short, long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Esquema completo en JSON (sustituye a --frame y --columns)
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Archivo de gramática alternativo
    #[arg(short, long)]
    pub grammar: Option<PathBuf>,

    /// Archivo de entrada con una consulta por línea
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Archivo de salida (por defecto, salida estándar)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Salida en JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parser_config() {
        let config = ParserConfig::default();
        assert_eq!(config.root, "Root");
        assert_eq!(config.candidates_per_cell, 20);
        assert_eq!(config.max_noise, 3);
        assert_eq!(config.max_leading_noise_unary, 2);
        assert!(config.merge.non_repeated.contains("histobins"));
        assert!(!config.merge.non_repeated.contains(VALUE_KEY));
    }

    #[test]
    fn test_cli_columns_are_split() {
        let config =
            Config::try_parse_from(["vizparse", "--columns", "Age,Income", "histogram Age"])
                .unwrap();
        assert_eq!(config.columns, vec!["Age", "Income"]);
        assert_eq!(config.query.as_deref(), Some("histogram Age"));
        assert_eq!(config.frame, "df");
        assert!(!config.json);
        assert!(config.output.is_none());
    }

    #[test]
    fn test_cli_files() {
        let config = Config::try_parse_from([
            "vizparse", "-s", "schema.json", "-i", "queries.txt", "-o", "out.json", "--json",
        ])
        .unwrap();
        assert_eq!(config.schema, Some(PathBuf::from("schema.json")));
        assert_eq!(config.input, Some(PathBuf::from("queries.txt")));
        assert_eq!(config.output, Some(PathBuf::from("out.json")));
        assert!(config.json);
        assert!(config.query.is_none());
    }

    #[test]
    fn test_cli_unknown_option() {
        assert!(Config::try_parse_from(["vizparse", "--nope"]).is_err());
    }
}
