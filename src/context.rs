//! Contexto del esquema de datos
//!
//! Nombres de columna, tipos y rangos del data frame sobre el que se consulta.

use serde::Deserialize;

/// Amplitud máxima de valores para tratar una columna entera como categórica
pub const PAN_CATEGORICAL_SPAN: f64 = 12.0;

/// Descripción de una columna
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ColumnProfile {
    /// Etiqueta de tipo (por ejemplo `int64`, `float64`, `category`)
    #[serde(default)]
    pub dtype: String,
    /// Rango numérico `[min, max]` si la columna es numérica
    #[serde(default)]
    pub range: Option<(f64, f64)>,
}

/// Contexto del esquema: data frame, columnas y nombres sueltos
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SchemaContext {
    /// Nombre del data frame
    #[serde(default)]
    pub data_frame: String,
    /// Nombres de columna originales, en orden
    #[serde(default)]
    pub columns: Vec<String>,
    /// Nombres que no pertenecen a ningún data frame
    #[serde(default)]
    pub single_frame_names: Vec<String>,
    /// Tipos y rangos por columna (vacío si se desconocen)
    #[serde(default)]
    pub profiles: Vec<ColumnProfile>,
}

impl SchemaContext {
    /// Crea un contexto con nombre de data frame y columnas
    pub fn new<I, S>(data_frame: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            data_frame: data_frame.to_string(),
            columns: columns.into_iter().map(Into::into).collect(),
            single_frame_names: Vec::new(),
            profiles: Vec::new(),
        }
    }

    /// Añade nombres que no pertenecen a ningún data frame
    pub fn with_single_frame_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.single_frame_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Añade tipos y rangos a partir de cadenas
    ///
    /// Solo las columnas `int*`/`float*` cuyos mínimo y máximo se puedan leer
    /// como números reciben rango; el resto queda sin rango.
    pub fn with_types<S: AsRef<str>>(mut self, types: &[S], mins: &[S], maxes: &[S]) -> Self {
        self.profiles = types
            .iter()
            .enumerate()
            .map(|(i, dtype)| {
                let dtype = dtype.as_ref();
                let numeric = dtype.starts_with("int") || dtype.starts_with("float");
                let range = if numeric {
                    let min = mins.get(i).and_then(|m| m.as_ref().trim().parse::<f64>().ok());
                    let max = maxes.get(i).and_then(|m| m.as_ref().trim().parse::<f64>().ok());
                    min.zip(max)
                } else {
                    None
                };
                ColumnProfile {
                    dtype: dtype.to_string(),
                    range,
                }
            })
            .collect();
        self
    }

    /// Todos los nombres que puede reconocer el emparejamiento de columnas
    pub fn candidate_names(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .chain(self.single_frame_names.iter())
            .map(String::as_str)
    }

    /// Posición de una columna del data frame
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// ¿Es un nombre reconocido (columna o nombre suelto)?
    pub fn is_known(&self, name: &str) -> bool {
        self.column_index(name).is_some() || self.single_frame_names.iter().any(|n| n == name)
    }

    fn profile(&self, name: &str) -> Option<&ColumnProfile> {
        self.column_index(name).and_then(|k| self.profiles.get(k))
    }

    /// ¿Es una columna de tipo `category`?
    pub fn is_categorical(&self, name: &str) -> bool {
        self.profile(name).map_or(false, |p| p.dtype == "category")
    }

    /// ¿Es categórica, o entera con un rango de a lo sumo 12 valores?
    pub fn is_pan_categorical(&self, name: &str) -> bool {
        if self.is_categorical(name) {
            return true;
        }
        match self.profile(name) {
            Some(ColumnProfile {
                dtype,
                range: Some((min, max)),
            }) => dtype.contains("int") && max - min <= PAN_CATEGORICAL_SPAN,
            _ => false,
        }
    }

    /// Mínimo conocido de una columna
    pub fn min(&self, name: &str) -> Option<f64> {
        self.profile(name).and_then(|p| p.range).map(|(min, _)| min)
    }

    /// Máximo conocido de una columna
    pub fn max(&self, name: &str) -> Option<f64> {
        self.profile(name).and_then(|p| p.range).map(|(_, max)| max)
    }
}
