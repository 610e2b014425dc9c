//! Interpretación del mejor análisis
//!
//! Vista tipada sobre el mapa semántico de un análisis raíz: tipo de gráfico,
//! columnas, ejes, agrupación, filtros y intervalos de histograma. Las
//! propiedades se leen por presencia; nunca hay valores nulos.

use serde::Serialize;
use tracing::debug;

use crate::config::LIST_SEPARATOR;
use crate::context::SchemaContext;
use crate::error::InterpretError;
use crate::grammar::{Parse, Semantics};

/// Palabras que delatan una columna temporal
const DATE_ELEMENTS: &[&str] = &["year", "month", "day", "time"];

const PAN_CATEGORICAL_WEIGHT: i32 = 5;
const DATE_WEIGHT: i32 = 2;

/// Tipo de gráfico solicitado
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotKind {
    Overview,
    Histogram,
    Scatter,
    #[serde(rename = "lineplot")]
    Line,
    Regression,
}

impl PlotKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PlotKind::Overview => "overview",
            PlotKind::Histogram => "histogram",
            PlotKind::Scatter => "scatter",
            PlotKind::Line => "lineplot",
            PlotKind::Regression => "regression",
        }
    }

    fn from_type(value: &str) -> Option<Self> {
        match value {
            "overview" => Some(PlotKind::Overview),
            "histogram" => Some(PlotKind::Histogram),
            "scatter" => Some(PlotKind::Scatter),
            "lineplot" => Some(PlotKind::Line),
            _ => None,
        }
    }

    /// Columnas necesarias para dibujar
    fn required_columns(self) -> usize {
        match self {
            PlotKind::Overview => 0,
            PlotKind::Histogram | PlotKind::Line => 1,
            PlotKind::Scatter | PlotKind::Regression => 2,
        }
    }
}

impl std::fmt::Display for PlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condición `columna op valor`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub column: String,
    pub op: String,
    pub value: String,
}

/// Agrupación de filas antes de dibujar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grouping {
    pub columns: Vec<String>,
    /// Función de agregación (`mean`, `sum`...)
    pub op: Option<String>,
    /// Una serie por grupo; si no, se agrega y la agrupación es el eje x
    pub series: bool,
}

/// Intervalos de un histograma
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Binning {
    /// Número de intervalos
    Count { bins: u32 },
    /// Bordes explícitos
    Edges { edges: Vec<f64> },
    /// Rango `[start, end]` con paso opcional
    Range {
        start: f64,
        end: f64,
        step: Option<f64>,
    },
}

/// Petición de visualización interpretada
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotRequest {
    pub kind: PlotKind,
    /// Columnas reconocidas en el esquema, en orden
    pub columns: Vec<String>,
    pub x: Option<String>,
    pub y: Option<String>,
    pub group: Option<Grouping>,
    pub filters: Vec<Filter>,
    pub bins: Option<Binning>,
    pub log: bool,
    pub stacked: bool,
    pub density: bool,
    pub marker: Option<String>,
    pub marker_column: Option<String>,
    pub color: Option<String>,
    pub color_column: Option<String>,
    pub line: Option<String>,
    pub score: f64,
}

impl PlotRequest {
    fn overview(score: f64) -> Self {
        Self {
            kind: PlotKind::Overview,
            columns: Vec::new(),
            x: None,
            y: None,
            group: None,
            filters: Vec::new(),
            bins: None,
            log: false,
            stacked: false,
            density: false,
            marker: None,
            marker_column: None,
            color: None,
            color_column: None,
            line: None,
            score,
        }
    }

    /// Interpreta un mapa semántico contra el esquema
    pub fn from_semantics(
        semantics: &Semantics,
        score: f64,
        context: &SchemaContext,
    ) -> Result<Self, InterpretError> {
        let mut view = View {
            semantics: semantics.clone(),
            context,
        };

        let typed = view.get("type").and_then(PlotKind::from_type);
        if typed == Some(PlotKind::Overview) || (typed.is_none() && !view.has("ColName")) {
            return Ok(Self::overview(score));
        }

        let kind = match typed {
            Some(PlotKind::Histogram) => PlotKind::Histogram,
            _ if view.has("regress") => PlotKind::Regression,
            Some(kind) => kind,
            None => view.infer_kind(),
        };

        view.resolve_grouping(kind);
        let series = view.layout_groups(kind);

        let columns = view.known_list("ColName");
        if columns.len() < kind.required_columns() {
            return Err(InterpretError::MissingColumns {
                kind: kind.to_string(),
                required: kind.required_columns(),
                found: columns.len(),
            });
        }

        let (x, y) = match kind {
            PlotKind::Scatter | PlotKind::Regression => {
                (view.x_axis(&columns), view.y_axis(&columns))
            }
            PlotKind::Line if columns.len() > 1 => (view.x_axis(&columns), view.y_axis(&columns)),
            PlotKind::Line => (None, view.y_axis(&columns)),
            _ => (None, None),
        };

        let group = view.list("group_col").map(|columns| Grouping {
            columns,
            op: view.get("group_op").map(str::to_string),
            series,
        });

        let bins = match kind {
            PlotKind::Histogram => view.binning(&columns),
            _ => None,
        };

        Ok(Self {
            kind,
            x,
            y,
            group,
            filters: view.filters(),
            bins,
            log: view.has("histolog"),
            stacked: view.has("histostack"),
            density: view.has("histodens"),
            marker: view.owned("marker"),
            marker_column: view.owned("marker_col"),
            color: view.owned("color"),
            color_column: view.owned("color_col"),
            line: view.owned("line"),
            columns,
            score,
        })
    }
}

/// Interpreta el mejor análisis de una sentencia
pub fn interpret(parse: &Parse<'_>, context: &SchemaContext) -> Result<PlotRequest, InterpretError> {
    if parse.is_empty() {
        return Err(InterpretError::NoInterpretation);
    }
    PlotRequest::from_semantics(parse.semantics(), parse.score(), context)
}

struct View<'c> {
    semantics: Semantics,
    context: &'c SchemaContext,
}

impl<'c> View<'c> {
    fn get(&self, key: &str) -> Option<&str> {
        self.semantics.get(key).map(String::as_str)
    }

    fn has(&self, key: &str) -> bool {
        self.semantics.contains_key(key)
    }

    fn owned(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    fn list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(split_list)
    }

    /// Elementos de la lista presentes en el esquema
    fn known_list(&self, key: &str) -> Vec<String> {
        self.list(key)
            .unwrap_or_default()
            .into_iter()
            .filter(|name| self.context.is_known(name))
            .collect()
    }

    fn axis_score(&self, column: &str) -> i32 {
        let mut score = 0;
        if self.context.is_pan_categorical(column) {
            score += PAN_CATEGORICAL_WEIGHT;
        }
        let lower = column.to_lowercase();
        if DATE_ELEMENTS.iter().any(|e| lower.contains(e)) {
            score += DATE_WEIGHT;
        }
        score
    }

    /// Primera columna con mayor puntuación categórica
    fn x_axis(&self, columns: &[String]) -> Option<String> {
        let mut best: Option<(&String, i32)> = None;
        for column in columns {
            let score = self.axis_score(column);
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((column, score));
            }
        }
        best.map(|(c, _)| c.clone())
    }

    /// Última columna con menor puntuación categórica
    fn y_axis(&self, columns: &[String]) -> Option<String> {
        let mut best: Option<(&String, i32)> = None;
        for column in columns {
            let score = self.axis_score(column);
            if best.map_or(true, |(_, b)| score <= b) {
                best = Some((column, score));
            }
        }
        best.map(|(c, _)| c.clone())
    }

    fn categorical_x(&self, key: &str) -> Option<String> {
        let columns = self.known_list(key);
        self.x_axis(&columns)
            .filter(|x| self.context.is_pan_categorical(x))
    }

    /// Puntuación por tipo cuando la consulta no lo dice
    ///
    /// Ante empate gana histograma, después línea y por último dispersión.
    fn infer_kind(&self) -> PlotKind {
        let columns = self.list("ColName").map_or(0, |c| c.len());
        let groups = self.list("group_col").map_or(0, |g| g.len());

        let (mut hist, mut scatter, mut line) = (0, 0, 0);
        if columns == 2 || (columns == 1 && groups > 1) {
            scatter += 1;
            line += 1;
        } else {
            scatter -= 2;
            line -= 2;
        }
        for key in ["histobins", "histostack", "histolog", "histodens"] {
            if self.has(key) {
                hist += 1;
            }
        }
        if self.has("marker") || self.has("marker_col") {
            scatter += 1;
        }
        if self.has("color") || self.has("color_col") {
            scatter += 1;
        }
        for key in ["marker", "line", "color"] {
            if self.has(key) {
                line += 1;
            }
        }
        if self.categorical_x("ColName").is_some() {
            scatter += 1;
        } else {
            line += 1;
        }

        let best = hist.max(scatter).max(line);
        if hist == best {
            PlotKind::Histogram
        } else if line == best {
            PlotKind::Line
        } else {
            PlotKind::Scatter
        }
    }

    /// Completa y reordena la agrupación
    fn resolve_grouping(&mut self, kind: PlotKind) {
        if self.has("group_op") && !self.has("group_col") {
            if let Some(x) = self.categorical_x("ColName") {
                if matches!(kind, PlotKind::Line | PlotKind::Scatter) {
                    self.semantics.insert("group_col".to_string(), x);
                }
            }
        }

        if !self.has("group_col") || !self.has("ColName") {
            return;
        }

        // Una columna categórica dibujada se intercambia con una agrupación
        // que no lo es
        let plotted = self.x_axis(&self.known_list("ColName"));
        let grouped = self.x_axis(&self.known_list("group_col"));
        if let (Some(plotted), Some(grouped)) = (plotted, grouped) {
            if self.context.is_pan_categorical(&plotted)
                && !self.context.is_pan_categorical(&grouped)
            {
                debug!(%plotted, %grouped, "intercambiando columna y agrupación");
                self.swap_member("ColName", &plotted, &grouped);
                self.swap_member("group_col", &grouped, &plotted);
            }
        }

        if !self.has("group_op") && kind != PlotKind::Histogram {
            let columns = self.known_list("ColName");
            let categorical_y = self
                .y_axis(&columns)
                .map_or(false, |y| self.context.is_pan_categorical(&y));
            if !categorical_y {
                self.semantics
                    .insert("group_op".to_string(), "mean".to_string());
            }
        }
    }

    /// Agregar por la agrupación o dibujar una serie por grupo
    ///
    /// Se agrega cuando hay una sola agrupación y una sola columna dibujada, o
    /// cuando el eje x categórico ya es la agrupación. Fuera de los histogramas
    /// una columna dibujada sola recibe delante la primera agrupación, que
    /// pasa a ser el eje x.
    fn layout_groups(&mut self, kind: PlotKind) -> bool {
        let groups = self.known_list("group_col");
        let columns = self.known_list("ColName");
        let Some(first) = groups.first() else {
            return false;
        };
        if columns.is_empty() || kind == PlotKind::Histogram {
            return true;
        }

        let x_is_group = columns.len() > 1
            && columns.iter().any(|c| self.context.is_pan_categorical(c))
            && self.x_axis(&columns).as_deref() == Some(first.as_str());
        let series = !(groups.len() == 1 && (columns.len() == 1 || x_is_group));

        if columns.len() == 1 && !columns.contains(first) {
            let joined = format!("{}{}{}", first, LIST_SEPARATOR, columns[0]);
            debug!(x = %first, series, "agrupación como eje x");
            self.semantics.insert("ColName".to_string(), joined);
        }
        series
    }

    /// Quita `remove` de la lista `key` y añade `add` al final
    fn swap_member(&mut self, key: &str, remove: &str, add: &str) {
        let mut items: Vec<String> = self
            .list(key)
            .unwrap_or_default()
            .into_iter()
            .filter(|item| item != remove)
            .collect();
        items.push(add.to_string());
        self.semantics
            .insert(key.to_string(), items.join(&LIST_SEPARATOR.to_string()));
    }

    /// Filtros emparejando operadores y valores por posición
    fn filters(&self) -> Vec<Filter> {
        let Some(column) = self.get("filter_col") else {
            return Vec::new();
        };
        let (Some(ops), Some(values)) = (self.list("filter_op"), self.list("filter_v")) else {
            return Vec::new();
        };
        if ops.len() != values.len() {
            debug!(
                ops = ops.len(),
                values = values.len(),
                "filtros sin pareja descartados"
            );
        }
        ops.into_iter()
            .zip(values)
            .map(|(op, value)| Filter {
                column: column.to_string(),
                op,
                value,
            })
            .collect()
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.get(key)?.trim().parse::<f64>().ok().filter(|n| n.is_finite())
    }

    fn binning(&self, columns: &[String]) -> Option<Binning> {
        if !self.has("histobins") {
            return None;
        }

        if let (Some(first), Some(second)) =
            (self.number("bin_pair_first"), self.number("bin_pair_second"))
        {
            let (start, end) = if first > second {
                (second, first)
            } else {
                (first, second)
            };
            let step = self
                .number("bin_pair_step")
                .or_else(|| self.number("bin_single"))
                .map(f64::abs)
                .filter(|s| *s > 0.0);
            return Some(Binning::Range { start, end, step });
        }

        if let Some(single) = self.get("bin_single") {
            if single.contains(',') {
                let edges = single
                    .split(',')
                    .map(|e| e.trim().parse::<f64>())
                    .collect::<Result<Vec<_>, _>>()
                    .ok()?;
                return Some(Binning::Edges { edges });
            }
            return single
                .trim()
                .parse::<u32>()
                .ok()
                .map(|bins| Binning::Count { bins });
        }

        let step = self.number("bin_pair_step").map(f64::abs).filter(|s| *s > 0.0)?;
        let column = columns.first()?;
        let start = self.context.min(column)?;
        let end = self.context.max(column)?;
        Some(Binning::Range {
            start,
            end,
            step: Some(step),
        })
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
