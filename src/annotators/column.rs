//! Nombres de columna con emparejamiento difuso

use super::{Annotation, Annotator, SpanView};
use crate::context::SchemaContext;
use crate::fuzzy::{best_match, NameMatch};

/// Similitud mínima para proponer una columna
pub const COLUMN_NAME_THRESHOLD: f64 = 0.5;

fn match_column<'c>(span: &SpanView<'_>, context: &'c SchemaContext, threshold: f64) -> Option<NameMatch<'c>> {
    let text = span.raw_text();
    best_match(&text, context.candidate_names(), threshold)
}

/// `$column`: columna a representar; emite `Value` y `ColName`
#[derive(Debug, Clone, Copy)]
pub struct ColumnAnnotator {
    pub threshold: f64,
}

impl Default for ColumnAnnotator {
    fn default() -> Self {
        Self {
            threshold: COLUMN_NAME_THRESHOLD,
        }
    }
}

impl Annotator for ColumnAnnotator {
    fn symbol(&self) -> &str {
        "$column"
    }

    fn annotate(&self, span: &SpanView<'_>, context: &SchemaContext) -> Option<Annotation> {
        let found = match_column(span, context, self.threshold)?;
        Some(
            Annotation::value(found.name)
                .with("ColName", found.name)
                .with_score(found.similarity),
        )
    }
}

/// `$auxcolumn`: columna auxiliar (agrupación, filtro, color); solo `Value`
#[derive(Debug, Clone, Copy)]
pub struct AuxColumnAnnotator {
    pub threshold: f64,
}

impl Default for AuxColumnAnnotator {
    fn default() -> Self {
        Self {
            threshold: COLUMN_NAME_THRESHOLD,
        }
    }
}

impl Annotator for AuxColumnAnnotator {
    fn symbol(&self) -> &str {
        "$auxcolumn"
    }

    fn annotate(&self, span: &SpanView<'_>, context: &SchemaContext) -> Option<Annotation> {
        let found = match_column(span, context, self.threshold)?;
        Some(Annotation::value(found.name).with_score(found.similarity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotators::test_support::{query, whole};

    fn movies() -> SchemaContext {
        SchemaContext::new("movies", ["MetaCritic", "Box Office", "Year"])
    }

    #[test]
    fn test_exact_column_case_insensitive() {
        let q = query("metacritic");
        let annotation = ColumnAnnotator::default()
            .annotate(&whole(&q), &movies())
            .unwrap();
        assert_eq!(annotation.get("ColName"), Some("MetaCritic"));
        assert_eq!(annotation.get("Value"), Some("MetaCritic"));
        assert_eq!(annotation.score, 1.0);
    }

    #[test]
    fn test_fuzzy_column() {
        // Una inserción frente a "Year": distancia 1, similitud 0.75
        let q = query("Years");
        let annotation = ColumnAnnotator::default()
            .annotate(&whole(&q), &movies())
            .unwrap();
        assert_eq!(annotation.get("ColName"), Some("Year"));
        assert_eq!(annotation.score, 0.75);
    }

    #[test]
    fn test_multi_token_column() {
        let q = query("box office");
        let annotation = ColumnAnnotator::default()
            .annotate(&whole(&q), &movies())
            .unwrap();
        assert_eq!(annotation.get("ColName"), Some("Box Office"));
    }

    #[test]
    fn test_below_threshold_rejected() {
        let q = query("histogram");
        assert!(ColumnAnnotator::default()
            .annotate(&whole(&q), &movies())
            .is_none());
    }

    #[test]
    fn test_aux_column_only_value() {
        let q = query("Year");
        let annotation = AuxColumnAnnotator::default()
            .annotate(&whole(&q), &movies())
            .unwrap();
        assert_eq!(annotation.get("Value"), Some("Year"));
        assert_eq!(annotation.get("ColName"), None);
    }

    #[test]
    fn test_single_frame_names_are_candidates() {
        let context = SchemaContext::new("df", ["A"]).with_single_frame_names(["sizes"]);
        let q = query("sizes");
        let annotation = AuxColumnAnnotator::default()
            .annotate(&whole(&q), &context)
            .unwrap();
        assert_eq!(annotation.get("Value"), Some("sizes"));
    }
}
