//! Anotadores de vocabulario cerrado: colores, estilos de línea, marcadores y
//! cadenas entre comillas

use super::{Annotation, Annotator, SpanView};
use crate::context::SchemaContext;

/// Colores predefinidos y su código de matplotlib
const COLORS: &[(&str, &str)] = &[
    ("white", "w"),
    ("cyan", "c"),
    ("black", "k"),
    ("blue", "b"),
    ("green", "g"),
    ("red", "r"),
    ("yellow", "y"),
    ("magenta", "m"),
];

const LINE_STYLES: &[(&str, &str)] = &[
    ("solid", "-"),
    ("dashed", "--"),
    ("dash-dot", "-."),
    ("dotted", ":"),
    ("dot-dash", "-."),
];

const MARKERS: &[(&str, &str)] = &[
    ("point", "."),
    ("dot", "."),
    ("pixel", ","),
    ("circle", "o"),
    ("triangle_down", "v"),
    ("triangle_up", "^"),
    ("triangle_left", "<"),
    ("triangle_right", ">"),
    ("tri_down", "1"),
    ("tri_up", "2"),
    ("tri_left", "3"),
    ("tri_right", "4"),
    ("square", "s"),
    ("pentagon", "p"),
    ("star", "*"),
    ("hexagon1", "h"),
    ("hexagon2", "H"),
    ("plus", "+"),
    ("x", "x"),
    ("diamond", "D"),
    ("thin_diamond", "d"),
    ("vline", "|"),
    ("hline", "_"),
];

fn lookup(table: &[(&str, &'static str)], word: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, code)| *code)
}

/// `$precolor`: nombre de color de un solo token; emite `Value` y `color`
#[derive(Debug, Clone, Copy, Default)]
pub struct PrecolorAnnotator;

impl Annotator for PrecolorAnnotator {
    fn symbol(&self) -> &str {
        "$precolor"
    }

    fn annotate(&self, span: &SpanView<'_>, _context: &SchemaContext) -> Option<Annotation> {
        if span.len() != 1 {
            return None;
        }
        let code = span
            .forms(0)
            .iter()
            .find_map(|form| lookup(COLORS, form))?;
        Some(Annotation::value(code).with("color", code))
    }
}

/// `$linefmt`: estilo de línea; emite `Value` y `line`
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormatAnnotator;

impl Annotator for LineFormatAnnotator {
    fn symbol(&self) -> &str {
        "$linefmt"
    }

    fn annotate(&self, span: &SpanView<'_>, _context: &SchemaContext) -> Option<Annotation> {
        if span.len() != 1 {
            return None;
        }
        // La raíz de "dotted" es "dot", que también es un marcador
        let code = lookup(LINE_STYLES, &span.raw[0].to_lowercase())?;
        Some(Annotation::value(code).with("line", code))
    }
}

/// `$markerfmt`: forma de marcador; emite `Value` y `marker`
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerFormatAnnotator;

impl Annotator for MarkerFormatAnnotator {
    fn symbol(&self) -> &str {
        "$markerfmt"
    }

    fn annotate(&self, span: &SpanView<'_>, _context: &SchemaContext) -> Option<Annotation> {
        if span.len() != 1 {
            return None;
        }
        let code = lookup(MARKERS, &span.raw[0].to_lowercase())?;
        Some(Annotation::value(code).with("marker", code))
    }
}

/// `$quotedstring`: un token entre comillas dobles, comillas incluidas
#[derive(Debug, Clone, Copy, Default)]
pub struct QuotedStringAnnotator;

impl Annotator for QuotedStringAnnotator {
    fn symbol(&self) -> &str {
        "$quotedstring"
    }

    fn annotate(&self, span: &SpanView<'_>, _context: &SchemaContext) -> Option<Annotation> {
        if span.len() != 1 {
            return None;
        }
        let raw = &span.raw[0];
        let quoted = raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"');
        quoted.then(|| Annotation::value(raw.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotators::test_support::{query, whole};

    fn annotate<A: Annotator>(annotator: &A, text: &str) -> Option<Annotation> {
        let q = query(text);
        annotator.annotate(&whole(&q), &SchemaContext::default())
    }

    #[test]
    fn test_precolor() {
        let annotation = annotate(&PrecolorAnnotator, "Red").unwrap();
        assert_eq!(annotation.get("color"), Some("r"));
        assert_eq!(annotation.get("Value"), Some("r"));
        // Negro y azul no comparten código
        assert_eq!(annotate(&PrecolorAnnotator, "black").unwrap().get("color"), Some("k"));
        assert_eq!(annotate(&PrecolorAnnotator, "blue").unwrap().get("color"), Some("b"));
        assert!(annotate(&PrecolorAnnotator, "purple").is_none());
        assert!(annotate(&PrecolorAnnotator, "red blue").is_none());
    }

    #[test]
    fn test_line_format() {
        assert_eq!(annotate(&LineFormatAnnotator, "dashed").unwrap().get("line"), Some("--"));
        assert_eq!(annotate(&LineFormatAnnotator, "Dotted").unwrap().get("line"), Some(":"));
        assert!(annotate(&LineFormatAnnotator, "wavy").is_none());
    }

    #[test]
    fn test_marker_format() {
        assert_eq!(annotate(&MarkerFormatAnnotator, "circle").unwrap().get("marker"), Some("o"));
        assert_eq!(annotate(&MarkerFormatAnnotator, "hexagon2").unwrap().get("marker"), Some("H"));
        assert!(annotate(&MarkerFormatAnnotator, "dotted").is_none());
    }

    #[test]
    fn test_quoted_string() {
        let annotation = annotate(&QuotedStringAnnotator, "\"USA\"").unwrap();
        assert_eq!(annotation.get("Value"), Some("\"USA\""));
        assert!(annotate(&QuotedStringAnnotator, "USA").is_none());
        assert!(annotate(&QuotedStringAnnotator, "\"").is_none());
    }
}
