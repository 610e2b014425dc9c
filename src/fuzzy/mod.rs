//! Emparejamiento difuso de nombres
//!
//! Compara el texto de la consulta con los nombres de columna del esquema.

pub mod levenshtein;

pub use levenshtein::weighted_distance;

/// Similitud entre el texto de la consulta y un nombre candidato
///
/// Se define como `1 - distancia / longitud(nombre)`. Vale 1.0 para nombres
/// idénticos (sin distinguir mayúsculas) y 0.0 cuando la distancia iguala la
/// longitud del nombre. Puede ser negativa si el texto es mucho más largo.
pub fn similarity(text: &str, name: &str) -> f64 {
    let name_len = name.chars().count();
    if name_len == 0 {
        return 0.0;
    }
    1.0 - weighted_distance(text, name) as f64 / name_len as f64
}

/// Mejor coincidencia de un texto entre varios nombres
#[derive(Debug, Clone, PartialEq)]
pub struct NameMatch<'a> {
    pub name: &'a str,
    pub similarity: f64,
}

/// Busca el nombre más parecido al texto
///
/// Se ignoran los nombres de menos de la mitad de longitud que el texto.
/// Ante empate gana el primero. Devuelve `None` si el mejor no alcanza `threshold`.
pub fn best_match<'a, I>(text: &str, names: I, threshold: f64) -> Option<NameMatch<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    let text_len = text.chars().count();
    let mut best: Option<NameMatch<'a>> = None;

    for name in names {
        if name.chars().count() * 2 < text_len {
            continue;
        }
        let score = similarity(text, name);
        if best.as_ref().map_or(score > 0.0, |b| score > b.similarity) {
            best = Some(NameMatch {
                name,
                similarity: score,
            });
        }
    }

    best.filter(|b| b.similarity >= threshold)
}
