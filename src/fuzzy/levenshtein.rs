//! Distancia de edición ponderada

/// Coste de sustituir un carácter
pub const SUBSTITUTION_COST: usize = 2;

/// Coste de insertar o eliminar un carácter
pub const INDEL_COST: usize = 1;

/// Calcula la distancia de edición entre dos cadenas sin distinguir mayúsculas
///
/// A diferencia de Levenshtein clásico, sustituir cuesta 2 mientras que
/// insertar o eliminar cuesta 1: una sustitución equivale a borrar y
/// volver a insertar.
pub fn weighted_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().flat_map(char::to_lowercase).collect();
    let b_chars: Vec<char> = b.chars().flat_map(char::to_lowercase).collect();

    let a_len = a_chars.len();
    let b_len = b_chars.len();

    // Casos base
    if a_len == 0 {
        return b_len * INDEL_COST;
    }
    if b_len == 0 {
        return a_len * INDEL_COST;
    }

    // Solo dos filas en lugar de la matriz completa
    let mut prev_row: Vec<usize> = (0..=b_len).map(|j| j * INDEL_COST).collect();
    let mut curr_row: Vec<usize> = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr_row[0] = i * INDEL_COST;

        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] {
                0
            } else {
                SUBSTITUTION_COST
            };

            curr_row[j] = (prev_row[j] + INDEL_COST) // eliminación
                .min(curr_row[j - 1] + INDEL_COST) // inserción
                .min(prev_row[j - 1] + cost); // sustitución
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}
