//! Header normalization for hand-written spreadsheet columns
//!
//! "Estantería", "ESTANTERIA " and "estanteria" all name the same column, and
//! "Rango inicio" matches "rango_inicio".

/// Fold a header to lowercase ASCII words joined by `_`
///
/// Spanish accented vowels and `ñ` are folded to their base letter. Runs of
/// other non-alphanumeric characters become a single `_`, with none at
/// either end.
pub fn normalize_header(header: &str) -> String {
    let mut out = String::with_capacity(header.len());
    let mut pending_sep = false;

    for ch in header.trim().chars().flat_map(char::to_lowercase) {
        let ch = fold_accent(ch);
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            pending_sep = true;
        }
    }

    out
}

fn fold_accent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        other => other,
    }
}

/// First run of ASCII digits in a header ("Anaquel 4" → 4)
pub fn header_number(header: &str) -> Option<i64> {
    let digits: String = header
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
