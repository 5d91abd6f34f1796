//! Name normalization.

use gps_model::RosterPlayer;

/// Folds a person name for comparison.
///
/// Non-Latin scripts are transliterated and diacritics dropped, apostrophes
/// vanish (`O'Neil` -> `oneil`) and any other punctuation separates words.
pub fn normalize_name(raw: &str) -> String {
    let ascii = deunicode::deunicode(raw.trim());
    let mut out = String::with_capacity(ascii.len());
    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if ch != '\'' && ch != '`' {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized "First Last" and "Last First" spellings of a roster name.
pub fn name_orders(player: &RosterPlayer) -> Vec<String> {
    let first = normalize_name(&player.first_name);
    let last = normalize_name(&player.last_name);
    let mut orders = Vec::with_capacity(2);
    match (first.is_empty(), last.is_empty()) {
        (true, true) => {}
        (false, true) => orders.push(first),
        (true, false) => orders.push(last),
        (false, false) => {
            orders.push(format!("{first} {last}"));
            orders.push(format!("{last} {first}"));
        }
    }
    orders
}

#[cfg(test)]
mod tests {
    use gps_model::PlayerId;

    use super::*;

    #[test]
    fn folds_case_script_and_punctuation() {
        assert_eq!(normalize_name("  J. Smith "), "j smith");
        assert_eq!(normalize_name("José  Müller-Lüdenscheidt"), "jose muller ludenscheidt");
        assert_eq!(normalize_name("O'Neil"), "oneil");
        assert_eq!(normalize_name("Иван Петров"), normalize_name("иван петров"));
        assert!(normalize_name("Иван").is_ascii());
    }

    #[test]
    fn both_orders_are_offered() {
        let player = RosterPlayer {
            id: PlayerId::new("P1").unwrap(),
            first_name: "John".to_string(),
            last_name: "Smith".to_string(),
        };
        assert_eq!(name_orders(&player), vec!["john smith", "smith john"]);
    }
}
