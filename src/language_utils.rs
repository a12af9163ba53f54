/*!
 * Language name resolution.
 *
 * The target language ends up verbatim inside the prompt, so ISO 639
 * codes from the config or CLI are expanded to their English names
 * ("km" -> "Khmer"). Anything that is not a known code is passed through.
 */

use isolang::Language;

/// Look up an ISO 639-1 or ISO 639-3 code
pub fn language_from_code(code: &str) -> Option<Language> {
    let code = code.trim().to_lowercase();
    match code.len() {
        2 => Language::from_639_1(&code),
        3 => Language::from_639_3(&code),
        _ => None,
    }
}

/// English name for a language code, or the input unchanged if it is already a name
pub fn resolve_language_name(language: &str) -> String {
    let trimmed = language.trim();
    match language_from_code(trimmed) {
        Some(lang) => lang.to_name().to_string(),
        None => trimmed.to_string(),
    }
}

/// Short code used in output file names ("Khmer" -> "km", "km" -> "km")
pub fn output_code(language: &str) -> String {
    let trimmed = language.trim();
    if let Some(lang) = language_from_code(trimmed) {
        return lang.to_639_1().unwrap_or(lang.to_639_3()).to_string();
    }
    Language::from_name(trimmed)
        .map(|lang| lang.to_639_1().unwrap_or(lang.to_639_3()).to_string())
        .unwrap_or_else(|| trimmed.to_lowercase().replace(char::is_whitespace, "_"))
}
