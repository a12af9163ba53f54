/*!
 * Tests for language utilities
 */

use gemsub::language_utils::{language_from_code, output_code, resolve_language_name};

#[test]
fn test_resolve_language_name_withIsoCodes_shouldReturnEnglishName() {
    assert_eq!(resolve_language_name("km"), "Khmer");
    assert_eq!(resolve_language_name("de"), "German");
    assert_eq!(resolve_language_name("spa"), "Spanish");
}

#[test]
fn test_resolve_language_name_withUnknownCode_shouldPassThrough() {
    assert_eq!(resolve_language_name("xx"), "xx");
    assert_eq!(resolve_language_name("Khmer"), "Khmer");
}

#[test]
fn test_language_from_code_withWrongLength_shouldReturnNone() {
    assert!(language_from_code("k").is_none());
    assert!(language_from_code("khmer").is_none());
}

#[test]
fn test_output_code_withNamesAndCodes_shouldBeShortCode() {
    assert_eq!(output_code("Khmer"), "km");
    assert_eq!(output_code("fr"), "fr");
    assert_eq!(output_code("French"), "fr");
}
