use anyhow::{Result, anyhow};
use isolang::Language;

// @module: ISO 639-1 / 639-2 language code handling for OCR and translation

/// Bibliographic (/B) codes that differ from their terminology (/T) form
const PART2B_TO_PART2T: [(&str, &str); 18] = [
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Language part of a tag: "zh" for "zh-CN", "hi" for "hi-t-i0-handwrit"
pub fn primary_subtag(code: &str) -> &str {
    let code = code.trim();
    code.split(['-', '_']).next().unwrap_or(code)
}

/// Whether the tag carries more than the language (region, script, ...)
pub fn has_subtags(code: &str) -> bool {
    code.trim().contains(['-', '_'])
}

fn lookup(code: &str) -> Option<Language> {
    let code = primary_subtag(code).to_lowercase();
    match code.len() {
        2 => Language::from_639_1(&code),
        3 => {
            let part2t = PART2B_TO_PART2T.iter()
                .find(|(b, _)| *b == code)
                .map(|(_, t)| *t)
                .unwrap_or(code.as_str());
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Validate that a code names a known language.
///
/// Only the primary subtag is checked, so tags such as "zh-CN" or the
/// handwriting hint "hi-t-i0-handwrit" are accepted.
pub fn validate_language_code(code: &str) -> Result<()> {
    lookup(code)
        .map(|_| ())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Normalize to ISO 639-1 where one exists, otherwise ISO 639-2/T.
///
/// Translation endpoints expect the short form ("hi", "en"). Subtags are
/// dropped, so callers that need "zh-CN" must check `has_subtags` first.
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let lang = lookup(code)
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))?;

    Ok(lang.to_639_1()
        .map(|c| c.to_string())
        .unwrap_or_else(|| lang.to_639_3().to_string()))
}

/// Check if two language codes represent the same language
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (lookup(code1), lookup(code2)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// English name of the language, e.g. "Hindi" for "hi"
pub fn get_language_name(code: &str) -> Result<String> {
    lookup(code)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))
}
