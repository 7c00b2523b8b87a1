// Language tag resolution
//
// The translation model expects FLORES-200 style tags ("eng_Latn", "tur_Latn").
// Detected languages arrive as ISO 639-1 codes ("en") or, for languages the
// detector knows but we do not map, as ISO 639-3 codes. Everything funnels
// through the static table below; anything the table does not know resolves to
// DEFAULT_LANGUAGE.

pub mod detect;

use serde::Serialize;

pub use detect::{detect_language, LanguageDetector, WhatlangDetector};
#[cfg(test)]
pub use detect::MockLanguageDetector;

/// One row of the language tag table
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Language {
    /// ISO 639-1 code
    pub code: &'static str,
    /// ISO 639-3 code as reported by the language identifier
    pub iso639_3: &'static str,
    /// Tag the translation model expects
    pub tag: &'static str,
    /// English name, used in prompts and listings
    pub name: &'static str,
}

const fn lang(
    code: &'static str,
    iso639_3: &'static str,
    tag: &'static str,
    name: &'static str,
) -> Language {
    Language { code, iso639_3, tag, name }
}

/// Code used whenever detection fails or yields an unmapped language
pub const DEFAULT_LANGUAGE_CODE: &str = "en";

const ENGLISH: Language = lang("en", "eng", "eng_Latn", "English");

/// Row returned for anything the table does not know
pub static DEFAULT_LANGUAGE: &Language = &ENGLISH;

pub static LANGUAGES: &[Language] = &[
    ENGLISH,
    lang("tr", "tur", "tur_Latn", "Turkish"),
    lang("de", "deu", "deu_Latn", "German"),
    lang("fr", "fra", "fra_Latn", "French"),
    lang("es", "spa", "spa_Latn", "Spanish"),
    lang("it", "ita", "ita_Latn", "Italian"),
    lang("pt", "por", "por_Latn", "Portuguese"),
    lang("nl", "nld", "nld_Latn", "Dutch"),
    lang("ru", "rus", "rus_Cyrl", "Russian"),
    lang("uk", "ukr", "ukr_Cyrl", "Ukrainian"),
    lang("pl", "pol", "pol_Latn", "Polish"),
    lang("cs", "ces", "ces_Latn", "Czech"),
    lang("sv", "swe", "swe_Latn", "Swedish"),
    lang("da", "dan", "dan_Latn", "Danish"),
    lang("fi", "fin", "fin_Latn", "Finnish"),
    lang("el", "ell", "ell_Grek", "Greek"),
    lang("bg", "bul", "bul_Cyrl", "Bulgarian"),
    lang("ro", "ron", "ron_Latn", "Romanian"),
    lang("hu", "hun", "hun_Latn", "Hungarian"),
    lang("ar", "ara", "arb_Arab", "Arabic"),
    lang("fa", "pes", "pes_Arab", "Persian"),
    lang("he", "heb", "heb_Hebr", "Hebrew"),
    lang("hi", "hin", "hin_Deva", "Hindi"),
    lang("bn", "ben", "ben_Beng", "Bengali"),
    lang("ur", "urd", "urd_Arab", "Urdu"),
    lang("zh", "cmn", "zho_Hans", "Chinese"),
    lang("ja", "jpn", "jpn_Jpan", "Japanese"),
    lang("ko", "kor", "kor_Hang", "Korean"),
    lang("vi", "vie", "vie_Latn", "Vietnamese"),
    lang("id", "ind", "ind_Latn", "Indonesian"),
    lang("az", "aze", "azj_Latn", "Azerbaijani"),
    lang("ka", "kat", "kat_Geor", "Georgian"),
    lang("hy", "hye", "hye_Armn", "Armenian"),
    lang("th", "tha", "tha_Thai", "Thai"),
];

/// Find a table row by ISO 639-1 or ISO 639-3 code, ignoring case
pub fn lookup(code: &str) -> Option<&'static Language> {
    let code = code.trim();
    LANGUAGES
        .iter()
        .find(|l| l.code.eq_ignore_ascii_case(code) || l.iso639_3.eq_ignore_ascii_case(code))
}

/// Map a detected code to the model's tag; unknown codes resolve to English
pub fn resolve_tag(code: &str) -> &'static Language {
    lookup(code).unwrap_or(DEFAULT_LANGUAGE)
}
