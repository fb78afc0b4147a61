// Translator
// Model translation with a small word-dictionary fallback

use serde::Deserialize;

use crate::models::{Engine, TranslateResponse};
use crate::services::providers::CompletionService;
use crate::services::text_processor::detect_language;

use super::{ask_model, non_empty, rewrite_words};

const TRANSLATE_SYSTEM_PROMPT: &str = r#"You are a professional translator. Translate the text into the target language, preserving meaning, tone and formatting.
Return JSON only: {"translatedText": "...", "sourceLanguage": "ISO 639-1 code"}"#;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct TranslateReply {
    translated_text: Option<String>,
    source_language: Option<String>,
}

const LANGUAGE_NAMES: &[(&str, &[&str])] = &[
    ("en", &["english", "inglés", "anglais", "englisch"]),
    ("es", &["spanish", "español", "espanol", "castellano"]),
    ("fr", &["french", "français", "francais"]),
    ("de", &["german", "deutsch"]),
    ("it", &["italian", "italiano"]),
    ("pt", &["portuguese", "português", "portugues"]),
    ("zh", &["chinese", "mandarin", "中文"]),
    ("ja", &["japanese", "日本語"]),
    ("ru", &["russian", "русский"]),
    ("ko", &["korean", "한국어"]),
];

/// Language name or code to a lowercase ISO 639-1 code ("Spanish" -> "es",
/// "pt-BR" -> "pt"). Unknown names pass through lowercased.
pub fn normalize_language(value: &str) -> String {
    let lower = value.trim().to_lowercase();
    for (code, names) in LANGUAGE_NAMES {
        if names.contains(&lower.as_str()) {
            return code.to_string();
        }
    }
    match lower.split(|c: char| c == '-' || c == '_').next() {
        Some(primary) if primary.len() == 2 => primary.to_string(),
        _ => lower,
    }
}

const ENGLISH_TO_SPANISH: &[(&str, &str)] = &[
    ("hello", "hola"), ("goodbye", "adiós"), ("thank", "gracias"), ("thanks", "gracias"),
    ("please", "por favor"), ("yes", "sí"), ("no", "no"), ("the", "el"), ("a", "un"),
    ("and", "y"), ("is", "es"), ("are", "son"), ("i", "yo"), ("you", "tú"), ("we", "nosotros"),
    ("good", "bueno"), ("bad", "malo"), ("friend", "amigo"), ("house", "casa"), ("world", "mundo"),
    ("water", "agua"), ("book", "libro"), ("day", "día"), ("night", "noche"), ("love", "amor"),
    ("time", "tiempo"), ("work", "trabajo"), ("today", "hoy"), ("with", "con"), ("very", "muy"),
];

const ENGLISH_TO_FRENCH: &[(&str, &str)] = &[
    ("hello", "bonjour"), ("goodbye", "au revoir"), ("thanks", "merci"), ("thank", "merci"),
    ("please", "s'il vous plaît"), ("yes", "oui"), ("no", "non"), ("the", "le"), ("a", "un"),
    ("and", "et"), ("is", "est"), ("are", "sont"), ("i", "je"), ("you", "vous"), ("we", "nous"),
    ("good", "bon"), ("bad", "mauvais"), ("friend", "ami"), ("house", "maison"), ("world", "monde"),
    ("water", "eau"), ("book", "livre"), ("day", "jour"), ("night", "nuit"), ("love", "amour"),
    ("time", "temps"), ("work", "travail"), ("today", "aujourd'hui"), ("with", "avec"), ("very", "très"),
];

const ENGLISH_TO_GERMAN: &[(&str, &str)] = &[
    ("hello", "hallo"), ("goodbye", "auf Wiedersehen"), ("thanks", "danke"), ("thank", "danke"),
    ("please", "bitte"), ("yes", "ja"), ("no", "nein"), ("the", "die"), ("a", "ein"),
    ("and", "und"), ("is", "ist"), ("are", "sind"), ("i", "ich"), ("you", "du"), ("we", "wir"),
    ("good", "gut"), ("bad", "schlecht"), ("friend", "Freund"), ("house", "Haus"), ("world", "Welt"),
    ("water", "Wasser"), ("book", "Buch"), ("day", "Tag"), ("night", "Nacht"), ("love", "Liebe"),
    ("time", "Zeit"), ("work", "Arbeit"), ("today", "heute"), ("with", "mit"), ("very", "sehr"),
];

fn dictionary(target: &str) -> Option<&'static [(&'static str, &'static str)]> {
    match target {
        "es" => Some(ENGLISH_TO_SPANISH),
        "fr" => Some(ENGLISH_TO_FRENCH),
        "de" => Some(ENGLISH_TO_GERMAN),
        _ => None,
    }
}

/// Word-by-word substitution for English into es/fr/de; any other pair comes
/// back tagged with the target code. Same-language requests are returned as is.
pub fn translate_locally(text: &str, source: &str, target: &str) -> String {
    if source == target {
        return text.to_string();
    }
    match dictionary(target) {
        Some(words) if source == "en" => {
            rewrite_words(text, |w| {
                words
                    .iter()
                    .find(|(en, _)| *en == w)
                    .map(|(_, tr)| tr.to_string())
            })
            .0
        }
        _ => format!("[{}] {}", target, text),
    }
}

pub async fn translate(
    completer: Option<&dyn CompletionService>,
    text: &str,
    target_language: &str,
    source_language: Option<&str>,
) -> TranslateResponse {
    let target = normalize_language(target_language);
    let source = source_language
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("auto"))
        .map(normalize_language)
        .unwrap_or_else(|| detect_language(text));

    let user_prompt = format!("Source language: {}\nTarget language: {}\n\nText:\n{}", source, target, text);
    if let Some(reply) = ask_model::<TranslateReply>(completer, "translate", TRANSLATE_SYSTEM_PROMPT, &user_prompt).await {
        if let Some(translated_text) = non_empty(reply.translated_text) {
            return TranslateResponse {
                translated_text,
                source_language: non_empty(reply.source_language)
                    .map(|s| normalize_language(&s))
                    .unwrap_or(source),
                target_language: target,
                engine: Engine::Model,
            };
        }
    }

    TranslateResponse {
        translated_text: translate_locally(text, &source, &target),
        source_language: source,
        target_language: target,
        engine: Engine::Local,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_language() {
        assert_eq!(normalize_language("Spanish"), "es");
        assert_eq!(normalize_language(" FR "), "fr");
        assert_eq!(normalize_language("pt-BR"), "pt");
        assert_eq!(normalize_language("Deutsch"), "de");
        assert_eq!(normalize_language("klingon"), "klingon");
    }

    #[test]
    fn test_dictionary_translation_keeps_case() {
        assert_eq!(translate_locally("Hello friend, thanks!", "en", "es"), "Hola amigo, gracias!");
        assert_eq!(translate_locally("Good day", "en", "de"), "Gut Tag");
    }

    #[test]
    fn test_unknown_pair_is_tagged() {
        assert_eq!(translate_locally("Hello", "en", "ko"), "[ko] Hello");
        assert_eq!(translate_locally("Hola", "es", "fr"), "[fr] Hola");
    }

    #[test]
    fn test_same_language_unchanged() {
        assert_eq!(translate_locally("Hello", "en", "en"), "Hello");
    }

    #[tokio::test]
    async fn test_translate_without_model() {
        let resp = translate(None, "hello world", "French", None).await;
        assert_eq!(resp.engine, Engine::Local);
        assert_eq!(resp.source_language, "en");
        assert_eq!(resp.target_language, "fr");
        assert_eq!(resp.translated_text, "bonjour monde");

        let resp = translate(None, "hello", "es", Some("auto")).await;
        assert_eq!(resp.source_language, "en");
    }
}
