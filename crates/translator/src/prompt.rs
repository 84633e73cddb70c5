use transcript::{ContextPair, Tone};

/// Languages with well-defined grammatical registers, where a tone label
/// maps to a specific instruction rather than the generic fallback.
const REGISTER_AWARE_LANGS: &[&str] = &["ko", "ja"];

/// Languages whose MT backends accept an explicit formality parameter
/// (used by the quality backend; the speed backend folds this into the
/// prompt instead).
pub const FORMALITY_AWARE_LANGS: &[&str] = &["de", "fr", "ja", "ko", "it", "es", "nl", "pl", "pt", "ru"];

pub fn supports_formality_param(target_lang: &str) -> bool {
    FORMALITY_AWARE_LANGS.contains(&target_lang)
}

/// Builds the register instruction for a (tone, target_lang) pair. This
/// is rebuilt by the caller whenever tone changes.
pub fn register_instruction(tone: Tone, target_lang: &str) -> String {
    if tone == Tone::Unset {
        return String::new();
    }

    if REGISTER_AWARE_LANGS.contains(&target_lang) {
        let label = match tone {
            Tone::Casual => "casual, informal speech level (반말/タメ口)",
            Tone::CasualPolite => "casual but polite speech level (해요체/丁寧語)",
            Tone::Formal => "formal, honorific speech level (합쇼체/敬語)",
            Tone::Narrative => "neutral narrative/descriptive register, as in written prose",
            Tone::Generic | Tone::Unset => "a neutral, generally polite register",
        };
        return format!("Translate using {label}.");
    }

    match tone {
        Tone::Unset => String::new(),
        _ => "Match the speaker's register and level of formality.".to_string(),
    }
}

/// Full system instruction for a translation request: register guidance
/// plus the one-shot context pair.
pub fn system_prompt(tone: Tone, target_lang: &str, prev_pair: &ContextPair) -> String {
    let mut prompt = String::from(
        "You are a live captioning translator. Translate the given source \
         sentence into the target language. Output only the translation, \
         with no commentary.",
    );

    let register = register_instruction(tone, target_lang);
    if !register.is_empty() {
        prompt.push(' ');
        prompt.push_str(&register);
    }

    if !prev_pair.source.is_empty() {
        prompt.push_str(&format!(
            "\n\nFor context, the previous sentence and its translation were:\nSource: {}\nTranslation: {}",
            prev_pair.source, prev_pair.translation
        ));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_tone_has_no_register_instruction() {
        assert_eq!(register_instruction(Tone::Unset, "ko"), "");
    }

    #[test]
    fn korean_formal_gets_specific_instruction() {
        let instr = register_instruction(Tone::Formal, "ko");
        assert!(instr.contains("합쇼체"));
    }

    #[test]
    fn non_register_language_gets_generic_instruction() {
        let instr = register_instruction(Tone::Formal, "es");
        assert_eq!(instr, "Match the speaker's register and level of formality.");
    }

    #[test]
    fn formality_param_support_matches_known_languages() {
        assert!(supports_formality_param("de"));
        assert!(!supports_formality_param("en"));
    }
}
