//! crates/story_core/src/catalog.rs
//!
//! Built-in stories used when nothing better is available. One entry per
//! supported language; the baseline entry always exists.

use crate::domain::{Story, BASELINE_LANGUAGE};

struct FallbackEntry {
    language: &'static str,
    title: &'static str,
    level: &'static str,
    content: &'static str,
}

const CATALOG: &[FallbackEntry] = &[
    FallbackEntry {
        language: "en",
        title: "The Journey Begins",
        level: "Beginner",
        content: "Every great journey starts with a single step. Mia opens the window and looks at the quiet street. Today she wants to learn something new.\n\nShe takes her bag, a small notebook and an apple. At the station, an old man smiles at her and says good morning.\n\nThe train leaves the city. Mia writes her first new word in the notebook and smiles back at the world.",
    },
    FallbackEntry {
        language: "tr",
        title: "Yolculuk Başlıyor",
        level: "Başlangıç",
        content: "Her büyük yolculuk tek bir adımla başlar. Mia pencereyi açar ve sessiz sokağa bakar. Bugün yeni bir şey öğrenmek istiyor.\n\nÇantasını, küçük bir defteri ve bir elmayı alır. İstasyonda yaşlı bir adam ona gülümser ve günaydın der.\n\nTren şehirden ayrılır. Mia defterine ilk yeni kelimesini yazar ve dünyaya gülümser.",
    },
    FallbackEntry {
        language: "de",
        title: "Die Reise beginnt",
        level: "Anfänger",
        content: "Jede große Reise beginnt mit einem einzigen Schritt. Mia öffnet das Fenster und schaut auf die ruhige Straße. Heute will sie etwas Neues lernen.\n\nSie nimmt ihre Tasche, ein kleines Heft und einen Apfel. Am Bahnhof lächelt ein alter Mann und sagt guten Morgen.\n\nDer Zug verlässt die Stadt. Mia schreibt ihr erstes neues Wort in das Heft und lächelt zurück.",
    },
    FallbackEntry {
        language: "es",
        title: "El viaje comienza",
        level: "Principiante",
        content: "Todo gran viaje empieza con un solo paso. Mia abre la ventana y mira la calle tranquila. Hoy quiere aprender algo nuevo.\n\nToma su bolso, un cuaderno pequeño y una manzana. En la estación, un hombre mayor le sonríe y le da los buenos días.\n\nEl tren sale de la ciudad. Mia escribe su primera palabra nueva en el cuaderno y sonríe.",
    },
    FallbackEntry {
        language: "fr",
        title: "Le voyage commence",
        level: "Débutant",
        content: "Chaque grand voyage commence par un seul pas. Mia ouvre la fenêtre et regarde la rue calme. Aujourd'hui, elle veut apprendre quelque chose de nouveau.\n\nElle prend son sac, un petit carnet et une pomme. À la gare, un vieil homme lui sourit et lui dit bonjour.\n\nLe train quitte la ville. Mia écrit son premier mot nouveau dans le carnet et sourit.",
    },
    FallbackEntry {
        language: "it",
        title: "Il viaggio comincia",
        level: "Principiante",
        content: "Ogni grande viaggio comincia con un solo passo. Mia apre la finestra e guarda la strada tranquilla. Oggi vuole imparare qualcosa di nuovo.\n\nPrende la borsa, un piccolo quaderno e una mela. Alla stazione, un signore anziano le sorride e le dice buongiorno.\n\nIl treno lascia la città. Mia scrive la sua prima parola nuova nel quaderno e sorride.",
    },
];

impl FallbackEntry {
    fn to_story(&self) -> Story {
        Story {
            id: format!("fallback_{}", self.language),
            title: self.title.to_string(),
            title_native: None,
            content: self.content.to_string(),
            segments: None,
            language: self.language.to_string(),
            level: self.level.to_string(),
            topic_ids: Vec::new(),
            vocabulary: None,
        }
    }
}

/// The catalog story for `language`, if the catalog has one.
pub fn catalog_story(language: &str) -> Option<Story> {
    CATALOG
        .iter()
        .find(|entry| entry.language == language)
        .map(FallbackEntry::to_story)
}

/// The catalog story for `language`, or the baseline entry.
pub fn fallback_story(language: Option<&str>) -> Story {
    language
        .and_then(catalog_story)
        .or_else(|| catalog_story(BASELINE_LANGUAGE))
        .unwrap_or_else(|| CATALOG[0].to_story())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_supported_language_has_an_entry() {
        for code in ["tr", "en", "de", "es", "fr", "it"] {
            let story = fallback_story(Some(code));
            assert_eq!(story.language, code);
            assert_eq!(story.id, format!("fallback_{code}"));
            assert!(!story.content.is_empty());
        }
    }

    #[test]
    fn unknown_or_missing_language_uses_baseline() {
        assert_eq!(fallback_story(Some("ja")).language, BASELINE_LANGUAGE);
        assert_eq!(fallback_story(None).language, BASELINE_LANGUAGE);
        assert!(catalog_story("ja").is_none());
    }
}
