//! Best-effort classification of a track's display title.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

use crate::domain::language::Language;

/// Extra knowledge passed along with the text to guess from.
#[derive(Debug, Clone, Default)]
pub struct GuessHints {
    /// Language the track is declared in, used to keep its region or script
    /// when the text only names the base language.
    pub expected_language: Option<Language>,
}

/// What could be inferred from a display title. `None` means no opinion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Guess {
    pub language: Option<Language>,
    pub commentary: Option<bool>,
    pub hearing_impaired: Option<bool>,
    pub closed_caption: Option<bool>,
}

pub trait LanguageGuesser {
    fn guess(&self, text: &str, hints: &GuessHints) -> Guess;
}

static COMMENTARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bcomment(?:ary|aries|aire|ario|ar)?\b").unwrap());

static HEARING_IMPAIRED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bSDH\b|\bHI\b|(?i:\bhearing[\s_-]*impaired\b)|(?i:\bsdh\b)").unwrap()
});

static CLOSED_CAPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bCC\b|(?i:\bclosed[\s_-]*captions?\b)").unwrap());

/// Language names as they show up in display titles, in English and in the
/// language itself, mapped to an IETF tag.
const LANGUAGE_WORDS: &[(&str, &str)] = &[
    ("english", "en"),
    ("french", "fr"),
    ("francais", "fr"),
    ("français", "fr"),
    ("german", "de"),
    ("deutsch", "de"),
    ("spanish", "es"),
    ("espanol", "es"),
    ("español", "es"),
    ("castellano", "es-ES"),
    ("castilian", "es-ES"),
    ("italian", "it"),
    ("italiano", "it"),
    ("portuguese", "pt"),
    ("portugues", "pt"),
    ("português", "pt"),
    ("russian", "ru"),
    ("русский", "ru"),
    ("japanese", "ja"),
    ("日本語", "ja"),
    ("korean", "ko"),
    ("한국어", "ko"),
    ("chinese", "zh"),
    ("中文", "zh"),
    ("mandarin", "cmn"),
    ("cantonese", "yue"),
    ("arabic", "ar"),
    ("hindi", "hi"),
    ("turkish", "tr"),
    ("polish", "pl"),
    ("polski", "pl"),
    ("dutch", "nl"),
    ("nederlands", "nl"),
    ("flemish", "nl-BE"),
    ("swedish", "sv"),
    ("svenska", "sv"),
    ("norwegian", "no"),
    ("norsk", "no"),
    ("danish", "da"),
    ("dansk", "da"),
    ("finnish", "fi"),
    ("suomi", "fi"),
    ("czech", "cs"),
    ("hungarian", "hu"),
    ("romanian", "ro"),
    ("bulgarian", "bg"),
    ("greek", "el"),
    ("hebrew", "he"),
    ("thai", "th"),
    ("vietnamese", "vi"),
    ("indonesian", "id"),
    ("malay", "ms"),
    ("filipino", "fil"),
    ("tagalog", "tl"),
    ("ukrainian", "uk"),
    ("croatian", "hr"),
    ("serbian", "sr"),
    ("slovenian", "sl"),
    ("slovak", "sk"),
    ("icelandic", "is"),
    ("catalan", "ca"),
    ("persian", "fa"),
    ("farsi", "fa"),
    ("tamil", "ta"),
    ("telugu", "te"),
    ("bengali", "bn"),
    ("latin", "la"),
];

/// Qualifiers narrowing a base language down to a region or script.
const QUALIFIERS: &[(&str, &str)] = &[
    ("brazilian", "pt-BR"),
    ("brazil", "pt-BR"),
    ("brasil", "pt-BR"),
    ("brasileiro", "pt-BR"),
    ("european portuguese", "pt-PT"),
    ("portugal", "pt-PT"),
    ("latin american", "es-419"),
    ("latin spanish", "es-419"),
    ("latin america", "es-419"),
    ("latinoamericano", "es-419"),
    ("latino", "es-419"),
    ("latam", "es-419"),
    ("european spanish", "es-ES"),
    ("spain", "es-ES"),
    ("canadian", "fr-CA"),
    ("quebecois", "fr-CA"),
    ("québécois", "fr-CA"),
    ("simplified", "zh-Hans"),
    ("traditional", "zh-Hant"),
    ("british", "en-GB"),
];

static LANGUAGE_RE: Lazy<Regex> = Lazy::new(|| word_alternation(LANGUAGE_WORDS));
static QUALIFIER_RE: Lazy<Regex> = Lazy::new(|| word_alternation(QUALIFIERS));

fn word_alternation(words: &[(&str, &str)]) -> Regex {
    let mut words: Vec<&str> = words.iter().map(|(w, _)| *w).collect();
    // longest first so "latin american" wins over "latin"
    words.sort_by_key(|w| std::cmp::Reverse(w.len()));
    let alternation: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation.join("|"))).unwrap()
}

fn lookup(table: &[(&str, &str)], word: &str) -> Option<Language> {
    let word = word.to_lowercase();
    table
        .iter()
        .find(|(w, _)| *w == word)
        .and_then(|(_, tag)| Language::from_ietf(tag))
}

/// Guesser driven by keyword tables, good enough for the display titles media
/// servers generate ("English (SDH)", "Portuguese (Brazilian) Forced", ...).
#[derive(Debug, Clone, Default)]
pub struct KeywordGuesser;

impl KeywordGuesser {
    fn guess_language(&self, text: &str, hints: &GuessHints) -> Option<Language> {
        let qualifiers: Vec<(Range<usize>, Language)> = QUALIFIER_RE
            .find_iter(text)
            .filter_map(|m| lookup(QUALIFIERS, m.as_str()).map(|q| (m.range(), q)))
            .collect();
        // words inside a qualifier ("latin" in "latin american") are not languages
        let base = LANGUAGE_RE
            .find_iter(text)
            .filter(|m| {
                !qualifiers
                    .iter()
                    .any(|(span, _)| span.start < m.end() && m.start() < span.end)
            })
            .find_map(|m| lookup(LANGUAGE_WORDS, m.as_str()));
        let qualified = qualifiers
            .into_iter()
            .map(|(_, q)| q)
            .find(|q| base.as_ref().map_or(true, |b| b.same_base(q)));

        let language = match (base, qualified) {
            (_, Some(qualified)) => qualified,
            (Some(base), None) => base,
            (None, None) => return None,
        };

        match &hints.expected_language {
            Some(expected) if expected.same_base(&language) && language.specificity() == 1 => {
                Some(expected.clone())
            }
            _ => Some(language),
        }
    }
}

impl LanguageGuesser for KeywordGuesser {
    fn guess(&self, text: &str, hints: &GuessHints) -> Guess {
        let flag = |re: &Regex| re.is_match(text).then_some(true);
        Guess {
            language: self.guess_language(text, hints),
            commentary: flag(&COMMENTARY_RE),
            hearing_impaired: flag(&HEARING_IMPAIRED_RE),
            closed_caption: flag(&CLOSED_CAPTION_RE),
        }
    }
}
