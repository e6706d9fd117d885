//! Language identity for audio and subtitle tracks.
//!
//! A [`Language`] is an ISO 639-3 base code optionally qualified by a country
//! (region) and a script, e.g. `pt-BR` or `zh-Hant`.

use std::fmt;
use std::str::FromStr;

use unic_langid::LanguageIdentifier;

use crate::error::InputError;

struct LanguageEntry {
    alpha3: &'static str,
    alpha3b: Option<&'static str>,
    alpha2: Option<&'static str>,
    name: &'static str,
}

const fn entry(
    alpha3: &'static str,
    alpha3b: Option<&'static str>,
    alpha2: Option<&'static str>,
    name: &'static str,
) -> LanguageEntry {
    LanguageEntry {
        alpha3,
        alpha3b,
        alpha2,
        name,
    }
}

const UNDETERMINED: &str = "und";

static LANGUAGES: &[LanguageEntry] = &[
    entry("eng", None, Some("en"), "English"),
    entry("fra", Some("fre"), Some("fr"), "French"),
    entry("deu", Some("ger"), Some("de"), "German"),
    entry("spa", None, Some("es"), "Spanish"),
    entry("ita", None, Some("it"), "Italian"),
    entry("por", None, Some("pt"), "Portuguese"),
    entry("rus", None, Some("ru"), "Russian"),
    entry("jpn", None, Some("ja"), "Japanese"),
    entry("kor", None, Some("ko"), "Korean"),
    entry("zho", Some("chi"), Some("zh"), "Chinese"),
    entry("cmn", None, None, "Mandarin Chinese"),
    entry("yue", None, None, "Cantonese"),
    entry("ara", None, Some("ar"), "Arabic"),
    entry("hin", None, Some("hi"), "Hindi"),
    entry("tur", None, Some("tr"), "Turkish"),
    entry("pol", None, Some("pl"), "Polish"),
    entry("nld", Some("dut"), Some("nl"), "Dutch"),
    entry("swe", None, Some("sv"), "Swedish"),
    entry("nor", None, Some("no"), "Norwegian"),
    entry("nob", None, Some("nb"), "Norwegian Bokmal"),
    entry("dan", None, Some("da"), "Danish"),
    entry("fin", None, Some("fi"), "Finnish"),
    entry("ces", Some("cze"), Some("cs"), "Czech"),
    entry("hun", None, Some("hu"), "Hungarian"),
    entry("ron", Some("rum"), Some("ro"), "Romanian"),
    entry("bul", None, Some("bg"), "Bulgarian"),
    entry("ell", Some("gre"), Some("el"), "Greek"),
    entry("heb", None, Some("he"), "Hebrew"),
    entry("tha", None, Some("th"), "Thai"),
    entry("vie", None, Some("vi"), "Vietnamese"),
    entry("ind", None, Some("id"), "Indonesian"),
    entry("msa", Some("may"), Some("ms"), "Malay"),
    entry("fil", None, None, "Filipino"),
    entry("tgl", None, Some("tl"), "Tagalog"),
    entry("ukr", None, Some("uk"), "Ukrainian"),
    entry("hrv", None, Some("hr"), "Croatian"),
    entry("srp", None, Some("sr"), "Serbian"),
    entry("bos", None, Some("bs"), "Bosnian"),
    entry("slv", None, Some("sl"), "Slovenian"),
    entry("slk", Some("slo"), Some("sk"), "Slovak"),
    entry("mkd", Some("mac"), Some("mk"), "Macedonian"),
    entry("sqi", Some("alb"), Some("sq"), "Albanian"),
    entry("lit", None, Some("lt"), "Lithuanian"),
    entry("lav", None, Some("lv"), "Latvian"),
    entry("est", None, Some("et"), "Estonian"),
    entry("isl", Some("ice"), Some("is"), "Icelandic"),
    entry("gle", None, Some("ga"), "Irish"),
    entry("cym", Some("wel"), Some("cy"), "Welsh"),
    entry("cat", None, Some("ca"), "Catalan"),
    entry("eus", Some("baq"), Some("eu"), "Basque"),
    entry("glg", None, Some("gl"), "Galician"),
    entry("kat", Some("geo"), Some("ka"), "Georgian"),
    entry("hye", Some("arm"), Some("hy"), "Armenian"),
    entry("aze", None, Some("az"), "Azerbaijani"),
    entry("kaz", None, Some("kk"), "Kazakh"),
    entry("mon", None, Some("mn"), "Mongolian"),
    entry("ben", None, Some("bn"), "Bengali"),
    entry("tam", None, Some("ta"), "Tamil"),
    entry("tel", None, Some("te"), "Telugu"),
    entry("pan", None, Some("pa"), "Punjabi"),
    entry("mar", None, Some("mr"), "Marathi"),
    entry("guj", None, Some("gu"), "Gujarati"),
    entry("kan", None, Some("kn"), "Kannada"),
    entry("mal", None, Some("ml"), "Malayalam"),
    entry("nep", None, Some("ne"), "Nepali"),
    entry("sin", None, Some("si"), "Sinhala"),
    entry("fas", Some("per"), Some("fa"), "Persian"),
    entry("urd", None, Some("ur"), "Urdu"),
    entry("khm", None, Some("km"), "Khmer"),
    entry("lao", None, Some("lo"), "Lao"),
    entry("mya", Some("bur"), Some("my"), "Burmese"),
    entry("swa", None, Some("sw"), "Swahili"),
    entry("amh", None, Some("am"), "Amharic"),
    entry("afr", None, Some("af"), "Afrikaans"),
    entry("zul", None, Some("zu"), "Zulu"),
    entry("mri", Some("mao"), Some("mi"), "Maori"),
    entry("lat", None, Some("la"), "Latin"),
    entry("mul", None, None, "Multiple languages"),
    entry("zxx", None, None, "No linguistic content"),
    entry(UNDETERMINED, None, None, "Undetermined"),
];

fn lookup(predicate: impl Fn(&LanguageEntry) -> bool) -> Option<&'static LanguageEntry> {
    LANGUAGES.iter().find(|e| predicate(e))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language {
    alpha3: &'static str,
    country: Option<String>,
    script: Option<String>,
}

impl Language {
    fn from_entry(entry: &'static LanguageEntry) -> Self {
        Self {
            alpha3: entry.alpha3,
            country: None,
            script: None,
        }
    }

    pub fn undetermined() -> Self {
        Self {
            alpha3: UNDETERMINED,
            country: None,
            script: None,
        }
    }

    /// Parses an IETF (BCP 47) tag such as `en`, `pt-BR` or `zh-Hant-TW`.
    pub fn from_ietf(tag: &str) -> Option<Self> {
        let id: LanguageIdentifier = tag.trim().parse().ok()?;
        let code = id.language.as_str();
        let entry = lookup(|e| {
            e.alpha2 == Some(code) || e.alpha3 == code || e.alpha3b == Some(code)
        })?;

        Some(Self {
            alpha3: entry.alpha3,
            country: id.region.map(|r| r.as_str().to_string()),
            script: id.script.map(|s| s.as_str().to_string()),
        })
    }

    /// Parses an English language name such as `Portuguese`.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        lookup(|e| e.name.eq_ignore_ascii_case(name)).map(Self::from_entry)
    }

    /// Parses a three letter code, either ISO 639-3 or the ISO 639-2
    /// bibliographic variant (`fre`, `ger`, ...).
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_lowercase();
        lookup(|e| e.alpha3 == code || e.alpha3b == Some(code.as_str())).map(Self::from_entry)
    }

    pub fn from_alpha2(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_lowercase();
        lookup(|e| e.alpha2 == Some(code.as_str())).map(Self::from_entry)
    }

    /// Runs every resolution strategy in order and keeps the first success.
    pub fn resolve(value: &str) -> Option<Self> {
        if value.trim().is_empty() {
            return None;
        }

        let strategies: [fn(&str) -> Option<Language>; 4] = [
            Language::from_ietf,
            Language::from_name,
            Language::from_code,
            Language::from_alpha2,
        ];
        strategies.iter().find_map(|strategy| strategy(value))
    }

    pub fn alpha3(&self) -> &str {
        self.alpha3
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    pub fn is_determined(&self) -> bool {
        self.alpha3 != UNDETERMINED
    }

    /// Number of subtags in the rendered tag; `pt-BR` is more specific than `pt`.
    pub fn specificity(&self) -> usize {
        1 + usize::from(self.country.is_some()) + usize::from(self.script.is_some())
    }

    /// Same base language, ignoring country and script.
    pub fn same_base(&self, other: &Language) -> bool {
        self.alpha3 == other.alpha3
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = lookup(|e| e.alpha3 == self.alpha3)
            .and_then(|e| e.alpha2)
            .unwrap_or(self.alpha3);
        write!(f, "{code}")?;
        if let Some(country) = &self.country {
            write!(f, "-{country}")?;
        }
        if let Some(script) = &self.script {
            write!(f, "-{script}")?;
        }
        Ok(())
    }
}

impl FromStr for Language {
    type Err = InputError;

    /// Strict IETF parsing, used for user supplied languages.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_ietf(s).ok_or_else(|| InputError::InvalidLanguage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ietf() {
        let lang = Language::from_ietf("pt-BR").unwrap();
        assert_eq!(lang.alpha3(), "por");
        assert_eq!(lang.country(), Some("BR"));
        assert_eq!(lang.script(), None);
        assert_eq!(lang.to_string(), "pt-BR");

        let lang = Language::from_ietf("zh-Hant").unwrap();
        assert_eq!(lang.alpha3(), "zho");
        assert_eq!(lang.script(), Some("Hant"));

        assert_eq!(Language::from_ietf("eng").unwrap().to_string(), "en");
        assert!(Language::from_ietf("English").is_none());
        assert!(Language::from_ietf("Portuguese").is_none());
    }

    #[test]
    fn test_from_name_and_codes() {
        assert_eq!(Language::from_name("portuguese").unwrap().alpha3(), "por");
        assert_eq!(Language::from_code("fre").unwrap().alpha3(), "fra");
        assert_eq!(Language::from_code("jpn").unwrap().to_string(), "ja");
        assert_eq!(Language::from_alpha2("DE").unwrap().alpha3(), "deu");
        assert!(Language::from_code("xx").is_none());
    }

    #[test]
    fn test_resolve_chain() {
        assert_eq!(Language::resolve("English").unwrap().to_string(), "en");
        assert_eq!(Language::resolve("por").unwrap().to_string(), "pt");
        assert_eq!(Language::resolve("pt-BR").unwrap().to_string(), "pt-BR");
        assert!(Language::resolve("").is_none());
        assert!(Language::resolve("Klingon").is_none());
    }

    #[test]
    fn test_specificity_and_base() {
        let pt = Language::from_alpha2("pt").unwrap();
        let pt_br = Language::from_ietf("pt-BR").unwrap();
        assert_eq!(pt.specificity(), 1);
        assert_eq!(pt_br.specificity(), 2);
        assert!(pt.same_base(&pt_br));
        assert_ne!(pt, pt_br);
        assert!(!Language::undetermined().is_determined());
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!("pt-BR".parse::<Language>().is_ok());
        assert_eq!(
            "not a language".parse::<Language>(),
            Err(InputError::InvalidLanguage("not a language".to_string()))
        );
    }
}
