use clap::ValueEnum;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::domain::language::Language;
use crate::domain::title::Title;
use crate::error::InputError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum WatchingPreference {
    /// Original audio, plus subtitles when it is not in the desired language
    Original,
    /// Audio in the desired language
    Dubbed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibraryType {
    Movie,
    Episode,
}

impl LibraryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LibraryType::Movie => "movie",
            LibraryType::Episode => "episode",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum AudioCodec {
    #[value(name = "dca")]
    Dts,
    #[value(name = "aac")]
    Aac,
    #[value(name = "ac3")]
    DolbyDigital,
    #[value(name = "eac3")]
    DolbyDigitalPlus,
    #[value(name = "truehd")]
    DolbyTrueHd,
    #[value(name = "flac")]
    Flac,
    #[value(name = "mp2")]
    Mp2,
    #[value(name = "mp3")]
    Mp3,
    #[value(name = "vorbis")]
    Vorbis,
    #[value(name = "opus")]
    Opus,
    #[value(name = "pcm")]
    Pcm,
}

impl AudioCodec {
    pub fn from_catalog(codec: &str) -> Option<Self> {
        let codec = codec.to_ascii_lowercase();
        let codec = match codec.as_str() {
            "dts" => "dca",
            c if c.starts_with("pcm") => "pcm",
            c => c,
        };
        <Self as ValueEnum>::from_str(codec, true).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum SubtitleCodec {
    #[value(name = "srt")]
    Srt,
    #[value(name = "pgs")]
    Pgs,
    #[value(name = "vobsub")]
    VobSub,
    #[value(name = "ass")]
    Ass,
    #[value(name = "mov_text")]
    MovText,
    #[value(name = "eia_608")]
    ClosedCaption,
    #[value(name = "dvb_subtitle")]
    Dvb,
    #[value(name = "webvtt")]
    WebVtt,
}

impl SubtitleCodec {
    pub fn from_catalog(codec: &str) -> Option<Self> {
        let codec = codec.to_ascii_lowercase();
        let codec = match codec.as_str() {
            "subrip" => "srt",
            "hdmv_pgs_subtitle" => "pgs",
            "dvd_subtitle" => "vobsub",
            "ssa" => "ass",
            "vtt" => "webvtt",
            c => c,
        };
        <Self as ValueEnum>::from_str(codec, true).ok()
    }
}

static AGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?P<weeks>\d+)w)?(?:(?P<days>\d+)d)?(?:(?P<hours>\d+)h)?$").unwrap()
});

/// Relative age such as `12h`, `3d` or `1w2d`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Age {
    text: String,
    duration: chrono::Duration,
}

impl Age {
    pub fn as_duration(&self) -> chrono::Duration {
        self.duration
    }
}

impl FromStr for Age {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InputError::InvalidAge(s.to_string());
        if s.is_empty() {
            return Err(invalid());
        }
        let caps = AGE_RE.captures(s).ok_or_else(invalid)?;

        let mut hours: i64 = 0;
        for (group, factor) in [("weeks", 7 * 24), ("days", 24), ("hours", 1)] {
            if let Some(m) = caps.name(group) {
                let value: i64 = m.as_str().parse().map_err(|_| invalid())?;
                hours = value
                    .checked_mul(factor)
                    .and_then(|v| hours.checked_add(v))
                    .ok_or_else(invalid)?;
            }
        }

        Ok(Age {
            text: s.to_string(),
            duration: chrono::Duration::try_hours(hours).ok_or_else(invalid)?,
        })
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// What to search for in the catalog.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    pub libraries: BTreeSet<String>,
    pub titles: Vec<Title>,
    pub newer_than: Option<Age>,
    pub older_than: Option<Age>,
    pub skip_watching: bool,
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.libraries.is_empty() {
            let libraries: Vec<&str> = self.libraries.iter().map(String::as_str).collect();
            parts.push(format!("in {}", libraries.join(",")));
        }
        if !self.titles.is_empty() {
            let titles: Vec<String> = self
                .titles
                .iter()
                .map(|t| format!("with title \"{t}\""))
                .collect();
            parts.push(titles.join(" or "));
        }
        if let Some(age) = &self.newer_than {
            parts.push(format!("newer than {age}"));
        }
        if let Some(age) = &self.older_than {
            parts.push(format!("older than {age}"));
        }
        write!(f, "{}", parts.join(" "))
    }
}

/// How the user wants to watch the selected videos.
#[derive(Debug, Clone)]
pub struct Preferences {
    pub watching_preference: WatchingPreference,
    pub language: Option<Language>,
    pub audio_codecs: HashSet<AudioCodec>,
    pub excluded_audio_codecs: HashSet<AudioCodec>,
    pub subtitle_codecs: HashSet<SubtitleCodec>,
    pub excluded_subtitle_codecs: HashSet<SubtitleCodec>,
    pub keep_selected_audio: bool,
    pub keep_selected_subtitle: bool,
    pub force_subtitles: bool,
}

impl Preferences {
    pub fn new(watching_preference: WatchingPreference, language: Option<Language>) -> Self {
        Self {
            watching_preference,
            language,
            audio_codecs: HashSet::new(),
            excluded_audio_codecs: HashSet::new(),
            subtitle_codecs: HashSet::new(),
            excluded_subtitle_codecs: HashSet::new(),
            keep_selected_audio: false,
            keep_selected_subtitle: false,
            force_subtitles: false,
        }
    }

    pub fn accepts_audio(&self, codec: Option<AudioCodec>) -> bool {
        accepts(codec, &self.audio_codecs, &self.excluded_audio_codecs)
    }

    pub fn accepts_subtitle(&self, codec: Option<SubtitleCodec>) -> bool {
        accepts(codec, &self.subtitle_codecs, &self.excluded_subtitle_codecs)
    }
}

// An empty allow-list allows everything, including unknown codecs.
fn accepts<C: Eq + std::hash::Hash>(
    codec: Option<C>,
    allowed: &HashSet<C>,
    excluded: &HashSet<C>,
) -> bool {
    match codec {
        Some(c) => (allowed.is_empty() || allowed.contains(&c)) && !excluded.contains(&c),
        None => allowed.is_empty(),
    }
}
