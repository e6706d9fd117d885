use tracing::debug;

use crate::domain::language::Language;
use crate::domain::media::{Stream, StreamKind};
use crate::domain::models::{AudioCodec, SubtitleCodec};
use crate::infra::plex::RawTrack;
use crate::media::guesser::{Guess, GuessHints, LanguageGuesser};

/// Longest of the display titles; ties go to the most descriptive field.
pub fn display_title(track: &RawTrack) -> Option<&str> {
    [
        track.extended_display_title.as_deref(),
        track.display_title.as_deref(),
        track.title.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|t| !t.is_empty())
    .fold(None, |best: Option<&str>, t| match best {
        Some(b) if b.chars().count() >= t.chars().count() => Some(b),
        _ => Some(t),
    })
}

/// Languages declared on the track, keeping only the most specific ones.
pub fn explicit_languages(track: &RawTrack) -> Vec<Language> {
    let mut languages: Vec<Language> = Vec::new();
    for value in [&track.language_code, &track.language, &track.language_tag]
        .into_iter()
        .flatten()
    {
        if let Some(language) = Language::resolve(value) {
            if !languages.contains(&language) {
                languages.push(language);
            }
        }
    }

    let max = languages.iter().map(Language::specificity).max().unwrap_or(0);
    languages.retain(|l| l.specificity() == max);
    languages
}

fn stream_kind(track: &RawTrack) -> StreamKind {
    if track.is_audio() {
        StreamKind::Audio(track.codec.as_deref().and_then(AudioCodec::from_catalog))
    } else if track.is_subtitle() {
        let codec = track
            .format
            .as_deref()
            .and_then(SubtitleCodec::from_catalog)
            .or_else(|| track.codec.as_deref().and_then(SubtitleCodec::from_catalog));
        StreamKind::Subtitle(codec)
    } else {
        StreamKind::Video
    }
}

/// Resolves the language and role of a raw track.
pub fn classify(track: &RawTrack, guesser: &dyn LanguageGuesser) -> Stream {
    let title = display_title(track);
    let explicit = explicit_languages(track);

    let hints = GuessHints {
        expected_language: match explicit.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        },
    };
    let guessed = title
        .map(|t| guesser.guess(t, &hints))
        .unwrap_or_default();

    let language = match explicit.as_slice() {
        [first, _, ..] => first.clone(),
        [only] => guessed.language.clone().unwrap_or_else(|| only.clone()),
        [] => guessed
            .language
            .clone()
            .unwrap_or_else(Language::undetermined),
    };

    let kind = stream_kind(track);
    let Guess {
        commentary,
        hearing_impaired,
        closed_caption,
        ..
    } = guessed;
    let closed_caption = closed_caption.unwrap_or(false)
        || kind == StreamKind::Subtitle(Some(SubtitleCodec::ClosedCaption));

    debug!(
        "Classified stream {} ({:?}) as {} from explicit {:?}",
        track.id,
        title,
        language,
        explicit.iter().map(ToString::to_string).collect::<Vec<_>>()
    );

    Stream {
        id: track.id,
        index: track.index.unwrap_or_default(),
        kind,
        language,
        commentary: commentary.unwrap_or(false),
        hearing_impaired: hearing_impaired.unwrap_or(false),
        closed_caption,
        selected: track.selected.unwrap_or(false),
        default: track.default.unwrap_or(false),
        title: title.map(str::to_string),
    }
}
