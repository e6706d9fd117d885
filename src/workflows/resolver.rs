use anyhow::Result;
use tracing::debug;

use crate::domain::language::Language;
use crate::domain::media::{same_selection, Change, MediaPart, Stream};
use crate::domain::models::{Preferences, WatchingPreference};
use crate::workflows::ranking::rank;
use crate::workflows::TrackMutator;

fn target_language<'a>(part: &'a MediaPart, prefs: &'a Preferences) -> Option<&'a Language> {
    match prefs.watching_preference {
        WatchingPreference::Dubbed => prefs.language.as_ref(),
        WatchingPreference::Original => part.original_language(),
    }
}

fn choose_audio<'a>(part: &'a MediaPart, prefs: &Preferences) -> Option<&'a Stream> {
    let previous = part.selected_audio();
    if prefs.keep_selected_audio {
        return previous;
    }
    let Some(target) = target_language(part, prefs) else {
        return previous;
    };

    let candidates: Vec<&Stream> = part
        .audio_streams
        .iter()
        .filter(|s| prefs.accepts_audio(s.audio_codec()))
        .collect();
    rank(candidates, Some(target)).first().copied().or(previous)
}

fn choose_subtitle<'a>(
    part: &'a MediaPart,
    prefs: &Preferences,
    audio: Option<&Stream>,
) -> Option<&'a Stream> {
    let previous = part.selected_subtitle();
    if prefs.keep_selected_subtitle && previous.is_some() {
        return previous;
    }

    let audio_matches = match (audio, prefs.language.as_ref()) {
        (Some(audio), Some(language)) => &audio.language == language,
        _ => false,
    };
    if audio_matches && !prefs.force_subtitles {
        return None;
    }

    let Some(language) = prefs.language.as_ref() else {
        return previous;
    };
    let candidates: Vec<&Stream> = part
        .subtitle_streams
        .iter()
        .filter(|s| prefs.accepts_subtitle(s.subtitle_codec()))
        .collect();
    rank(candidates, Some(language)).first().copied().or(previous)
}

/// Decides the audio and subtitle tracks `part` should have selected.
///
/// Returns `None` when the current selection already satisfies `prefs`.
pub fn resolve(video: &str, part: &MediaPart, prefs: &Preferences) -> Option<Change> {
    let previous_audio = part.selected_audio();
    let previous_subtitle = part.selected_subtitle();

    let audio = choose_audio(part, prefs);
    let subtitle = choose_subtitle(part, prefs, audio);

    if same_selection(previous_audio, audio) && same_selection(previous_subtitle, subtitle) {
        return None;
    }

    Some(Change {
        video: video.to_string(),
        part_id: part.id,
        previous_audio: previous_audio.cloned(),
        previous_subtitle: previous_subtitle.cloned(),
        new_audio: audio.cloned(),
        new_subtitle: subtitle.cloned(),
    })
}

/// Issues the mutations recorded in `change`, at most one per track kind.
pub fn apply(change: &Change, part: &MediaPart, mutator: &mut dyn TrackMutator) -> Result<()> {
    if change.audio_changed() {
        if let Some(audio) = &change.new_audio {
            debug!("{} - new audio track in {} selected: {}", change.video, audio.language, audio);
            mutator.select_audio(part, audio)?;
        }
    }

    if change.subtitle_changed() {
        match &change.new_subtitle {
            Some(subtitle) => {
                debug!(
                    "{} - new subtitle in {} selected: {}",
                    change.video, subtitle.language, subtitle
                );
                mutator.select_subtitle(part, subtitle)?;
            }
            None => {
                debug!("{} - no subtitle selected", change.video);
                mutator.unselect_subtitle(part)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AudioCodec, SubtitleCodec};
    use crate::domain::media::StreamKind;

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        Audio(u64, u64),
        Subtitle(u64, u64),
        Unselect(u64),
    }

    #[derive(Default)]
    struct RecordingMutator {
        calls: Vec<Call>,
    }

    impl TrackMutator for RecordingMutator {
        fn select_audio(&mut self, part: &MediaPart, stream: &Stream) -> Result<()> {
            self.calls.push(Call::Audio(part.id, stream.id));
            Ok(())
        }

        fn select_subtitle(&mut self, part: &MediaPart, stream: &Stream) -> Result<()> {
            self.calls.push(Call::Subtitle(part.id, stream.id));
            Ok(())
        }

        fn unselect_subtitle(&mut self, part: &MediaPart) -> Result<()> {
            self.calls.push(Call::Unselect(part.id));
            Ok(())
        }
    }

    fn lang(tag: &str) -> Language {
        Language::from_ietf(tag).unwrap()
    }

    fn stream(id: u64, kind: StreamKind, tag: &str) -> Stream {
        Stream {
            id,
            index: id as u32,
            kind,
            language: lang(tag),
            commentary: false,
            hearing_impaired: false,
            closed_caption: false,
            selected: false,
            default: false,
            title: None,
        }
    }

    fn video(id: u64, tag: &str) -> Stream {
        let mut s = stream(id, StreamKind::Video, tag);
        s.default = true;
        s
    }

    fn audio(id: u64, tag: &str) -> Stream {
        stream(id, StreamKind::Audio(Some(AudioCodec::Aac)), tag)
    }

    fn subtitle(id: u64, tag: &str) -> Stream {
        stream(id, StreamKind::Subtitle(Some(SubtitleCodec::Srt)), tag)
    }

    fn selected(mut s: Stream) -> Stream {
        s.selected = true;
        s
    }

    fn part(video: Vec<Stream>, audio: Vec<Stream>, subtitle: Vec<Stream>) -> MediaPart {
        MediaPart {
            id: 42,
            file: "/media/movie.mkv".to_string(),
            video_streams: video,
            audio_streams: audio,
            subtitle_streams: subtitle,
        }
    }

    /// What the catalog reports after the change has been saved.
    fn applied(part: &MediaPart, change: &Change) -> MediaPart {
        let mut part = part.clone();
        let audio_id = change.new_audio.as_ref().map(|s| s.id);
        let subtitle_id = change.new_subtitle.as_ref().map(|s| s.id);
        for s in &mut part.audio_streams {
            s.selected = Some(s.id) == audio_id;
        }
        for s in &mut part.subtitle_streams {
            s.selected = Some(s.id) == subtitle_id;
        }
        part
    }

    fn ids(change: &Change) -> (Option<u64>, Option<u64>) {
        (
            change.new_audio.as_ref().map(|s| s.id),
            change.new_subtitle.as_ref().map(|s| s.id),
        )
    }

    #[test]
    fn test_original_selects_native_audio_and_subtitle() {
        let part = part(
            vec![video(1, "ja")],
            vec![selected(audio(2, "en")), audio(3, "ja")],
            vec![subtitle(4, "fr"), subtitle(5, "en")],
        );
        let prefs = Preferences::new(WatchingPreference::Original, Some(lang("en")));

        let change = resolve("Spirited Away (2001)", &part, &prefs).unwrap();
        assert_eq!(ids(&change), (Some(3), Some(5)));
        assert_eq!(change.previous_audio.as_ref().map(|s| s.id), Some(2));
        assert_eq!(change.previous_subtitle, None);
        assert!(change.audio_changed());
        assert!(change.subtitle_changed());

        let mut mutator = RecordingMutator::default();
        apply(&change, &part, &mut mutator).unwrap();
        assert_eq!(mutator.calls, vec![Call::Audio(42, 3), Call::Subtitle(42, 5)]);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let part = part(
            vec![video(1, "ja")],
            vec![selected(audio(2, "en")), audio(3, "ja")],
            vec![subtitle(4, "en")],
        );
        let prefs = Preferences::new(WatchingPreference::Original, Some(lang("en")));

        let change = resolve("Akira", &part, &prefs).unwrap();
        let part = applied(&part, &change);
        assert!(resolve("Akira", &part, &prefs).is_none());
    }

    #[test]
    fn test_dubbed_already_selected_is_noop() {
        let part = part(
            vec![video(1, "en")],
            vec![audio(2, "en"), selected(audio(3, "pt-BR"))],
            vec![subtitle(4, "pt-BR")],
        );
        let prefs = Preferences::new(WatchingPreference::Dubbed, Some(lang("pt-BR")));
        assert!(resolve("Heat", &part, &prefs).is_none());
    }

    #[test]
    fn test_dubbed_unselects_subtitle_when_audio_matches() {
        let part = part(
            vec![video(1, "en")],
            vec![selected(audio(2, "en")), audio(3, "pt-BR")],
            vec![selected(subtitle(4, "pt-BR"))],
        );
        let prefs = Preferences::new(WatchingPreference::Dubbed, Some(lang("pt-BR")));

        let change = resolve("Heat", &part, &prefs).unwrap();
        assert_eq!(ids(&change), (Some(3), None));

        let mut mutator = RecordingMutator::default();
        apply(&change, &part, &mut mutator).unwrap();
        assert_eq!(mutator.calls, vec![Call::Audio(42, 3), Call::Unselect(42)]);
    }

    #[test]
    fn test_force_subtitles() {
        let part = part(
            vec![video(1, "en")],
            vec![selected(audio(2, "en"))],
            vec![subtitle(3, "fr"), subtitle(4, "en")],
        );
        let mut prefs = Preferences::new(WatchingPreference::Dubbed, Some(lang("en")));
        assert!(resolve("Heat", &part, &prefs).is_none());

        prefs.force_subtitles = true;
        let change = resolve("Heat", &part, &prefs).unwrap();
        assert_eq!(ids(&change), (Some(2), Some(4)));
        assert!(!change.audio_changed());

        let mut mutator = RecordingMutator::default();
        apply(&change, &part, &mut mutator).unwrap();
        assert_eq!(mutator.calls, vec![Call::Subtitle(42, 4)]);
    }

    #[test]
    fn test_keep_selected_tracks() {
        let part = part(
            vec![video(1, "en")],
            vec![selected(audio(2, "en")), audio(3, "fr")],
            vec![selected(subtitle(4, "de")), subtitle(5, "fr")],
        );
        let mut prefs = Preferences::new(WatchingPreference::Dubbed, Some(lang("fr")));
        prefs.keep_selected_audio = true;
        let change = resolve("Heat", &part, &prefs).unwrap();
        assert_eq!(ids(&change), (Some(2), Some(5)));

        prefs.keep_selected_subtitle = true;
        assert!(resolve("Heat", &part, &prefs).is_none());
    }

    #[test]
    fn test_codec_lists_filter_candidates() {
        let mut dts = selected(audio(2, "en"));
        dts.kind = StreamKind::Audio(Some(AudioCodec::Dts));
        let part = part(
            vec![video(1, "en")],
            vec![dts, audio(3, "en")],
            vec![],
        );
        let mut prefs = Preferences::new(WatchingPreference::Original, None);
        assert!(resolve("Heat", &part, &prefs).is_none());

        prefs.excluded_audio_codecs.insert(AudioCodec::Dts);
        let change = resolve("Heat", &part, &prefs).unwrap();
        assert_eq!(ids(&change), (Some(3), None));

        prefs.excluded_audio_codecs.clear();
        prefs.audio_codecs.insert(AudioCodec::Flac);
        assert!(resolve("Heat", &part, &prefs).is_none());
    }

    #[test]
    fn test_no_language_keeps_previous_selection() {
        let part = part(
            vec![],
            vec![selected(audio(2, "und")), audio(3, "und")],
            vec![selected(subtitle(4, "fr")), subtitle(5, "en")],
        );
        let prefs = Preferences::new(WatchingPreference::Original, None);
        assert!(resolve("Heat", &part, &prefs).is_none());

        let prefs = Preferences::new(WatchingPreference::Dubbed, None);
        assert!(resolve("Heat", &part, &prefs).is_none());
    }
}
