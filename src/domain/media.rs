use std::fmt;

use crate::domain::language::Language;
use crate::domain::models::{AudioCodec, LibraryType, SubtitleCodec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio(Option<AudioCodec>),
    Subtitle(Option<SubtitleCodec>),
}

/// A classified track of a media part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stream {
    /// Catalog identifier, used when selecting the track.
    pub id: u64,
    pub index: u32,
    pub kind: StreamKind,
    pub language: Language,
    pub commentary: bool,
    pub hearing_impaired: bool,
    pub closed_caption: bool,
    pub selected: bool,
    pub default: bool,
    pub title: Option<String>,
}

impl Stream {
    pub fn audio_codec(&self) -> Option<AudioCodec> {
        match self.kind {
            StreamKind::Audio(codec) => codec,
            _ => None,
        }
    }

    pub fn subtitle_codec(&self) -> Option<SubtitleCodec> {
        match self.kind {
            StreamKind::Subtitle(codec) => codec,
            _ => None,
        }
    }

    pub fn same_track(&self, other: &Stream) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.title {
            Some(title) => write!(f, "{}: {}", self.language, title),
            None => write!(f, "{}: #{}", self.language, self.index),
        }
    }
}

/// One physical file of a video with its classified streams.
#[derive(Debug, Clone)]
pub struct MediaPart {
    pub id: u64,
    pub file: String,
    pub video_streams: Vec<Stream>,
    pub audio_streams: Vec<Stream>,
    pub subtitle_streams: Vec<Stream>,
}

impl MediaPart {
    pub fn selected_audio(&self) -> Option<&Stream> {
        self.audio_streams.iter().find(|s| s.selected)
    }

    pub fn selected_subtitle(&self) -> Option<&Stream> {
        self.subtitle_streams.iter().find(|s| s.selected)
    }

    /// Language of the work's native audio: default video streams first, then
    /// the other video streams, then audio streams in the same order.
    pub fn original_language(&self) -> Option<&Language> {
        first_determined(&self.video_streams).or_else(|| first_determined(&self.audio_streams))
    }
}

fn first_determined(streams: &[Stream]) -> Option<&Language> {
    let defaults = streams.iter().filter(|s| s.default);
    let others = streams.iter().filter(|s| !s.default);
    defaults
        .chain(others)
        .map(|s| &s.language)
        .find(|l| l.is_determined())
}

/// A movie or an episode found in the catalog.
#[derive(Debug, Clone)]
pub struct Video {
    pub key: String,
    pub kind: LibraryType,
    pub title: String,
    pub view_offset: u64,
}

impl Video {
    pub fn is_being_watched(&self) -> bool {
        self.view_offset > 0
    }
}

impl fmt::Display for Video {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Selection change computed for a media part.
#[derive(Debug, Clone)]
pub struct Change {
    pub video: String,
    pub part_id: u64,
    pub previous_audio: Option<Stream>,
    pub previous_subtitle: Option<Stream>,
    pub new_audio: Option<Stream>,
    pub new_subtitle: Option<Stream>,
}

impl Change {
    pub fn audio_changed(&self) -> bool {
        !same_selection(self.previous_audio.as_ref(), self.new_audio.as_ref())
    }

    pub fn subtitle_changed(&self) -> bool {
        !same_selection(self.previous_subtitle.as_ref(), self.new_subtitle.as_ref())
    }
}

pub fn same_selection(a: Option<&Stream>, b: Option<&Stream>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.same_track(b),
        (None, None) => true,
        _ => false,
    }
}
