use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::debug;

use crate::config::Settings;
use crate::domain::media::{MediaPart, Stream, Video};
use crate::domain::models::LibraryType;
use crate::workflows::filters::{CompiledFilter, FilterValue};
use crate::workflows::{Catalog, TrackMutator};

const STREAM_TYPE_VIDEO: u8 = 1;
const STREAM_TYPE_AUDIO: u8 = 2;
const STREAM_TYPE_SUBTITLE: u8 = 3;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "MediaContainer")]
    container: T,
}

#[derive(Debug, Deserialize)]
struct SectionsContainer {
    #[serde(rename = "Directory", default)]
    directories: Vec<Section>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    pub key: String,
    pub title: String,
    #[serde(rename = "type")]
    pub section_type: String,
}

impl Section {
    /// Kind of video this section holds, if it holds videos at all.
    pub fn library_type(&self) -> Option<LibraryType> {
        match self.section_type.as_str() {
            "movie" => Some(LibraryType::Movie),
            "show" => Some(LibraryType::Episode),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MetadataContainer {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<Metadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Metadata {
    rating_key: String,
    #[serde(rename = "type")]
    metadata_type: String,
    title: String,
    year: Option<u32>,
    grandparent_title: Option<String>,
    parent_index: Option<u32>,
    index: Option<u32>,
    #[serde(default)]
    view_offset: u64,
    #[serde(rename = "Media", default)]
    media: Vec<Media>,
}

impl Metadata {
    fn into_video(self) -> Video {
        let kind = if self.metadata_type == "episode" {
            LibraryType::Episode
        } else {
            LibraryType::Movie
        };
        let title = match kind {
            LibraryType::Episode => format!(
                "{} - S{:02}E{:02} - {}",
                self.grandparent_title.as_deref().unwrap_or("Unknown"),
                self.parent_index.unwrap_or_default(),
                self.index.unwrap_or_default(),
                self.title
            ),
            LibraryType::Movie => match self.year {
                Some(year) => format!("{} ({year})", self.title),
                None => self.title.clone(),
            },
        };
        Video {
            key: self.rating_key,
            kind,
            title,
            view_offset: self.view_offset,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Media {
    #[serde(rename = "Part", default)]
    parts: Vec<RawPart>,
}

/// A media part as returned by the catalog, streams not yet classified.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPart {
    pub id: u64,
    #[serde(default)]
    pub file: String,
    #[serde(rename = "Stream", default)]
    pub streams: Vec<RawTrack>,
}

impl RawPart {
    pub fn tracks_of(&self, stream_type: u8) -> impl Iterator<Item = &RawTrack> {
        self.streams
            .iter()
            .filter(move |s| s.stream_type == stream_type)
    }

    /// Builds the part with every track run through `classify`.
    pub fn classify_with(&self, classify: impl Fn(&RawTrack) -> Stream) -> MediaPart {
        MediaPart {
            id: self.id,
            file: self.file.clone(),
            video_streams: self.tracks_of(STREAM_TYPE_VIDEO).map(&classify).collect(),
            audio_streams: self.tracks_of(STREAM_TYPE_AUDIO).map(&classify).collect(),
            subtitle_streams: self.tracks_of(STREAM_TYPE_SUBTITLE).map(&classify).collect(),
        }
    }
}

/// Track metadata as reported by the catalog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTrack {
    pub id: u64,
    pub stream_type: u8,
    pub index: Option<u32>,
    pub codec: Option<String>,
    pub format: Option<String>,
    pub language_code: Option<String>,
    pub language: Option<String>,
    pub language_tag: Option<String>,
    pub title: Option<String>,
    pub display_title: Option<String>,
    pub extended_display_title: Option<String>,
    pub selected: Option<bool>,
    pub default: Option<bool>,
}

impl RawTrack {
    pub fn is_audio(&self) -> bool {
        self.stream_type == STREAM_TYPE_AUDIO
    }

    pub fn is_subtitle(&self) -> bool {
        self.stream_type == STREAM_TYPE_SUBTITLE
    }
}

#[derive(Debug, Clone)]
pub struct PlexClient {
    base_url: String,
    token: String,
    http: reqwest::blocking::Client,
}

impl PlexClient {
    pub fn new(settings: &Settings) -> Self {
        Self {
            base_url: settings.url.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
            http: reqwest::blocking::Client::new(),
        }
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(String, String)]) -> Result<T> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header("X-Plex-Token", &self.token)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .with_context(|| format!("Failed to reach Plex server at {}", self.base_url))?;

        if !response.status().is_success() {
            bail!("Plex request {path} failed: HTTP {}", response.status());
        }

        let envelope: Envelope<T> = serde_json::from_str(&response.text()?)
            .with_context(|| format!("Unexpected Plex response for {path}"))?;
        Ok(envelope.container)
    }

    fn put(&self, path: &str, query: &[(&str, String)]) -> Result<()> {
        let response = self
            .http
            .put(format!("{}{}", self.base_url, path))
            .header("X-Plex-Token", &self.token)
            .query(query)
            .send()
            .with_context(|| format!("Failed to reach Plex server at {}", self.base_url))?;

        if !response.status().is_success() {
            bail!("Plex update {path} failed: HTTP {}", response.status());
        }
        Ok(())
    }
}

impl Catalog for PlexClient {
    /// Sections named in `libraries`, or every section when it is empty.
    fn sections(&self, libraries: &BTreeSet<String>) -> Result<Vec<Section>> {
        let container: SectionsContainer = self.get("/library/sections", &[])?;
        debug!("Found {} sections", container.directories.len());

        if libraries.is_empty() {
            return Ok(container.directories);
        }

        let mut sections = Vec::new();
        for library in libraries {
            match container.directories.iter().find(|s| &s.title == library) {
                Some(section) => sections.push(section.clone()),
                None => bail!("Library '{library}' not found"),
            }
        }
        Ok(sections)
    }

    fn search(
        &self,
        section: &Section,
        kind: LibraryType,
        filter: &CompiledFilter,
    ) -> Result<Vec<Video>> {
        let mut query = vec![("type".to_string(), plex_type(kind).to_string())];
        query.extend(filter_query(filter, Utc::now())?);

        let container: MetadataContainer =
            self.get(&format!("/library/sections/{}/all", section.key), &query)?;
        debug!(
            "Found {} {}s in section {}",
            container.metadata.len(),
            kind.as_str(),
            section.title
        );
        Ok(container
            .metadata
            .into_iter()
            .map(Metadata::into_video)
            .collect())
    }

    /// Reloads the full metadata of a video, including every stream of every part.
    fn refresh(&self, video: &Video) -> Result<Vec<RawPart>> {
        let container: MetadataContainer =
            self.get(&format!("/library/metadata/{}", video.key), &[])?;
        let parts: Vec<RawPart> = container
            .metadata
            .into_iter()
            .flat_map(|m| m.media)
            .flat_map(|m| m.parts)
            .collect();
        debug!("Found {} parts for video {}", parts.len(), video);
        Ok(parts)
    }
}

impl TrackMutator for PlexClient {
    fn select_audio(&mut self, part: &MediaPart, stream: &Stream) -> Result<()> {
        self.put(
            &format!("/library/parts/{}", part.id),
            &[
                ("audioStreamID", stream.id.to_string()),
                ("allParts", "1".to_string()),
            ],
        )
    }

    fn select_subtitle(&mut self, part: &MediaPart, stream: &Stream) -> Result<()> {
        self.put(
            &format!("/library/parts/{}", part.id),
            &[
                ("subtitleStreamID", stream.id.to_string()),
                ("allParts", "1".to_string()),
            ],
        )
    }

    fn unselect_subtitle(&mut self, part: &MediaPart) -> Result<()> {
        self.put(
            &format!("/library/parts/{}", part.id),
            &[
                ("subtitleStreamID", "0".to_string()),
                ("allParts", "1".to_string()),
            ],
        )
    }
}

fn plex_type(kind: LibraryType) -> u8 {
    match kind {
        LibraryType::Movie => 1,
        LibraryType::Episode => 4,
    }
}

/// Renders a compiled filter as query parameters; ages become absolute
/// `addedAt` timestamps relative to `now`.
fn filter_query(filter: &CompiledFilter, now: DateTime<Utc>) -> Result<Vec<(String, String)>> {
    filter
        .iter()
        .map(|(name, value)| {
            let value = match value {
                FilterValue::Text(text) => text.clone(),
                FilterValue::Texts(texts) => texts.join(","),
                FilterValue::Number(number) => number.to_string(),
                FilterValue::Age(age) => match now.checked_sub_signed(age.as_duration()) {
                    Some(date) => date.timestamp().to_string(),
                    None => bail!("Age {age} reaches before the earliest supported date"),
                },
            };
            Ok((name.to_string(), value))
        })
        .collect()
}
