use anyhow::Result;
use std::collections::BTreeSet;

use crate::domain::media::{MediaPart, Stream, Video};
use crate::domain::models::LibraryType;
use crate::infra::plex::{RawPart, Section};
use crate::workflows::filters::CompiledFilter;

/// Persists track selections on the catalog.
pub trait TrackMutator {
    fn select_audio(&mut self, part: &MediaPart, stream: &Stream) -> Result<()>;

    fn select_subtitle(&mut self, part: &MediaPart, stream: &Stream) -> Result<()>;

    fn unselect_subtitle(&mut self, part: &MediaPart) -> Result<()>;
}

/// Read side of the catalog.
pub trait Catalog: TrackMutator {
    fn sections(&self, libraries: &BTreeSet<String>) -> Result<Vec<Section>>;

    fn search(
        &self,
        section: &Section,
        kind: LibraryType,
        filter: &CompiledFilter,
    ) -> Result<Vec<Video>>;

    fn refresh(&self, video: &Video) -> Result<Vec<RawPart>>;
}

pub mod filters;
pub mod preferences;
pub mod ranking;
pub mod report;
pub mod resolver;
