use anyhow::Result;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::domain::media::{Change, Video};
use crate::domain::models::{Criteria, LibraryType, Preferences};
use crate::media::guesser::LanguageGuesser;
use crate::media::streams::classify;
use crate::workflows::filters::compile;
use crate::workflows::resolver::{apply, resolve};
use crate::workflows::Catalog;

/// Videos seen and changed for one library type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub selected: usize,
    pub changed: usize,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct Summary {
    pub found: usize,
    pub skipped: usize,
    pub failed: usize,
    pub movies: Tally,
    pub episodes: Tally,
    pub changes: Vec<Change>,
}

impl Summary {
    pub fn tally(&self, kind: LibraryType) -> Tally {
        match kind {
            LibraryType::Movie => self.movies,
            LibraryType::Episode => self.episodes,
        }
    }

    fn tally_mut(&mut self, kind: LibraryType) -> &mut Tally {
        match kind {
            LibraryType::Movie => &mut self.movies,
            LibraryType::Episode => &mut self.episodes,
        }
    }
}

/// Searches every relevant section for videos matching `criteria`.
pub fn find_videos<C: Catalog>(catalog: &C, criteria: &Criteria) -> Result<Vec<Video>> {
    let sections = catalog.sections(&criteria.libraries)?;
    let mut seen = HashSet::new();
    let mut videos = Vec::new();

    for section in &sections {
        let Some(kind) = section.library_type() else {
            debug!("Skipping section {} of type {}", section.title, section.section_type);
            continue;
        };
        debug!("Entering section {}", section.title);

        for filter in compile(criteria, kind) {
            debug!("Searching {} with {} predicates", section.title, filter.len());
            for video in catalog.search(section, kind, &filter)? {
                if seen.insert(video.key.clone()) {
                    videos.push(video);
                }
            }
        }
    }

    Ok(videos)
}

/// Resolves and saves the preferences of every part of `video`.
///
/// Each change is pushed to `changes` once saved, so when a part fails the
/// changes of the earlier parts are kept. With `dry_run` the changes are
/// computed but never sent to the catalog.
pub fn save_preferences<C: Catalog>(
    catalog: &mut C,
    video: &Video,
    prefs: &Preferences,
    guesser: &dyn LanguageGuesser,
    dry_run: bool,
    changes: &mut Vec<Change>,
) -> Result<()> {
    for raw in catalog.refresh(video)? {
        let part = raw.classify_with(|track| classify(track, guesser));
        let Some(change) = resolve(&video.title, &part, prefs) else {
            continue;
        };
        if !dry_run {
            apply(&change, &part, catalog)?;
        }
        changes.push(change);
    }
    Ok(())
}

/// Applies `prefs` to every video matching `criteria`.
///
/// A failure on one video is logged and the run moves on to the next one.
/// Failed videos only count as selected when some of their parts were saved.
pub fn run<C: Catalog>(
    catalog: &mut C,
    criteria: &Criteria,
    prefs: &Preferences,
    guesser: &dyn LanguageGuesser,
    dry_run: bool,
) -> Result<Summary> {
    let videos = find_videos(catalog, criteria)?;
    info!("Configuring watching preferences of {} videos", videos.len());

    let mut summary = Summary {
        found: videos.len(),
        ..Default::default()
    };

    for video in &videos {
        if criteria.skip_watching && video.is_being_watched() {
            info!("Skipping {video}, currently being watched");
            summary.skipped += 1;
            continue;
        }

        let mut changes = Vec::new();
        let result = save_preferences(catalog, video, prefs, guesser, dry_run, &mut changes);
        if let Err(e) = &result {
            warn!("Failed to save preferences of {video}: {e:#}");
            summary.failed += 1;
        }
        if result.is_err() && changes.is_empty() {
            continue;
        }

        let tally = summary.tally_mut(video.kind);
        tally.selected += 1;
        if changes.is_empty() {
            debug!("{video} already up to date");
        } else {
            tally.changed += 1;
            summary.changes.extend(changes);
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::language::Language;
    use crate::domain::media::{MediaPart, Stream};
    use crate::domain::models::WatchingPreference;
    use crate::domain::title::Title;
    use crate::infra::plex::{RawPart, RawTrack, Section};
    use crate::media::guesser::KeywordGuesser;
    use crate::workflows::filters::CompiledFilter;
    use crate::workflows::TrackMutator;
    use anyhow::bail;
    use std::collections::{BTreeSet, HashMap};

    #[derive(Default)]
    struct FakeCatalog {
        sections: Vec<Section>,
        videos: HashMap<String, Vec<Video>>,
        parts: HashMap<String, Vec<RawPart>>,
        searches: std::cell::RefCell<Vec<(String, usize)>>,
        mutations: Vec<String>,
        rejected_part: Option<u64>,
    }

    impl TrackMutator for FakeCatalog {
        fn select_audio(&mut self, part: &MediaPart, stream: &Stream) -> Result<()> {
            if self.rejected_part == Some(part.id) {
                bail!("part {} is read only", part.id);
            }
            self.mutations.push(format!("audio {} {}", part.id, stream.id));
            Ok(())
        }

        fn select_subtitle(&mut self, part: &MediaPart, stream: &Stream) -> Result<()> {
            self.mutations.push(format!("subtitle {} {}", part.id, stream.id));
            Ok(())
        }

        fn unselect_subtitle(&mut self, part: &MediaPart) -> Result<()> {
            self.mutations.push(format!("unselect {}", part.id));
            Ok(())
        }
    }

    impl Catalog for FakeCatalog {
        fn sections(&self, libraries: &BTreeSet<String>) -> Result<Vec<Section>> {
            Ok(self
                .sections
                .iter()
                .filter(|s| libraries.is_empty() || libraries.contains(&s.title))
                .cloned()
                .collect())
        }

        fn search(
            &self,
            section: &Section,
            _kind: LibraryType,
            filter: &CompiledFilter,
        ) -> Result<Vec<Video>> {
            self.searches
                .borrow_mut()
                .push((section.key.clone(), filter.len()));
            Ok(self.videos.get(&section.key).cloned().unwrap_or_default())
        }

        fn refresh(&self, video: &Video) -> Result<Vec<RawPart>> {
            match self.parts.get(&video.key) {
                Some(parts) => Ok(parts.clone()),
                None => bail!("metadata of {} unavailable", video.key),
            }
        }
    }

    fn section(key: &str, title: &str, section_type: &str) -> Section {
        Section {
            key: key.to_string(),
            title: title.to_string(),
            section_type: section_type.to_string(),
        }
    }

    fn video(key: &str, kind: LibraryType, title: &str) -> Video {
        Video {
            key: key.to_string(),
            kind,
            title: title.to_string(),
            view_offset: 0,
        }
    }

    fn track(id: u64, stream_type: u8, code: &str, selected: bool) -> RawTrack {
        RawTrack {
            id,
            stream_type,
            index: Some(id as u32),
            language_code: Some(code.to_string()),
            selected: Some(selected),
            default: Some(stream_type == 1),
            ..Default::default()
        }
    }

    /// Japanese film with English audio selected and an English subtitle.
    fn anime_part(id: u64) -> RawPart {
        RawPart {
            id,
            file: format!("/media/{id}.mkv"),
            streams: vec![
                track(1, 1, "jpn", false),
                track(2, 2, "eng", true),
                track(3, 2, "jpn", false),
                track(4, 3, "eng", false),
            ],
        }
    }

    fn catalog() -> FakeCatalog {
        let mut catalog = FakeCatalog {
            sections: vec![
                section("1", "Movies", "movie"),
                section("2", "TV Shows", "show"),
                section("3", "Music", "artist"),
            ],
            ..Default::default()
        };
        catalog.videos.insert(
            "1".to_string(),
            vec![
                video("10", LibraryType::Movie, "Akira (1988)"),
                video("11", LibraryType::Movie, "Broken (2000)"),
            ],
        );
        catalog.videos.insert(
            "2".to_string(),
            vec![video("20", LibraryType::Episode, "Cowboy Bebop - S01E01 - Asteroid Blues")],
        );
        catalog.parts.insert("10".to_string(), vec![anime_part(100)]);
        catalog.parts.insert("20".to_string(), vec![anime_part(200)]);
        catalog
    }

    fn prefs() -> Preferences {
        Preferences::new(WatchingPreference::Original, Language::from_ietf("en"))
    }

    #[test]
    fn test_find_videos_skips_unsupported_sections() {
        let catalog = catalog();
        let videos = find_videos(&catalog, &Criteria::default()).unwrap();
        let keys: Vec<&str> = videos.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(keys, vec!["10", "11", "20"]);
        assert_eq!(
            catalog.searches.borrow().as_slice(),
            &[("1".to_string(), 0), ("2".to_string(), 0)]
        );
    }

    #[test]
    fn test_find_videos_skips_kinds_without_applicable_titles() {
        let catalog = catalog();
        let criteria = Criteria {
            titles: vec!["Cowboy Bebop s01".parse::<Title>().unwrap()],
            ..Default::default()
        };
        let videos = find_videos(&catalog, &criteria).unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(catalog.searches.borrow().as_slice(), &[("2".to_string(), 2)]);
    }

    #[test]
    fn test_run_counts_and_continues_after_failure() {
        let mut catalog = catalog();
        let summary = run(&mut catalog, &Criteria::default(), &prefs(), &KeywordGuesser, false).unwrap();

        assert_eq!(summary.found, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.tally(LibraryType::Movie), Tally { selected: 1, changed: 1 });
        assert_eq!(summary.tally(LibraryType::Episode), Tally { selected: 1, changed: 1 });
        assert_eq!(summary.changes.len(), 2);
        assert_eq!(
            catalog.mutations,
            vec!["audio 100 3", "subtitle 100 4", "audio 200 3", "subtitle 200 4"]
        );
    }

    #[test]
    fn test_dry_run_does_not_mutate() {
        let mut catalog = catalog();
        let summary = run(&mut catalog, &Criteria::default(), &prefs(), &KeywordGuesser, true).unwrap();
        assert_eq!(summary.changes.len(), 2);
        assert!(catalog.mutations.is_empty());
    }

    #[test]
    fn test_skip_watching() {
        let mut catalog = catalog();
        if let Some(videos) = catalog.videos.get_mut("1") {
            videos[0].view_offset = 120_000;
        }
        let criteria = Criteria {
            skip_watching: true,
            ..Default::default()
        };
        let summary = run(&mut catalog, &criteria, &prefs(), &KeywordGuesser, false).unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.tally(LibraryType::Movie).selected, 0);
        assert_eq!(catalog.mutations, vec!["audio 200 3", "subtitle 200 4"]);
    }

    #[test]
    fn test_failing_part_keeps_saved_changes() {
        let mut catalog = catalog();
        catalog
            .parts
            .insert("20".to_string(), vec![anime_part(200), anime_part(201)]);
        catalog.rejected_part = Some(201);

        let summary = run(&mut catalog, &Criteria::default(), &prefs(), &KeywordGuesser, false).unwrap();
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.tally(LibraryType::Episode), Tally { selected: 1, changed: 1 });
        assert_eq!(summary.changes.len(), 2);
        assert_eq!(summary.changes[1].part_id, 200);
        assert_eq!(
            catalog.mutations,
            vec!["audio 100 3", "subtitle 100 4", "audio 200 3", "subtitle 200 4"]
        );
    }
}
