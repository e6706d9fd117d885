//! Orders candidate tracks for a desired language.
//!
//! Ranking is expressed as a sort key rather than a pairwise comparator so
//! that sorting is always a total order. The key, from most to least
//! significant:
//!
//! 1. exact language match with the desired language
//! 2. same base language as the desired language
//! 3. base language group, ordered by the lowest index carrying that base
//! 4. same country as the desired language
//! 5. country group within the base, ordered by its lowest index
//! 6. same script as the desired language
//! 7. language group, ordered by the lowest index carrying that language
//! 8. plain tracks before commentary, then closed caption, then hearing impaired
//! 9. original stream index
//!
//! Country and script are compared between tracks of the same base language
//! even when that base is not the desired one, so with `en` desired a plain
//! `es` track ranks before `es-419`.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::language::Language;
use crate::domain::media::Stream;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct RankKey {
    exact_miss: bool,
    base_miss: bool,
    base_group: u32,
    country_miss: bool,
    country_group: u32,
    script_miss: bool,
    language_group: u32,
    commentary: bool,
    closed_caption: bool,
    hearing_impaired: bool,
    index: u32,
}

/// Lowest stream index per base language, per base and country, and per
/// language among the candidates.
#[derive(Default)]
struct Groups<'a> {
    bases: HashMap<&'a str, u32>,
    countries: HashMap<(&'a str, Option<&'a str>), u32>,
    languages: HashMap<&'a Language, u32>,
}

fn lowest<K: std::hash::Hash + Eq>(groups: &mut HashMap<K, u32>, key: K, index: u32) {
    groups
        .entry(key)
        .and_modify(|g| *g = (*g).min(index))
        .or_insert(index);
}

impl<'a> Groups<'a> {
    fn of(streams: impl Iterator<Item = &'a Stream>) -> Self {
        let mut groups = Groups::default();
        for stream in streams {
            let language = &stream.language;
            lowest(&mut groups.bases, language.alpha3(), stream.index);
            lowest(
                &mut groups.countries,
                (language.alpha3(), language.country()),
                stream.index,
            );
            lowest(&mut groups.languages, language, stream.index);
        }
        groups
    }

    fn key(&self, stream: &'a Stream, desired: Option<&Language>) -> RankKey {
        let language = &stream.language;
        let (exact, base, country, script) = match desired {
            Some(desired) => (
                language == desired,
                language.same_base(desired),
                language.country() == desired.country(),
                language.script() == desired.script(),
            ),
            None => (false, false, false, false),
        };

        RankKey {
            exact_miss: !exact,
            base_miss: !base,
            base_group: self.bases[language.alpha3()],
            country_miss: !country,
            country_group: self.countries[&(language.alpha3(), language.country())],
            script_miss: !script,
            language_group: self.languages[language],
            commentary: stream.commentary,
            closed_caption: stream.closed_caption,
            hearing_impaired: stream.hearing_impaired,
            index: stream.index,
        }
    }
}

/// Compares two candidates; `Ordering::Less` means `a` is preferred.
pub fn compare(a: &Stream, b: &Stream, desired: Option<&Language>) -> Ordering {
    let groups = Groups::of([a, b].into_iter());
    groups.key(a, desired).cmp(&groups.key(b, desired))
}

/// Sorts candidates from most to least preferred for `desired`.
pub fn rank<'a>(candidates: Vec<&'a Stream>, desired: Option<&Language>) -> Vec<&'a Stream> {
    let groups = Groups::of(candidates.iter().copied());
    let mut ranked = candidates;
    ranked.sort_by_key(|s| groups.key(*s, desired));
    ranked
}
