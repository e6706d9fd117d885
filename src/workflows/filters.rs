use crate::domain::models::{Age, Criteria, LibraryType};
use crate::domain::title::Title;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Texts(Vec<String>),
    Number(u32),
    Age(Age),
}

/// Predicates for a single catalog search, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledFilter {
    predicates: Vec<(String, FilterValue)>,
}

impl CompiledFilter {
    fn insert(&mut self, name: impl Into<String>, value: FilterValue) {
        let name = name.into();
        self.predicates.retain(|(n, _)| n != &name);
        self.predicates.push((name, value));
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.predicates
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.predicates.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }
}

fn title_predicate(kind: LibraryType) -> &'static str {
    match kind {
        LibraryType::Movie => "movie.title",
        LibraryType::Episode => "show.title",
    }
}

fn year_predicate(kind: LibraryType) -> &'static str {
    match kind {
        LibraryType::Movie => "movie.year",
        LibraryType::Episode => "episode.year",
    }
}

fn base_filter(criteria: &Criteria) -> CompiledFilter {
    let mut filter = CompiledFilter::default();
    if let Some(age) = &criteria.newer_than {
        filter.insert("addedAt>>", FilterValue::Age(age.clone()));
    }
    if let Some(age) = &criteria.older_than {
        filter.insert("addedAt<<", FilterValue::Age(age.clone()));
    }
    filter
}

fn title_filter(criteria: &Criteria, title: &Title, kind: LibraryType) -> CompiledFilter {
    let mut filter = base_filter(criteria);
    filter.insert(title_predicate(kind), FilterValue::Text(title.name.clone()));
    if let Some(year) = title.year {
        filter.insert(year_predicate(kind), FilterValue::Number(year));
    }
    if let Some(season) = title.season {
        filter.insert("season.index", FilterValue::Number(season));
    }
    if let Some(episode) = title.episode {
        filter.insert("episode.index", FilterValue::Number(episode));
    }
    filter
}

/// Compiles the search criteria into the filters to run against libraries of
/// the given kind. An empty result means there is nothing to search for.
pub fn compile(criteria: &Criteria, kind: LibraryType) -> Vec<CompiledFilter> {
    let titles: Vec<&Title> = criteria
        .titles
        .iter()
        .filter(|t| kind == LibraryType::Episode || !t.is_episode())
        .collect();

    if titles.is_empty() {
        if criteria.titles.is_empty() {
            return vec![base_filter(criteria)];
        }
        return Vec::new();
    }

    if titles.iter().all(|t| t.is_only_name()) {
        let mut filter = base_filter(criteria);
        let names = titles.iter().map(|t| t.name.clone()).collect();
        filter.insert(title_predicate(kind), FilterValue::Texts(names));
        return vec![filter];
    }

    titles
        .into_iter()
        .map(|title| title_filter(criteria, title, kind))
        .collect()
}
