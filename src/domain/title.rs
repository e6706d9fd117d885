use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

use crate::error::InputError;

/// `NAME [(YYYY)] [sSS[eEE]]`
static TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?P<name>.*?)\s*(?:\((?P<year>\d{4})\))?\s*(?:s(?P<season>\d+)(?:e(?P<episode>\d+))?)?$",
    )
    .unwrap()
});

/// Structured identity of a movie, show, season or episode to search for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    pub name: String,
    pub year: Option<u32>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

impl Title {
    pub fn is_episode(&self) -> bool {
        self.season.is_some() || self.episode.is_some()
    }

    pub fn is_only_name(&self) -> bool {
        self.year.is_none() && !self.is_episode()
    }
}

impl FromStr for Title {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InputError::InvalidTitle(s.to_string());
        let caps = TITLE_RE.captures(s).ok_or_else(invalid)?;

        let number = |group: &str| -> Result<Option<u32>, InputError> {
            caps.name(group)
                .map(|m| m.as_str().parse::<u32>().map_err(|_| invalid()))
                .transpose()
        };

        Ok(Title {
            name: caps["name"].to_string(),
            year: number("year")?,
            season: number("season")?,
            episode: number("episode")?,
        })
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(year) = self.year {
            write!(f, " ({year:04})")?;
        }
        if let Some(season) = self.season {
            write!(f, " s{season:02}")?;
        }
        if let Some(episode) = self.episode {
            write!(f, "e{episode:02}")?;
        }
        Ok(())
    }
}
