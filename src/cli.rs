use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};

use crate::domain::language::Language;
use crate::domain::models::{
    Age, AudioCodec, Criteria, Preferences, SubtitleCodec, WatchingPreference,
};
use crate::domain::title::Title;

#[derive(Parser)]
#[command(name = "watchpref")]
#[command(about = "Select the audio and subtitle tracks of a Plex library according to your watching preferences")]
pub struct Cli {
    /// Plex server URL, e.g. http://localhost:32400
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Plex authentication token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Configure the selected audio and subtitle tracks of matching videos
    Preferences(PreferencesArgs),
}

#[derive(Args)]
pub struct PreferencesArgs {
    /// Watch in the original language or dubbed in --language
    #[arg(value_enum)]
    pub watching_preference: WatchingPreference,

    /// Library to search in, all libraries when omitted
    #[arg(short = 'L', long = "library")]
    pub libraries: Vec<String>,

    /// Title to search for: "Name", "Name (YYYY)", "Name s01" or "Name s01e02"
    #[arg(short = 't', long = "title")]
    pub titles: Vec<Title>,

    /// Preferred language as an IETF tag, e.g. en, pt-BR, zh-Hant
    #[arg(short = 'l', long)]
    pub language: Option<Language>,

    /// Accepted audio codecs, all when omitted
    #[arg(short = 'a', long = "audio-codec", value_enum)]
    pub audio_codecs: Vec<AudioCodec>,

    /// Audio codecs never to select
    #[arg(short = 'A', long = "excluded-audio-codec", value_enum)]
    pub excluded_audio_codecs: Vec<AudioCodec>,

    /// Accepted subtitle codecs, all when omitted
    #[arg(short = 's', long = "subtitle-codec", value_enum)]
    pub subtitle_codecs: Vec<SubtitleCodec>,

    /// Subtitle codecs never to select
    #[arg(short = 'S', long = "excluded-subtitle-codec", value_enum)]
    pub excluded_subtitle_codecs: Vec<SubtitleCodec>,

    /// Only videos added more recently than this age, e.g. 2w or 1d12h
    #[arg(short = 'n', long)]
    pub newer: Option<Age>,

    /// Only videos added before this age
    #[arg(short = 'o', long)]
    pub older: Option<Age>,

    /// Skip videos that are currently being watched
    #[arg(long)]
    pub skip_watching: bool,

    /// Never change the selected audio track
    #[arg(long)]
    pub keep_selected_audio: bool,

    /// Never change an already selected subtitle
    #[arg(long)]
    pub keep_selected_subtitle: bool,

    /// Select subtitles even when the audio is already in --language
    #[arg(long)]
    pub force_subtitles: bool,

    /// Print every change made
    #[arg(short = 'f', long)]
    pub full_summary: bool,

    /// Compute and report the changes without saving them
    #[arg(long)]
    pub dry_run: bool,
}

impl PreferencesArgs {
    pub fn criteria(&self) -> Result<Criteria> {
        if let Some(title) = self.titles.iter().find(|t| t.name.is_empty()) {
            bail!("Title {title:?} has no name");
        }

        Ok(Criteria {
            libraries: self.libraries.iter().cloned().collect(),
            titles: self.titles.clone(),
            newer_than: self.newer.clone(),
            older_than: self.older.clone(),
            skip_watching: self.skip_watching,
        })
    }

    pub fn preferences(&self) -> Result<Preferences> {
        if self.watching_preference == WatchingPreference::Dubbed && self.language.is_none() {
            bail!("--language is required when watching dubbed");
        }

        let mut prefs = Preferences::new(self.watching_preference, self.language.clone());
        prefs.audio_codecs = self.audio_codecs.iter().copied().collect();
        prefs.excluded_audio_codecs = self.excluded_audio_codecs.iter().copied().collect();
        prefs.subtitle_codecs = self.subtitle_codecs.iter().copied().collect();
        prefs.excluded_subtitle_codecs = self.excluded_subtitle_codecs.iter().copied().collect();
        prefs.keep_selected_audio = self.keep_selected_audio;
        prefs.keep_selected_subtitle = self.keep_selected_subtitle;
        prefs.force_subtitles = self.force_subtitles;
        Ok(prefs)
    }
}
