use crate::domain::media::Change;
use crate::domain::models::LibraryType;
use crate::workflows::preferences::Summary;

fn plural(kind: LibraryType, count: usize) -> String {
    if count > 1 {
        format!("{}s", kind.as_str())
    } else {
        kind.as_str().to_string()
    }
}

fn videos(count: usize) -> String {
    if count > 1 {
        format!("{count} videos")
    } else {
        format!("{count} video")
    }
}

fn describe(selection: Option<&impl ToString>) -> String {
    selection.map_or_else(|| "none".to_string(), ToString::to_string)
}

/// One line per library type that had videos selected.
pub fn summary_lines(summary: &Summary) -> Vec<String> {
    [LibraryType::Movie, LibraryType::Episode]
        .into_iter()
        .filter_map(|kind| {
            let tally = summary.tally(kind);
            (tally.selected > 0).then(|| {
                format!(
                    "{} {} changed out of {} selected {}",
                    tally.changed,
                    plural(kind, tally.changed),
                    tally.selected,
                    plural(kind, tally.selected)
                )
            })
        })
        .collect()
}

/// Describes the audio and subtitle transitions of a change.
pub fn change_line(change: &Change) -> String {
    let mut texts = Vec::new();
    if change.audio_changed() {
        texts.push(format!(
            "changed audio from {} to {}",
            describe(change.previous_audio.as_ref()),
            describe(change.new_audio.as_ref())
        ));
    }
    if change.subtitle_changed() {
        texts.push(match (&change.previous_subtitle, &change.new_subtitle) {
            (None, Some(new)) => format!("changed from no subtitles to {new} subtitles"),
            (Some(previous), None) => format!("changed from {previous} to no subtitles"),
            (previous, new) => format!(
                "changed subtitles from {} to {}",
                describe(previous.as_ref()),
                describe(new.as_ref())
            ),
        });
    }
    format!("{} {}", change.video, texts.join(" and "))
}

/// Renders the run summary, and every change when `full` is set.
pub fn render(summary: &Summary, full: bool) -> Vec<String> {
    let mut lines = summary_lines(summary);
    if full {
        lines.extend(summary.changes.iter().map(change_line));
    }
    if summary.skipped > 0 {
        lines.push(format!("{} skipped while being watched", videos(summary.skipped)));
    }
    if summary.failed > 0 {
        lines.push(format!("{} could not be updated", videos(summary.failed)));
    }
    lines
}
