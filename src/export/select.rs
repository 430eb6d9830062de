//! Playlist selection.
//!
//! The orchestrator hands the full catalog to a [`PlaylistSelector`] and
//! exports whatever comes back. Selection can be interactive (numbered
//! prompt), scripted by title, or everything.

use std::io::{BufRead, Write};

use crate::error::{ErrorCode, ExportError, Result};
use crate::types::PlaylistSummary;

/// Chooses which playlists to export.
pub trait PlaylistSelector {
    /// Returns the subset of `playlists` to export, in export order.
    fn select(&mut self, playlists: &[PlaylistSummary]) -> Result<Vec<PlaylistSummary>>;
}

/// Selects every playlist in the catalog.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllPlaylists;

impl PlaylistSelector for AllPlaylists {
    fn select(&mut self, playlists: &[PlaylistSummary]) -> Result<Vec<PlaylistSummary>> {
        Ok(playlists.to_vec())
    }
}

/// Selects playlists by title, case-insensitively.
///
/// Every requested title must match at least one playlist.
#[derive(Debug, Clone)]
pub struct ByTitle {
    titles: Vec<String>,
}

impl ByTitle {
    pub fn new(titles: Vec<String>) -> Self {
        Self { titles }
    }
}

impl PlaylistSelector for ByTitle {
    fn select(&mut self, playlists: &[PlaylistSummary]) -> Result<Vec<PlaylistSummary>> {
        let mut selected: Vec<PlaylistSummary> = Vec::new();
        for wanted in &self.titles {
            let matches: Vec<_> = playlists
                .iter()
                .filter(|p| p.title.eq_ignore_ascii_case(wanted.trim()))
                .collect();
            if matches.is_empty() {
                let available: Vec<_> = playlists.iter().map(|p| p.title.as_str()).collect();
                return Err(ExportError::new(
                    ErrorCode::SelectionFailed,
                    format!(
                        "No playlist titled \"{}\" (available: {})",
                        wanted,
                        available.join(", ")
                    ),
                ));
            }
            for playlist in matches {
                if !selected.iter().any(|s| s.id == playlist.id) {
                    selected.push(playlist.clone());
                }
            }
        }
        Ok(selected)
    }
}

/// Numbered multi-select prompt.
///
/// Prints the catalog to `output` and reads one line from `input`, e.g.
/// `1,3`, `2-4`, or `all`. An empty line selects nothing.
pub struct PromptSelector<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptSelector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

/// Prompt over the process's stdin and stderr.
pub fn stdin_prompt() -> PromptSelector<std::io::StdinLock<'static>, std::io::Stderr> {
    PromptSelector::new(std::io::stdin().lock(), std::io::stderr())
}

impl<R: BufRead, W: Write> PlaylistSelector for PromptSelector<R, W> {
    fn select(&mut self, playlists: &[PlaylistSummary]) -> Result<Vec<PlaylistSummary>> {
        if playlists.is_empty() {
            return Ok(Vec::new());
        }

        let io_failed = |e: std::io::Error| {
            ExportError::with_source(ErrorCode::SelectionFailed, "Prompt I/O failed", e)
        };

        writeln!(self.output, "Select playlists to export:").map_err(io_failed)?;
        for (i, playlist) in playlists.iter().enumerate() {
            let written = match playlist.track_count {
                Some(count) => writeln!(
                    self.output,
                    "  {:>3}) {} ({} tracks)",
                    i + 1,
                    playlist.title,
                    count
                ),
                None => writeln!(self.output, "  {:>3}) {}", i + 1, playlist.title),
            };
            written.map_err(io_failed)?;
        }
        write!(self.output, "Numbers (e.g. 1,3 or 2-4), 'all', or empty for none: ")
            .map_err(io_failed)?;
        self.output.flush().map_err(io_failed)?;

        let mut line = String::new();
        self.input.read_line(&mut line).map_err(io_failed)?;

        let indices = parse_selection(&line, playlists.len())?;
        Ok(indices.into_iter().map(|i| playlists[i].clone()).collect())
    }
}

/// Parses a 1-based selection line into 0-based indices.
///
/// Accepts comma- or whitespace-separated numbers and `a-b` ranges, or
/// `all` / `*`. Duplicates are dropped, first occurrence wins.
pub fn parse_selection(line: &str, count: usize) -> Result<Vec<usize>> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("all") || line == "*" {
        return Ok((0..count).collect());
    }

    let invalid = |token: &str| {
        ExportError::new(
            ErrorCode::SelectionFailed,
            format!("Invalid selection \"{}\" (choose 1-{})", token, count),
        )
    };
    let parse_one = |token: &str| -> Result<usize> {
        match token.trim().parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
            _ => Err(invalid(token)),
        }
    };

    let mut indices = Vec::new();
    for token in line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let range = match token.split_once('-') {
            Some((start, end)) => {
                let (start, end) = (parse_one(start)?, parse_one(end)?);
                if start > end {
                    return Err(invalid(token));
                }
                start..=end
            }
            None => {
                let n = parse_one(token)?;
                n..=n
            }
        };
        for index in range {
            if !indices.contains(&index) {
                indices.push(index);
            }
        }
    }
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::summary;

    fn catalog() -> Vec<PlaylistSummary> {
        vec![
            summary("1", "Road Trip"),
            summary("2", "Focus"),
            summary("3", "Workout"),
        ]
    }

    #[test]
    fn parse_numbers_and_ranges() {
        assert_eq!(parse_selection("1,3", 3).unwrap(), vec![0, 2]);
        assert_eq!(parse_selection(" 2-3 ", 3).unwrap(), vec![1, 2]);
        assert_eq!(parse_selection("3 1 3", 3).unwrap(), vec![2, 0]);
        assert_eq!(parse_selection("all", 3).unwrap(), vec![0, 1, 2]);
        assert_eq!(parse_selection("\n", 3).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn parse_rejects_out_of_range() {
        let err = parse_selection("4", 3).unwrap_err();
        assert_eq!(err.code, ErrorCode::SelectionFailed);
        assert!(parse_selection("0", 3).is_err());
        assert!(parse_selection("3-1", 3).is_err());
        assert!(parse_selection("two", 3).is_err());
    }

    #[test]
    fn all_selects_everything() {
        let selected = AllPlaylists.select(&catalog()).unwrap();
        assert_eq!(selected, catalog());
    }

    #[test]
    fn by_title_is_case_insensitive() {
        let mut selector = ByTitle::new(vec!["workout".to_string(), "Road Trip".to_string()]);
        let selected = selector.select(&catalog()).unwrap();
        let ids: Vec<_> = selected.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["3", "1"]);
    }

    #[test]
    fn by_title_unknown_fails() {
        let mut selector = ByTitle::new(vec!["Missing".to_string()]);
        let err = selector.select(&catalog()).unwrap_err();
        assert_eq!(err.code, ErrorCode::SelectionFailed);
        assert!(err.message.contains("Road Trip"));
    }

    #[test]
    fn prompt_reads_selection() {
        let mut output = Vec::new();
        let mut selector = PromptSelector::new("2,3\n".as_bytes(), &mut output);

        let selected = selector.select(&catalog()).unwrap();

        let titles: Vec<_> = selected.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Focus", "Workout"]);
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("  1) Road Trip"));
        assert!(shown.contains("  3) Workout"));
    }

    #[test]
    fn prompt_with_empty_catalog_does_not_read() {
        let mut output = Vec::new();
        let mut selector = PromptSelector::new("".as_bytes(), &mut output);
        assert!(selector.select(&[]).unwrap().is_empty());
        assert!(output.is_empty());
    }
}
