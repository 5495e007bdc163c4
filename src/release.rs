use lazy_regex::{Regex, regex};
use regex::Captures;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

// Both patterns only anchor the start of the release name; resolution,
// codec and group tags after the match are never looked at.

/// Episode release, e.g. `Show.Name.2020.S01E02.1080p.WEB.x264-GRP`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ParsedTv {
    pub show: String,
    pub year: Option<u16>,
    pub season: u32,
    pub episode: u32,
}

/// Movie release, e.g. `Movie.Title.1999.BluRay.x264-GRP`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ParsedMovie {
    pub title: String,
    pub year: u16,
}

impl ParsedTv {
    /// `Show` or `Show (Year)`
    pub fn show_folder(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({year})", self.show),
            None => self.show.clone(),
        }
    }

    /// `Season NN`
    pub fn season_folder(&self) -> String {
        format!("Season {:02}", self.season)
    }

    /// Path of the season directory relative to the TV library root
    pub fn library_dir(&self) -> PathBuf {
        PathBuf::from(self.show_folder()).join(self.season_folder())
    }
}

impl ParsedMovie {
    /// Path of the movie directory relative to the movies library root
    pub fn library_dir(&self) -> PathBuf {
        PathBuf::from(format!("{} ({})", self.title, self.year))
    }
}

impl fmt::Display for ParsedTv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} S{:02}E{:02}",
            self.show_folder(),
            self.season,
            self.episode
        )
    }
}

impl fmt::Display for ParsedMovie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.year)
    }
}

/// Turn a dotted release segment into a display title.
///
/// Dots become spaces, whitespace runs collapse to one space and the result
/// is trimmed. Other punctuation is kept as-is.
pub fn normalize_title(segment: &str) -> String {
    segment
        .replace('.', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn capture_number<T: std::str::FromStr>(captures: &Captures<'_>, name: &str) -> Option<T> {
    captures.name(name)?.as_str().parse().ok()
}

/// Parse a TV release name: `<show>[.<year>].SxxEyy...`
///
/// Returns `None` when the name does not start with that shape.
pub fn parse_tv(release: &str) -> Option<ParsedTv> {
    let re: &Regex = regex!(
        r"(?i)^(?P<show>.+?)(?:\.(?P<year>19[0-9]{2}|20[0-9]{2}))?\.S(?P<season>[0-9]{2})E(?P<episode>[0-9]{2})\b"
    );

    let captures = re.captures(release)?;

    Some(ParsedTv {
        show: normalize_title(captures.name("show")?.as_str()),
        year: capture_number(&captures, "year"),
        season: capture_number(&captures, "season")?,
        episode: capture_number(&captures, "episode")?,
    })
}

/// Parse a movie release name: `<title>.<year>...`
///
/// Returns `None` when no year follows the title.
pub fn parse_movie(release: &str) -> Option<ParsedMovie> {
    let re: &Regex = regex!(r"(?i)^(?P<title>.+?)\.(?P<year>19[0-9]{2}|20[0-9]{2})\b");

    let captures = re.captures(release)?;

    Some(ParsedMovie {
        title: normalize_title(captures.name("title")?.as_str()),
        year: capture_number(&captures, "year")?,
    })
}
