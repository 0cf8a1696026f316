//! Database models

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date formats accepted for release dates, tried in order
const RELEASE_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d.%m.%Y"];

/// A song row
///
/// `release_date`, `text` and `link` are absent on a base record and
/// populated together by enrichment; explicit updates may set them freely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: i64,
    pub group_name: String,
    pub song_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Song {
    /// True once release date, text and link are all present
    pub fn is_enriched(&self) -> bool {
        self.release_date.is_some() && self.text.is_some() && self.link.is_some()
    }
}

/// Listing row (no lyric text)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongSummary {
    pub id: i64,
    pub group_name: String,
    pub song_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
}

/// Fields written onto a base record by enrichment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongEnrichment {
    pub release_date: NaiveDate,
    pub text: String,
    pub link: String,
}

/// Full overwrite of a song row
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SongUpdate {
    pub group_name: String,
    pub song_title: String,
    pub release_date: Option<NaiveDate>,
    pub text: Option<String>,
    pub link: Option<String>,
}

/// Listing filter; `None` fields do not filter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SongFilter {
    /// Case-insensitive substring of the group name
    pub group_name: Option<String>,
    /// Case-insensitive substring of the song title
    pub song_title: Option<String>,
    /// Exact release date
    pub release_date: Option<NaiveDate>,
}

impl SongFilter {
    /// Build a filter from raw query values; empty strings mean "no filter"
    pub fn from_params(
        group_name: Option<&str>,
        song_title: Option<&str>,
        release_date: Option<&str>,
    ) -> Result<Self> {
        let release_date = match non_empty(release_date) {
            Some(raw) => Some(parse_release_date(&raw)?),
            None => None,
        };

        Ok(Self {
            group_name: non_empty(group_name),
            song_title: non_empty(song_title),
            release_date,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Parse a release date (`YYYY-MM-DD`, or `DD.MM.YYYY` as some lookup sources send)
pub fn parse_release_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    RELEASE_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| Error::InvalidInput(format!("Invalid release date: {}", raw)))
}
