//! Movie metadata

use serde::{Deserialize, Serialize};

/// Catalog metadata for one movie
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieInfo {
    /// Catalog id (absent when the search found nothing)
    #[serde(default)]
    pub id: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub director: Vec<String>,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub genre: Vec<String>,
    /// Minutes
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub plot: Option<String>,
    /// Catalog vote average (0-10)
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub production_companies: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl MovieInfo {
    /// Title and year only, used when the catalog has no match
    pub fn basic(title: impl Into<String>, year: Option<i32>) -> Self {
        Self {
            title: title.into(),
            year,
            ..Default::default()
        }
    }

    /// `《title》(year)` display form
    pub fn display_title(&self) -> String {
        match self.year {
            Some(year) => format!("《{}》({})", self.title, year),
            None => format!("《{}》", self.title),
        }
    }
}

/// Year part of a `YYYY-MM-DD` date
pub fn year_from_release_date(date: &str) -> Option<i32> {
    date.split('-').next()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_from_release_date() {
        assert_eq!(year_from_release_date("1994-09-23"), Some(1994));
        assert_eq!(year_from_release_date(""), None);
        assert_eq!(year_from_release_date("unknown"), None);
    }

    #[test]
    fn test_display_title() {
        assert_eq!(MovieInfo::basic("活着", Some(1994)).display_title(), "《活着》(1994)");
        assert_eq!(MovieInfo::basic("活着", None).display_title(), "《活着》");
    }
}
