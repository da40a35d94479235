//! Academic terms
//!
//! Term codes are integers of the form `YYYYSS`: `10` spring, `20` summer,
//! `30` fall (e.g. `202330` is fall 2023). The short form used in SIS section
//! ids appends a letter instead (`2023C`).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub fn code(&self) -> i32 {
        match self {
            Self::Spring => 10,
            Self::Summer => 20,
            Self::Fall => 30,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Self::Spring => 'A',
            Self::Summer => 'B',
            Self::Fall => 'C',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'A' => Some(Self::Spring),
            'B' => Some(Self::Summer),
            'C' => Some(Self::Fall),
            _ => None,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            10 => Some(Self::Spring),
            20 => Some(Self::Summer),
            30 => Some(Self::Fall),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Term {
    pub year: i32,
    pub season: Season,
}

impl Term {
    pub fn new(year: i32, season: Season) -> Self {
        Self { year, season }
    }

    /// The term in session on `date`
    pub fn for_date(date: NaiveDate) -> Self {
        let season = match date.month() {
            1..=4 => Season::Spring,
            5..=7 => Season::Summer,
            _ => Season::Fall,
        };
        Self::new(date.year(), season)
    }

    pub fn next(&self) -> Self {
        match self.season {
            Season::Spring => Self::new(self.year, Season::Summer),
            Season::Summer => Self::new(self.year, Season::Fall),
            Season::Fall => Self::new(self.year + 1, Season::Spring),
        }
    }

    pub fn code(&self) -> i32 {
        self.year * 100 + self.season.code()
    }

    pub fn from_code(code: i32) -> Option<Self> {
        let season = Season::from_code(code % 100)?;
        Some(Self::new(code / 100, season))
    }

    /// SIS-style short form, e.g. `2023C`
    pub fn short(&self) -> String {
        format!("{}{}", self.year, self.season.letter())
    }

    /// Parse the short form
    pub fn from_short(short: &str) -> Option<Self> {
        let short = short.trim();
        if short.len() != 5 || !short.is_ascii() {
            return None;
        }
        let (year, letter) = short.split_at(4);
        let year = year.parse().ok()?;
        let season = Season::from_letter(letter.chars().next()?)?;
        Some(Self::new(year, season))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_date() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(Term::for_date(date(2023, 2, 1)).code(), 202310);
        assert_eq!(Term::for_date(date(2023, 6, 15)).code(), 202320);
        assert_eq!(Term::for_date(date(2023, 9, 5)).code(), 202330);
    }

    #[test]
    fn test_next_wraps_year() {
        let fall = Term::new(2023, Season::Fall);
        assert_eq!(fall.next(), Term::new(2024, Season::Spring));
        assert_eq!(Term::new(2024, Season::Spring).next().code(), 202420);
    }

    #[test]
    fn test_code_round_trip_and_invalid() {
        assert_eq!(Term::from_code(202330), Some(Term::new(2023, Season::Fall)));
        assert_eq!(Term::from_code(202340), None);
        assert_eq!(Term::new(2023, Season::Fall).short(), "2023C");
        assert_eq!(Term::new(2023, Season::Fall).to_string(), "202330");
    }

    #[test]
    fn test_from_short() {
        assert_eq!(Term::from_short("2023C"), Some(Term::new(2023, Season::Fall)));
        assert_eq!(Term::from_short("2024a").map(|t| t.code()), Some(202410));
        assert_eq!(Term::from_short("2023D"), None);
        assert_eq!(Term::from_short("23C"), None);
    }
}
