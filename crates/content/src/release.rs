use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use crate::error::{Error, ErrorKind};
use time::{Date, Month};

/// Month-granular release date, displayed as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReleaseDate {
    year: i32,
    month: u8,
}

impl ReleaseDate {
    pub const fn new(year: i32, month: Month) -> Self {
        Self { year, month: month as u8 }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Month {
        // Only ever constructed from a valid `Month`.
        Month::try_from(self.month).unwrap_or(Month::January)
    }
}

impl From<Date> for ReleaseDate {
    fn from(date: Date) -> Self {
        Self::new(date.year(), date.month())
    }
}

impl FromStr for ReleaseDate {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_error = || ErrorKind::ParseError { field: "release_date", value: s.to_string() };
        let Some((year, month)) = s.trim().split_once('-') else {
            exn::bail!(parse_error());
        };
        let (Ok(year), Ok(month)) = (year.parse::<i32>(), month.parse::<u8>()) else {
            exn::bail!(parse_error());
        };
        let Ok(month) = Month::try_from(month) else {
            exn::bail!(parse_error());
        };
        Ok(Self::new(year, month))
    }
}

impl Display for ReleaseDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ReleaseDate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ReleaseDate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <String as serde::Deserialize>::deserialize(deserializer)?;
        text.parse().map_err(|e: Error| serde::de::Error::custom(&*e))
    }
}
