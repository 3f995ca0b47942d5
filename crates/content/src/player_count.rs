use std::fmt::{Display, Formatter, Result as FmtResult};

/// Recommended number of players for a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerCount {
    Exact(u32),
    /// Inclusive range, always with `min < max`.
    Range(u32, u32),
}

impl PlayerCount {
    /// Normalises a min/max pair. Non-positive bounds count as unset:
    ///
    /// ```
    /// use ua_content::PlayerCount;
    /// assert_eq!(PlayerCount::from_bounds(8, 8), Some(PlayerCount::Exact(8)));
    /// assert_eq!(PlayerCount::from_bounds(4, 8), Some(PlayerCount::Range(4, 8)));
    /// assert_eq!(PlayerCount::from_bounds(0, 6), Some(PlayerCount::Exact(6)));
    /// assert_eq!(PlayerCount::from_bounds(0, 0), None);
    /// ```
    pub fn from_bounds(min: i32, max: i32) -> Option<Self> {
        let min = u32::try_from(min).ok().filter(|v| *v > 0);
        let max = u32::try_from(max).ok().filter(|v| *v > 0);
        match (min, max) {
            (Some(a), Some(b)) if a == b => Some(Self::Exact(a)),
            (Some(a), Some(b)) => Some(Self::Range(a.min(b), a.max(b))),
            (Some(n), None) | (None, Some(n)) => Some(Self::Exact(n)),
            (None, None) => None,
        }
    }

    /// Parses free-form legacy text such as `"4-8"`, `"8 players"` or
    /// `"2 to 4"`. The first two numbers found are treated as bounds.
    pub fn parse_loose(text: &str) -> Option<Self> {
        let mut numbers = text
            .split(|c: char| !c.is_ascii_digit())
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse::<i32>().ok());
        let first = numbers.next()?;
        let second = numbers.next().unwrap_or(first);
        Self::from_bounds(first, second)
    }
}

impl Display for PlayerCount {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PlayerCount::Exact(n) => write!(f, "{n}"),
            PlayerCount::Range(min, max) => write!(f, "{min}-{max}"),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for PlayerCount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for PlayerCount {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <String as serde::Deserialize>::deserialize(deserializer)?;
        Self::parse_loose(&text).ok_or_else(|| serde::de::Error::custom(format!("invalid player count: {text}")))
    }
}
