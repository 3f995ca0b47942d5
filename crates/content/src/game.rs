use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use super::sanitize;

/// The engine generation or title a piece of content was built for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Game {
    Unreal,
    UnrealTournament,
    UnrealTournament2004,
    UnrealTournament3,
    Unreal2,
    /// A game named by a submitter override that is not one of the above.
    Other(String),
    #[default]
    Unknown,
}

impl Game {
    pub fn as_str(&self) -> &str {
        match self {
            Game::Unreal => "Unreal",
            Game::UnrealTournament => "Unreal Tournament",
            Game::UnrealTournament2004 => "Unreal Tournament 2004",
            Game::UnrealTournament3 => "Unreal Tournament 3",
            Game::Unreal2 => "Unreal 2",
            Game::Other(name) => name,
            Game::Unknown => "Unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Game::Unknown)
    }

    /// Resolves a game name leniently; names that match no known game are
    /// kept verbatim as [`Game::Other`], blank names are [`Game::Unknown`].
    pub fn from_name(name: &str) -> Self {
        match sanitize(name).as_str() {
            "" | "unknown" => Self::Unknown,
            "unreal" | "unreal1" | "u1" => Self::Unreal,
            "unrealtournament" | "ut" | "ut99" | "ut1999" | "utgoty" => Self::UnrealTournament,
            "unrealtournament2004" | "ut2004" | "ut2k4" => Self::UnrealTournament2004,
            "unrealtournament3" | "ut3" => Self::UnrealTournament3,
            "unreal2" | "u2" | "unrealii" | "unreal2theawakening" => Self::Unreal2,
            _ => Self::Other(name.trim().to_string()),
        }
    }
}

impl Game {
    /// Resolves a game name exactly as given. Only a name spelled the way
    /// [`Game::as_str`] spells a known game maps to that game; anything else,
    /// aliases and `"Unknown"` included, is kept verbatim as [`Game::Other`].
    pub fn from_exact(name: &str) -> Self {
        let known =
            [Self::Unreal, Self::UnrealTournament, Self::UnrealTournament2004, Self::UnrealTournament3, Self::Unreal2];
        known
            .into_iter()
            .find(|game| game.as_str() == name)
            .unwrap_or_else(|| Self::Other(name.to_string()))
    }
}

impl From<&str> for Game {
    fn from(value: &str) -> Self {
        Self::from_name(value)
    }
}

impl FromStr for Game {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl Display for Game {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Game {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Game {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = <String as serde::Deserialize>::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}
