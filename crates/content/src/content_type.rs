use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use super::sanitize;
use crate::error::{Error, ErrorKind};

/// What a submission contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContentType {
    Map,
    MapPack,
    Mutator,
    Voice,
    #[default]
    Unknown,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Map => "Map",
            ContentType::MapPack => "Map Pack",
            ContentType::Mutator => "Mutator",
            ContentType::Voice => "Voice",
            ContentType::Unknown => "Unknown",
        }
    }
}

impl TryFrom<String> for ContentType {
    type Error = Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.as_str().parse()
    }
}

impl FromStr for ContentType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "map" => Self::Map,
            "mappack" | "maps" => Self::MapPack,
            "mutator" | "mutators" => Self::Mutator,
            "voice" | "voices" | "voicepack" => Self::Voice,
            "unknown" => Self::Unknown,
            _ => exn::bail!(ErrorKind::ParseError { field: "content_type", value: s.to_string() }),
        })
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
