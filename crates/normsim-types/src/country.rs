//! The four state actors of the simulation and the speaker label attached
//! to each utterance.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One of the four canonical state actors.
///
/// Serialized with its display name (`USA`, `China`, `Russia`, `EU`), which
/// is also the label the agent service uses in its turn markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Country {
    /// United States of America.
    #[serde(rename = "USA")]
    Usa,
    /// People's Republic of China.
    China,
    /// Russian Federation.
    Russia,
    /// European Union.
    #[serde(rename = "EU")]
    Eu,
}

impl Country {
    /// Every country, in the order the simulation runs their turns.
    pub const ALL: [Self; 4] = [Self::Usa, Self::China, Self::Russia, Self::Eu];

    /// Canonical identifier used on the wire and in markers.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Usa => "USA",
            Self::China => "China",
            Self::Russia => "Russia",
            Self::Eu => "EU",
        }
    }
}

impl core::fmt::Display for Country {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who spoke an utterance.
///
/// Almost always a known [`Country`]. When the agent service emits a turn
/// marker whose label matches no known alias, the raw label is kept so the
/// renderer can still show (and flag) the turn instead of losing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(untagged)]
pub enum Speaker {
    /// A recognized state actor.
    Country(Country),
    /// A marker label that matched no alias, passed through verbatim.
    Unrecognized(String),
}

impl Speaker {
    /// The canonical country, if the label was recognized.
    pub const fn country(&self) -> Option<Country> {
        match self {
            Self::Country(c) => Some(*c),
            Self::Unrecognized(_) => None,
        }
    }
}

impl From<Country> for Speaker {
    fn from(country: Country) -> Self {
        Self::Country(country)
    }
}

impl PartialEq<Country> for Speaker {
    fn eq(&self, other: &Country) -> bool {
        self.country() == Some(*other)
    }
}

impl core::fmt::Display for Speaker {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Country(c) => c.fmt(f),
            Self::Unrecognized(label) => f.write_str(label),
        }
    }
}
