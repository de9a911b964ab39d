//! Mapped record ready to be created as a Notion page

use serde::{Deserialize, Serialize};

/// Page icon, serialized the way the Notion API expects it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Icon {
    Emoji { emoji: String },
    External { external: ExternalFile },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalFile {
    pub url: String,
}

impl Icon {
    pub fn emoji(glyph: char) -> Self {
        Icon::Emoji {
            emoji: glyph.to_string(),
        }
    }

    pub fn external(url: impl Into<String>) -> Self {
        Icon::External {
            external: ExternalFile { url: url.into() },
        }
    }
}

/// Which icon, if any, to attach to each record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Decoration {
    #[default]
    None,
    Emoji,
    External,
}

impl Decoration {
    /// Resolve the two request flags; emoji wins when both are set
    pub fn from_flags(emoji: bool, external: bool) -> Self {
        match (emoji, external) {
            (true, _) => Decoration::Emoji,
            (false, true) => Decoration::External,
            (false, false) => Decoration::None,
        }
    }
}

impl std::fmt::Display for Decoration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decoration::None => write!(f, "none"),
            Decoration::Emoji => write!(f, "emoji"),
            Decoration::External => write!(f, "external"),
        }
    }
}

/// A job application mapped onto the target database schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedRecord {
    pub company: String,
    pub position: String,
    /// Status option name; never empty
    pub status: String,
    pub icon: Option<Icon>,
}

impl MappedRecord {
    /// Key used to detect entries that already exist in the database
    pub fn dedupe_key(&self) -> (String, String) {
        (self.company.clone(), self.position.clone())
    }
}
