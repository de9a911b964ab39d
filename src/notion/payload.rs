//! Create-page request bodies

use serde::Serialize;

use crate::entities::{Icon, MappedRecord};

/// Property names of the target database
pub const COMPANY_PROPERTY: &str = "Company";
pub const POSITION_PROPERTY: &str = "Position";
pub const STATUS_PROPERTY: &str = "Status";

/// Body of `POST /v1/pages`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRequest {
    pub parent: Parent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    pub properties: PageProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parent {
    pub database_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageProperties {
    #[serde(rename = "Company")]
    pub company: TitleProperty,
    #[serde(rename = "Position")]
    pub position: RichTextProperty,
    #[serde(rename = "Status")]
    pub status: StatusProperty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleProperty {
    pub title: Vec<RichText>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RichTextProperty {
    pub rich_text: Vec<RichText>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusProperty {
    pub status: StatusOption,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusOption {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RichText {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: TextContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextContent {
    pub content: String,
}

impl RichText {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            kind: "text",
            text: TextContent {
                content: content.into(),
            },
        }
    }
}

impl PageRequest {
    /// Build the request that creates `record` in `database_id`
    pub fn new(database_id: &str, record: &MappedRecord) -> Self {
        Self {
            parent: Parent {
                database_id: database_id.to_string(),
            },
            icon: record.icon.clone(),
            properties: PageProperties {
                company: TitleProperty {
                    title: vec![RichText::plain(&record.company)],
                },
                position: RichTextProperty {
                    rich_text: vec![RichText::plain(&record.position)],
                },
                status: StatusProperty {
                    status: StatusOption {
                        name: record.status.clone(),
                    },
                },
            },
        }
    }

    /// Pretty JSON for diagnostics and dry runs
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("<unserializable: {e}>"))
    }
}
