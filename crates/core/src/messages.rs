//! Messages exchanged with the plugin UI panel.
//!
//! Both directions are JSON objects tagged by `type`, with camelCase payload
//! fields.

use serde::{Deserialize, Serialize};

use crate::types::{MediaType, SearchResultItem, TrendingResultItem};

pub const NETWORK_ERROR: &str = "Network error";
pub const INSERT_ERROR: &str = "Error inserting poster";
pub const NO_SUITABLE_POSTER: &str = "No suitable poster found";
pub const POSTER_NOT_AVAILABLE: &str = "Poster not available";
pub const ACTION_FAILED: &str = "Action failed";
pub const CANNOT_HAVE_FILLS: &str = "Selected item cannot have fills";
pub const SELECT_ONLY_ONE: &str = "Select only one frame or nothing";

/// Messages sent by the UI panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum InboundMessage {
    LiveSearch {
        #[serde(default)]
        media_type: MediaType,
        #[serde(default)]
        query: String,
    },
    Search {
        #[serde(default)]
        media_type: MediaType,
        #[serde(default)]
        query: String,
    },
    GetTrending {
        #[serde(default)]
        media_type: MediaType,
    },
    RandomPick {
        #[serde(default)]
        media_type: MediaType,
    },
    InsertPoster {
        /// Image bytes already downloaded by the UI.
        #[serde(default)]
        data: Option<Vec<u8>>,
        /// Absolute image URL or `data:` URI.
        #[serde(default)]
        image_url: Option<String>,
        #[serde(default)]
        poster_path: Option<String>,
        #[serde(default)]
        title: Option<String>,
    },
    Close,
}

impl InboundMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LiveSearch { .. } => "live-search",
            Self::Search { .. } => "search",
            Self::GetTrending { .. } => "get-trending",
            Self::RandomPick { .. } => "random-pick",
            Self::InsertPoster { .. } => "insert-poster",
            Self::Close => "close",
        }
    }
}

/// Messages posted back to the UI panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum OutboundMessage {
    SearchResults {
        results: Vec<SearchResultItem>,
        query: String,
    },
    TrendingResults {
        results: Vec<TrendingResultItem>,
    },
    FetchForRandom {
        poster_path: String,
        title: String,
    },
    Inserted {
        message: String,
    },
    NoSelection {
        message: String,
    },
    Snackbar {
        message: String,
    },
}

impl OutboundMessage {
    pub fn snackbar(message: impl Into<String>) -> Self {
        Self::Snackbar {
            message: message.into(),
        }
    }

    pub fn no_selection(message: impl Into<String>) -> Self {
        Self::NoSelection {
            message: message.into(),
        }
    }

    pub fn inserted(title: &str) -> Self {
        Self::Inserted {
            message: format!("Added: {title}"),
        }
    }
}
