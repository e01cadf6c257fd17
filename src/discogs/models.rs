//! Discogs response models and query descriptors

use crate::collection::{Identified, PagedQuery};
use crate::pagination::Pagination;
use crate::types::{OptionStringExt, SortOrder};
use serde::{Deserialize, Deserializer, Serialize};

/// Page size used when a query does not set one
pub const DEFAULT_PER_PAGE: u32 = 25;

// ============================================================================
// Releases
// ============================================================================

/// One row of a label or artist release listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Release (or master) id
    pub id: u64,
    /// Release title
    #[serde(default)]
    pub title: String,
    /// Catalog number on this label
    #[serde(default, deserialize_with = "empty_as_none")]
    pub catno: Option<String>,
    /// Thumbnail image URL
    #[serde(default, deserialize_with = "empty_as_none")]
    pub thumb: Option<String>,
    /// Credited artist
    #[serde(default, deserialize_with = "empty_as_none")]
    pub artist: Option<String>,
    /// Format summary, e.g. "12\", EP"
    #[serde(default, deserialize_with = "empty_as_none")]
    pub format: Option<String>,
    /// Label name (artist listings only)
    #[serde(default, deserialize_with = "empty_as_none")]
    pub label: Option<String>,
    /// Track credit summary, e.g. "Strings For Yasmin" (artist listings only)
    #[serde(default, deserialize_with = "empty_as_none")]
    pub trackinfo: Option<String>,
    /// Release year; Discogs reports unknown years as 0
    #[serde(default, deserialize_with = "zero_as_none")]
    pub year: Option<u32>,
    /// Listing status, e.g. "Accepted"
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<String>,
    /// Artist role on the release (artist listings only)
    #[serde(default, deserialize_with = "empty_as_none")]
    pub role: Option<String>,
    /// "release" or "master" (artist listings only)
    #[serde(rename = "type", default, deserialize_with = "empty_as_none")]
    pub kind: Option<String>,
    /// API URL of the full release
    #[serde(default, deserialize_with = "empty_as_none")]
    pub resource_url: Option<String>,
}

impl Identified for Release {
    /// Masters and releases are numbered independently, so the kind is
    /// part of the identity.
    type Id = (u64, Option<String>);

    fn id(&self) -> Self::Id {
        (self.id, self.kind.clone())
    }
}

/// Wire shape of a paginated release listing
#[derive(Debug, Deserialize)]
pub(crate) struct ReleasesResponse {
    #[serde(default)]
    pub pagination: Option<Pagination>,
    pub releases: Vec<Release>,
}

// ============================================================================
// Labels
// ============================================================================

/// Label details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label id
    pub id: u64,
    /// Label name
    pub name: String,
    /// Contact information
    #[serde(default, deserialize_with = "empty_as_none")]
    pub contact_info: Option<String>,
    /// Free-text profile
    #[serde(default, deserialize_with = "empty_as_none")]
    pub profile: Option<String>,
    /// Label images, primary first
    #[serde(default)]
    pub images: Vec<Image>,
    /// External links
    #[serde(default)]
    pub urls: Vec<String>,
    /// Parent label, if any
    #[serde(default)]
    pub parent_label: Option<LabelRef>,
    /// Sub-labels
    #[serde(default)]
    pub sublabels: Vec<LabelRef>,
    /// Discogs web page
    #[serde(default)]
    pub uri: Option<String>,
}

impl Label {
    /// The image a detail view shows as its cover
    pub fn cover_image(&self) -> Option<&Image> {
        self.images
            .iter()
            .find(|image| image.kind.as_deref() == Some("primary"))
            .or_else(|| self.images.first())
    }
}

/// Reference to another label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRef {
    /// Label id
    pub id: u64,
    /// Label name
    pub name: String,
    /// API URL of the label
    #[serde(default)]
    pub resource_url: Option<String>,
}

/// Image metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// "primary" or "secondary"
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Full-size image URL
    #[serde(default, deserialize_with = "empty_as_none")]
    pub resource_url: Option<String>,
    /// 150px thumbnail URL
    #[serde(default, deserialize_with = "empty_as_none")]
    pub uri150: Option<String>,
    /// Width in pixels
    #[serde(default)]
    pub width: Option<u32>,
    /// Height in pixels
    #[serde(default)]
    pub height: Option<u32>,
}

// ============================================================================
// Queries
// ============================================================================

/// Sort keys accepted by the artist releases endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtistReleaseSort {
    /// By release year
    Year,
    /// Alphabetically by title
    Title,
    /// By format name
    Format,
}

impl ArtistReleaseSort {
    /// Query parameter value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Title => "title",
            Self::Format => "format",
        }
    }
}

/// Whose releases to list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseTarget {
    /// Releases on a label
    Label(u64),
    /// Releases and masters of an artist
    Artist {
        /// Artist id
        id: u64,
        /// Optional sort key
        sort: Option<ArtistReleaseSort>,
        /// Sort direction, used with `sort`
        order: SortOrder,
    },
}

/// A release listing query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseQuery {
    /// Listing to page through
    pub target: ReleaseTarget,
    /// Items per page
    pub per_page: u32,
}

impl ReleaseQuery {
    /// Releases of a label
    pub fn label(id: u64) -> Self {
        Self {
            target: ReleaseTarget::Label(id),
            per_page: DEFAULT_PER_PAGE,
        }
    }

    /// Releases of an artist
    pub fn artist(id: u64) -> Self {
        Self {
            target: ReleaseTarget::Artist {
                id,
                sort: None,
                order: SortOrder::default(),
            },
            per_page: DEFAULT_PER_PAGE,
        }
    }

    /// Set the page size
    #[must_use]
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Sort an artist listing; no effect on label listings
    #[must_use]
    pub fn sorted_by(mut self, key: ArtistReleaseSort, direction: SortOrder) -> Self {
        if let ReleaseTarget::Artist { sort, order, .. } = &mut self.target {
            *sort = Some(key);
            *order = direction;
        }
        self
    }

    /// API path of the listing
    pub fn path(&self) -> String {
        match &self.target {
            ReleaseTarget::Label(id) => format!("/labels/{id}/releases"),
            ReleaseTarget::Artist { id, .. } => format!("/artists/{id}/releases"),
        }
    }
}

impl PagedQuery for ReleaseQuery {
    fn per_page(&self) -> u32 {
        self.per_page
    }
}

// ============================================================================
// Serde helpers
// ============================================================================

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.none_if_empty())
}

fn zero_as_none<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.filter(|year| *year != 0))
}
