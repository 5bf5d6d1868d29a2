//! Archive listing resolution.
//!
//! An archive is one of the three ways products are grouped for listing
//! pages: by artist, by physical format, or by free-form tag. Each dimension
//! maps to a single backend catalog search; the artist dimension runs
//! against the curated archive backend and additionally constrains results
//! to products catalogued under the artist as primary (configurable), while
//! format and tag are plain filters against the shop backend.

use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::{instrument, warn};

use crate::commerce::types::{CatalogQuery, Product};
use crate::commerce::{CatalogSource, CommerceError};

/// Products per archive page. Fixed per archive type, never client-supplied.
pub const ARCHIVE_PAGE_SIZE: u32 = 48;

// =============================================================================
// Query types
// =============================================================================

/// The three archive groupings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveDimension {
    Artist,
    Format,
    Tag,
}

impl ArchiveDimension {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Format => "format",
            Self::Tag => "tag",
        }
    }
}

impl FromStr for ArchiveDimension {
    type Err = UnknownDimension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "artist" => Ok(Self::Artist),
            "format" => Ok(Self::Format),
            "tag" => Ok(Self::Tag),
            other => Err(UnknownDimension(other.to_string())),
        }
    }
}

impl std::fmt::Display for ArchiveDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Path segment that names no archive dimension.
#[derive(Debug, thiserror::Error)]
#[error("unknown archive dimension: {0}")]
pub struct UnknownDimension(pub String);

/// Sort order for archive listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Most recent first. The default, and the fallback for unknown input.
    #[default]
    Latest,
    PriceAsc,
    PriceDesc,
    TitleAsc,
    TitleDesc,
    ArtistAsc,
    ArtistDesc,
}

impl SortKey {
    /// Parse a caller-supplied sort parameter; unknown or missing input
    /// falls back to [`SortKey::Latest`].
    #[must_use]
    pub fn parse(input: Option<&str>) -> Self {
        match input {
            Some("price-asc") => Self::PriceAsc,
            Some("price-desc") => Self::PriceDesc,
            Some("title-asc") => Self::TitleAsc,
            Some("title-desc") => Self::TitleDesc,
            Some("artist-asc") => Self::ArtistAsc,
            Some("artist-desc") => Self::ArtistDesc,
            _ => Self::Latest,
        }
    }

    /// Backend sort field and direction.
    #[must_use]
    pub const fn wire(self) -> (&'static str, bool) {
        match self {
            Self::Latest => ("created", true),
            Self::PriceAsc => ("price", false),
            Self::PriceDesc => ("price", true),
            Self::TitleAsc => ("title", false),
            Self::TitleDesc => ("title", true),
            Self::ArtistAsc => ("artist", false),
            Self::ArtistDesc => ("artist", true),
        }
    }
}

/// A fully specified archive page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveQuery {
    pub dimension: ArchiveDimension,
    pub slug: String,
    /// 1-indexed; values below 1 are treated as 1.
    pub page: u32,
    pub sort: SortKey,
}

/// One resolved archive page.
///
/// `degraded` is set when the backend failed and the page is an empty
/// placeholder; callers render a "nothing found" state instead of a 500.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArchivePage {
    pub products: Vec<Product>,
    pub total_count: u64,
    pub has_next_page: bool,
    pub degraded: bool,
}

impl ArchivePage {
    fn empty() -> Self {
        Self::default()
    }

    fn degraded() -> Self {
        Self {
            degraded: true,
            ..Self::default()
        }
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Resolves archive queries against the backend that owns each dimension.
#[derive(Clone)]
pub struct ArchiveResolver {
    /// Shop backend: owns the format and tag dimensions.
    shop: Arc<dyn CatalogSource>,
    /// Curated archive backend: owns the artist dimension.
    archive: Arc<dyn CatalogSource>,
    /// Artist pages list the curated subset (primary-artist products) rather
    /// than everything tagged with the artist. The exact rule is backend-
    /// defined, so it stays a configuration knob.
    artist_primary_only: bool,
}

impl ArchiveResolver {
    #[must_use]
    pub fn new(
        shop: Arc<dyn CatalogSource>,
        archive: Arc<dyn CatalogSource>,
        artist_primary_only: bool,
    ) -> Self {
        Self {
            shop,
            archive,
            artist_primary_only,
        }
    }

    /// Resolve one archive page.
    ///
    /// Never fails: a backend error yields an empty degraded page, an
    /// unknown slug yields an empty page, and a page past the end of the
    /// listing yields an empty page with `has_next_page: false`.
    #[instrument(skip(self), fields(dimension = %query.dimension, slug = %query.slug))]
    pub async fn resolve(&self, query: &ArchiveQuery) -> ArchivePage {
        let page = query.page.max(1);
        let catalog_query = self.build_query(query, page);

        match self.source_for(query.dimension).product_page(&catalog_query).await {
            Ok(result) => {
                // Pagination metadata is derived here so a page past the end
                // is a well-formed empty page whatever the backend reported.
                let has_next_page =
                    u64::from(page) * u64::from(ARCHIVE_PAGE_SIZE) < result.total_count;
                ArchivePage {
                    products: result.products,
                    total_count: result.total_count,
                    has_next_page,
                    degraded: false,
                }
            }
            // Unknown slug: a valid empty listing, not an error.
            Err(CommerceError::NotFound(_)) => ArchivePage::empty(),
            Err(e) => {
                warn!(error = %e, "archive resolution failed, serving degraded page");
                ArchivePage::degraded()
            }
        }
    }

    fn source_for(&self, dimension: ArchiveDimension) -> &dyn CatalogSource {
        match dimension {
            ArchiveDimension::Artist => self.archive.as_ref(),
            ArchiveDimension::Format | ArchiveDimension::Tag => self.shop.as_ref(),
        }
    }

    fn build_query(&self, query: &ArchiveQuery, page: u32) -> CatalogQuery {
        let (sort, reverse) = query.sort.wire();
        let slug = &query.slug;

        let (filter, primary_only) = match query.dimension {
            ArchiveDimension::Artist => {
                (format!("artist:\"{slug}\""), self.artist_primary_only)
            }
            ArchiveDimension::Format => (format!("format:\"{slug}\""), false),
            ArchiveDimension::Tag => (format!("tag:\"{slug}\""), false),
        };

        CatalogQuery {
            filter,
            primary_only,
            sort,
            reverse,
            page,
            per_page: ARCHIVE_PAGE_SIZE,
        }
    }
}
