//! Discogs database API client
//!
//! Implements [`PageSource`](crate::collection::PageSource) for label and
//! artist release listings and fetches label details.
//!
//! Endpoints used:
//! - `GET /labels/{id}`
//! - `GET /labels/{id}/releases?page=N&per_page=M`
//! - `GET /artists/{id}/releases?page=N&per_page=M[&sort=..&sort_order=..]`

mod client;
mod models;

pub use client::{DiscogsClient, DEFAULT_BASE_URL};
pub use models::{
    ArtistReleaseSort, Image, Label, LabelRef, Release, ReleaseQuery, ReleaseTarget,
    DEFAULT_PER_PAGE,
};
