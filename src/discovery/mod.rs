//! Restaurant discovery: rating aggregation, the filter/sort engine behind the
//! explore page, slugs and the detail page gallery.
//!
//! Everything here is a pure function of the restaurant and review
//! collections handed in; nothing is cached between calls.

pub mod aggregate;
pub mod filter;
pub mod gallery;
pub mod slug;

pub use aggregate::{
    RatingIndex, RatingSummary, average_rating, display_rating, review_count, summarize,
};
pub use filter::{AreaFilter, MinRating, SortKey, ViewQuery, cards, unique_areas, view};
pub use gallery::{Gallery, GalleryView, PLACEHOLDER_IMAGE};
pub use slug::{find_by_slug, slugify};
