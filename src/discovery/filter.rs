use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    discovery::{aggregate::RatingIndex, slug::slugify},
    errors::AppError,
    models::{Restaurant, RestaurantCard, Review},
};

const ALL_AREAS: &str = "all";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Newest,
    Rating,
    Trending,
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(SortKey::Newest),
            "rating" => Ok(SortKey::Rating),
            "trending" => Ok(SortKey::Trending),
            other => Err(AppError::BadRequest(format!("Unknown sort key: {other}"))),
        }
    }
}

/// Minimum average rating a restaurant needs to stay in the view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MinRating {
    #[default]
    Any,
    One,
    Two,
    Three,
    Four,
    FourAndHalf,
}

impl MinRating {
    pub fn threshold(self) -> f64 {
        match self {
            MinRating::Any => 0.0,
            MinRating::One => 1.0,
            MinRating::Two => 2.0,
            MinRating::Three => 3.0,
            MinRating::Four => 4.0,
            MinRating::FourAndHalf => 4.5,
        }
    }
}

impl FromStr for MinRating {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" | "" => Ok(MinRating::Any),
            "1" => Ok(MinRating::One),
            "2" => Ok(MinRating::Two),
            "3" => Ok(MinRating::Three),
            "4" => Ok(MinRating::Four),
            "4.5" => Ok(MinRating::FourAndHalf),
            other => Err(AppError::BadRequest(format!(
                "Unsupported minimum rating: {other}"
            ))),
        }
    }
}

impl TryFrom<String> for MinRating {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MinRating> for String {
    fn from(value: MinRating) -> Self {
        value.to_string()
    }
}

impl fmt::Display for MinRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinRating::FourAndHalf => f.write_str("4.5"),
            other => write!(f, "{}", other.threshold() as u8),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AreaFilter {
    #[default]
    All,
    Only(String),
}

impl AreaFilter {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some(ALL_AREAS) | Some("") => AreaFilter::All,
            Some(area) => AreaFilter::Only(area.to_string()),
        }
    }

    pub fn matches(&self, area: Option<&str>) -> bool {
        match self {
            AreaFilter::All => true,
            AreaFilter::Only(wanted) => area == Some(wanted.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewQuery {
    pub query: String,
    pub area: AreaFilter,
    pub min_rating: MinRating,
    pub sort: SortKey,
}

impl ViewQuery {
    fn matches_text(&self, restaurant: &Restaurant) -> bool {
        if self.query.is_empty() {
            return true;
        }

        let needle = self.query.to_lowercase();
        restaurant.name.to_lowercase().contains(&needle)
            || restaurant
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }
}

/// Filters and orders `restaurants` for the listing page.
///
/// Text, area and rating predicates are ANDed. Sorting is stable, so ties
/// (including restaurants without reviews under `rating`/`trending`) keep
/// their input order. Inputs are left untouched.
pub fn view(restaurants: &[Restaurant], reviews: &[Review], query: &ViewQuery) -> Vec<Restaurant> {
    let index = RatingIndex::build(reviews);
    let threshold = query.min_rating.threshold();

    let mut filtered: Vec<Restaurant> = restaurants
        .iter()
        .filter(|r| query.matches_text(r))
        .filter(|r| query.area.matches(r.area.as_deref()))
        .filter(|r| index.get(r.id).average >= threshold)
        .cloned()
        .collect();

    filtered.sort_by(|a, b| match query.sort {
        SortKey::Newest => b.created_at.cmp(&a.created_at),
        SortKey::Rating => index
            .get(b.id)
            .average
            .partial_cmp(&index.get(a.id).average)
            .unwrap_or(Ordering::Equal),
        SortKey::Trending => index
            .get(b.id)
            .review_count
            .cmp(&index.get(a.id).review_count),
    });

    filtered
}

/// Attaches rating aggregates and slugs to an already computed view.
pub fn cards(restaurants: Vec<Restaurant>, reviews: &[Review]) -> Vec<RestaurantCard> {
    let index = RatingIndex::build(reviews);

    restaurants
        .into_iter()
        .map(|restaurant| {
            let summary = index.get(restaurant.id);
            RestaurantCard {
                slug: slugify(&restaurant.name),
                average_rating: summary.average,
                display_rating: summary.display(),
                review_count: summary.review_count,
                restaurant,
            }
        })
        .collect()
}

/// Distinct non-empty areas in the order they first appear.
pub fn unique_areas(restaurants: &[Restaurant]) -> Vec<String> {
    let mut areas: Vec<String> = Vec::new();

    for area in restaurants.iter().filter_map(|r| r.area.as_deref()) {
        if !area.is_empty() && !areas.iter().any(|a| a == area) {
            areas.push(area.to_string());
        }
    }

    areas
}
