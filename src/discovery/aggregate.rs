use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::models::Review;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// Unrounded mean, used for filtering and sorting.
    pub average: f64,
    pub review_count: usize,
}

impl RatingSummary {
    pub fn from_reviews<'a>(reviews: impl IntoIterator<Item = &'a Review>) -> Self {
        let mut review_count = 0;
        let mut rated = 0usize;
        let mut sum = 0i64;

        for review in reviews {
            review_count += 1;
            if let Some(stars) = review.stars() {
                rated += 1;
                sum += i64::from(stars);
            }
        }

        let average = if rated == 0 {
            0.0
        } else {
            sum as f64 / rated as f64
        };

        Self {
            average,
            review_count,
        }
    }

    /// Mean rounded to one decimal place, for display.
    pub fn display(&self) -> f64 {
        round_one_decimal(self.average)
    }
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Mean star rating of the reviews that belong to `restaurant_id`, or 0 when
/// there are none. Reviews without a rating are left out of the mean.
pub fn average_rating(restaurant_id: Uuid, reviews: &[Review]) -> f64 {
    summarize(restaurant_id, reviews).average
}

pub fn display_rating(restaurant_id: Uuid, reviews: &[Review]) -> f64 {
    summarize(restaurant_id, reviews).display()
}

pub fn review_count(restaurant_id: Uuid, reviews: &[Review]) -> usize {
    reviews
        .iter()
        .filter(|r| r.restaurant_id == Some(restaurant_id))
        .count()
}

pub fn summarize(restaurant_id: Uuid, reviews: &[Review]) -> RatingSummary {
    RatingSummary::from_reviews(
        reviews
            .iter()
            .filter(|r| r.restaurant_id == Some(restaurant_id)),
    )
}

/// Summaries for every restaurant in one pass over the review collection.
#[derive(Debug, Default)]
pub struct RatingIndex {
    summaries: HashMap<Uuid, RatingSummary>,
}

impl RatingIndex {
    pub fn build(reviews: &[Review]) -> Self {
        let mut grouped: HashMap<Uuid, Vec<&Review>> = HashMap::new();
        for review in reviews {
            if let Some(restaurant_id) = review.restaurant_id {
                grouped.entry(restaurant_id).or_default().push(review);
            }
        }

        let summaries = grouped
            .into_iter()
            .map(|(id, group)| (id, RatingSummary::from_reviews(group)))
            .collect();

        Self { summaries }
    }

    pub fn get(&self, restaurant_id: Uuid) -> RatingSummary {
        self.summaries
            .get(&restaurant_id)
            .copied()
            .unwrap_or_default()
    }
}
