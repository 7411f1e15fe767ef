use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    discovery::{
        self, AreaFilter, Gallery, GalleryView, MinRating, RatingSummary, SortKey, ViewQuery,
    },
    errors::AppError,
    models::{Restaurant, RestaurantCard, Review},
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExploreParams {
    pub query: String,
    pub area: Option<String>,
    pub min_rating: MinRating,
    pub sort: SortKey,
}

impl From<ExploreParams> for ViewQuery {
    fn from(params: ExploreParams) -> Self {
        ViewQuery {
            area: AreaFilter::parse(params.area.as_deref()),
            query: params.query,
            min_rating: params.min_rating,
            sort: params.sort,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreView {
    pub restaurants: Vec<RestaurantCard>,
    pub areas: Vec<String>,
    pub total: usize,
}

pub async fn explore_handler(
    State(state): State<AppState>,
    Query(params): Query<ExploreParams>,
) -> Result<Json<ExploreView>, AppError> {
    let (restaurants, reviews) =
        tokio::try_join!(state.store.list_restaurants(), state.store.list_reviews(None))
            .map_err(|e| {
                tracing::error!("Error fetching data: {}", e);
                e
            })?;

    let query = ViewQuery::from(params);
    let visible = discovery::view(&restaurants, &reviews, &query);
    let cards = discovery::cards(visible, &reviews);

    Ok(Json(ExploreView {
        total: cards.len(),
        restaurants: cards,
        areas: discovery::unique_areas(&restaurants),
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DetailParams {
    pub image: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantDetail {
    pub restaurant: Restaurant,
    pub rating: RatingSummary,
    pub display_rating: f64,
    pub reviews: Vec<Review>,
    pub gallery: GalleryView,
}

pub async fn restaurant_detail_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<DetailParams>,
) -> Result<Json<RestaurantDetail>, AppError> {
    let restaurants = state.store.list_restaurants().await.map_err(|e| {
        tracing::error!("Error fetching restaurant: {}", e);
        e
    })?;

    let restaurant = discovery::find_by_slug(&restaurants, &slug)
        .map_err(|e| {
            tracing::info!("Restaurant not found for slug {}", slug);
            e
        })?
        .clone();

    let reviews = state
        .store
        .list_reviews(Some(restaurant.id))
        .await
        .map_err(|e| {
            tracing::error!("Error fetching reviews for {}: {}", restaurant.id, e);
            e
        })?;

    let mut gallery = Gallery::new(restaurant.images());
    if let Some(index) = params.image {
        gallery.select(index)?;
    }

    let rating = RatingSummary::from_reviews(&reviews);

    Ok(Json(RestaurantDetail {
        display_rating: rating.display(),
        rating,
        reviews,
        gallery: GalleryView::from(&gallery),
        restaurant,
    }))
}
