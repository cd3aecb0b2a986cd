use crate::app::AppState;
use crate::handlers::{
    answer_question, get_attraction, get_city, get_itinerary, health_check, list_cities,
    list_city_itineraries, not_found,
};
use axum::{Router, routing::get, routing::post};

/// Creates and configures all application routes
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(answer_question))
        .route("/health", get(health_check))
        .route("/api/cities", get(list_cities))
        .route("/api/cities/{city_id}", get(get_city))
        .route("/api/cities/{city_id}/itineraries", get(list_city_itineraries))
        .route(
            "/api/cities/{city_id}/attractions/{attraction_id}",
            get(get_attraction),
        )
        .route("/api/itineraries/{itinerary_id}", get(get_itinerary))
        .fallback(not_found)
}
