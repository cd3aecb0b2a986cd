use crate::app::AppState;
use crate::catalog::{City, Itinerary};
use crate::error::{AppError, AppResult};
use crate::models::{
    AnswerResponse, AttractionDetail, HealthResponse, ItineraryDetail, QuestionRequest,
};
use axum::{
    extract::{Json, Path, State, rejection::JsonRejection},
    response::Json as ResponseJson,
};
use tracing::{debug, info};

/// Health check handler
/// Returns the service status and health information
pub async fn health_check() -> AppResult<ResponseJson<HealthResponse>> {
    debug!("Health check endpoint called");

    let response = HealthResponse::ok();

    info!("Health check successful");
    Ok(ResponseJson(response))
}

/// Question handler: relays one visitor question about one attraction to
/// the answer model. Undecodable bodies are reported like missing fields.
pub async fn answer_question(
    State(state): State<AppState>,
    payload: Result<Json<QuestionRequest>, JsonRejection>,
) -> AppResult<ResponseJson<AnswerResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        AppError::InvalidInput(format!(
            "요청 본문을 해석할 수 없습니다: {}",
            rejection.body_text()
        ))
    })?;

    info!(
        "Question endpoint called: {} chars of question, {} chars of context",
        request.question.chars().count(),
        request.context.chars().count()
    );

    let response = state.proxy.answer(&request).await?;
    Ok(ResponseJson(response))
}

/// Home screen: every city in authored order.
pub async fn list_cities(State(state): State<AppState>) -> ResponseJson<&'static [City]> {
    ResponseJson(state.catalog.cities())
}

/// City screen.
pub async fn get_city(
    State(state): State<AppState>,
    Path(city_id): Path<String>,
) -> AppResult<ResponseJson<&'static City>> {
    state
        .catalog
        .city(&city_id)
        .map(ResponseJson)
        .ok_or_else(|| AppError::NotFound(format!("도시를 찾을 수 없습니다: {city_id}")))
}

/// Home screen tab: the courses of the selected city.
pub async fn list_city_itineraries(
    State(state): State<AppState>,
    Path(city_id): Path<String>,
) -> AppResult<ResponseJson<Vec<&'static Itinerary>>> {
    let catalog = state.catalog;
    if catalog.city(&city_id).is_none() {
        return Err(AppError::NotFound(format!(
            "도시를 찾을 수 없습니다: {city_id}"
        )));
    }
    Ok(ResponseJson(catalog.itineraries_for_city(&city_id).collect()))
}

/// Itinerary screen: the course with its stops in visiting order.
pub async fn get_itinerary(
    State(state): State<AppState>,
    Path(itinerary_id): Path<String>,
) -> AppResult<ResponseJson<ItineraryDetail<'static>>> {
    let catalog = state.catalog;
    let itinerary = catalog
        .itinerary(&itinerary_id)
        .ok_or_else(|| AppError::NotFound(format!("코스를 찾을 수 없습니다: {itinerary_id}")))?;

    Ok(ResponseJson(ItineraryDetail {
        itinerary,
        stops: catalog.itinerary_stops(itinerary),
    }))
}

/// One attraction with its question context and recommended courses.
pub async fn get_attraction(
    State(state): State<AppState>,
    Path((city_id, attraction_id)): Path<(String, String)>,
) -> AppResult<ResponseJson<AttractionDetail<'static>>> {
    let catalog = state.catalog;
    let attraction = catalog.attraction(&city_id, &attraction_id).ok_or_else(|| {
        AppError::NotFound(format!("명소를 찾을 수 없습니다: {city_id}/{attraction_id}"))
    })?;

    Ok(ResponseJson(AttractionDetail {
        attraction,
        context: attraction.context_string(),
        itineraries: catalog.itineraries_including(&attraction.id).collect(),
    }))
}

/// Anything unrouted.
pub async fn not_found() -> AppError {
    AppError::NotFound("요청한 경로를 찾을 수 없습니다.".to_string())
}
