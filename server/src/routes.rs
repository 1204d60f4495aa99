use std::{path::Path, sync::Arc};

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};

use roster::{
    communities::Community,
    loader::load_all,
    store::{communities_of, fetch_eligible, fetch_registrations, register_address},
    utils::normalize_address,
};

use crate::{
    error::AppError,
    prices::{
        DEFAULT_HISTORY_LIMIT, HISTORY_CAP, PricePoint, fetch_latest_price, fetch_price_history,
        store_price,
    },
    state::AppState,
};

#[derive(Deserialize)]
pub struct AddressParams {
    address: Option<String>,
}

#[derive(Deserialize)]
pub struct CommunityParams {
    community: Option<String>,
}

#[derive(Deserialize)]
pub struct RegistrationPayload {
    address: Option<String>,
    community: Option<String>,
}

#[derive(Deserialize)]
pub struct PricePayload {
    price: Option<f64>,
    timestamp: Option<i64>,
}

#[derive(Deserialize)]
pub struct HistoryParams {
    limit: Option<usize>,
}

/// Which communities an address is eligible for. An address on no roster
/// answers with an empty list, never an error.
pub async fn get_address_communities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AddressParams>,
) -> Result<impl IntoResponse, AppError> {
    let raw = params.address.ok_or(AppError::MissingField("address"))?;
    let address = normalize_address(&raw).ok_or(AppError::InvalidAddress)?;

    let mut conn = state.clawback_connection.clone();
    let communities = communities_of(&mut conn, &address).await?;

    Ok(Json(json!({ "address": address, "communities": communities })))
}

/// The stored roster for one community. `loaded` distinguishes "never
/// loaded" from "loaded but empty".
pub async fn get_eligible_addresses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CommunityParams>,
) -> Result<impl IntoResponse, AppError> {
    let raw = params.community.ok_or(AppError::MissingField("community"))?;
    let community: Community = raw.parse()?;

    let mut conn = state.clawback_connection.clone();
    let stored = fetch_eligible(&mut conn, community).await?;
    let loaded = stored.is_some();

    Ok(Json(json!({
        "addresses": stored.unwrap_or_default(),
        "loaded": loaded,
    })))
}

/// Re-run the eligibility loader from the configured roster directory,
/// rebuilding the derived address index as well.
pub async fn set_address_communities(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = state.clawback_connection.clone();
    let summary = load_all(&mut conn, Path::new(&state.config.roster_dir), true).await?;

    Ok(Json(json!({
        "message": format!(
            "Loaded {} addresses across {} communities ({} skipped, {} lines discarded)",
            summary.addresses_loaded,
            summary.communities_loaded,
            summary.skipped.len(),
            summary.discarded,
        )
    })))
}

/// The full clawback record, every known community present, absent sets
/// rendered as empty arrays.
pub async fn get_clawback_registration(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = state.clawback_connection.clone();
    let record = fetch_registrations(&mut conn).await?;

    let mut body = serde_json::Map::new();
    for community in Community::ALL {
        body.insert(community.to_string(), json!(record.addresses(community)));
    }

    Ok(Json(Value::Object(body)))
}

pub async fn clawback_registration(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegistrationPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(|_| AppError::MalformedPayload)?;

    let raw = payload.address.ok_or(AppError::MissingField("address"))?;
    let address = normalize_address(&raw).ok_or(AppError::InvalidAddress)?;
    let community: Community = payload
        .community
        .ok_or(AppError::MissingField("community"))?
        .parse()?;

    let mut conn = state.clawback_connection.clone();
    register_address(&mut conn, community, &address).await?;

    Ok(Json(json!({ "message": "Address registered successfully" })))
}

/// Community-less variant kept for older terminal builds: the target
/// community is the first roster that lists the address.
pub async fn set_clawback_registration(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegistrationPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(|_| AppError::MalformedPayload)?;

    let raw = payload.address.ok_or(AppError::MissingField("address"))?;
    let address = normalize_address(&raw).ok_or(AppError::InvalidAddress)?;

    let mut conn = state.clawback_connection.clone();
    let community = communities_of(&mut conn, &address)
        .await?
        .into_iter()
        .next()
        .ok_or(AppError::NotEligible)?;

    register_address(&mut conn, community, &address).await?;

    Ok(Json(json!({ "message": "Address registered successfully" })))
}

pub async fn list_all_communities() -> impl IntoResponse {
    Json(json!({ "communities": Community::ALL }))
}

pub async fn get_price(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let mut conn = state.prices_connection.clone();
    let point = fetch_latest_price(&mut conn)
        .await?
        .ok_or(AppError::NoPriceData)?;

    Ok(Json(point))
}

pub async fn set_price(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PricePayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(|_| AppError::MalformedPayload)?;

    let price = payload.price.ok_or(AppError::MissingField("price"))?;
    let timestamp = payload
        .timestamp
        .ok_or(AppError::MissingField("timestamp"))?;

    let point = PricePoint::checked(price, timestamp).ok_or(AppError::InvalidPrice)?;

    let mut conn = state.prices_connection.clone();
    store_price(&mut conn, &point).await?;

    Ok(Json(json!({ "message": "Price recorded" })))
}

pub async fn get_price_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).min(HISTORY_CAP);

    let mut conn = state.prices_connection.clone();
    let prices = fetch_price_history(&mut conn, limit).await?;

    Ok(Json(json!({ "prices": prices })))
}

pub async fn unknown_route() -> AppError {
    AppError::UnknownRoute
}

pub async fn wrong_method() -> AppError {
    AppError::MethodNotAllowed
}
