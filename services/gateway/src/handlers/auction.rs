use crate::auth::AuthenticatedPrincipal;
use crate::error::AppError;
use crate::models::{
    ActivateRequest, AuctionResponse, CancelRequest, CreateAuctionRequest, PageQuery,
};
use crate::state::AppState;
use auction_engine::{AuctionStore, BidView, CreateAuction};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use types::ids::AuctionId;
use uuid::Uuid;

pub async fn create_auction(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Json(payload): Json<CreateAuctionRequest>,
) -> Result<(StatusCode, Json<AuctionResponse>), AppError> {
    state
        .rate_limiter
        .check_rate_limit(&format!("{}:auction_create", principal.id), 10, 1.0)?;

    let auction = state
        .lifecycle
        .create(
            &principal,
            CreateAuction {
                title: payload.title,
                description: payload.description,
                starting_price: payload.starting_price,
                reserve_price: payload.reserve_price,
                bid_increment: payload.bid_increment,
                start_time: payload.start_time,
                end_time: payload.end_time,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuctionResponse::for_viewer(auction, &principal)),
    ))
}

pub async fn get_auction(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Json<AuctionResponse>, AppError> {
    let auction_id = AuctionId::from_uuid(id);
    let auction = state
        .store
        .read(auction_id)
        .await
        .map_err(|e| AppError::ServiceUnavailable(e.to_string()))?
        .ok_or_else(|| AppError::NotFound(format!("auction not found: {}", auction_id)))?;

    Ok(Json(AuctionResponse::for_viewer(auction, &principal)))
}

pub async fn schedule_auction(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Json<AuctionResponse>, AppError> {
    let auction = state
        .lifecycle
        .schedule(&principal, AuctionId::from_uuid(id))
        .await?;
    Ok(Json(AuctionResponse::for_viewer(auction, &principal)))
}

pub async fn activate_auction(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
    payload: Option<Json<ActivateRequest>>,
) -> Result<Json<AuctionResponse>, AppError> {
    let override_start = payload.map(|Json(p)| p.override_start).unwrap_or(false);
    let auction = state
        .lifecycle
        .activate(&principal, AuctionId::from_uuid(id), override_start)
        .await?;
    Ok(Json(AuctionResponse::for_viewer(auction, &principal)))
}

pub async fn end_auction(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
) -> Result<Json<AuctionResponse>, AppError> {
    let auction = state
        .lifecycle
        .end(&principal, AuctionId::from_uuid(id))
        .await?;
    Ok(Json(AuctionResponse::for_viewer(auction, &principal)))
}

pub async fn cancel_auction(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelRequest>,
) -> Result<Json<AuctionResponse>, AppError> {
    let auction = state
        .lifecycle
        .cancel(&principal, AuctionId::from_uuid(id), payload.reason)
        .await?;
    Ok(Json(AuctionResponse::for_viewer(auction, &principal)))
}

pub async fn list_bids(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<BidView>>, AppError> {
    state
        .rate_limiter
        .check_rate_limit(&format!("{}:bid_query", principal.id), 60, 10.0)?;

    let views = state
        .admission
        .bids_for_auction(AuctionId::from_uuid(id), query.page, query.limit)
        .await?;
    Ok(Json(views))
}
