use crate::auth::AuthenticatedPrincipal;
use crate::error::AppError;
use crate::models::{BidResponse, PlaceBidRequest};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use types::ids::AuctionId;
use uuid::Uuid;

pub async fn place_bid(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(id): Path<Uuid>,
    Json(payload): Json<PlaceBidRequest>,
) -> Result<(StatusCode, Json<BidResponse>), AppError> {
    state
        .rate_limiter
        .check_rate_limit(&format!("{}:place_bid", principal.id), 20, 5.0)?;

    // The bidder identity is the resolved principal; a bidder id in
    // the payload would not be trusted and is not even accepted.
    let bid = state
        .admission
        .place_bid(
            &principal,
            AuctionId::from_uuid(id),
            payload.amount,
            payload.is_auto_bid,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(BidResponse::from(bid))))
}
