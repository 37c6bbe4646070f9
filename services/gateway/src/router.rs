use crate::handlers::{auction, bid, ws};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/auctions", post(auction::create_auction))
        .route("/auctions/{id}", get(auction::get_auction))
        .route("/auctions/{id}/schedule", post(auction::schedule_auction))
        .route("/auctions/{id}/activate", post(auction::activate_auction))
        .route("/auctions/{id}/end", post(auction::end_auction))
        .route("/auctions/{id}/cancel", post(auction::cancel_auction))
        .route(
            "/auctions/{id}/bids",
            get(auction::list_bids).post(bid::place_bid),
        )
        .route("/ws", get(ws::ws_handler));

    Router::new()
        .nest("/v1", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
