//! Payment intent routes.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/intent", post(create_intent))
}

#[derive(Debug, Deserialize)]
struct CreateIntentRequest {
    order_id: String,
}

#[derive(Debug, Serialize)]
struct CreateIntentResponse {
    client_secret: String,
}

/// Re-create a payment intent for a pending card order, for storefronts
/// that lost the client secret returned by checkout.
async fn create_intent(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CreateIntentRequest>,
) -> Result<Json<CreateIntentResponse>> {
    let client_secret = state
        .orders()
        .payment_intent(&body.order_id, &user.id)
        .await?;
    Ok(Json(CreateIntentResponse { client_secret }))
}
