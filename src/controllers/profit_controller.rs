use axum::{extract::State, http::StatusCode, response::Response};

use crate::{
    error::ApiResult,
    services::profit_service::{self, NetProfitReport},
    AppState,
};

use super::respond;

pub async fn get_net_profit(State(state): State<AppState>) -> ApiResult<Response> {
    let profit = profit_service::net_profit(&state).await?;
    Ok(respond(
        StatusCode::OK,
        "Net profit calculated successfully",
        "data",
        NetProfitReport::from(&profit),
    ))
}
