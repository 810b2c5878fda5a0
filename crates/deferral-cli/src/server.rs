//! Intake HTTP server (warp).
//!
//! - `POST /<route>`: urlencoded form with `schedule_time`; 200 once queued,
//!   400 on a missing/malformed time
//! - `GET /pending`: JSON listing of waiting items
//! - `GET /health`: liveness

use std::convert::Infallible;
use std::sync::Arc;

use deferral_core::DeferralError;
use deferral_core::app::{Intake, PendingView};
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::{Filter, Rejection, Reply};

pub const MAX_FORM_BYTES: u64 = 64 * 1024;

pub fn routes(
    intake: Arc<Intake>,
    route: String,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let schedule = warp::post()
        .and(warp::path(route))
        .and(warp::path::end())
        .and(warp::body::content_length_limit(MAX_FORM_BYTES))
        .and(warp::body::bytes())
        .and(with_intake(Arc::clone(&intake)))
        .and_then(schedule_request);

    let pending = warp::get()
        .and(warp::path("pending"))
        .and(warp::path::end())
        .and(with_intake(intake))
        .and_then(list_pending);

    let health = warp::get()
        .and(warp::path("health"))
        .and(warp::path::end())
        .map(|| "ok");

    schedule.or(pending).or(health)
}

fn with_intake(
    intake: Arc<Intake>,
) -> impl Filter<Extract = (Arc<Intake>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&intake))
}

async fn schedule_request(
    body: Bytes,
    intake: Arc<Intake>,
) -> Result<warp::reply::Response, Infallible> {
    let result = match std::str::from_utf8(&body) {
        Ok(text) => intake.submit_form(text).await,
        Err(err) => Err(DeferralError::InvalidForm(err.to_string())),
    };

    let response = match result {
        Ok(_) => warp::reply::with_status("Request scheduled successfully\n", StatusCode::OK)
            .into_response(),
        Err(err) if err.is_client_error() => {
            warn!(error = %err, "rejected schedule request");
            warp::reply::with_status(client_message(&err), StatusCode::BAD_REQUEST).into_response()
        }
        Err(err) => {
            error!(error = %err, "could not schedule request");
            warp::reply::with_status("Internal Server Error\n", StatusCode::INTERNAL_SERVER_ERROR)
                .into_response()
        }
    };
    Ok(response)
}

fn client_message(err: &DeferralError) -> &'static str {
    match err {
        DeferralError::InvalidForm(_) => "Invalid form body\n",
        _ => "Invalid schedule time\n",
    }
}

async fn list_pending(intake: Arc<Intake>) -> Result<impl Reply, Infallible> {
    let view = PendingView::collect(intake.store()).await;
    Ok(warp::reply::json(&view))
}
