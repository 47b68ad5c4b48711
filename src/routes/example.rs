use axum::{routing::get, Json, Router};

use crate::models::ExampleResponse;
use crate::routes::endpoint;

pub const EXAMPLE_MESSAGE: &str = "This is /jupyter-fs/get-example endpoint!";

pub fn routes(base_url: &str) -> Router {
    Router::new().route(&endpoint(base_url, "get-example"), get(get_example))
}

async fn get_example() -> Json<ExampleResponse> {
    Json(ExampleResponse {
        data: EXAMPLE_MESSAGE.to_string(),
    })
}
