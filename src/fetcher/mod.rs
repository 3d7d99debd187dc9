pub mod astronomy;
pub mod space_weather;
pub mod weather;

pub use astronomy::AstronomyFetcher;
pub use space_weather::SpaceWeatherFetcher;
pub use weather::WeatherFetcher;

use std::time::Duration;

use reqwest::header::CACHE_CONTROL;
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};

/// Longest upstream error body kept for the log line.
const MAX_ERROR_BODY: usize = 200;

pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// GET `url` with caching disabled and decode the JSON body as `T`.
/// Non-2xx responses become `AppError::Status` carrying the start of the body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<T> {
    let resp = client
        .get(url)
        .query(query)
        .header(CACHE_CONTROL, "no-cache")
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(AppError::Status {
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY).collect(),
        });
    }

    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}


#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Json, Router};

    #[tokio::test]
    async fn decodes_json_body() {
        let base = testing::serve(Router::new().route(
            "/data",
            get(|| async { Json(serde_json::json!({"value": 4})) }),
        ))
        .await;
        let v: serde_json::Value = get_json(&testing::client(), &format!("{base}/data"), &[])
            .await
            .unwrap();
        assert_eq!(v["value"], 4);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error_with_body() {
        let base = testing::serve(Router::new().route(
            "/data",
            get(|| async { (StatusCode::BAD_REQUEST, "unknown field moonphase") }),
        ))
        .await;
        let err = get_json::<serde_json::Value>(&testing::client(), &format!("{base}/data"), &[])
            .await
            .unwrap_err();
        match err {
            AppError::Status { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "unknown field moonphase");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_json_error() {
        let base = testing::serve(Router::new().route("/data", get(|| async { "<html>" }))).await;
        let err = get_json::<serde_json::Value>(&testing::client(), &format!("{base}/data"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Json(_)));
    }

    #[tokio::test]
    async fn closed_port_is_a_transport_error() {
        let base = testing::closed_port_url().await;
        let err = get_json::<serde_json::Value>(&testing::client(), &format!("{base}/data"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Http(_)));
    }

    #[tokio::test]
    async fn sends_query_and_no_cache_header() {
        let base = testing::serve(Router::new().route(
            "/echo",
            get(
                |axum::extract::RawQuery(q): axum::extract::RawQuery,
                 headers: axum::http::HeaderMap| async move {
                    Json(serde_json::json!({
                        "query": q,
                        "cache": headers.get("cache-control").and_then(|v| v.to_str().ok()),
                    }))
                },
            ),
        ))
        .await;
        let v: serde_json::Value = get_json(
            &testing::client(),
            &format!("{base}/echo"),
            &[("latitude", "-34.77".to_string()), ("timezone", "UTC".to_string())],
        )
        .await
        .unwrap();
        assert_eq!(v["query"], "latitude=-34.77&timezone=UTC");
        assert_eq!(v["cache"], "no-cache");
    }
}
