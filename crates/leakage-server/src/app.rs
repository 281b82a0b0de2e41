//! Router assembly: routes, CORS and request tracing.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderValue, Request, Response};
use axum::routing::{get, post};
use axum::Router;
use leakage_config::CorsOrigins;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::handlers;
use crate::state::ServerState;

pub const API_PREFIX: &str = "/api/v1";

pub fn router(state: Arc<ServerState>) -> Router {
    let cors = cors_layer(&state.settings.cors_origins);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let api = Router::new()
        .route("/predict", post(handlers::predict::predict))
        .layer(trace_layer)
        .route("/healthz", get(handlers::healthz));

    Router::new()
        .nest(API_PREFIX, api)
        .layer(cors)
        .with_state(state)
}

/// Credentials are only allowed for an explicit origin list; wildcards cannot carry them.
fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    match origins {
        CorsOrigins::Any => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("Ignoring invalid CORS origin {:?}", origin);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(values))
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use leakage_config::Settings;
    use leakage_core::{ClaimsRequest, ModelError, ModelType, Prediction};
    use tower::ServiceExt;

    use crate::dto::{HealthCheckResponse, PredictResponse};
    use crate::services::model::{tests::trained_artifact, BaselineModel, ClaimsModel, ForestModel};

    struct FailingModel;

    impl ClaimsModel for FailingModel {
        fn version(&self) -> &str {
            "broken"
        }

        fn predict(&self, _claims: &[ClaimsRequest]) -> Result<Vec<Prediction>, ModelError> {
            Err(ModelError::MissingFeature("vet_visits".into()))
        }
    }

    fn app(model: Arc<dyn ClaimsModel>) -> Router {
        router(Arc::new(ServerState::new(model, Settings::default())))
    }

    fn predict_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/predict")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(res: Response<Body>) -> T {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_healthz_reports_version() {
        let res = app(Arc::new(BaselineModel))
            .oneshot(Request::get("/api/v1/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let health: HealthCheckResponse = body_json(res).await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.model_version, "v1");
    }

    #[tokio::test]
    async fn test_predict_one_per_claim() {
        let model = Arc::new(ForestModel::new(trained_artifact(ModelType::ClaimsLeakage)));
        let body = r#"{"claims": [
            {"id_loss": 11, "claim_amount": 1500.0, "pet_species": "cat", "pet_breed": "siamese"},
            {"id_loss": 12},
            {"id_loss": 13, "pet_breed": "axolotl"}
        ]}"#;
        let res = app(model).oneshot(predict_request(body)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let out: PredictResponse = body_json(res).await;
        assert_eq!(out.predictions.len(), 3);
        assert_eq!(
            out.predictions.iter().map(|p| p.id_loss).collect::<Vec<_>>(),
            vec![11, 12, 13]
        );
        assert!(out
            .predictions
            .iter()
            .all(|p| (0.0..=1.0).contains(&p.leakage_probability)));
    }

    #[tokio::test]
    async fn test_predict_empty_list() {
        let res = app(Arc::new(BaselineModel))
            .oneshot(predict_request(r#"{"claims": []}"#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let out: PredictResponse = body_json(res).await;
        assert!(out.predictions.is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_is_500_with_detail() {
        let res = app(Arc::new(FailingModel))
            .oneshot(predict_request(r#"{"claims": [{"id_loss": 1}]}"#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: serde_json::Value = body_json(res).await;
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.starts_with("model prediction failed with error"));
        assert!(detail.contains("vet_visits"));
    }

    #[tokio::test]
    async fn test_wrong_field_type_is_client_error() {
        let res = app(Arc::new(BaselineModel))
            .oneshot(predict_request(r#"{"claims": [{"claim_amount": "lots"}]}"#))
            .await
            .unwrap();
        assert!(res.status().is_client_error());
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let settings = Settings {
            cors_origins: CorsOrigins::List(vec!["https://claims.example.com".into()]),
            ..Settings::default()
        };
        let app = router(Arc::new(ServerState::new(Arc::new(BaselineModel), settings)));
        let req = Request::get("/api/v1/healthz")
            .header("origin", "https://claims.example.com")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(
            res.headers().get("access-control-allow-origin").unwrap(),
            "https://claims.example.com"
        );
        assert_eq!(res.headers().get("access-control-allow-credentials").unwrap(), "true");
    }

    #[tokio::test]
    async fn test_cors_preflight_with_credentials() {
        let settings = Settings {
            cors_origins: CorsOrigins::List(vec!["https://claims.example.com".into()]),
            ..Settings::default()
        };
        let app = router(Arc::new(ServerState::new(Arc::new(BaselineModel), settings)));
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/v1/predict")
            .header("origin", "https://claims.example.com")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();

        assert!(res.status().is_success());
        assert_eq!(res.headers().get("access-control-allow-credentials").unwrap(), "true");
        assert_eq!(res.headers().get("access-control-allow-methods").unwrap(), "POST");
    }

    #[tokio::test]
    async fn test_wildcard_cors_omits_credentials() {
        let req = Request::get("/api/v1/healthz")
            .header("origin", "https://anywhere.example.com")
            .body(Body::empty())
            .unwrap();
        let res = app(Arc::new(BaselineModel)).oneshot(req).await.unwrap();
        assert_eq!(res.headers().get("access-control-allow-origin").unwrap(), "*");
        assert!(res.headers().get("access-control-allow-credentials").is_none());
    }
}
