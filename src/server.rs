//! HTTP presentation layer for the segmentation demo.
//!
//! Serves the single demo page, the banner asset, and the prediction
//! endpoint the page's Predict button calls.

use crate::error::Error;
use crate::metrics::PredictionMetrics;
use crate::models::inference::InferenceEngine;
use crate::types::patient::PatientRecord;
use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared state handed to every request handler
pub struct AppState {
    pub engine: Arc<InferenceEngine>,
    pub metrics: Arc<PredictionMetrics>,
    banner: Option<Vec<u8>>,
}

impl AppState {
    /// Build state, reading the banner image from disk. A missing banner is
    /// tolerated; the page hides the slot.
    pub fn new<P: AsRef<Path>>(
        engine: Arc<InferenceEngine>,
        metrics: Arc<PredictionMetrics>,
        banner_path: P,
    ) -> Self {
        let banner_path = banner_path.as_ref();
        let banner = match std::fs::read(banner_path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(path = %banner_path.display(), error = %e, "Banner image not available");
                None
            }
        };

        Self {
            engine,
            metrics,
            banner,
        }
    }

    pub fn without_banner(engine: Arc<InferenceEngine>, metrics: Arc<PredictionMetrics>) -> Self {
        Self {
            engine,
            metrics,
            banner: None,
        }
    }
}

pub struct DemoServer;

impl DemoServer {
    /// Run the HTTP server until shutdown.
    pub async fn start(state: Arc<AppState>, host: &str, port: u16) -> std::io::Result<()> {
        info!(host = %host, port = port, "Starting demo server");

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(state.clone()))
                .configure(configure)
        })
        .bind((host, port))?
        .run()
        .await
    }
}

/// Route table, shared between the server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/assets/banner", web::get().to(banner))
        .route("/api/predict", web::post().to(predict));
}

async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}

async fn banner(state: web::Data<Arc<AppState>>) -> HttpResponse {
    match &state.banner {
        Some(bytes) => HttpResponse::Ok()
            .content_type("image/jpeg")
            .body(bytes.clone()),
        None => HttpResponse::NotFound().finish(),
    }
}

/// One Predict action: validate, snapshot, run inference once, respond.
async fn predict(
    state: web::Data<Arc<AppState>>,
    req: web::Json<PatientRecord>,
) -> ActixResult<HttpResponse> {
    let patient = req.into_inner();
    let started = Instant::now();

    if let Err(e) = patient.validate() {
        state.metrics.record_failure();
        warn!(error = %e, "Rejected prediction request");
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": e.to_string()
        })));
    }

    let result = state
        .engine
        .predict(&patient)
        .and_then(|outcome| outcome.to_prediction(&patient));

    match result {
        Ok(prediction) => {
            let processing_time = started.elapsed();
            state
                .metrics
                .record_prediction(processing_time, prediction.cluster);

            info!(
                prediction_id = %prediction.prediction_id,
                cluster = prediction.cluster,
                label = %prediction.label,
                processing_time_us = processing_time.as_micros(),
                "Prediction served"
            );

            Ok(HttpResponse::Ok().json(prediction))
        }
        Err(e) => {
            state.metrics.record_failure();
            error!(error = %e, "Prediction failed");

            let status = match e {
                Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };

            Ok(HttpResponse::build(status).json(serde_json::json!({
                "error": e.to_string()
            })))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{fake_engine, store_with, FailingClassifier};
    use actix_web::test;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::without_banner(
            Arc::new(fake_engine()),
            Arc::new(PredictionMetrics::new()),
        ))
    }

    fn failing_state() -> Arc<AppState> {
        let engine = InferenceEngine::new(Arc::new(store_with(Arc::new(FailingClassifier))));
        Arc::new(AppState::without_banner(
            Arc::new(engine),
            Arc::new(PredictionMetrics::new()),
        ))
    }

    macro_rules! test_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_predict_round_trip() {
        let app = test_app!(test_state());

        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(serde_json::json!({
                "age": 45,
                "stay_days": 3,
                "billing_amount": 2500.0,
                "admission": "ER",
                "test_result": "Negative"
            }))
            .to_request();

        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["cluster"], 2);
        assert_eq!(body["label"], "Diagnostics_Monitoring");
        assert_eq!(body["inputs"]["age"], 45);
        assert_eq!(body["inputs"]["admission"], "ER");
        assert_eq!(body["attributions"].as_array().unwrap().len(), 7);
        assert_eq!(body["feature_names"][3], "Adm_ICU");
    }

    #[actix_web::test]
    async fn test_predict_rejects_out_of_range_age() {
        let app = test_app!(test_state());

        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(serde_json::json!({
                "age": 121,
                "stay_days": 3,
                "billing_amount": 2500.0,
                "admission": "ER",
                "test_result": "Negative"
            }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_predict_rejects_unknown_category() {
        let app = test_app!(test_state());

        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(serde_json::json!({
                "age": 45,
                "stay_days": 3,
                "billing_amount": 2500.0,
                "admission": "WARD",
                "test_result": "Negative"
            }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_predict_surfaces_inference_failure() {
        let app = test_app!(failing_state());

        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(serde_json::json!({
                "age": 45,
                "stay_days": 3,
                "billing_amount": 2500.0,
                "admission": "ER",
                "test_result": "Negative"
            }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("Inference"));
    }

    #[actix_web::test]
    async fn test_index_serves_page() {
        let app = test_app!(test_state());

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = test::read_body(resp).await;
        let html = std::str::from_utf8(&body).unwrap();
        assert!(html.contains("Patient Segmentation"));
    }

    #[actix_web::test]
    async fn test_missing_banner_is_not_found() {
        let app = test_app!(test_state());

        let req = test::TestRequest::get().uri("/assets/banner").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
