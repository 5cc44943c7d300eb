use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use prometheus::{Encoder, Registry, TextEncoder};

use crate::actors::OrderWriterHandle;

// ============================================================================
// Metrics Server - Prometheus exposition and readiness probe
// ============================================================================

#[derive(Clone)]
pub struct ServerState {
    pub registry: Registry,
    pub orders: OrderWriterHandle,
}

fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/metrics", web::get().to(metrics_handler))
        .route("/health", web::get().to(health_handler));
}

/// Serve `/metrics` and `/health` until the server is stopped.
///
/// Must run inside an actix system, e.g. on a dedicated thread driven by
/// `actix_web::rt::System::new().block_on(..)`.
pub async fn start_metrics_server(state: ServerState, port: u16) -> std::io::Result<()> {
    tracing::info!("📊 Starting metrics server on http://0.0.0.0:{}/metrics", port);

    let data = web::Data::new(state);
    HttpServer::new(move || App::new().app_data(data.clone()).configure(configure))
        .bind(("0.0.0.0", port))?
        .run()
        .await
}

async fn metrics_handler(state: web::Data<ServerState>) -> impl Responder {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&state.registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

async fn health_handler(state: web::Data<ServerState>) -> impl Responder {
    match state.orders.ensure_storage().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "service": "storefront-orders"
        })),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "service": "storefront-orders",
                "error": e.to_string()
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;
    use crate::notifications::NotificationDispatcher;
    use crate::service::OrderService;
    use crate::store::{InMemoryStorage, OrderStorage, OrderStore};
    use actix_web::{http::StatusCode, test};
    use std::sync::Arc;

    fn state(storage: Arc<dyn OrderStorage>) -> (ServerState, Arc<Metrics>) {
        let metrics = Arc::new(Metrics::new().unwrap());
        let store = OrderStore::new(storage).with_metrics(metrics.clone());
        let service = OrderService::new(store, NotificationDispatcher::disabled("shop@example.com"))
            .with_metrics(metrics.clone());
        let state = ServerState {
            registry: metrics.registry().clone(),
            orders: OrderWriterHandle::spawn(service),
        };
        (state, metrics)
    }

    #[actix_web::test]
    async fn test_metrics_endpoint_exposes_registry() {
        let (state, metrics) = state(Arc::new(InMemoryStorage::new()));
        metrics.record_order_created();
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).configure(configure),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = test::read_body(resp).await;
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("orders_created_total 1"));
    }

    #[actix_web::test]
    async fn test_health_reports_available_storage() {
        let (state, _) = state(Arc::new(InMemoryStorage::new()));
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).configure(configure),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_health_fails_when_storage_unavailable() {
        let (state, _) = state(Arc::new(InMemoryStorage::unavailable()));
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).configure(configure),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
