use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::{
    BroadcastService, DeliveryPromotionService, MessageStore, MessageVisibilityService,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{health, invites, messages};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn MessageStore>,
    pub broadcasts: BroadcastService,
    pub promotion: DeliveryPromotionService,
    pub visibility: MessageVisibilityService,
}

impl AppState {
    /// Wire the messaging services over one record store.
    pub fn new(config: Arc<Config>, store: Arc<dyn MessageStore>) -> Self {
        let visibility = MessageVisibilityService::new(store.clone()).with_page_sizes(
            config.messaging.default_page_size,
            config.messaging.max_page_size,
        );

        Self {
            broadcasts: BroadcastService::new(store.clone()),
            promotion: DeliveryPromotionService::new(store.clone()),
            visibility,
            store,
            config,
        }
    }
}

pub fn create_app(config: Config, store: Arc<dyn MessageStore>) -> Router {
    let config = Arc::new(config);
    let state = AppState::new(config.clone(), store);

    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let message_routes = Router::new()
        .route(
            "/api/v1/events/:event_id/messages",
            post(messages::create_message).get(messages::list_messages),
        )
        .route(
            "/api/v1/events/:event_id/messages/:message_id/read",
            post(messages::mark_message_read),
        )
        .route(
            "/api/v1/events/:event_id/attendees/:attendee_id/messages/unread-count",
            get(messages::unread_count),
        )
        .route(
            "/api/v1/invites/:invite_id/promote",
            post(invites::promote_queued_messages),
        );

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(message_routes)
        // Route layer so the matched path template is available for labels
        .route_layer(middleware::from_fn(metrics_middleware))
        // Global middleware (order matters: bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
