mod config;
mod engine;
mod model;
mod types;
mod verdict;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{Html, Json},
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use clap::Parser;
use metrics::counter;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use config::Config;
use engine::Classifier;
use model::{ModelConfig, SentimentModel};
use types::{ClassifyRequest, ClassifyResponse, ErrorBody};

const DASHBOARD_HTML: &str = include_str!("../static/index.html");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,nazar=debug".into()),
        )
        .init();

    let config = Config::parse();
    tracing::info!("Starting sentiment dashboard with config: {:?}", config);

    // Validate that either model_id or model_path is provided
    if config.model_id.is_none() && config.model_path.is_none() {
        anyhow::bail!("Either --model-id or --model-path must be provided");
    }

    let model_config = ModelConfig {
        model_id: config.model_id.clone(),
        model_path: config.model_path.clone(),
        revision: config.model_revision.clone(),
        use_pth: config.use_pth,
        cpu: config.cpu_only,
        max_sequence_length: config.max_sequence_length,
    };

    tracing::info!("Loading sentiment model...");
    let model = SentimentModel::load(model_config).await?;
    tracing::info!("Model loaded successfully");

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let app = Router::new()
        .route("/", get(dashboard_handler))
        .route("/api/classify", post(classify_handler))
        .route("/metrics", get(|| async move { metric_handle.render() }))
        .layer(prometheus_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(Arc::new(model), config.model_name()));

    let listener = TcpListener::bind(&config.server_address()).await?;
    tracing::info!("Dashboard running on http://{}", config.server_address());

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Clone)]
struct AppState {
    classifier: Arc<dyn Classifier>,
    model_name: String,
}

impl AppState {
    fn new(classifier: Arc<dyn Classifier>, model_name: String) -> Self {
        Self {
            classifier,
            model_name,
        }
    }
}

async fn dashboard_handler() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

#[tracing::instrument(skip(state, request), fields(chars = request.text.len()))]
async fn classify_handler(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, (StatusCode, Json<ErrorBody>)> {
    counter!("classification_requests_total").increment(1);

    let Some(text) = types::trimmed_review(&request.text) else {
        counter!("classification_rejected_total").increment(1);
        tracing::debug!("Rejected empty review");
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorBody {
                error: "Please enter a review.".to_string(),
            }),
        ));
    };

    let score = state.classifier.positive_probability(text).await.map_err(|e| {
        tracing::error!(error = %e, "Classification failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: "Classification failed".to_string(),
            }),
        )
    })?;

    // Out-of-range probabilities are a model defect; surface them, never clamp.
    let sentiment = verdict::verdict(score).map_err(|e| {
        tracing::error!(error = %e, "Model returned an invalid probability");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: e.to_string(),
            }),
        )
    })?;

    tracing::info!(
        category = sentiment.category.as_str(),
        display_score = sentiment.display_score,
        "Classification completed"
    );

    Ok(Json(ClassifyResponse {
        id: format!("classify-{}", uuid::Uuid::new_v4().simple()),
        object: "verdict".to_string(),
        created: chrono::Utc::now().timestamp(),
        model: state.model_name.clone(),
        category: sentiment.category,
        label: sentiment.category.label_fa(),
        glyph: sentiment.glyph,
        display_score: sentiment.display_score,
        positive_probability: score,
    }))
}
