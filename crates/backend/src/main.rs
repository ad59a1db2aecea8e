mod config;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::{extract::State, response::Html, routing::get, Json, Router};
use forecast360_shared::DashboardConfig;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing_subscriber::EnvFilter;

use config::ServerConfig;

const CACHE_1DAY: &str = "public, max-age=86400, must-revalidate";
const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";
const NO_CACHE: &str = "no-cache";

const PLACEHOLDER_INDEX: &str = r#"<!DOCTYPE html>
<html>
<head><title>FijiForecast360</title></head>
<body>
<h1>FijiForecast360</h1>
<p>Frontend not built yet. The dashboard configuration is at <a href="/config.json">/config.json</a>.</p>
</body>
</html>"#;

struct AppState {
    dashboard: DashboardConfig,
    dist_dir: PathBuf,
}

/// Build a cache-controlled static file router.
///
/// Separated so tests can exercise the caching layer with arbitrary directories.
fn cached_static_router(dir: &Path, cache_header: &'static str) -> Router {
    let layer = SetResponseHeaderLayer::overriding(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(cache_header),
    );
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(layer)
}

async fn dashboard_config(State(state): State<Arc<AppState>>) -> Json<DashboardConfig> {
    Json(state.dashboard.clone())
}

async fn serve_index(State(state): State<Arc<AppState>>) -> Html<String> {
    let path = state.dist_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Html(html),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "serving placeholder index");
            Html(PLACEHOLDER_INDEX.to_string())
        }
    }
}

/// Build the full application router.
fn build_app(config: &ServerConfig) -> Router {
    let state = Arc::new(AppState {
        dashboard: config.dashboard.clone(),
        dist_dir: config.dist_dir.clone(),
    });

    // Static file routers are stateless; merge them before adding app state
    let static_files = Router::new()
        .nest("/static", cached_static_router(&config.assets_dir, CACHE_1DAY))
        .nest("/dist", cached_static_router(&config.dist_dir, CACHE_IMMUTABLE))
        .nest(
            "/assets",
            cached_static_router(&config.dist_dir.join("assets"), CACHE_IMMUTABLE),
        );

    // Config and the page shell must be revalidated so deploys take effect.
    let dynamic = Router::new()
        .route("/config.json", get(dashboard_config))
        .route("/", get(serve_index))
        .route("/topic/{id}", get(serve_index))
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::CACHE_CONTROL,
            HeaderValue::from_static(NO_CACHE),
        ));

    dynamic
        .merge(static_files)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "refusing to start");
            std::process::exit(1);
        }
    };
    let app = build_app(&config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(
        port = config.port,
        dist = %config.dist_dir.display(),
        prediction_api = %config.dashboard.api_base_url,
        "FijiForecast360 server running"
    );

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    /// Config pointing at temp directories, everything else default.
    fn test_config(dist_dir: &Path, assets_dir: &Path) -> ServerConfig {
        ServerConfig {
            port: 0,
            dist_dir: dist_dir.to_path_buf(),
            assets_dir: assets_dir.to_path_buf(),
            dashboard: DashboardConfig::default(),
        }
    }

    /// Create a temp dir with a test file and return the dir path.
    fn temp_dir_with_file(file_name: &str, content: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(file_name), content).unwrap();
        dir
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_text(resp: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_config_json_publishes_dashboard_config() {
        let dist = temp_dir_with_file("index.html", "<html></html>");
        let assets = tempfile::tempdir().unwrap();
        let mut config = test_config(dist.path(), assets.path());
        config.dashboard.api_base_url = "http://forecast.local:5000".to_string();
        config.dashboard.viewport.snap_back_grace_ms = 20_000;

        let resp = build_app(&config).oneshot(get_request("/config.json")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("cache-control").unwrap(), NO_CACHE);
        let published = DashboardConfig::from_json(&body_text(resp).await).unwrap();
        assert_eq!(published, config.dashboard);
    }

    #[tokio::test]
    async fn test_deep_link_serves_index() {
        let dist = temp_dir_with_file("index.html", "<html>forecast</html>");
        let assets = tempfile::tempdir().unwrap();
        let app = build_app(&test_config(dist.path(), assets.path()));

        for uri in ["/", "/topic/cyclone"] {
            let resp = app.clone().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK, "{uri}");
            assert_eq!(body_text(resp).await, "<html>forecast</html>");
        }
    }

    #[tokio::test]
    async fn test_missing_bundle_serves_placeholder() {
        let dist = tempfile::tempdir().unwrap();
        let assets = tempfile::tempdir().unwrap();
        let app = build_app(&test_config(dist.path(), assets.path()));

        let resp = app.oneshot(get_request("/")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("Frontend not built yet"));
    }

    #[tokio::test]
    async fn test_static_assets_have_1day_cache() {
        let dist = temp_dir_with_file("index.html", "<html></html>");
        let assets = temp_dir_with_file("fiji-outline.svg", "<svg/>");
        let app = build_app(&test_config(dist.path(), assets.path()));

        let resp = app.oneshot(get_request("/static/fiji-outline.svg")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("cache-control").unwrap(), CACHE_1DAY);
    }

    #[tokio::test]
    async fn test_dist_bundles_have_immutable_cache() {
        let dist = temp_dir_with_file("app-abc123.js", "bundle()");
        let assets = tempfile::tempdir().unwrap();
        let app = build_app(&test_config(dist.path(), assets.path()));

        let resp = app.oneshot(get_request("/dist/app-abc123.js")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("cache-control").unwrap(), CACHE_IMMUTABLE);
    }

    #[tokio::test]
    async fn test_dist_assets_have_immutable_cache() {
        let dist = tempfile::tempdir().unwrap();
        std::fs::create_dir(dist.path().join("assets")).unwrap();
        std::fs::write(dist.path().join("assets/main-xyz.css"), "body{}").unwrap();
        let assets = tempfile::tempdir().unwrap();
        let app = build_app(&test_config(dist.path(), assets.path()));

        let resp = app.oneshot(get_request("/assets/main-xyz.css")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("cache-control").unwrap(), CACHE_IMMUTABLE);
    }

    #[tokio::test]
    async fn test_missing_static_file_returns_404() {
        let dist = temp_dir_with_file("index.html", "<html></html>");
        let assets = temp_dir_with_file("fiji-outline.svg", "<svg/>");
        let app = build_app(&test_config(dist.path(), assets.path()));

        let resp = app.oneshot(get_request("/static/nonexistent.txt")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
