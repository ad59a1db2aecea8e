use forecast360_shared::schema::ForecastKind;
use forecast360_shared::wire::{self, ForecastRequest, ForecastResult};
use forecast360_shared::{DashboardConfig, FetchError};

/// Longest slice of a non-JSON error body surfaced to the user.
const MAX_ERROR_BODY: usize = 200;

/// Full URL of the prediction endpoint serving `request`.
pub fn endpoint_url(base: &str, request: &ForecastRequest) -> String {
    format!("{}/{}", base.trim_end_matches('/'), request.endpoint())
}

fn config_url() -> Option<String> {
    let origin = web_sys::window()?.location().origin().ok()?;
    Some(format!("{}/config.json", origin))
}

fn transport(e: reqwest::Error) -> FetchError {
    FetchError::Transport(e.to_string())
}

/// Map a raw HTTP answer of the prediction service to a result.
pub fn interpret_response(kind: ForecastKind, status: u16, body: &str) -> Result<ForecastResult, FetchError> {
    if !(200..300).contains(&status) {
        let message = wire::service_error_message(body)
            .unwrap_or_else(|| body.trim().chars().take(MAX_ERROR_BODY).collect());
        return Err(FetchError::Status { status, message });
    }
    wire::parse_response(kind, body)
}

/// POST one forecast request.
pub async fn predict(base: &str, request: &ForecastRequest) -> Result<ForecastResult, FetchError> {
    let url = endpoint_url(base, request);
    tracing::info!(%url, year = request.year(), "requesting forecast");

    let resp = reqwest::Client::new()
        .post(&url)
        .json(request)
        .send()
        .await
        .map_err(transport)?;
    let status = resp.status().as_u16();
    let body = resp.text().await.map_err(transport)?;

    interpret_response(request.kind(), status, &body)
}

/// Runtime configuration published by the server next to the bundle.
pub async fn fetch_config() -> Result<DashboardConfig, FetchError> {
    let url = config_url().ok_or_else(|| FetchError::Transport("no browser window".into()))?;
    let resp = reqwest::get(&url).await.map_err(transport)?;
    let status = resp.status().as_u16();
    let body = resp.text().await.map_err(transport)?;
    if !(200..300).contains(&status) {
        return Err(FetchError::Status {
            status,
            message: format!("{} unavailable", url),
        });
    }
    DashboardConfig::from_json(&body).map_err(|e| FetchError::Schema(e.to_string()))
}
