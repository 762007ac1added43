use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::config::GitCloneMode;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct Health {
    #[serde(rename = "Status")]
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct Version {
    #[serde(rename = "Version")]
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct SizeLimit {
    #[serde(rename = "MaxResponseBodySize")]
    pub max_response_body_size: u64,
}

#[derive(Serialize)]
pub struct CorsStatus {
    #[serde(rename = "Cors")]
    pub cors: String,
}

#[derive(Serialize)]
pub struct SmartGitStatus {
    pub enabled: bool,
}

#[derive(Serialize)]
pub struct ShellStatus {
    pub editor: bool,
    #[serde(rename = "rewriteAPI")]
    pub rewrite_api: bool,
}

pub async fn healthcheck() -> Json<Health> {
    Json(Health { status: "OK" })
}

pub async fn version() -> Json<Version> {
    Json(Version {
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Configured limit, in MiB.
pub async fn size_limit(State(state): State<AppState>) -> Json<SizeLimit> {
    Json(SizeLimit {
        max_response_body_size: state.config.load().server.size_limit_mb,
    })
}

pub async fn cors_status(State(state): State<AppState>) -> Json<CorsStatus> {
    Json(CorsStatus {
        cors: state.config.load().server.cors.clone(),
    })
}

pub async fn smartgit_status(State(state): State<AppState>) -> Json<SmartGitStatus> {
    Json(SmartGitStatus {
        enabled: state.config.load().git_clone.mode == GitCloneMode::Cache,
    })
}

pub async fn shell_status(State(state): State<AppState>) -> Json<ShellStatus> {
    let config = state.config.load();
    Json(ShellStatus {
        editor: config.shell.editor,
        rewrite_api: config.shell.rewrite_api,
    })
}
