// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;

/// Default location of the Verifai dashboard API.
pub const DEFAULT_BASE_API_URL: &str = "https://dashboard.verifai.com/api/";

/// Settings for talking to the Verifai backend and the local services.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Token for the metadata API (`Authorization: Token <api_token>`).
    pub api_token: Option<String>,
    /// Base URL of the metadata API. A missing trailing slash is tolerated.
    pub base_api_url: String,
    /// Verify TLS certificates on every request.
    pub ssl_verify: bool,
    /// Full classify endpoint URLs, e.g. `http://localhost:5000/api/classify/`.
    pub classifier_urls: Vec<String>,
    /// Full OCR endpoint URLs, e.g. `http://localhost:5001/api/ocr/`.
    pub ocr_urls: Vec<String>,
    /// Register configured URLs without an OPTIONS probe.
    pub skip_liveness_check: bool,
    /// Per-request timeout enforced by the transport.
    pub request_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_api_url: DEFAULT_BASE_API_URL.to_string(),
            ssl_verify: true,
            classifier_urls: Vec::new(),
            ocr_urls: Vec::new(),
            skip_liveness_check: false,
            request_timeout_secs: 30,
        }
    }
}

// Hand-written so the token never ends up in logs.
impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("base_api_url", &self.base_api_url)
            .field("ssl_verify", &self.ssl_verify)
            .field("classifier_urls", &self.classifier_urls)
            .field("ocr_urls", &self.ocr_urls)
            .field("skip_liveness_check", &self.skip_liveness_check)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl ServiceConfig {
    /// Load a config persisted as JSON. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        debug!(path = %path.display(), "loaded service config");
        Ok(config)
    }

    /// Persist the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "saved service config");
        Ok(())
    }

    /// Base API URL guaranteed to end with `/`.
    pub fn normalized_base_api_url(&self) -> String {
        if self.base_api_url.ends_with('/') {
            self.base_api_url.clone()
        } else {
            format!("{}/", self.base_api_url)
        }
    }
}
