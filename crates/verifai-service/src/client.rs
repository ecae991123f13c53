// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dispatch client — the HTTP-backed `Dispatcher`.
//
// Image uploads go to a pool-selected classifier or OCR endpoint; metadata
// lookups go to `<base-url>/id-models?uuid=<uuid>` with the API token. Every
// failure propagates to the caller unchanged; nothing here retries.

use std::sync::Arc;

use reqwest::Url;
use tracing::{debug, info, instrument, warn};

use verifai_core::config::ServiceConfig;
use verifai_core::dispatch::Dispatcher;
use verifai_core::error::{Result, VerifaiError};
use verifai_core::types::{ClassifyOutcome, ModelMetadata, MrzReadResult, ServiceKind};

use crate::pool::EndpointPool;
use crate::transport::{HttpReply, HttpTransport, Transport};
use crate::wire;

/// Path of the id-model lookup, relative to the base API URL.
const ID_MODELS_PATH: &str = "id-models";

/// Client for the Verifai classifier, OCR, and metadata services.
///
/// One instance is meant to be shared (behind an `Arc`) by every document
/// it produces.
pub struct VerifaiService {
    config: ServiceConfig,
    transport: Arc<dyn Transport>,
    pool: EndpointPool,
}

impl VerifaiService {
    /// Build a service with the blocking HTTP transport and register every
    /// endpoint listed in `config`.
    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Build a service on an arbitrary transport. Configured endpoints that
    /// fail their liveness probe are skipped, not reported as errors.
    pub fn with_transport(config: ServiceConfig, transport: Arc<dyn Transport>) -> Self {
        let pool = EndpointPool::new(Arc::clone(&transport));
        let service = Self {
            config,
            transport,
            pool,
        };

        let skip = service.config.skip_liveness_check;
        for url in &service.config.classifier_urls {
            service.pool.register(url, ServiceKind::Classifier, skip);
        }
        for url in &service.config.ocr_urls {
            service.pool.register(url, ServiceKind::Ocr, skip);
        }
        info!(
            classifiers = service.pool.len(ServiceKind::Classifier),
            ocr = service.pool.len(ServiceKind::Ocr),
            "Verifai service initialised"
        );
        service
    }

    /// Add a classifier endpoint, e.g. `http://localhost:5000/api/classify/`.
    pub fn add_classifier_url(&self, url: &str, skip_liveness_check: bool) -> bool {
        self.pool.register(url, ServiceKind::Classifier, skip_liveness_check)
    }

    /// Add an OCR endpoint, e.g. `http://localhost:5001/api/ocr/`.
    pub fn add_ocr_url(&self, url: &str, skip_liveness_check: bool) -> bool {
        self.pool.register(url, ServiceKind::Ocr, skip_liveness_check)
    }

    pub fn pool(&self) -> &EndpointPool {
        &self.pool
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Full metadata lookup URL for `uuid`, query string escaped.
    pub fn metadata_url(&self, uuid: &str) -> Result<Url> {
        let base = format!("{}{}", self.config.normalized_base_api_url(), ID_MODELS_PATH);
        Url::parse_with_params(&base, &[("uuid", uuid)])
            .map_err(|e| VerifaiError::Config(format!("invalid base API URL {base:?}: {e}")))
    }

    fn send_image<T>(
        &self,
        kind: ServiceKind,
        image: &[u8],
        parse: impl FnOnce(&[u8]) -> Result<T>,
    ) -> Result<T> {
        let url = self.pool.select(kind)?;
        let reply = self.transport.post_image(&url, image)?;
        parse_reply(kind.as_str(), &url, &reply, parse)
    }
}

/// Parse a reply body. If the body is unusable and the status was not 2xx,
/// the status is what gets reported.
fn parse_reply<T>(
    what: &str,
    url: &str,
    reply: &HttpReply,
    parse: impl FnOnce(&[u8]) -> Result<T>,
) -> Result<T> {
    match parse(&reply.body) {
        Ok(value) => Ok(value),
        Err(VerifaiError::MalformedResponse(detail)) if !reply.is_success() => {
            warn!(url, status = reply.status, "{what} request failed");
            Err(VerifaiError::MalformedResponse(format!(
                "{what} endpoint {url} returned HTTP {} ({detail})",
                reply.status
            )))
        }
        Err(e) => Err(e),
    }
}

impl Dispatcher for VerifaiService {
    #[instrument(skip(self, image), fields(image_len = image.len()))]
    fn classify(&self, image: &[u8]) -> Result<ClassifyOutcome> {
        let outcome = self.send_image(ServiceKind::Classifier, image, wire::parse_classify)?;
        match &outcome {
            ClassifyOutcome::Classified(result) => {
                info!(uuid = %result.uuid, side = %result.side, "document classified")
            }
            ClassifyOutcome::Rejected { status } => {
                info!(status = %status, "classifier found no document")
            }
        }
        Ok(outcome)
    }

    #[instrument(skip(self, image), fields(image_len = image.len()))]
    fn read_ocr(&self, image: &[u8]) -> Result<MrzReadResult> {
        let result = self.send_image(ServiceKind::Ocr, image, wire::parse_ocr)?;
        debug!(status = ?result.status, rotation = ?result.rotation, "OCR answered");
        Ok(result)
    }

    #[instrument(skip(self))]
    fn fetch_metadata(&self, uuid: &str) -> Result<Option<ModelMetadata>> {
        let token = self.config.api_token.as_deref().ok_or_else(|| {
            VerifaiError::Config("an API token is required to fetch model metadata".into())
        })?;
        let url = self.metadata_url(uuid)?;
        let authorization = format!("Token {token}");

        let reply = self.transport.get(url.as_str(), Some(&authorization))?;
        let metadata = parse_reply("metadata", url.as_str(), &reply, wire::parse_metadata)?;
        match &metadata {
            Some(m) => debug!(
                model = %m.model,
                country = %m.country,
                zones = m.zones.len(),
                "metadata fetched"
            ),
            None => warn!("no id-model matches uuid"),
        }
        Ok(metadata)
    }
}
