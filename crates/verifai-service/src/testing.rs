// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory transport for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use verifai_core::error::{Result, VerifaiError};

use crate::transport::{HttpReply, Transport};

/// One request seen by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: &'static str,
    pub url: String,
    pub authorization: Option<String>,
    pub body_len: usize,
}

/// Canned replies keyed by full URL. Unknown URLs fail with a network error.
#[derive(Default)]
pub struct FakeTransport {
    allow: HashMap<String, String>,
    replies: HashMap<String, HttpReply>,
    timeouts: Vec<String>,
    calls: Mutex<Vec<Call>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allow(mut self, url: &str, header: &str) -> Self {
        self.allow.insert(url.to_string(), header.to_string());
        self
    }

    pub fn with_reply(mut self, url: &str, status: u16, body: &str) -> Self {
        self.replies.insert(
            url.to_string(),
            HttpReply {
                status,
                body: body.as_bytes().to_vec(),
            },
        );
        self
    }

    pub fn with_timeout(mut self, url: &str) -> Self {
        self.timeouts.push(url.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(
        &self,
        method: &'static str,
        url: &str,
        authorization: Option<&str>,
        body_len: usize,
    ) {
        self.calls.lock().unwrap().push(Call {
            method,
            url: url.to_string(),
            authorization: authorization.map(str::to_owned),
            body_len,
        });
    }

    fn reply(&self, url: &str) -> Result<HttpReply> {
        if self.timeouts.iter().any(|u| u == url) {
            return Err(VerifaiError::Timeout(format!("{url}: operation timed out")));
        }
        self.replies
            .get(url)
            .cloned()
            .ok_or_else(|| VerifaiError::Network(format!("{url}: connection refused")))
    }
}

impl Transport for FakeTransport {
    fn post_image(&self, url: &str, image: &[u8]) -> Result<HttpReply> {
        self.record("POST", url, None, image.len());
        self.reply(url)
    }

    fn get(&self, url: &str, authorization: Option<&str>) -> Result<HttpReply> {
        self.record("GET", url, authorization, 0);
        self.reply(url)
    }

    fn allowed_methods(&self, url: &str) -> Result<Option<String>> {
        self.record("OPTIONS", url, None, 0);
        if self.timeouts.iter().any(|u| u == url) {
            return Err(VerifaiError::Timeout(format!("{url}: operation timed out")));
        }
        Ok(self.allow.get(url).cloned())
    }
}
