// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted network and submit fakes shared by the worker tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use ql_core::{PendingOperation, SubmitResult, Submitter};
use ql_ipc::{FetchRequest, FetchResponse, ResponseSource};
use tokio::sync::Semaphore;
use url::Url;

use crate::cache::{FetchError, FetchResult, Fetcher};

/// A network that serves canned responses and can be switched off.
#[derive(Default)]
pub struct FakeNetwork {
    online: AtomicBool,
    routes: Mutex<HashMap<String, FetchResponse>>,
    requests: Mutex<Vec<String>>,
}

impl FakeNetwork {
    /// An online network with no routes; unknown URLs get a 404.
    pub fn online() -> Arc<Self> {
        let net = FakeNetwork::default();
        net.online.store(true, Ordering::SeqCst);
        Arc::new(net)
    }

    /// An offline network.
    pub fn offline() -> Arc<Self> {
        Arc::new(FakeNetwork::default())
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn route(&self, url: &str, content_type: &str, body: &[u8]) {
        self.route_status(url, 200, content_type, body);
    }

    pub fn route_status(&self, url: &str, status: u16, content_type: &str, body: &[u8]) {
        self.routes.lock().unwrap().insert(
            url.to_string(),
            FetchResponse {
                status,
                content_type: Some(content_type.to_string()),
                body: body.to_vec(),
                source: ResponseSource::Network,
            },
        );
    }

    /// Every request that reached the network, as `METHOD url`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Fetcher for FakeNetwork {
    fn fetch<'a>(
        &'a self,
        request: &'a FetchRequest,
        url: &'a Url,
    ) -> Pin<Box<dyn Future<Output = FetchResult> + Send + 'a>> {
        Box::pin(async move {
            if !self.online.load(Ordering::SeqCst) {
                return Err(FetchError::Network("offline".into()));
            }
            self.requests
                .lock()
                .unwrap()
                .push(format!("{} {}", request.method, url));
            let response = self.routes.lock().unwrap().get(url.as_str()).cloned();
            Ok(response.unwrap_or(FetchResponse {
                status: 404,
                content_type: None,
                body: Vec::new(),
                source: ResponseSource::Network,
            }))
        })
    }
}

/// A submitter with a default outcome, per-id overrides, and an optional gate.
pub struct ScriptedSubmitter {
    default: Mutex<SubmitResult>,
    overrides: Mutex<HashMap<String, SubmitResult>>,
    submitted: Mutex<Vec<String>>,
    gate: Option<Semaphore>,
}

impl ScriptedSubmitter {
    pub fn new(default: SubmitResult) -> Arc<Self> {
        Arc::new(ScriptedSubmitter {
            default: Mutex::new(default),
            overrides: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    /// Every submission waits for [`ScriptedSubmitter::release`].
    pub fn gated(default: SubmitResult) -> Arc<Self> {
        Arc::new(ScriptedSubmitter {
            default: Mutex::new(default),
            overrides: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            gate: Some(Semaphore::new(0)),
        })
    }

    pub fn set_default(&self, result: SubmitResult) {
        *self.default.lock().unwrap() = result;
    }

    pub fn set_outcome(&self, id: &str, result: SubmitResult) {
        self.overrides.lock().unwrap().insert(id.to_string(), result);
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    /// Ids submitted so far, in call order.
    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }
}

impl Submitter for ScriptedSubmitter {
    fn submit<'a>(
        &'a self,
        op: &'a PendingOperation,
    ) -> Pin<Box<dyn Future<Output = SubmitResult> + Send + 'a>> {
        Box::pin(async move {
            self.submitted.lock().unwrap().push(op.id.clone());
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
            let scripted = self.overrides.lock().unwrap().get(&op.id).cloned();
            scripted.unwrap_or_else(|| self.default.lock().unwrap().clone())
        })
    }
}
