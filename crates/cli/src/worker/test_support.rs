// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! A scripted stand-in for the worker socket.

#![allow(clippy::unwrap_used)]

use std::os::unix::net::UnixListener;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

use ql_ipc::{framing, ForegroundRequest, WorkerResponse};

type Handler = dyn Fn(&ForegroundRequest) -> Vec<WorkerResponse> + Send + Sync;

/// Listens on `socket_path` and answers every request with the frames the
/// handler returns. Records what it received.
pub struct FakeWorker {
    received: Arc<Mutex<Vec<ForegroundRequest>>>,
}

impl FakeWorker {
    pub fn spawn<F>(socket_path: &Path, handler: F) -> Self
    where
        F: Fn(&ForegroundRequest) -> Vec<WorkerResponse> + Send + Sync + 'static,
    {
        let listener = UnixListener::bind(socket_path).unwrap();
        let handler: Arc<Handler> = Arc::new(handler);
        let received = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&received);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let handler = Arc::clone(&handler);
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    while let Ok(request) = framing::read_message::<_, ForegroundRequest>(&mut stream) {
                        log.lock().unwrap().push(request.clone());
                        for response in handler(&request) {
                            if framing::write_message(&mut stream, &response).is_err() {
                                return;
                            }
                        }
                    }
                });
            }
        });

        FakeWorker { received }
    }

    pub fn received(&self) -> Vec<ForegroundRequest> {
        self.received.lock().unwrap().clone()
    }
}
