// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test doubles for the Kubernetes API, Pebble and the host runtime.

use crate::error::{RancherError, Result};
use crate::kubernetes::{IngressCollaborator, IngressProvider};
use crate::pebble::WorkloadSupervisor;
use crate::runtime::HostRuntime;
use crate::types::{
    ActionParams, ActionResult, CharmConfig, Layer, Override, PersistedState, Service, Startup,
    UnitStatus,
};
use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use kube::client::Body;
use kube::Client;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::net::UnixListener;
use tokio::task::JoinHandle;
use tower::Service as TowerService;

/// A mock Kubernetes API server that returns predefined responses based on
/// request paths and records every request it receives.
///
/// A successful PATCH also becomes the GET response for its path, so later
/// reads see what was applied.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for PATCH requests matching the exact path
    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
        self
    }

    /// Number of requests received with this method and path
    pub fn request_count(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, p)| m == method && p == path)
            .count()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        self.responses
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl TowerService<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<
            dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>>
                + Send,
        >,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        self.requests
            .lock()
            .unwrap()
            .push((method.clone(), path.clone()));
        let response = self.find_response(&method, &path);
        if let Some((status @ 200..=299, body)) = &response {
            if method == "PATCH" {
                self.responses
                    .lock()
                    .unwrap()
                    .insert(("GET".to_string(), path.clone()), (*status, body.clone()));
            }
        }

        Box::pin(async move {
            let (status, body) =
                response.unwrap_or_else(|| (404, not_found_json("resource", &path)));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}

/// Create an Ingress JSON response routing `host` to `service:port`
pub fn ingress_json(name: &str, namespace: &str, host: &str, service: &str, port: i32) -> String {
    json!({
        "apiVersion": "networking.k8s.io/v1",
        "kind": "Ingress",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "uid": "test-uid"
        },
        "spec": {
            "ingressClassName": "nginx",
            "rules": [{
                "host": host,
                "http": {
                    "paths": [{
                        "path": "/",
                        "pathType": "Prefix",
                        "backend": {
                            "service": {
                                "name": service,
                                "port": { "number": port }
                            }
                        }
                    }]
                }
            }]
        }
    })
    .to_string()
}

type RecordedRequests = Arc<Mutex<Vec<(String, String, Value)>>>;

/// A Pebble API served on a temporary unix socket.
///
/// Autostart returns change "1"; waiting on it succeeds unless
/// `fail_changes_with` was called.
pub struct FakePebbleServer {
    socket_path: PathBuf,
    requests: RecordedRequests,
    change_error: Arc<Mutex<Option<String>>>,
    handle: JoinHandle<()>,
}

impl FakePebbleServer {
    pub async fn start(name: &str) -> Self {
        let socket_path = std::env::temp_dir().join(format!(
            "rancher-operator-{}-{}.socket",
            std::process::id(),
            name
        ));
        let _ = std::fs::remove_file(&socket_path);
        let listener = UnixListener::bind(&socket_path).unwrap();

        let requests: RecordedRequests = Arc::new(Mutex::new(Vec::new()));
        let change_error = Arc::new(Mutex::new(None));

        let (reqs, errs) = (requests.clone(), change_error.clone());
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let (reqs, errs) = (reqs.clone(), errs.clone());
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let (reqs, errs) = (reqs.clone(), errs.clone());
                        async move { Ok::<_, Infallible>(pebble_response(req, reqs, errs).await) }
                    });
                    let _ = hyper::server::conn::http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self {
            socket_path,
            requests,
            change_error,
            handle,
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub fn fail_changes_with(&self, err: &str) {
        *self.change_error.lock().unwrap() = Some(err.to_string());
    }

    /// Requests received so far as (method, path, JSON body)
    pub fn requests(&self) -> Vec<(String, String, Value)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for FakePebbleServer {
    fn drop(&mut self) {
        self.handle.abort();
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

async fn pebble_response(
    req: Request<Incoming>,
    requests: RecordedRequests,
    change_error: Arc<Mutex<Option<String>>>,
) -> Response<Full<Bytes>> {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let bytes = req
        .into_body()
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .unwrap_or_default();
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    requests.lock().unwrap().push((method, path.clone(), body));

    let (status, envelope): (u16, Value) = if path == "/v1/services" {
        (
            202,
            json!({
                "type": "async",
                "status-code": 202,
                "status": "Accepted",
                "change": "1",
                "result": null
            }),
        )
    } else if path.starts_with("/v1/changes/") {
        let err = change_error.lock().unwrap().clone().unwrap_or_default();
        (
            200,
            json!({
                "type": "sync",
                "status-code": 200,
                "status": "OK",
                "result": {"id": "1", "ready": true, "err": err}
            }),
        )
    } else {
        (
            200,
            json!({"type": "sync", "status-code": 200, "status": "OK", "result": true}),
        )
    };

    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(envelope.to_string())))
        .unwrap()
}

/// In-memory supervisor that combines layers the way Pebble does and keeps
/// track of which services are running.
#[derive(Default)]
pub struct FakeSupervisor {
    /// Layers in the order they were first added
    layers: Mutex<Vec<(String, Layer)>>,
    running: Mutex<BTreeSet<String>>,
    calls: Mutex<Vec<String>>,
    fail_with: Option<String>,
}

impl FakeSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// A supervisor that rejects every call
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Services of all layers combined, later labels overriding earlier ones
    pub fn plan(&self) -> BTreeMap<String, Service> {
        self.layers
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(_, layer)| layer.services.clone())
            .collect()
    }

    pub fn layer(&self, label: &str) -> Option<Layer> {
        self.layers
            .lock()
            .unwrap()
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, layer)| layer.clone())
    }

    /// Seed an unrelated layer, as another charm library would
    pub fn with_layer(self, label: &str, layer: Layer) -> Self {
        self.layers.lock().unwrap().push((label.to_string(), layer));
        self
    }

    pub fn running(&self) -> BTreeSet<String> {
        self.running.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn check_failure(&self) -> Result<()> {
        match &self.fail_with {
            Some(message) => Err(RancherError::PebbleError(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WorkloadSupervisor for FakeSupervisor {
    async fn add_layer(&self, label: &str, layer: &Layer, combine: bool) -> Result<()> {
        self.calls.lock().unwrap().push(format!("add_layer:{}", label));
        self.check_failure()?;

        let mut layers = self.layers.lock().unwrap();
        let existing = layers
            .iter_mut()
            .find(|(existing, _)| existing == label)
            .map(|(_, layer)| layer);
        match existing {
            Some(existing) if combine => {
                for (name, service) in &layer.services {
                    let current = existing.services.get_mut(name);
                    let merged = match (service.override_policy, current) {
                        (Override::Merge, Some(current)) => {
                            current.command = service.command.clone();
                            current.startup = service.startup;
                            current.environment.extend(service.environment.clone());
                            true
                        }
                        _ => false,
                    };
                    if !merged {
                        existing.services.insert(name.clone(), service.clone());
                    }
                }
                existing.summary = layer.summary.clone();
                existing.description = layer.description.clone();
            }
            Some(_) => {
                return Err(RancherError::PebbleError(format!(
                    "layer \"{}\" already exists",
                    label
                )))
            }
            None => {
                layers.push((label.to_string(), layer.clone()));
            }
        }
        Ok(())
    }

    async fn autostart(&self) -> Result<()> {
        self.calls.lock().unwrap().push("autostart".to_string());
        self.check_failure()?;

        let enabled: Vec<String> = self
            .plan()
            .into_iter()
            .filter(|(_, service)| service.startup == Startup::Enabled)
            .map(|(name, _)| name)
            .collect();
        self.running.lock().unwrap().extend(enabled);
        Ok(())
    }
}

/// Ingress collaborator recording every update it receives.
///
/// It also acts as its own provider; clones share the recorded updates.
#[derive(Clone, Default)]
pub struct FakeIngress {
    updates: Arc<Mutex<Vec<BTreeMap<String, String>>>>,
    connects: Arc<Mutex<usize>>,
    fail_with: Option<String>,
    fail_connect_with: Option<String>,
}

impl FakeIngress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// A provider that cannot reach the cluster
    pub fn failing_connect(message: &str) -> Self {
        Self {
            fail_connect_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn updates(&self) -> Vec<BTreeMap<String, String>> {
        self.updates.lock().unwrap().clone()
    }

    pub fn connects(&self) -> usize {
        *self.connects.lock().unwrap()
    }
}

#[async_trait]
impl IngressProvider for FakeIngress {
    type Ingress = FakeIngress;

    async fn connect(&self, _config: &CharmConfig) -> Result<FakeIngress> {
        *self.connects.lock().unwrap() += 1;
        match &self.fail_connect_with {
            Some(message) => Err(RancherError::IngressError(message.clone())),
            None => Ok(self.clone()),
        }
    }
}

#[async_trait]
impl IngressCollaborator for FakeIngress {
    async fn update_config(&self, fields: &BTreeMap<String, String>) -> Result<()> {
        self.updates.lock().unwrap().push(fields.clone());
        match &self.fail_with {
            Some(message) => Err(RancherError::IngressError(message.clone())),
            None => Ok(()),
        }
    }
}

/// Host runtime backed by memory, recording every call made to it
pub struct FakeRuntime {
    model_name: String,
    config: Mutex<CharmConfig>,
    state: Mutex<Option<PersistedState>>,
    params: ActionParams,
    statuses: Mutex<Vec<UnitStatus>>,
    responses: Mutex<Vec<ActionResult>>,
    calls: Mutex<Vec<&'static str>>,
    fail_status: bool,
    fail_config: bool,
}

impl FakeRuntime {
    pub fn new(config: CharmConfig) -> Self {
        Self {
            model_name: "cattle".to_string(),
            config: Mutex::new(config),
            state: Mutex::new(None),
            params: ActionParams::default(),
            statuses: Mutex::new(Vec::new()),
            responses: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            fail_status: false,
            fail_config: false,
        }
    }

    pub fn with_params(mut self, params: ActionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_state(self, state: PersistedState) -> Self {
        *self.state.lock().unwrap() = Some(state);
        self
    }

    /// Make `status-set` fail
    pub fn with_failing_status(mut self) -> Self {
        self.fail_status = true;
        self
    }

    /// Make `config-get` fail
    pub fn with_failing_config(mut self) -> Self {
        self.fail_config = true;
        self
    }

    pub fn set_config(&self, config: CharmConfig) {
        *self.config.lock().unwrap() = config;
    }

    pub fn state(&self) -> Option<PersistedState> {
        *self.state.lock().unwrap()
    }

    pub fn statuses(&self) -> Vec<UnitStatus> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn responses(&self) -> Vec<ActionResult> {
        self.responses.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl HostRuntime for FakeRuntime {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn charm_config(&self) -> Result<CharmConfig> {
        self.record("charm_config");
        if self.fail_config {
            return Err(RancherError::HookToolError {
                tool: "config-get".to_string(),
                message: "no such unit".to_string(),
            });
        }
        Ok(self.config.lock().unwrap().clone())
    }

    async fn set_status(&self, status: &UnitStatus) -> Result<()> {
        self.record("set_status");
        if self.fail_status {
            return Err(RancherError::HookToolError {
                tool: "status-set".to_string(),
                message: "connection refused".to_string(),
            });
        }
        self.statuses.lock().unwrap().push(status.clone());
        Ok(())
    }

    async fn load_state(&self) -> Result<Option<PersistedState>> {
        self.record("load_state");
        Ok(*self.state.lock().unwrap())
    }

    async fn save_state(&self, state: &PersistedState) -> Result<()> {
        self.record("save_state");
        *self.state.lock().unwrap() = Some(*state);
        Ok(())
    }

    async fn action_params(&self) -> Result<ActionParams> {
        self.record("action_params");
        Ok(self.params.clone())
    }

    async fn respond(&self, result: &ActionResult) -> Result<()> {
        self.record("respond");
        self.responses.lock().unwrap().push(result.clone());
        Ok(())
    }
}
