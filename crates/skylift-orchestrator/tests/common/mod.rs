use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use skylift_api::{App, Machine, MachineConfig, OperationError, Result};
use skylift_orchestrator::{ResourceOps, TelemetryEvent, TelemetrySink};

/// Scripted stand-in for the control plane: every operation pops the next
/// queued result, falling back to a sticky default when the queue is empty.
#[derive(Clone, Default)]
pub struct FakeOps {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    create_app: Mutex<VecDeque<Result<App>>>,
    get_app: Mutex<VecDeque<Result<App>>>,
    get_app_default: Mutex<Option<Result<App>>>,
    create_machine: Mutex<VecDeque<Result<Machine>>>,
    get_machine: Mutex<VecDeque<Result<Machine>>>,
    get_machine_default: Mutex<Option<Result<Machine>>>,
    wait_machine: Mutex<VecDeque<Result<Machine>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeOps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_create_app(&self, result: Result<App>) {
        self.inner.create_app.lock().unwrap().push_back(result);
    }

    pub fn push_get_app(&self, result: Result<App>) {
        self.inner.get_app.lock().unwrap().push_back(result);
    }

    pub fn default_get_app(&self, result: Result<App>) {
        *self.inner.get_app_default.lock().unwrap() = Some(result);
    }

    pub fn push_create_machine(&self, result: Result<Machine>) {
        self.inner.create_machine.lock().unwrap().push_back(result);
    }

    pub fn push_get_machine(&self, result: Result<Machine>) {
        self.inner.get_machine.lock().unwrap().push_back(result);
    }

    pub fn default_get_machine(&self, result: Result<Machine>) {
        *self.inner.get_machine_default.lock().unwrap() = Some(result);
    }

    pub fn push_wait_machine(&self, result: Result<Machine>) {
        self.inner.wait_machine.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn called(&self, name: &str) -> bool {
        self.calls().iter().any(|c| c == name)
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == name).count()
    }

    fn record(&self, name: &str) {
        self.inner.calls.lock().unwrap().push(name.to_string());
    }

    fn next<T: Clone>(
        queue: &Mutex<VecDeque<Result<T>>>,
        default: Option<&Mutex<Option<Result<T>>>>,
        what: &str,
    ) -> Result<T> {
        if let Some(result) = queue.lock().unwrap().pop_front() {
            return result;
        }
        if let Some(default) = default {
            if let Some(result) = default.lock().unwrap().clone() {
                return result;
            }
        }
        panic!("no scripted result for {what}");
    }
}

#[async_trait]
impl ResourceOps for FakeOps {
    async fn create_app(&self, _name: &str, _org: &str) -> Result<App> {
        self.record("create_app");
        Self::next(&self.inner.create_app, None, "create_app")
    }

    async fn get_app(&self, _name: &str) -> Result<App> {
        self.record("get_app");
        Self::next(
            &self.inner.get_app,
            Some(&self.inner.get_app_default),
            "get_app",
        )
    }

    async fn create_machine(
        &self,
        _app_name: &str,
        _config: &MachineConfig,
        _region: Option<&str>,
    ) -> Result<Machine> {
        self.record("create_machine");
        Self::next(&self.inner.create_machine, None, "create_machine")
    }

    async fn get_machine(&self, _app_name: &str, _machine_id: &str) -> Result<Machine> {
        self.record("get_machine");
        Self::next(
            &self.inner.get_machine,
            Some(&self.inner.get_machine_default),
            "get_machine",
        )
    }

    async fn wait_machine(
        &self,
        _app_name: &str,
        _machine_id: &str,
        _instance_id: &str,
        _state: &str,
        _timeout: Duration,
    ) -> Result<Machine> {
        self.record("wait_machine");
        Self::next(&self.inner.wait_machine, None, "wait_machine")
    }
}

/// Telemetry sink that records every event for assertions.
#[derive(Default)]
pub struct CaptureSink {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl TelemetrySink for CaptureSink {
    fn emit(&self, event: TelemetryEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl CaptureSink {
    pub fn names(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(TelemetryEvent::full_name)
            .collect()
    }

    pub fn measurement(&self, event_name: &str, key: &str) -> Option<f64> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.full_name() == event_name)
            .and_then(|e| e.measurements.get(key).copied())
    }

    pub fn metadata(&self, event_name: &str, key: &str) -> Option<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.full_name() == event_name)
            .and_then(|e| e.metadata.get(key).cloned())
    }
}

pub fn app(name: &str, status: &str) -> App {
    App {
        name: name.to_string(),
        organization: "acme".to_string(),
        status: status.to_string(),
        created_at: None,
    }
}

pub fn machine(id: &str, state: &str, instance_id: Option<&str>) -> Machine {
    Machine {
        id: id.to_string(),
        name: None,
        state: state.to_string(),
        region: None,
        instance_id: instance_id.map(String::from),
        private_ip: None,
        config: None,
        created_at: None,
    }
}

pub fn api_error(status: u16, code: &str, message: &str) -> OperationError {
    OperationError::from_response(
        status,
        "POST",
        "https://api.test/v1/apps",
        Some("req-test".to_string()),
        &format!(r#"{{"error":{{"code":"{code}","message":"{message}"}}}}"#),
    )
}
