// Recording doubles for pipeline hooks

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use waymark_core::{
    ActionDescriptorProvider, ActionDescriptorProviderContext, ApplicationModelProvider,
    ApplicationModelProviderContext, ChangeSource, Result,
};

/// Shared, ordered log of hook calls.
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn was_called(&self, call: &str) -> bool {
        self.calls.lock().iter().any(|c| c == call)
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

/// Provider that only records when it runs.
///
/// Implements both provider traits, logging `"<name>:executing"` and
/// `"<name>:executed"`.
pub struct RecordingProvider {
    name: String,
    order: i32,
    log: CallLog,
}

impl RecordingProvider {
    pub fn new(name: impl Into<String>, order: i32, log: CallLog) -> Self {
        Self {
            name: name.into(),
            order,
            log,
        }
    }
}

impl ApplicationModelProvider for RecordingProvider {
    fn order(&self) -> i32 {
        self.order
    }

    fn on_providers_executing(&self, _: &mut ApplicationModelProviderContext) -> Result<()> {
        self.log.record(format!("{}:executing", self.name));
        Ok(())
    }

    fn on_providers_executed(&self, _: &mut ApplicationModelProviderContext) -> Result<()> {
        self.log.record(format!("{}:executed", self.name));
        Ok(())
    }
}

impl ActionDescriptorProvider for RecordingProvider {
    fn order(&self) -> i32 {
        self.order
    }

    fn on_providers_executing(&self, _: &mut ActionDescriptorProviderContext) -> Result<()> {
        self.log.record(format!("{}:executing", self.name));
        Ok(())
    }

    fn on_providers_executed(&self, _: &mut ActionDescriptorProviderContext) -> Result<()> {
        self.log.record(format!("{}:executed", self.name));
        Ok(())
    }
}

/// Change source bumped by hand.
#[derive(Default)]
pub struct ManualChangeSource {
    version: AtomicU64,
}

impl ManualChangeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bump(&self) {
        self.version.fetch_add(1, Ordering::AcqRel);
    }
}

impl ChangeSource for ManualChangeSource {
    fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}
