//! One-time installation of the capture decorators

use std::sync::Arc;

use netscope_core::Clock;
use tracing::{debug, info};

use crate::client::{FetchClient, XhrFactory};
use crate::config::CaptureConfig;
use crate::fetch::CapturingFetch;
use crate::recorder::Recorder;
use crate::sink::RecordSink;
use crate::xhr::CapturingXhrFactory;

/// The network primitives page code reaches for
#[derive(Clone)]
pub struct NetworkCapabilities {
    pub fetch: Arc<dyn FetchClient>,
    pub xhr: Arc<dyn XhrFactory>,
}

impl NetworkCapabilities {
    pub fn new(fetch: Arc<dyn FetchClient>, xhr: Arc<dyn XhrFactory>) -> Self {
        Self { fetch, xhr }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    Uninstalled,
    Installed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    AlreadyInstalled,
}

/// Wraps a page's primitives with capturing decorators, at most once
pub struct CaptureLayer {
    state: InstallState,
    recorder: Recorder,
}

impl CaptureLayer {
    pub fn new(sink: Arc<dyn RecordSink>, config: &CaptureConfig) -> Self {
        Self {
            state: InstallState::Uninstalled,
            recorder: Recorder::new(sink, config),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.recorder = self.recorder.with_clock(clock);
        self
    }

    pub fn state(&self) -> InstallState {
        self.state
    }

    /// Replace both primitives with capturing versions
    ///
    /// A second call leaves `capabilities` untouched, so a request is never
    /// recorded twice.
    pub fn install(&mut self, capabilities: &mut NetworkCapabilities) -> InstallOutcome {
        if self.state == InstallState::Installed {
            debug!("Capture layer already installed, skipping");
            return InstallOutcome::AlreadyInstalled;
        }

        capabilities.fetch = Arc::new(CapturingFetch::new(
            Arc::clone(&capabilities.fetch),
            self.recorder.clone(),
        ));
        capabilities.xhr = Arc::new(CapturingXhrFactory::new(
            Arc::clone(&capabilities.xhr),
            self.recorder.clone(),
        ));
        self.state = InstallState::Installed;

        info!("Capture layer installed");
        InstallOutcome::Installed
    }
}
