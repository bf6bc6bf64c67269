// Test fixtures shared by the unit tests

use crate::error::ProbeError;
use crate::fingerprint::{BatteryStatus, CanvasScene, GpuInfo, Resolution, SignalSource};
use crate::install::InstallSignals;
use crate::store::StorageBackend;
use async_trait::async_trait;
use std::cell::Cell;
use std::rc::Rc;

const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1";
const ANDROID_UA: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Mobile Safari/537.36";
const DESKTOP_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Deterministic environment with a counter on the rendering/audio probes.
#[derive(Clone)]
pub struct FixedSource {
    user_agent: String,
    platform: String,
    vendor: String,
    timezone: String,
    probes: bool,
    install: InstallSignals,
    calls: Rc<Cell<usize>>,
}

impl FixedSource {
    pub fn iphone() -> Self {
        Self {
            user_agent: IPHONE_UA.to_string(),
            platform: "iPhone".to_string(),
            vendor: "Apple Computer, Inc.".to_string(),
            timezone: "Europe/Warsaw".to_string(),
            probes: true,
            install: InstallSignals::default(),
            calls: Rc::new(Cell::new(0)),
        }
    }

    pub fn android() -> Self {
        Self {
            user_agent: ANDROID_UA.to_string(),
            platform: "Linux armv8l".to_string(),
            vendor: "Google Inc.".to_string(),
            ..Self::iphone()
        }
    }

    pub fn desktop() -> Self {
        Self {
            user_agent: DESKTOP_UA.to_string(),
            platform: "Linux x86_64".to_string(),
            vendor: "Google Inc.".to_string(),
            ..Self::iphone()
        }
    }

    pub fn standalone(mut self, standalone: bool) -> Self {
        self.install.display_mode_standalone = standalone;
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn with_timezone(mut self, timezone: &str) -> Self {
        self.timezone = timezone.to_string();
        self
    }

    /// Every fallible probe fails.
    pub fn without_probes(mut self) -> Self {
        self.probes = false;
        self
    }

    pub fn probe_calls(&self) -> usize {
        self.calls.get()
    }

    pub fn call_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.calls)
    }

    fn probe<T>(&self, name: &'static str, value: T) -> Result<T, ProbeError> {
        self.calls.set(self.calls.get() + 1);
        if self.probes {
            Ok(value)
        } else {
            Err(ProbeError::Unavailable(name))
        }
    }
}

#[async_trait(?Send)]
impl SignalSource for FixedSource {
    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }

    fn language(&self) -> String {
        "pl-PL".to_string()
    }

    fn platform(&self) -> String {
        self.platform.clone()
    }

    fn screen_resolution(&self) -> Resolution {
        Resolution::new(390, 844)
    }

    fn color_depth(&self) -> u32 {
        24
    }

    fn timezone(&self) -> String {
        self.timezone.clone()
    }

    fn max_touch_points(&self) -> u32 {
        5
    }

    fn vendor(&self) -> String {
        self.vendor.clone()
    }

    fn render_canvas(&self, _scene: &CanvasScene) -> Result<String, ProbeError> {
        self.probe("canvas", "data:image/png;base64,AAAA".to_string())
    }

    fn gpu_info(&self) -> Result<GpuInfo, ProbeError> {
        self.probe(
            "webgl",
            GpuInfo {
                vendor: "Apple Inc.".to_string(),
                renderer: "Apple GPU".to_string(),
                version: "WebGL 1.0".to_string(),
            },
        )
    }

    async fn audio_spectrum(&self, bins: usize) -> Result<Vec<f32>, ProbeError> {
        let spectrum = vec![-100.0, -101.5, f32::NEG_INFINITY];
        self.probe("audio", spectrum.into_iter().take(bins).collect())
    }

    fn install_signals(&self) -> InstallSignals {
        self.install.clone()
    }

    async fn battery(&self) -> Result<BatteryStatus, ProbeError> {
        if self.probes {
            Ok(BatteryStatus {
                level: 0.8,
                charging: true,
            })
        } else {
            Err(ProbeError::Unavailable("battery status"))
        }
    }

    fn font_available(&self, font: &str) -> Result<bool, ProbeError> {
        if self.probes {
            Ok(matches!(font, "Arial" | "Georgia"))
        } else {
            Err(ProbeError::Unavailable("font loading API"))
        }
    }
}

/// Backend whose every operation fails, like storage disabled by the visitor.
pub struct FailingStorage;

impl StorageBackend for FailingStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, String> {
        Err("storage disabled".to_string())
    }

    fn put(&self, _key: &str, _value: &str) -> Result<(), String> {
        Err("storage disabled".to_string())
    }

    fn remove(&self, _key: &str) -> Result<(), String> {
        Err("storage disabled".to_string())
    }
}
