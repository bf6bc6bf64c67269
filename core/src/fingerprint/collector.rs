// Fingerprint collection: environment probes folded into a DeviceSignalRecord
//
// Every fallible probe degrades to an absent field. Collection itself never
// fails; it only declines to run on non-mobile platforms.

use super::record::{AuxiliarySignals, BatteryStatus, DeviceSignalRecord, GpuInfo, Resolution};
use crate::config::ProbeConfig;
use crate::error::ProbeError;
use crate::install::InstallSignals;
use crate::platform::Platform;
use async_trait::async_trait;

// ============================================================================
// CANVAS SCENE
// ============================================================================

/// One drawing step of the canvas probe.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        color: &'static str,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    FillText {
        color: &'static str,
        x: f64,
        y: f64,
    },
}

/// Fixed scene rendered by the canvas probe. Everything here is constant for
/// a given [`ProbeConfig`] so the same font/driver stack reproduces the same
/// pixels on every visit.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasScene {
    pub size: u32,
    pub font: String,
    pub text: String,
    pub text_baseline: &'static str,
    pub ops: Vec<DrawOp>,
}

impl CanvasScene {
    pub fn from_config(probe: &ProbeConfig) -> Self {
        Self {
            size: probe.canvas_size,
            font: probe.canvas_font.clone(),
            text: probe.canvas_text.clone(),
            text_baseline: "alphabetic",
            ops: vec![
                DrawOp::FillRect {
                    color: "#f60",
                    x: 125.0,
                    y: 1.0,
                    width: 62.0,
                    height: 20.0,
                },
                DrawOp::FillText {
                    color: "#069",
                    x: 2.0,
                    y: 15.0,
                },
                DrawOp::FillText {
                    color: "rgba(102, 204, 0, 0.7)",
                    x: 4.0,
                    y: 17.0,
                },
            ],
        }
    }
}

// ============================================================================
// SIGNAL SOURCE
// ============================================================================

/// Read access to the runtime environment.
///
/// The browser adapter implements this over `navigator`, `screen`, canvas,
/// WebGL and Web Audio; tests implement it with fixed values. Plain getters
/// are infallible (the browser always answers them); the rendering and
/// audio probes may fail and are isolated by the collector.
#[async_trait(?Send)]
pub trait SignalSource {
    fn user_agent(&self) -> String;
    fn language(&self) -> String;
    fn platform(&self) -> String;
    fn screen_resolution(&self) -> Resolution;
    fn color_depth(&self) -> u32;
    /// IANA name of the resolved time zone
    fn timezone(&self) -> String;
    fn max_touch_points(&self) -> u32;
    fn vendor(&self) -> String;

    /// Render `scene` offscreen and return its pixel encoding.
    fn render_canvas(&self, scene: &CanvasScene) -> Result<String, ProbeError>;

    /// Vendor/renderer/version of the 3-D context.
    fn gpu_info(&self) -> Result<GpuInfo, ProbeError>;

    /// Play a short tone through an offscreen audio graph and return the
    /// first `bins` frequency magnitudes. Must release the audio context.
    async fn audio_spectrum(&self, bins: usize) -> Result<Vec<f32>, ProbeError>;

    fn install_signals(&self) -> InstallSignals;

    async fn battery(&self) -> Result<BatteryStatus, ProbeError> {
        Err(ProbeError::Unavailable("battery status"))
    }

    fn font_available(&self, _font: &str) -> Result<bool, ProbeError> {
        Err(ProbeError::Unavailable("font loading API"))
    }
}

// ============================================================================
// COLLECTION
// ============================================================================

/// Render analyser bins the way the browser's number-to-string does, so the
/// signature text matches tokens produced by the plain-script page.
pub fn audio_signature(bins: &[f32]) -> String {
    bins.iter()
        .map(|&v| {
            if v.is_nan() {
                "NaN".to_string()
            } else if v == f32::INFINITY {
                "Infinity".to_string()
            } else if v == f32::NEG_INFINITY {
                "-Infinity".to_string()
            } else {
                format!("{}", v as f64)
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn degrade<T>(probe: &'static str, result: Result<T, ProbeError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("{} probe unavailable: {}", probe, e);
            None
        }
    }
}

/// Collect the device record, or `None` when the platform is not mobile.
pub async fn collect(
    source: &dyn SignalSource,
    platform: &Platform,
    probe: &ProbeConfig,
) -> Option<DeviceSignalRecord> {
    if !platform.is_mobile() {
        return None;
    }

    let scene = CanvasScene::from_config(probe);
    let canvas = degrade("canvas", source.render_canvas(&scene));
    let webgl = degrade("webgl", source.gpu_info());
    let audio = degrade("audio", source.audio_spectrum(probe.audio_bins).await)
        .map(|bins| audio_signature(&bins[..bins.len().min(probe.audio_bins)]));

    Some(DeviceSignalRecord {
        user_agent: source.user_agent(),
        language: source.language(),
        platform: source.platform(),
        resolution: source.screen_resolution(),
        color_depth: source.color_depth(),
        timezone: source.timezone(),
        touch_points: source.max_touch_points(),
        vendor: source.vendor(),
        is_ios: platform.ios,
        canvas,
        webgl,
        audio,
    })
}

/// Battery and installed-font signals. Not part of the token.
pub async fn collect_auxiliary(source: &dyn SignalSource, probe: &ProbeConfig) -> AuxiliarySignals {
    let battery = degrade("battery", source.battery().await);
    let fonts = probe
        .font_candidates
        .iter()
        .filter(|font| degrade("font", source.font_available(font)).unwrap_or(false))
        .cloned()
        .collect();

    AuxiliarySignals { battery, fonts }
}
