// Device signal record: the fixed-shape input to the token codec

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Screen dimensions, serialized as `"<width>x<height>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once('x')
            .ok_or_else(|| format!("resolution {s:?} is not WxH"))?;
        let width = w.parse().map_err(|_| format!("bad width in {s:?}"))?;
        let height = h.parse().map_err(|_| format!("bad height in {s:?}"))?;
        Ok(Self { width, height })
    }
}

impl From<Resolution> for String {
    fn from(r: Resolution) -> Self {
        r.to_string()
    }
}

impl TryFrom<String> for Resolution {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Graphics driver identification read from a 3-D rendering context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuInfo {
    pub vendor: String,
    pub renderer: String,
    pub version: String,
}

/// All signals that feed the device token.
///
/// Field order is the serialization order and therefore part of the token
/// format; do not reorder. Key names match the tokens already held in
/// visitors' storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSignalRecord {
    pub user_agent: String,
    pub language: String,
    pub platform: String,
    pub resolution: Resolution,
    pub color_depth: u32,
    pub timezone: String,
    pub touch_points: u32,
    pub vendor: String,
    #[serde(rename = "isIOS")]
    pub is_ios: bool,
    /// Data URL of the rendered probe scene
    pub canvas: Option<String>,
    pub webgl: Option<GpuInfo>,
    /// Comma-joined leading analyser bins
    pub audio: Option<String>,
}

/// Battery state as reported by the Battery Status API.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryStatus {
    pub level: f64,
    pub charging: bool,
}

/// Signals gathered alongside the record but kept out of the token: they
/// change between visits (battery) or duplicate canvas entropy (fonts).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuxiliarySignals {
    pub battery: Option<BatteryStatus>,
    pub fonts: Vec<String>,
}
