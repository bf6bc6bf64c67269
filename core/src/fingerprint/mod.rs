// Device fingerprint: signal collection and token encoding

pub mod codec;
pub mod collector;
pub mod record;

pub use codec::{decode, encode, FingerprintToken};
pub use collector::{
    audio_signature, collect, collect_auxiliary, CanvasScene, DrawOp, SignalSource,
};
pub use record::{AuxiliarySignals, BatteryStatus, DeviceSignalRecord, GpuInfo, Resolution};

use crate::config::ProbeConfig;
use crate::error::GateError;
use crate::platform::Platform;

/// Collect and encode in one step. `Ok(None)` on non-mobile platforms.
pub async fn current_token(
    source: &dyn SignalSource,
    platform: &Platform,
    probe: &ProbeConfig,
) -> Result<Option<FingerprintToken>, GateError> {
    match collect(source, platform, probe).await {
        Some(record) => encode(&record).map(Some),
        None => Ok(None),
    }
}
