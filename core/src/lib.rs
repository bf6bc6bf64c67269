// DevGate core: device-gating decision pipeline
//
// Decides whether a page shows its content, a block notice, or an
// install prompt, based on the platform, a locally computed device
// fingerprint, and whether the page runs as an installed app.
//
// Not a security boundary. The fingerprint is computed and checked on the
// client and is trivially spoofable; this is channel gating and casual-copy
// deterrence only.

pub mod approval;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod gate;
pub mod guards;
pub mod install;
pub mod platform;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use approval::ApprovalRegistry;
pub use config::{ApprovalPolicy, GateConfig, GuardToggles, NoticeTemplates, ProbeConfig, StorageFailurePolicy};
pub use error::{ConfigError, GateError, ProbeError};
pub use fingerprint::{
    AuxiliarySignals, BatteryStatus, CanvasScene, DeviceSignalRecord, DrawOp, FingerprintToken,
    GpuInfo, Resolution, SignalSource,
};
pub use gate::{AccessDecision, AccessGate, GateState, GateView};
pub use guards::{install_guards, GuardHost, GuardPlan, GuardReport};
pub use install::{is_standalone, InstallSignals};
pub use platform::{Platform, PlatformKind};
pub use store::{FingerprintStore, MemoryStorage, StorageBackend, TrustOutcome};

/// Library version string.
pub fn version() -> &'static str {
    concat!("devgate-core ", env!("CARGO_PKG_VERSION"))
}
