//! Operator configuration for the gate
//!
//! Everything the page operator can tune without rebuilding:
//! - Storage key of the trusted-token slot
//! - Canvas/audio probe parameters (changing them invalidates stored tokens)
//! - Approval policy and the static allow-list
//! - Storage failure policy
//! - Notice markup and anti-copy guard toggles

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_STORAGE_KEY: &str = "deviceFingerprint";

// ============================================================================
// ENUMS
// ============================================================================

/// How a device with an empty trusted-token slot is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApprovalPolicy {
    /// Any first-seen token becomes trusted.
    TrustOnFirstUse,
    /// Only tokens listed in the approval table may become trusted.
    AllowList,
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self::TrustOnFirstUse
    }
}

/// What the gate does when the trusted-token slot cannot be read or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StorageFailurePolicy {
    /// Deny as an unknown device.
    FailClosed,
    /// Let the fingerprint check pass.
    FailOpen,
}

impl Default for StorageFailurePolicy {
    fn default() -> Self {
        Self::FailClosed
    }
}

// ============================================================================
// SECTIONS
// ============================================================================

/// Parameters of the environment probes. They are part of what makes a
/// token stable, so they must not change between visits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProbeConfig {
    /// Width and height of the offscreen canvas, in pixels
    pub canvas_size: u32,
    pub canvas_text: String,
    pub canvas_font: String,
    /// Number of leading frequency bins kept from the audio analyser
    pub audio_bins: usize,
    /// Fonts checked by the auxiliary font probe
    pub font_candidates: Vec<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            canvas_size: 200,
            canvas_text: "mObywatel2.0".to_string(),
            canvas_font: "14px 'Arial'".to_string(),
            audio_bins: 10,
            font_candidates: ["Arial", "Times New Roman", "Courier", "Verdana", "Georgia"]
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }
}

/// Approval table plus the policy that decides whether it is consulted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApprovalConfig {
    pub policy: ApprovalPolicy,
    /// token -> approved. Anything absent or `false` is not approved.
    pub approved: BTreeMap<String, bool>,
}

/// Fixed markup injected for each denial. The gate never interpolates
/// anything into these strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NoticeTemplates {
    pub mobile_only: String,
    pub no_access: String,
    pub install_prompt: String,
}

impl Default for NoticeTemplates {
    fn default() -> Self {
        Self {
            mobile_only: concat!(
                r#"<div style="text-align: center; padding: 20px;">"#,
                "<h2>Mobile devices only</h2>",
                "<p>This page is only available on mobile devices.</p>",
                "</div>"
            )
            .to_string(),
            no_access: concat!(
                r#"<div style="display: flex; justify-content: center; align-items: center; height: 100vh;">"#,
                r#"<div style="text-align: center; padding: 20px;">"#,
                "<h2>No access</h2>",
                "<p>You are not allowed to view this page.</p>",
                "</div></div>"
            )
            .to_string(),
            install_prompt: concat!(
                r#"<div style="position: fixed; inset: 0; display: flex; align-items: center; justify-content: center; text-align: center;">"#,
                r#"<div style="padding: 20px; max-width: 90%;">"#,
                "<h2>Add to Home Screen required</h2>",
                "<p>To continue:<br>1. Tap the Share icon<br>",
                "2. Choose \"Add to Home Screen\"<br>",
                "3. Open the app from your home screen</p>",
                "</div></div>"
            )
            .to_string(),
        }
    }
}

/// Which best-effort anti-copy deterrents are installed at load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuardToggles {
    pub block_print: bool,
    pub suppress_unload_prompt: bool,
    pub protect_images: bool,
}

impl Default for GuardToggles {
    fn default() -> Self {
        Self {
            block_print: true,
            suppress_unload_prompt: true,
            protect_images: true,
        }
    }
}

// ============================================================================
// GATE CONFIG
// ============================================================================

/// Complete gate configuration. Every field has a default, so an empty
/// JS object (or none at all) yields the stock behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GateConfig {
    /// Durable storage key of the trusted-token slot
    pub storage_key: String,
    /// Element id of the content container; `None` means the document body
    pub content_root: Option<String>,
    pub probe: ProbeConfig,
    pub approval: ApprovalConfig,
    pub storage_failure: StorageFailurePolicy,
    pub notices: NoticeTemplates,
    pub guards: GuardToggles,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            content_root: None,
            probe: ProbeConfig::default(),
            approval: ApprovalConfig::default(),
            storage_failure: StorageFailurePolicy::default(),
            notices: NoticeTemplates::default(),
            guards: GuardToggles::default(),
        }
    }
}

impl GateConfig {
    /// Parse a JSON document, filling gaps with defaults, and validate it.
    pub fn from_json(json: &str) -> Result<Self, crate::GateError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| crate::GateError::Encoding(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        if self.probe.canvas_size == 0 {
            return Err(ConfigError::ZeroCanvasSize);
        }
        if self.probe.audio_bins == 0 {
            return Err(ConfigError::ZeroAudioBins);
        }
        if self.approval.policy == ApprovalPolicy::AllowList
            && !self.approval.approved.values().any(|approved| *approved)
        {
            return Err(ConfigError::EmptyAllowList);
        }
        Ok(())
    }
}
