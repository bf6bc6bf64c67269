//! Access gate: platform, fingerprint and installation checks composed into
//! one decision, then handed to the view.
//!
//! The gate conceals content before anything else and only calls the view
//! once the (possibly asynchronous) fingerprint evaluation has resolved, so
//! granted content never flashes before the decision.

use crate::approval::ApprovalRegistry;
use crate::config::{ApprovalPolicy, GateConfig, StorageFailurePolicy};
use crate::fingerprint::{self, AuxiliarySignals, FingerprintToken, SignalSource};
use crate::install::is_standalone;
use crate::platform::{Platform, PlatformKind};
use crate::store::{FingerprintStore, StorageBackend};
use crate::GateError;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::sync::Arc;

// ============================================================================
// DECISION & STATE
// ============================================================================

/// Final outcome of one evaluation. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessDecision {
    DeniedNotMobile,
    DeniedUnknownDevice,
    DeniedNotInstalled,
    Granted,
}

impl AccessDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeniedNotMobile => "denied-not-mobile",
            Self::DeniedUnknownDevice => "denied-unknown-device",
            Self::DeniedNotInstalled => "denied-not-installed",
            Self::Granted => "granted",
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

impl std::fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of the current evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Init,
    PlatformChecked,
    FingerprintChecked,
    InstallationChecked,
    Done(AccessDecision),
}

/// Presentation side of the gate. Receives the outcome kind only.
#[cfg_attr(test, mockall::automock)]
pub trait GateView {
    /// Hide content while the decision is pending.
    fn conceal(&self) -> Result<(), String>;
    /// Replace all content with the mobile-only notice.
    fn show_mobile_only(&self) -> Result<(), String>;
    /// Keep content hidden and insert the no-access notice before it.
    fn block_unknown_device(&self) -> Result<(), String>;
    /// Keep content hidden and insert the add-to-home-screen notice.
    fn prompt_install(&self) -> Result<(), String>;
    /// Make content visible.
    fn reveal(&self) -> Result<(), String>;
}

// ============================================================================
// ACCESS GATE
// ============================================================================

pub struct AccessGate {
    config: GateConfig,
    source: Arc<dyn SignalSource>,
    store: FingerprintStore,
    approvals: ApprovalRegistry,
    state: Cell<GateState>,
}

impl AccessGate {
    pub fn new(
        config: GateConfig,
        source: Arc<dyn SignalSource>,
        backend: Arc<dyn StorageBackend>,
    ) -> Result<Self, GateError> {
        config.validate()?;
        let store = FingerprintStore::new(backend, config.storage_key.clone());
        let approvals = ApprovalRegistry::from_table(&config.approval.approved);
        Ok(Self {
            config,
            source,
            store,
            approvals,
            state: Cell::new(GateState::Init),
        })
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn state(&self) -> GateState {
        self.state.get()
    }

    pub fn store(&self) -> &FingerprintStore {
        &self.store
    }

    pub fn approvals(&self) -> &ApprovalRegistry {
        &self.approvals
    }

    pub fn platform(&self) -> Platform {
        Platform::detect(&self.source.user_agent())
    }

    /// Token of the current device, `None` off mobile.
    pub async fn current_token(&self) -> Result<Option<FingerprintToken>, GateError> {
        fingerprint::current_token(self.source.as_ref(), &self.platform(), &self.config.probe).await
    }

    pub async fn auxiliary_signals(&self) -> AuxiliarySignals {
        fingerprint::collect_auxiliary(self.source.as_ref(), &self.config.probe).await
    }

    /// Run every check and return the decision, without touching the view.
    pub async fn evaluate(&self) -> AccessDecision {
        self.state.set(GateState::Init);

        let platform = self.platform();
        if !platform.is_mobile() {
            return self.finish(AccessDecision::DeniedNotMobile);
        }
        self.state.set(GateState::PlatformChecked);

        if !self.fingerprint_granted(&platform).await {
            return self.finish(AccessDecision::DeniedUnknownDevice);
        }
        self.state.set(GateState::FingerprintChecked);

        let standalone = is_standalone(&self.source.install_signals());
        self.state.set(GateState::InstallationChecked);

        // Android is never asked to install.
        if platform.kind() == PlatformKind::Ios && !standalone {
            return self.finish(AccessDecision::DeniedNotInstalled);
        }
        self.finish(AccessDecision::Granted)
    }

    /// Conceal, evaluate, then apply exactly one view effect.
    pub async fn run(&self, view: &dyn GateView) -> AccessDecision {
        if let Err(e) = view.conceal() {
            tracing::warn!("Could not conceal content: {}", e);
        }
        let decision = self.evaluate().await;
        apply(view, decision);
        decision
    }

    async fn fingerprint_granted(&self, platform: &Platform) -> bool {
        let token = match fingerprint::current_token(
            self.source.as_ref(),
            platform,
            &self.config.probe,
        )
        .await
        {
            Ok(Some(token)) => token,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!("Fingerprint could not be encoded: {}", e);
                return false;
            }
        };

        let outcome = match self.config.approval.policy {
            ApprovalPolicy::TrustOnFirstUse => self.store.evaluate(&token),
            ApprovalPolicy::AllowList => self
                .store
                .evaluate_with(&token, |t| self.approvals.is_approved(t)),
        };

        match outcome {
            Ok(outcome) => {
                tracing::debug!("Trust outcome for {}: {:?}", token.short_id(), outcome);
                outcome.is_granted()
            }
            Err(e) => {
                let open = self.config.storage_failure == StorageFailurePolicy::FailOpen;
                tracing::warn!(
                    "Trusted-token slot unavailable ({}); failing {}",
                    e,
                    if open { "open" } else { "closed" }
                );
                open
            }
        }
    }

    fn finish(&self, decision: AccessDecision) -> AccessDecision {
        self.state.set(GateState::Done(decision));
        tracing::info!("Access decision: {}", decision);
        decision
    }
}

/// Map a decision onto its single view effect.
pub fn apply(view: &dyn GateView, decision: AccessDecision) {
    let result = match decision {
        AccessDecision::DeniedNotMobile => view.show_mobile_only(),
        AccessDecision::DeniedUnknownDevice => view.block_unknown_device(),
        AccessDecision::DeniedNotInstalled => view.prompt_install(),
        AccessDecision::Granted => view.reveal(),
    };
    if let Err(e) = result {
        tracing::warn!("View update for {} failed: {}", decision, e);
    }
}
