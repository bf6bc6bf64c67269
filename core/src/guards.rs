//! Anti-copy deterrents installed at page load.
//!
//! These run independently of the access decision and are best-effort:
//! a guard that cannot be installed is logged and skipped, never fatal.

use crate::config::GuardToggles;
use crate::platform::Platform;

/// Page hooks the guards need. Implemented over the DOM in the wasm crate.
#[cfg_attr(test, mockall::automock)]
pub trait GuardHost {
    /// Cancel print initiation.
    fn block_print(&self) -> Result<(), String>;
    /// Clear any `beforeunload` prompt and stop its propagation.
    fn suppress_unload_prompt(&self) -> Result<(), String>;
    /// Disable drag, context menu and selection on every image. Returns
    /// how many images were covered.
    fn protect_images(&self) -> Result<usize, String>;
}

/// Which guards apply on this page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GuardPlan {
    pub block_print: bool,
    pub suppress_unload_prompt: bool,
    pub protect_images: bool,
}

impl GuardPlan {
    /// Unload-prompt suppression only applies on Android.
    pub fn for_platform(platform: &Platform, toggles: &GuardToggles) -> Self {
        Self {
            block_print: toggles.block_print,
            suppress_unload_prompt: toggles.suppress_unload_prompt && platform.android,
            protect_images: toggles.protect_images,
        }
    }

    /// Guards that can go in before the document has been parsed.
    pub fn early(&self) -> Self {
        Self {
            protect_images: false,
            ..*self
        }
    }

    /// Guards that need the parsed document.
    pub fn on_ready(&self) -> Self {
        Self {
            protect_images: self.protect_images,
            ..Self::default()
        }
    }
}

/// What [`install_guards`] managed to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardReport {
    pub installed: Vec<&'static str>,
    pub failed: Vec<&'static str>,
    pub images_protected: usize,
}

/// Install every planned guard. Failures are logged and recorded in the
/// report; nothing here can block rendering.
pub fn install_guards(host: &dyn GuardHost, plan: &GuardPlan) -> GuardReport {
    let mut report = GuardReport::default();

    if plan.block_print {
        report.record("print", host.block_print());
    }
    if plan.suppress_unload_prompt {
        report.record("unload", host.suppress_unload_prompt());
    }
    if plan.protect_images {
        let result = host.protect_images().map(|count| {
            report.images_protected = count;
        });
        report.record("images", result);
    }

    tracing::debug!("Guards installed: {:?}", report.installed);
    report
}

impl GuardReport {
    fn record(&mut self, name: &'static str, result: Result<(), String>) {
        match result {
            Ok(()) => self.installed.push(name),
            Err(e) => {
                tracing::warn!("Guard {} not installed: {}", name, e);
                self.failed.push(name);
            }
        }
    }
}
