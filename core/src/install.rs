// Installation mode detection (home-screen app vs. browser tab)

use serde::{Deserialize, Serialize};

/// Referrer prefix used when an Android app wrapper (TWA) launches the page.
pub const APP_REFERRER_MARKER: &str = "android-app://";

/// Raw inputs for the standalone check, read once from the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallSignals {
    /// `(display-mode: standalone)` media query matched
    pub display_mode_standalone: bool,
    /// iOS `navigator.standalone`; absent on other platforms
    pub navigator_standalone: Option<bool>,
    pub referrer: String,
}

/// True when the page runs as an installed/standalone app.
pub fn is_standalone(signals: &InstallSignals) -> bool {
    signals.display_mode_standalone
        || signals.navigator_standalone.unwrap_or(false)
        || signals.referrer.contains(APP_REFERRER_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_tab_is_not_standalone() {
        assert!(!is_standalone(&InstallSignals::default()));
        assert!(!is_standalone(&InstallSignals {
            navigator_standalone: Some(false),
            referrer: "https://example.org/".into(),
            ..Default::default()
        }));
    }

    #[test]
    fn test_any_signal_means_standalone() {
        assert!(is_standalone(&InstallSignals {
            display_mode_standalone: true,
            ..Default::default()
        }));
        assert!(is_standalone(&InstallSignals {
            navigator_standalone: Some(true),
            ..Default::default()
        }));
        assert!(is_standalone(&InstallSignals {
            referrer: "android-app://com.example.twa/".into(),
            ..Default::default()
        }));
    }
}
