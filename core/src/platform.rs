//! Mobile platform classification from the user-agent string.
//!
//! The two families are matched independently. A user agent that satisfies
//! both patterns keeps both flags set and [`Platform::kind`] resolves it to
//! Android, which exempts it from the install requirement.

use serde::{Deserialize, Serialize};

const ANDROID_SIGNATURE: &str = "android";
const IOS_SIGNATURES: [&str; 3] = ["iPad", "iPhone", "iPod"];

/// Coarse platform family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    Android,
    Ios,
    Other,
}

impl std::fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Android => write!(f, "Android"),
            Self::Ios => write!(f, "iOS"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// Result of matching a user agent against both mobile families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Platform {
    pub android: bool,
    pub ios: bool,
}

impl Platform {
    /// Classify a user-agent string. Android matching ignores case, iOS
    /// device names are matched as written.
    pub fn detect(user_agent: &str) -> Self {
        Self {
            android: user_agent.to_ascii_lowercase().contains(ANDROID_SIGNATURE),
            ios: IOS_SIGNATURES.iter().any(|sig| user_agent.contains(sig)),
        }
    }

    pub fn is_mobile(&self) -> bool {
        self.android || self.ios
    }

    pub fn kind(&self) -> PlatformKind {
        if self.android {
            PlatformKind::Android
        } else if self.ios {
            PlatformKind::Ios
        } else {
            PlatformKind::Other
        }
    }
}
