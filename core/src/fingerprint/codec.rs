// Token codec: canonical JSON of the record, then standard base64

use super::record::DeviceSignalRecord;
use crate::error::GateError;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Opaque, equality-comparable device token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FingerprintToken(String);

impl FingerprintToken {
    /// Wrap a token read back from storage or configuration.
    pub fn from_stored(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Short hex digest safe to put in logs instead of the token itself.
    pub fn short_id(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(&digest[..6])
    }
}

impl fmt::Display for FingerprintToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FingerprintToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Serialize a record into its token. Field order is fixed by the struct
/// definition, so equal records always give byte-identical tokens.
pub fn encode(record: &DeviceSignalRecord) -> Result<FingerprintToken, GateError> {
    let json = serde_json::to_string(record).map_err(|e| GateError::Encoding(e.to_string()))?;
    Ok(FingerprintToken(B64.encode(json.as_bytes())))
}

/// Inverse of [`encode`].
pub fn decode(token: &FingerprintToken) -> Result<DeviceSignalRecord, GateError> {
    let bytes = B64
        .decode(token.as_str().as_bytes())
        .map_err(|e| GateError::MalformedToken(format!("base64: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| GateError::MalformedToken(format!("json: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::record::{GpuInfo, Resolution};
    use proptest::prelude::*;

    fn sample() -> DeviceSignalRecord {
        DeviceSignalRecord {
            user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X)".into(),
            language: "pl-PL".into(),
            platform: "iPhone".into(),
            resolution: Resolution::new(390, 844),
            color_depth: 24,
            timezone: "Europe/Warsaw".into(),
            touch_points: 5,
            vendor: "Apple Computer, Inc.".into(),
            is_ios: true,
            canvas: Some("data:image/png;base64,iVBORw0KGgo=".into()),
            webgl: Some(GpuInfo {
                vendor: "WebKit".into(),
                renderer: "Apple GPU".into(),
                version: "WebGL 1.0".into(),
            }),
            audio: None,
        }
    }

    #[test]
    fn test_canonical_json_layout() {
        let token = encode(&sample()).unwrap();
        let json = String::from_utf8(B64.decode(token.as_str()).unwrap()).unwrap();
        assert!(json.starts_with(r#"{"userAgent":"#));
        let order = [
            "userAgent", "language", "platform", "resolution", "colorDepth", "timezone",
            "touchPoints", "vendor", "isIOS", "canvas", "webgl", "audio",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|k| json.find(&format!("\"{k}\":")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(json.contains(r#""resolution":"390x844""#));
        assert!(json.ends_with(r#""audio":null}"#));
    }

    #[test]
    fn test_decode_inverts_encode() {
        let record = sample();
        let token = encode(&record).unwrap();
        assert_eq!(decode(&token).unwrap(), record);
    }

    #[test]
    fn test_different_devices_differ() {
        let mut other = sample();
        other.timezone = "Europe/Berlin".into();
        assert_ne!(encode(&sample()).unwrap(), encode(&other).unwrap());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode(&FingerprintToken::from_stored("!!not base64!!")),
            Err(GateError::MalformedToken(_))
        ));
        let not_json = FingerprintToken::from_stored(B64.encode("hello"));
        assert!(matches!(decode(&not_json), Err(GateError::MalformedToken(_))));
    }

    #[test]
    fn test_short_id_is_stable_and_short() {
        let token = encode(&sample()).unwrap();
        assert_eq!(token.short_id(), token.clone().short_id());
        assert_eq!(token.short_id().len(), 12);
    }

    proptest! {
        #[test]
        fn prop_encoding_is_deterministic_and_reversible(
            ua in ".{0,64}",
            tz in "[A-Za-z/_]{1,24}",
            w in 1u32..5000,
            h in 1u32..5000,
            touch in 0u32..11,
            audio in proptest::option::of("[-0-9.,]{0,40}"),
        ) {
            let mut record = sample();
            record.user_agent = ua;
            record.timezone = tz;
            record.resolution = Resolution::new(w, h);
            record.touch_points = touch;
            record.audio = audio;

            let first = encode(&record).unwrap();
            let second = encode(&record.clone()).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(decode(&first).unwrap(), record);
        }
    }
}
