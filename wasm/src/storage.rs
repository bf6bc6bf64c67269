// localStorage backend for the trusted-token slot
//
// `window.localStorage` can be missing or throw (private browsing, storage
// disabled by the visitor). The backend is still constructed in that case and
// reports every operation as an error, leaving the decision to the gate's
// storage failure policy.

use devgate_core::StorageBackend;
use wasm_bindgen::JsValue;
use web_sys::Storage;

const UNAVAILABLE: &str = "localStorage unavailable";

fn storage_err(e: JsValue) -> String {
    format!("localStorage: {:?}", e)
}

pub struct LocalStorageBackend {
    storage: Option<Storage>,
}

impl LocalStorageBackend {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|window| match window.local_storage() {
            Ok(storage) => storage,
            Err(e) => {
                tracing::warn!("localStorage access denied: {:?}", e);
                None
            }
        });
        Self { storage }
    }

    pub fn is_available(&self) -> bool {
        self.storage.is_some()
    }

    fn storage(&self) -> Result<&Storage, String> {
        self.storage.as_ref().ok_or_else(|| UNAVAILABLE.to_string())
    }
}

impl Default for LocalStorageBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for LocalStorageBackend {
    fn get(&self, key: &str) -> Result<Option<String>, String> {
        self.storage()?.get_item(key).map_err(storage_err)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), String> {
        self.storage()?.set_item(key, value).map_err(storage_err)
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        self.storage()?.remove_item(key).map_err(storage_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_local_storage_roundtrip() {
        let backend = LocalStorageBackend::new();
        assert!(backend.is_available());

        backend.put("devgate-test", "token").unwrap();
        assert_eq!(backend.get("devgate-test").unwrap().as_deref(), Some("token"));
        backend.remove("devgate-test").unwrap();
        assert_eq!(backend.get("devgate-test").unwrap(), None);
    }
}
