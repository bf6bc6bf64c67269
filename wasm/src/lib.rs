// devgate-wasm: WebAssembly bindings for the device gate

pub mod environment;
pub mod guards;
pub mod storage;
pub mod view;

use crate::environment::BrowserSignals;
use crate::guards::DomGuards;
use crate::storage::LocalStorageBackend;
use crate::view::DomView;
use anyhow::Context;
use devgate_core::{install_guards, AccessGate, AuxiliarySignals, GateConfig, GuardPlan};
use std::rc::Rc;
use std::sync::Arc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

#[wasm_bindgen]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    // A second gate on the same page keeps the first subscriber.
    let _ = tracing_wasm::try_set_as_global_default();
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{:#}", e))
}

fn parse_config(value: JsValue) -> anyhow::Result<GateConfig> {
    if value.is_undefined() || value.is_null() {
        return Ok(GateConfig::default());
    }
    let config: GateConfig =
        serde_wasm_bindgen::from_value(value).context("gate config is not a valid object")?;
    config.validate().context("gate config rejected")?;
    Ok(config)
}

#[wasm_bindgen]
pub struct DeviceGate {
    gate: Rc<AccessGate>,
}

#[wasm_bindgen]
impl DeviceGate {
    /// Build a gate from an optional plain config object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<DeviceGate, JsValue> {
        init_logging();
        let config = parse_config(config).map_err(to_js)?;
        let source = BrowserSignals::new().map_err(to_js)?;
        let backend = LocalStorageBackend::new();
        if !backend.is_available() {
            tracing::warn!("Trusted-token slot has no durable storage");
        }
        let gate = AccessGate::new(config, Arc::new(source), Arc::new(backend)).map_err(to_js)?;
        Ok(Self {
            gate: Rc::new(gate),
        })
    }

    /// Evaluate the device and update the page. Resolves to the decision
    /// name once the view has been updated.
    pub fn run(&self) -> Result<js_sys::Promise, JsValue> {
        let view = self.view().map_err(to_js)?;
        let gate = Rc::clone(&self.gate);
        Ok(future_to_promise(async move {
            let decision = gate.run(&view).await;
            Ok(JsValue::from_str(decision.as_str()))
        }))
    }

    /// Evaluate without touching the page.
    pub fn evaluate(&self) -> js_sys::Promise {
        let gate = Rc::clone(&self.gate);
        future_to_promise(async move {
            let decision = gate.evaluate().await;
            Ok(JsValue::from_str(decision.as_str()))
        })
    }

    /// Token of this device, or `undefined` off mobile.
    #[wasm_bindgen(js_name = currentFingerprint)]
    pub fn current_fingerprint(&self) -> js_sys::Promise {
        let gate = Rc::clone(&self.gate);
        future_to_promise(async move {
            match gate.current_token().await.map_err(to_js)? {
                Some(token) => Ok(JsValue::from_str(token.as_str())),
                None => Ok(JsValue::UNDEFINED),
            }
        })
    }

    /// Forget the trusted device; the next visit trusts whoever comes first.
    #[wasm_bindgen(js_name = resetTrustedDevice)]
    pub fn reset_trusted_device(&self) -> Result<(), JsValue> {
        self.gate.store().clear().map_err(to_js)
    }

    #[wasm_bindgen(js_name = isApproved)]
    pub fn is_approved(&self, token: String) -> bool {
        self.gate
            .approvals()
            .is_approved(&devgate_core::FingerprintToken::from_stored(token))
    }

    /// Platform, token id and auxiliary signals, for support screens.
    #[wasm_bindgen(js_name = collectDiagnostics)]
    pub fn collect_diagnostics(&self) -> js_sys::Promise {
        let gate = Rc::clone(&self.gate);
        future_to_promise(async move {
            let platform = gate.platform();
            let token = gate.current_token().await.map_err(to_js)?;
            let trusted = gate.store().load().ok().flatten();
            let diagnostics = WasmDiagnostics {
                platform: platform.kind().to_string(),
                token_id: token.as_ref().map(|t| t.short_id()),
                trusted_id: trusted.as_ref().map(|t| t.short_id()),
                auxiliary: gate.auxiliary_signals().await,
            };
            serde_wasm_bindgen::to_value(&diagnostics).map_err(to_js)
        })
    }

    /// Install every configured anti-copy guard now. Returns the report.
    #[wasm_bindgen(js_name = installGuards)]
    pub fn install_guards(&self) -> Result<JsValue, JsValue> {
        let host = DomGuards::new().map_err(to_js)?;
        let report = install_guards(&host, &self.guard_plan());
        serde_wasm_bindgen::to_value(&WasmGuardReport {
            installed: report.installed,
            failed: report.failed,
            images_protected: report.images_protected,
        })
        .map_err(to_js)
    }

    pub fn state(&self) -> String {
        format!("{:?}", self.gate.state())
    }
}

impl DeviceGate {
    fn view(&self) -> Result<DomView, String> {
        let config = self.gate.config();
        DomView::new(config.content_root.clone(), config.notices.clone())
    }

    fn guard_plan(&self) -> GuardPlan {
        GuardPlan::for_platform(&self.gate.platform(), &self.gate.config().guards)
    }
}

/// Page-load entry point.
///
/// Installs print/unload guards immediately, then once the document is
/// parsed protects images and runs the gate. Returns the gate for later
/// calls (diagnostics, reset).
#[wasm_bindgen(js_name = protectPage)]
pub fn protect_page(config: JsValue) -> Result<DeviceGate, JsValue> {
    let device_gate = DeviceGate::new(config)?;
    let plan = device_gate.guard_plan();
    let host = DomGuards::new().map_err(to_js)?;
    install_guards(&host, &plan.early());

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| to_js("no document"))?;
    let view = device_gate.view().map_err(to_js)?;
    let gate = Rc::clone(&device_gate.gate);

    let on_ready = move || {
        install_guards(&host, &plan.on_ready());
        spawn_local(async move {
            gate.run(&view).await;
        });
    };

    if document.ready_state() == "loading" {
        let handler = Closure::once(on_ready);
        document
            .add_event_listener_with_callback("DOMContentLoaded", handler.as_ref().unchecked_ref())?;
        handler.forget();
    } else {
        on_ready();
    }

    Ok(device_gate)
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct WasmDiagnostics {
    platform: String,
    token_id: Option<String>,
    trusted_id: Option<String>,
    auxiliary: AuxiliarySignals,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct WasmGuardReport {
    installed: Vec<&'static str>,
    failed: Vec<&'static str>,
    images_protected: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_gate_creation_with_defaults() {
        let gate = DeviceGate::new(JsValue::UNDEFINED).unwrap();
        assert_eq!(gate.state(), "Init");
    }

    #[wasm_bindgen_test]
    fn test_invalid_config_rejected() {
        let config = js_sys::Object::new();
        js_sys::Reflect::set(&config, &"storageKey".into(), &"".into()).unwrap();
        assert!(DeviceGate::new(config.into()).is_err());
    }

    #[wasm_bindgen_test]
    async fn test_headless_browser_is_not_mobile() {
        let gate = DeviceGate::new(JsValue::UNDEFINED).unwrap();
        let decision = wasm_bindgen_futures::JsFuture::from(gate.evaluate()).await.unwrap();
        assert_eq!(decision.as_string().as_deref(), Some("denied-not-mobile"));
    }
}
