// Browser signal source: navigator, screen, canvas, WebGL and Web Audio probes
//
// Every probe that touches an optional browser API returns a ProbeError
// instead of throwing, so the collector can drop just that field.

use async_trait::async_trait;
use devgate_core::{
    BatteryStatus, CanvasScene, DrawOp, GpuInfo, InstallSignals, ProbeError, Resolution,
    SignalSource,
};
use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    AudioContext, CanvasRenderingContext2d, Document, HtmlCanvasElement, Navigator,
    WebGlRenderingContext, Window,
};

const STANDALONE_QUERY: &str = "(display-mode: standalone)";

fn js_err(e: JsValue) -> ProbeError {
    ProbeError::Failed(format!("{:?}", e))
}

fn js_prop(target: &JsValue, name: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(name))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

/// Signal source over the live `window`.
pub struct BrowserSignals {
    window: Window,
}

impl BrowserSignals {
    pub fn new() -> Result<Self, String> {
        web_sys::window()
            .map(|window| Self { window })
            .ok_or_else(|| "no global window".to_string())
    }

    fn navigator(&self) -> Navigator {
        self.window.navigator()
    }

    fn document(&self) -> Result<Document, ProbeError> {
        self.window
            .document()
            .ok_or(ProbeError::Unavailable("document"))
    }

    fn create_canvas(&self) -> Result<HtmlCanvasElement, ProbeError> {
        self.document()?
            .create_element("canvas")
            .map_err(js_err)?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| ProbeError::Failed("created element is not a canvas".to_string()))
    }

    /// Standard constructor first, then the prefixed WebKit one.
    fn audio_context(&self) -> Result<AudioContext, ProbeError> {
        if let Ok(context) = AudioContext::new() {
            return Ok(context);
        }
        let ctor = js_prop(&self.window, "webkitAudioContext")
            .and_then(|ctor| ctor.dyn_into::<js_sys::Function>().ok())
            .ok_or(ProbeError::Unavailable("Web Audio"))?;
        Reflect::construct(&ctor, &js_sys::Array::new())
            .map(|context| context.unchecked_into::<AudioContext>())
            .map_err(js_err)
    }
}

/// oscillator -> analyser -> gain -> destination, started and stopped at once.
fn sample_tone(context: &AudioContext, bins: usize) -> Result<Vec<f32>, ProbeError> {
    let oscillator = context.create_oscillator().map_err(js_err)?;
    let analyser = context.create_analyser().map_err(js_err)?;
    let gain = context.create_gain().map_err(js_err)?;

    oscillator.connect_with_audio_node(&analyser).map_err(js_err)?;
    analyser.connect_with_audio_node(&gain).map_err(js_err)?;
    gain.connect_with_audio_node(&context.destination())
        .map_err(js_err)?;

    oscillator.start_with_when(0.0).map_err(js_err)?;
    let mut data = vec![0f32; analyser.frequency_bin_count() as usize];
    analyser.get_float_frequency_data(&mut data);
    oscillator.stop().map_err(js_err)?;

    data.truncate(bins);
    Ok(data)
}

fn gl_string(gl: &WebGlRenderingContext, parameter: u32) -> Result<String, ProbeError> {
    Ok(gl
        .get_parameter(parameter)
        .map_err(js_err)?
        .as_string()
        .unwrap_or_default())
}

#[async_trait(?Send)]
impl SignalSource for BrowserSignals {
    fn user_agent(&self) -> String {
        self.navigator().user_agent().unwrap_or_default()
    }

    fn language(&self) -> String {
        self.navigator().language().unwrap_or_default()
    }

    fn platform(&self) -> String {
        self.navigator().platform().unwrap_or_default()
    }

    fn screen_resolution(&self) -> Resolution {
        self.window
            .screen()
            .ok()
            .map(|screen| {
                Resolution::new(
                    screen.width().unwrap_or(0).max(0) as u32,
                    screen.height().unwrap_or(0).max(0) as u32,
                )
            })
            .unwrap_or(Resolution::new(0, 0))
    }

    fn color_depth(&self) -> u32 {
        self.window
            .screen()
            .and_then(|screen| screen.color_depth())
            .unwrap_or(0)
            .max(0) as u32
    }

    fn timezone(&self) -> String {
        let format = js_sys::Intl::DateTimeFormat::new(&js_sys::Array::new(), &js_sys::Object::new());
        js_prop(&format.resolved_options(), "timeZone")
            .and_then(|tz| tz.as_string())
            .unwrap_or_default()
    }

    fn max_touch_points(&self) -> u32 {
        self.navigator().max_touch_points().max(0) as u32
    }

    fn vendor(&self) -> String {
        js_prop(&self.navigator(), "vendor")
            .and_then(|v| v.as_string())
            .unwrap_or_default()
    }

    fn render_canvas(&self, scene: &CanvasScene) -> Result<String, ProbeError> {
        let canvas = self.create_canvas()?;
        canvas.set_width(scene.size);
        canvas.set_height(scene.size);

        let ctx = canvas
            .get_context("2d")
            .map_err(js_err)?
            .ok_or(ProbeError::Unavailable("2d canvas"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| ProbeError::Failed("unexpected 2d context type".to_string()))?;

        ctx.set_font(&scene.font);
        ctx.set_text_baseline(scene.text_baseline);
        for op in &scene.ops {
            match op {
                DrawOp::FillRect {
                    color,
                    x,
                    y,
                    width,
                    height,
                } => {
                    ctx.set_fill_style_str(color);
                    ctx.fill_rect(*x, *y, *width, *height);
                }
                DrawOp::FillText { color, x, y } => {
                    ctx.set_fill_style_str(color);
                    ctx.fill_text(&scene.text, *x, *y).map_err(js_err)?;
                }
            }
        }

        canvas.to_data_url().map_err(js_err)
    }

    fn gpu_info(&self) -> Result<GpuInfo, ProbeError> {
        let canvas = self.create_canvas()?;
        let gl = ["webgl", "experimental-webgl"]
            .iter()
            .find_map(|kind| canvas.get_context(kind).ok().flatten())
            .ok_or(ProbeError::Unavailable("WebGL"))?
            .unchecked_into::<WebGlRenderingContext>();

        Ok(GpuInfo {
            vendor: gl_string(&gl, WebGlRenderingContext::VENDOR)?,
            renderer: gl_string(&gl, WebGlRenderingContext::RENDERER)?,
            version: gl_string(&gl, WebGlRenderingContext::VERSION)?,
        })
    }

    async fn audio_spectrum(&self, bins: usize) -> Result<Vec<f32>, ProbeError> {
        let context = self.audio_context()?;
        let spectrum = sample_tone(&context, bins);

        // Release the context whether or not sampling worked.
        match context.close() {
            Ok(promise) => {
                if let Err(e) = JsFuture::from(promise).await {
                    tracing::debug!("AudioContext close rejected: {:?}", e);
                }
            }
            Err(e) => tracing::debug!("AudioContext close threw: {:?}", e),
        }

        spectrum
    }

    fn install_signals(&self) -> InstallSignals {
        let display_mode_standalone = self
            .window
            .match_media(STANDALONE_QUERY)
            .ok()
            .flatten()
            .map(|query| query.matches())
            .unwrap_or(false);
        let navigator_standalone =
            js_prop(&self.navigator(), "standalone").and_then(|v| v.as_bool());
        let referrer = self
            .window
            .document()
            .map(|document| document.referrer())
            .unwrap_or_default();

        InstallSignals {
            display_mode_standalone,
            navigator_standalone,
            referrer,
        }
    }

    async fn battery(&self) -> Result<BatteryStatus, ProbeError> {
        let navigator = self.navigator();
        let get_battery = js_prop(&navigator, "getBattery")
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok())
            .ok_or(ProbeError::Unavailable("battery status"))?;
        let promise = get_battery
            .call0(&navigator)
            .map_err(js_err)?
            .dyn_into::<js_sys::Promise>()
            .map_err(|_| ProbeError::Failed("getBattery did not return a promise".to_string()))?;
        let manager = JsFuture::from(promise).await.map_err(js_err)?;

        Ok(BatteryStatus {
            level: js_prop(&manager, "level")
                .and_then(|v| v.as_f64())
                .ok_or_else(|| ProbeError::Failed("battery level missing".to_string()))?,
            charging: js_prop(&manager, "charging")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
        })
    }

    fn font_available(&self, font: &str) -> Result<bool, ProbeError> {
        self.document()?
            .fonts()
            .check(&format!("12px \"{font}\""))
            .map_err(js_err)
    }
}
