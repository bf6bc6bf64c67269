// DOM guard host: print, unload-prompt and image deterrents
//
// Listeners live as long as the page, so their closures are leaked with
// `forget()` once registered.

use devgate_core::GuardHost;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Event, HtmlElement, Window};

fn dom_err(e: JsValue) -> String {
    format!("{:?}", e)
}

fn prevent_default() -> Closure<dyn FnMut(Event)> {
    Closure::wrap(Box::new(|event: Event| event.prevent_default()) as Box<dyn FnMut(Event)>)
}

pub struct DomGuards {
    window: Window,
}

impl DomGuards {
    pub fn new() -> Result<Self, String> {
        web_sys::window()
            .map(|window| Self { window })
            .ok_or_else(|| "no global window".to_string())
    }
}

impl GuardHost for DomGuards {
    fn block_print(&self) -> Result<(), String> {
        let handler = prevent_default();
        self.window
            .add_event_listener_with_callback("beforeprint", handler.as_ref().unchecked_ref())
            .map_err(dom_err)?;
        handler.forget();
        Ok(())
    }

    fn suppress_unload_prompt(&self) -> Result<(), String> {
        self.window.set_onbeforeunload(None);

        let handler = Closure::wrap(Box::new(|event: Event| {
            event.stop_immediate_propagation();
            event.stop_propagation();
            let _ = js_sys::Reflect::delete_property(&event, &JsValue::from_str("returnValue"));
        }) as Box<dyn FnMut(Event)>);
        // Capture phase so it runs ahead of page-registered handlers.
        self.window
            .add_event_listener_with_callback_and_bool(
                "beforeunload",
                handler.as_ref().unchecked_ref(),
                true,
            )
            .map_err(dom_err)?;
        handler.forget();
        Ok(())
    }

    fn protect_images(&self) -> Result<usize, String> {
        let document = self
            .window
            .document()
            .ok_or_else(|| "no document".to_string())?;
        let images = document.get_elements_by_tag_name("img");
        let handler = prevent_default();

        let mut protected = 0;
        for i in 0..images.length() {
            let Some(image) = images.item(i) else {
                continue;
            };
            for event in ["dragstart", "contextmenu"] {
                image
                    .add_event_listener_with_callback(event, handler.as_ref().unchecked_ref())
                    .map_err(dom_err)?;
            }
            if let Some(image) = image.dyn_ref::<HtmlElement>() {
                let style = image.style();
                style.set_property("user-select", "none").map_err(dom_err)?;
                style
                    .set_property("-webkit-user-select", "none")
                    .map_err(dom_err)?;
            }
            protected += 1;
        }

        handler.forget();
        Ok(protected)
    }
}
