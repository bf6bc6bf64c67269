// DOM view: hides/shows the content root and inserts fixed notices

use devgate_core::{GateView, NoticeTemplates};
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

pub struct DomView {
    document: Document,
    content_root: Option<String>,
    notices: NoticeTemplates,
}

impl DomView {
    pub fn new(content_root: Option<String>, notices: NoticeTemplates) -> Result<Self, String> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| "no document".to_string())?;
        Ok(Self {
            document,
            content_root,
            notices,
        })
    }

    /// The configured container, or `<body>`.
    fn content(&self) -> Result<HtmlElement, String> {
        match &self.content_root {
            Some(id) => self
                .document
                .get_element_by_id(id)
                .ok_or_else(|| format!("no element with id {id:?}"))?
                .dyn_into::<HtmlElement>()
                .map_err(|_| format!("element {id:?} is not an HTML element")),
            None => self.document.body().ok_or_else(|| "no body".to_string()),
        }
    }

    fn set_display(&self, content: &HtmlElement, value: &str) -> Result<(), String> {
        content
            .style()
            .set_property("display", value)
            .map_err(|e| format!("{:?}", e))
    }

    /// Hide the content and put `markup` in a new element right before it.
    /// The original content stays in place.
    fn insert_notice(&self, markup: &str) -> Result<(), String> {
        let content = self.content()?;
        self.set_display(&content, "none")?;

        let notice = self
            .document
            .create_element("div")
            .map_err(|e| format!("{:?}", e))?;
        notice.set_inner_html(markup);

        let parent = content
            .parent_node()
            .ok_or_else(|| "content has no parent".to_string())?;
        parent
            .insert_before(&notice, Some(&content))
            .map_err(|e| format!("{:?}", e))?;
        Ok(())
    }
}

impl GateView for DomView {
    fn conceal(&self) -> Result<(), String> {
        self.set_display(&self.content()?, "none")
    }

    fn show_mobile_only(&self) -> Result<(), String> {
        let content = self.content()?;
        content.set_inner_html(&self.notices.mobile_only);
        self.set_display(&content, "block")
    }

    fn block_unknown_device(&self) -> Result<(), String> {
        self.insert_notice(&self.notices.no_access)
    }

    fn prompt_install(&self) -> Result<(), String> {
        self.insert_notice(&self.notices.install_prompt)
    }

    fn reveal(&self) -> Result<(), String> {
        self.set_display(&self.content()?, "block")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn mount(id: &str) -> HtmlElement {
        let document = web_sys::window().unwrap().document().unwrap();
        let el = document
            .create_element("div")
            .unwrap()
            .dyn_into::<HtmlElement>()
            .unwrap();
        el.set_id(id);
        el.set_inner_html("<p>secret</p>");
        document.body().unwrap().append_child(&el).unwrap();
        el
    }

    #[wasm_bindgen_test]
    fn test_block_keeps_original_content() {
        let el = mount("devgate-block");
        let view = DomView::new(Some("devgate-block".into()), NoticeTemplates::default()).unwrap();

        view.conceal().unwrap();
        view.block_unknown_device().unwrap();

        assert_eq!(el.style().get_property_value("display").unwrap(), "none");
        assert_eq!(el.inner_html(), "<p>secret</p>");
        let notice = el.previous_element_sibling().unwrap();
        assert!(notice.inner_html().contains("No access"));
    }

    #[wasm_bindgen_test]
    fn test_reveal_shows_content() {
        let el = mount("devgate-reveal");
        let view = DomView::new(Some("devgate-reveal".into()), NoticeTemplates::default()).unwrap();
        view.conceal().unwrap();
        view.reveal().unwrap();
        assert_eq!(el.style().get_property_value("display").unwrap(), "block");
    }

    #[wasm_bindgen_test]
    fn test_missing_root_is_an_error() {
        let view = DomView::new(Some("devgate-missing".into()), NoticeTemplates::default()).unwrap();
        assert!(view.reveal().is_err());
    }
}
