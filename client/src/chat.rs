use web_sys::{Document, Element, HtmlElement};

use crate::session::ChatPane;

pub struct DomChatPane {
    document: Document,
    chat_box: HtmlElement,
    online_label: Option<Element>,
}

impl DomChatPane {
    pub fn new(document: Document, chat_box: HtmlElement, online_label: Option<Element>) -> Self {
        Self {
            document,
            chat_box,
            online_label,
        }
    }

    fn div(&self, class_name: &str) -> Option<Element> {
        let element = self.document.create_element("div").ok()?;
        element.set_class_name(class_name);
        Some(element)
    }

    fn span(&self, class_name: &str, text: &str) -> Option<Element> {
        let element = self.document.create_element("span").ok()?;
        element.set_class_name(class_name);
        element.set_text_content(Some(text));
        Some(element)
    }

    fn append(&self, element: &Element) {
        let _ = self.chat_box.append_child(element);
        self.chat_box.set_scroll_top(self.chat_box.scroll_height());
    }
}

fn clock_label() -> String {
    let now = js_sys::Date::new_0();
    format!("{}:{:02}", now.get_hours(), now.get_minutes())
}

impl ChatPane for DomChatPane {
    fn add_message(&mut self, sender: &str, content: &str, own: bool) {
        let class_name = if own { "message own" } else { "message other" };
        let (Some(message), Some(header), Some(body)) = (
            self.div(class_name),
            self.div("message-header"),
            self.div("message-content"),
        ) else {
            return;
        };
        if let Some(sender) = self.span("message-sender", sender) {
            let _ = header.append_child(&sender);
        }
        if let Some(time) = self.span("message-time", &clock_label()) {
            let _ = header.append_child(&time);
        }
        body.set_text_content(Some(content));
        let _ = message.append_child(&header);
        let _ = message.append_child(&body);
        self.append(&message);
    }

    fn add_system_message(&mut self, text: &str) {
        if let Some(message) = self.div("message system") {
            message.set_text_content(Some(text));
            self.append(&message);
        }
    }

    fn set_online_users(&mut self, label: &str) {
        if let Some(element) = &self.online_label {
            element.set_text_content(Some(label));
        }
    }
}
