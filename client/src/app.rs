use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlCanvasElement, HtmlElement, HtmlInputElement, KeyboardEvent, PointerEvent};

use pizarra_shared::Tool;

use crate::chat::DomChatPane;
use crate::dom::{disable_touch_scrolling, event_to_point, get_element, query_all, set_active};
use crate::render::CanvasSurface;
use crate::session::Session;
use crate::ws::{connect_ws, listen, WsEvent, WsTransport};

type ClientSession = Session<CanvasSurface, WsTransport, DomChatPane>;

const CLEAR_PROMPT: &str = "¿Estás seguro de que quieres limpiar el lienzo?";

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;

    let canvas: HtmlCanvasElement = get_element(&document, "board")?;
    let chat_box: HtmlElement = get_element(&document, "chatBox")?;
    let input: HtmlInputElement = get_element(&document, "input")?;
    let send_button: HtmlElement = get_element(&document, "send")?;
    let clear_button: HtmlElement = get_element(&document, "clearBtn")?;
    let online_label = document.query_selector(".online-users span")?;
    let swatches = Rc::new(query_all(&document, ".color-option")?);
    let tool_buttons = Rc::new(query_all(&document, ".tool-btn")?);

    disable_touch_scrolling(&canvas);
    let mut surface = CanvasSurface::new(canvas.clone())?;
    surface.fit_to_parent();

    let transport = connect_ws(&window)?;
    let chat = DomChatPane::new(document.clone(), chat_box, online_label);
    let session: Rc<RefCell<ClientSession>> = Rc::new(RefCell::new(Session::new(
        surface,
        transport.clone(),
        chat,
    )));

    {
        let session = session.clone();
        listen(&transport, &window, move |event| {
            let mut session = session.borrow_mut();
            match event {
                WsEvent::Connection(event) => session.handle_socket_event(event),
                WsEvent::Message(text) => session.handle_socket_message(&text),
            }
        })?;
    }

    {
        let session = session.clone();
        let canvas_cb = canvas.clone();
        let onpointerdown = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            event.prevent_default();
            if let Some(point) = event_to_point(&canvas_cb, &event) {
                session.borrow_mut().pointer_down(point);
            }
        });
        canvas.add_event_listener_with_callback(
            "pointerdown",
            onpointerdown.as_ref().unchecked_ref(),
        )?;
        onpointerdown.forget();
    }

    {
        let session = session.clone();
        let canvas_cb = canvas.clone();
        let onpointermove = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let mut session = session.borrow_mut();
            if !session.is_drawing() {
                return;
            }
            event.prevent_default();
            if let Some(point) = event_to_point(&canvas_cb, &event) {
                session.pointer_move(point);
            }
        });
        canvas.add_event_listener_with_callback(
            "pointermove",
            onpointermove.as_ref().unchecked_ref(),
        )?;
        onpointermove.forget();
    }

    for name in ["pointerup", "pointerleave", "pointercancel"] {
        let session = session.clone();
        let onpointerup = Closure::<dyn FnMut(PointerEvent)>::new(move |_| {
            session.borrow_mut().pointer_up();
        });
        canvas.add_event_listener_with_callback(name, onpointerup.as_ref().unchecked_ref())?;
        onpointerup.forget();
    }

    for swatch in swatches.iter() {
        let session = session.clone();
        let swatches = swatches.clone();
        let swatch_cb = swatch.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            set_active(&swatches, &swatch_cb);
            if let Some(color) = swatch_cb.get_attribute("data-color") {
                session.borrow_mut().set_color(&color);
            }
        });
        swatch.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    for button in tool_buttons.iter() {
        let session = session.clone();
        let tool_buttons = tool_buttons.clone();
        let button_cb = button.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            let tool = button_cb
                .get_attribute("data-tool")
                .and_then(|value| Tool::from_attr(&value));
            let Some(tool) = tool else {
                log::warn!("ignoring unknown tool button");
                return;
            };
            set_active(&tool_buttons, &button_cb);
            session.borrow_mut().set_tool(tool);
        });
        button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let session = session.clone();
        let window_cb = window.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            // The dialog can let socket callbacks run; ask before borrowing.
            let confirmed = window_cb
                .confirm_with_message(CLEAR_PROMPT)
                .unwrap_or(false);
            session.borrow_mut().clear_canvas(confirmed);
        });
        clear_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let session = session.clone();
        let input_cb = input.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            submit_chat(&session, &input_cb);
        });
        send_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let session = session.clone();
        let input_cb = input.clone();
        let onkeypress = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            if event.key() == "Enter" {
                submit_chat(&session, &input_cb);
            }
        });
        input.add_event_listener_with_callback("keypress", onkeypress.as_ref().unchecked_ref())?;
        onkeypress.forget();
    }

    {
        let session = session.clone();
        let onresize = Closure::<dyn FnMut(Event)>::new(move |_| {
            session.borrow_mut().surface_mut().fit_to_parent();
        });
        window.add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref())?;
        onresize.forget();
    }

    log::info!(
        "board ready {}x{}",
        session.borrow().surface().canvas().width(),
        session.borrow().surface().canvas().height()
    );
    Ok(())
}

fn submit_chat(session: &Rc<RefCell<ClientSession>>, input: &HtmlInputElement) {
    if session.borrow_mut().send_chat(&input.value()) {
        input.set_value("");
    }
}
