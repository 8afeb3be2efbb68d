use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket, Window};

use crate::session::{ConnectionEvent, Transport};

#[derive(Debug)]
pub enum WsEvent {
    Connection(ConnectionEvent),
    Message(String),
}

#[derive(Clone)]
pub struct WsTransport {
    socket: WebSocket,
}

impl Transport for WsTransport {
    fn is_open(&self) -> bool {
        self.socket.ready_state() == WebSocket::OPEN
    }

    fn send_text(&self, payload: &str) {
        if let Err(error) = self.socket.send_with_str(payload) {
            log::warn!("WS send failed: {error:?}");
        }
    }
}

pub fn websocket_url(window: &Window) -> Result<String, JsValue> {
    let location = window.location();
    let protocol = location.protocol()?;
    let host = location.host()?;
    let scheme = if protocol == "https:" { "wss" } else { "ws" };
    Ok(format!("{scheme}://{host}/ws"))
}

pub fn connect_ws(window: &Window) -> Result<WsTransport, JsValue> {
    let ws_url = websocket_url(window)?;
    log::info!("connecting to {ws_url}");
    let socket = WebSocket::new(&ws_url)?;
    Ok(WsTransport { socket })
}

/// Routes socket callbacks to `on_event` and closes the socket when the
/// page unloads. Nothing reconnects after a close.
pub fn listen(
    transport: &WsTransport,
    window: &Window,
    on_event: impl 'static + FnMut(WsEvent),
) -> Result<(), JsValue> {
    let socket = &transport.socket;
    let on_event = std::rc::Rc::new(std::cell::RefCell::new(on_event));

    {
        let on_event = on_event.clone();
        let onopen = Closure::<dyn FnMut(Event)>::new(move |_| {
            on_event.borrow_mut()(WsEvent::Connection(ConnectionEvent::Open));
        });
        socket.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        onopen.forget();
    }

    {
        let on_event = on_event.clone();
        let onclose = Closure::<dyn FnMut(CloseEvent)>::new(move |event: CloseEvent| {
            log::info!("WS closed code={} reason={:?}", event.code(), event.reason());
            on_event.borrow_mut()(WsEvent::Connection(ConnectionEvent::Close));
        });
        socket.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        onclose.forget();
    }

    {
        let on_event = on_event.clone();
        let onerror = Closure::<dyn FnMut(Event)>::new(move |_| {
            on_event.borrow_mut()(WsEvent::Connection(ConnectionEvent::Error));
        });
        socket.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();
    }

    {
        let on_event = on_event.clone();
        let onmessage = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            let Some(text) = event.data().as_string() else {
                log::error!("WS message data is not a string");
                return;
            };
            on_event.borrow_mut()(WsEvent::Message(text));
        });
        socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();
    }

    {
        let socket = socket.clone();
        let onbeforeunload = Closure::<dyn FnMut(Event)>::new(move |_| {
            let _ = socket.close();
        });
        window.add_event_listener_with_callback(
            "beforeunload",
            onbeforeunload.as_ref().unchecked_ref(),
        )?;
        onbeforeunload.forget();
    }

    Ok(())
}
