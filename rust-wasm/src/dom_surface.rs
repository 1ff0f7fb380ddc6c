//! Surface backed by a DOM container
//!
//! Frames are written as SVG markup into a host `<div>` appended to the
//! container. Resize listens on the window, clicks on the host element, and
//! animation frames come from `requestAnimationFrame`.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use lattice_viz::render::{Frame, ListenerId, ListenerKind, Size, Surface, SurfaceEvent};
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, EventTarget, HtmlElement, MouseEvent, Window};

type Handler = Rc<dyn Fn(SurfaceEvent)>;

/// Slot through which DOM callbacks reach the engine's owner.
///
/// Empty until the owner installs a handler, and emptied again on detach.
#[derive(Clone, Default)]
pub struct EventSink {
    handler: Rc<RefCell<Option<Handler>>>,
}

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, handler: impl Fn(SurfaceEvent) + 'static) {
        *self.handler.borrow_mut() = Some(Rc::new(handler));
    }

    pub fn clear(&self) {
        self.handler.borrow_mut().take();
    }

    pub fn is_installed(&self) -> bool {
        self.handler.borrow().is_some()
    }

    /// The handler is cloned out first so it may clear the slot while running.
    pub fn deliver(&self, event: SurfaceEvent) {
        let handler = self.handler.borrow().clone();
        if let Some(handler) = handler {
            handler(event);
        }
    }
}

struct DomListener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl DomListener {
    fn remove(&self) {
        if let Err(err) = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref())
        {
            warn!("Failed to remove {} listener: {:?}", self.event, err);
        }
    }
}

pub struct DomSurface {
    window: Window,
    container: HtmlElement,
    host: Element,
    sink: EventSink,
    listeners: BTreeMap<ListenerId, DomListener>,
    next_id: u64,
    frame_pending: Rc<Cell<bool>>,
    detached: bool,
}

impl DomSurface {
    pub fn new(container: HtmlElement, sink: EventSink) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No global window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Window has no document"))?;
        let host = document.create_element("div")?;
        host.set_class_name("lattice-viz");
        host.set_attribute("style", "width: 100%; height: 100%;")?;
        container.append_child(&host)?;

        Ok(Self {
            window,
            container,
            host,
            sink,
            listeners: BTreeMap::new(),
            next_id: 0,
            frame_pending: Rc::new(Cell::new(false)),
            detached: false,
        })
    }

    pub fn host(&self) -> &Element {
        &self.host
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn listen(&mut self, kind: ListenerKind) -> Result<DomListener, JsValue> {
        let sink = self.sink.clone();
        let listener = match kind {
            ListenerKind::Resize => DomListener {
                target: self.window.clone().into(),
                event: "resize",
                callback: Closure::wrap(Box::new(move |_event: Event| {
                    sink.deliver(SurfaceEvent::Resize);
                }) as Box<dyn FnMut(Event)>),
            },
            ListenerKind::Click => {
                let host = self.host.clone();
                DomListener {
                    target: self.host.clone().into(),
                    event: "click",
                    callback: Closure::wrap(Box::new(move |event: Event| {
                        if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                            let rect = host.get_bounding_client_rect();
                            sink.deliver(SurfaceEvent::Click {
                                x: mouse.client_x() as f64 - rect.left(),
                                y: mouse.client_y() as f64 - rect.top(),
                            });
                        }
                    }) as Box<dyn FnMut(Event)>),
                }
            }
        };
        listener
            .target
            .add_event_listener_with_callback(listener.event, listener.callback.as_ref().unchecked_ref())?;
        Ok(listener)
    }

    fn remove_listeners(&mut self) {
        for (_, listener) in std::mem::take(&mut self.listeners) {
            listener.remove();
        }
    }
}

impl Surface for DomSurface {
    fn client_size(&self) -> Option<Size> {
        if self.detached {
            return None;
        }
        Some(Size::new(
            self.container.client_width() as f64,
            self.container.client_height() as f64,
        ))
    }

    fn now_ms(&self) -> f64 {
        self.window
            .performance()
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn subscribe(&mut self, kind: ListenerKind) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        match self.listen(kind) {
            Ok(listener) => {
                self.listeners.insert(id, listener);
            }
            Err(err) => warn!("Failed to subscribe to {:?}: {:?}", kind, err),
        }
        id
    }

    fn unsubscribe(&mut self, id: ListenerId) {
        if let Some(listener) = self.listeners.remove(&id) {
            listener.remove();
        }
    }

    fn request_frame(&mut self) {
        if self.detached || self.frame_pending.get() {
            return;
        }
        let pending = self.frame_pending.clone();
        let sink = self.sink.clone();
        let callback = Closure::once_into_js(move |_timestamp: f64| {
            pending.set(false);
            sink.deliver(SurfaceEvent::AnimationFrame);
        });
        match self.window.request_animation_frame(callback.unchecked_ref()) {
            Ok(_) => self.frame_pending.set(true),
            Err(err) => warn!("requestAnimationFrame failed: {:?}", err),
        }
    }

    fn draw(&mut self, frame: &Frame) {
        if !self.detached {
            self.host.set_inner_html(&frame.to_svg());
        }
    }

    fn detach(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;
        self.remove_listeners();
        self.host.remove();
        self.sink.clear();
        debug!("DOM surface detached");
    }
}

impl Drop for DomSurface {
    fn drop(&mut self) {
        self.remove_listeners();
    }
}
