//! Drawing surface abstraction and an in-memory implementation.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::render::engine::LatticeEngine;
use crate::render::scene::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Kinds of host events the engine subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ListenerKind {
    Resize,
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

/// Events a host delivers to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    /// The window or container was resized.
    Resize,
    /// Click at surface coordinates.
    Click { x: f64, y: f64 },
    /// A frame requested through [`Surface::request_frame`] is due.
    AnimationFrame,
    /// The owner made the visualization visible (e.g. its slide became active).
    BecameVisible { animated: bool },
}

impl SurfaceEvent {
    /// The subscription an event needs before a host may deliver it.
    pub fn listener_kind(&self) -> Option<ListenerKind> {
        match self {
            SurfaceEvent::Resize => Some(ListenerKind::Resize),
            SurfaceEvent::Click { .. } => Some(ListenerKind::Click),
            SurfaceEvent::AnimationFrame | SurfaceEvent::BecameVisible { .. } => None,
        }
    }
}

/// A drawing surface owned exclusively by one engine.
///
/// Every subscription taken by the engine is released in its teardown; a
/// surface must not deliver events for a released subscription.
pub trait Surface {
    /// Client size of the container; `None` when the container is missing.
    fn client_size(&self) -> Option<Size>;
    /// Monotonic clock in milliseconds driving transitions.
    fn now_ms(&self) -> f64;
    fn subscribe(&mut self, kind: ListenerKind) -> ListenerId;
    fn unsubscribe(&mut self, id: ListenerId);
    /// Ask the host for an [`SurfaceEvent::AnimationFrame`].
    fn request_frame(&mut self);
    fn draw(&mut self, frame: &Frame);
    /// Remove the drawing from the container.
    fn detach(&mut self);
}

#[derive(Debug, Default)]
pub struct HeadlessState {
    pub size: Option<Size>,
    pub now_ms: f64,
    pub listeners: BTreeMap<ListenerId, ListenerKind>,
    pub frames_drawn: usize,
    pub last_frame: Option<Frame>,
    pub frame_requested: bool,
    pub detached: bool,
    next_id: u64,
}

/// In-memory surface with a manual clock. Used by the CLI to produce SVG
/// snapshots and by tests to observe the engine.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_size(Some(Size::new(width, height)))
    }

    /// A surface whose container never mounted.
    pub fn without_container() -> Self {
        Self::with_size(None)
    }

    fn with_size(size: Option<Size>) -> Self {
        let state = HeadlessState {
            size,
            ..HeadlessState::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// A second handle onto the same state, kept by the owner after the
    /// surface moved into an engine.
    pub fn handle(&self) -> HeadlessHandle {
        HeadlessHandle {
            state: Rc::clone(&self.state),
        }
    }
}

impl Surface for HeadlessSurface {
    fn client_size(&self) -> Option<Size> {
        self.state.borrow().size
    }

    fn now_ms(&self) -> f64 {
        self.state.borrow().now_ms
    }

    fn subscribe(&mut self, kind: ListenerKind) -> ListenerId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = ListenerId(state.next_id);
        state.listeners.insert(id, kind);
        id
    }

    fn unsubscribe(&mut self, id: ListenerId) {
        self.state.borrow_mut().listeners.remove(&id);
    }

    fn request_frame(&mut self) {
        self.state.borrow_mut().frame_requested = true;
    }

    fn draw(&mut self, frame: &Frame) {
        let mut state = self.state.borrow_mut();
        if state.detached {
            return;
        }
        state.frames_drawn += 1;
        state.last_frame = Some(frame.clone());
    }

    fn detach(&mut self) {
        let mut state = self.state.borrow_mut();
        state.detached = true;
        state.last_frame = None;
    }
}

/// Observer/driver side of a [`HeadlessSurface`].
#[derive(Debug, Clone)]
pub struct HeadlessHandle {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessHandle {
    pub fn set_size(&self, width: f64, height: f64) {
        self.state.borrow_mut().size = Some(Size::new(width, height));
    }

    pub fn set_now(&self, now_ms: f64) {
        self.state.borrow_mut().now_ms = now_ms;
    }

    pub fn advance(&self, delta_ms: f64) {
        self.state.borrow_mut().now_ms += delta_ms;
    }

    pub fn now_ms(&self) -> f64 {
        self.state.borrow().now_ms
    }

    pub fn frames_drawn(&self) -> usize {
        self.state.borrow().frames_drawn
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.state.borrow().last_frame.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    pub fn is_subscribed(&self, kind: ListenerKind) -> bool {
        self.state.borrow().listeners.values().any(|k| *k == kind)
    }

    pub fn is_detached(&self) -> bool {
        self.state.borrow().detached
    }

    /// Returns and clears the pending frame request.
    pub fn take_frame_request(&self) -> bool {
        std::mem::take(&mut self.state.borrow_mut().frame_requested)
    }

    /// Whether a host would deliver `event` right now.
    pub fn accepts(&self, event: &SurfaceEvent) -> bool {
        if self.is_detached() {
            return false;
        }
        match event.listener_kind() {
            Some(kind) => self.is_subscribed(kind),
            None => true,
        }
    }

    /// Deliver `event` the way a browser would: only through a live subscription.
    pub fn dispatch(
        &self,
        engine: &mut LatticeEngine<HeadlessSurface>,
        event: SurfaceEvent,
    ) -> bool {
        if !self.accepts(&event) {
            return false;
        }
        engine.handle_event(event);
        true
    }

    /// Advance the clock in fixed steps, delivering requested frames, until no
    /// further frame is requested or `max_ms` has elapsed.
    pub fn run_animations(
        &self,
        engine: &mut LatticeEngine<HeadlessSurface>,
        step_ms: f64,
        max_ms: f64,
    ) {
        let mut elapsed = 0.0;
        while self.take_frame_request() && elapsed < max_ms {
            self.advance(step_ms);
            elapsed += step_ms;
            self.dispatch(engine, SurfaceEvent::AnimationFrame);
        }
    }
}
