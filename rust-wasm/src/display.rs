//! Mounted lattice display for the browser
//!
//! Owns a `LatticeDisplay<DomSurface>` behind an `Rc<RefCell<..>>`; DOM
//! callbacks reach it through a weak reference so dropping the wrapper
//! tears everything down.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use lattice_viz::config::EngineConfig;
use lattice_viz::display::{DisplayProps, LatticeDisplay, RadiusControl};
use lattice_viz::render::SurfaceEvent;
use log::warn;
use nalgebra::Vector2;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::common::{BasisData, EventData};
use crate::dom_surface::{DomSurface, EventSink};
use crate::lattice::Basis;
use crate::utils::to_js_error;

type SharedDisplay = Rc<RefCell<LatticeDisplay<DomSurface>>>;

fn from_js_or_default<T: DeserializeOwned + Default>(value: JsValue, what: &str) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| to_js_error(&format!("Failed to parse {}", what), e))
}

/// Route host events to the display unless it is gone or already busy.
fn forward(display: &Weak<RefCell<LatticeDisplay<DomSurface>>>, event: SurfaceEvent) {
    let Some(display) = display.upgrade() else {
        return;
    };
    match display.try_borrow_mut() {
        Ok(mut display) => display.handle_event(event),
        Err(_) => warn!("Dropped {:?}: display is busy", event),
    };
}

/// Lattice visualization mounted into a container element
#[wasm_bindgen]
pub struct WasmLatticeDisplay {
    inner: SharedDisplay,
}

impl WasmLatticeDisplay {
    fn with<R>(&self, f: impl FnOnce(&mut LatticeDisplay<DomSurface>) -> R) -> Option<R> {
        match self.inner.try_borrow_mut() {
            Ok(mut display) => Some(f(&mut display)),
            Err(_) => {
                warn!("Display call ignored: re-entered from an observer");
                None
            }
        }
    }

    fn peek<R>(&self, f: impl FnOnce(&LatticeDisplay<DomSurface>) -> R) -> Option<R> {
        self.inner.try_borrow().ok().map(|display| f(&display))
    }
}

#[wasm_bindgen]
impl WasmLatticeDisplay {
    /// Mount into `container`. `props` and `config` may be omitted for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(container: HtmlElement, props: JsValue, config: JsValue) -> Result<WasmLatticeDisplay, JsValue> {
        let props: DisplayProps = from_js_or_default(props, "display props")?;
        let config: EngineConfig = from_js_or_default(config, "engine config")?;
        config
            .validate()
            .map_err(|e| to_js_error("Invalid engine config", e))?;

        let sink = EventSink::new();
        let surface = DomSurface::new(container, sink.clone())?;
        let inner: SharedDisplay = Rc::new(RefCell::new(LatticeDisplay::mount(surface, config, props)));

        let weak = Rc::downgrade(&inner);
        sink.install(move |event| forward(&weak, event));

        Ok(WasmLatticeDisplay { inner })
    }

    /// Dual-only preset: primal hidden, shortest vectors and CVP in dual space
    #[wasm_bindgen(js_name = dualViewProps)]
    pub fn dual_view_props() -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&DisplayProps::dual_view())
            .map_err(|e| to_js_error("Failed to serialize props", e))
    }

    /// Receive engine notifications as `{ kind, ... }` objects
    #[wasm_bindgen(js_name = setObserver)]
    pub fn set_observer(&self, callback: js_sys::Function) {
        self.with(|display| {
            display.set_observer(move |event| {
                let value = match serde_wasm_bindgen::to_value(&EventData::from(event)) {
                    Ok(value) => value,
                    Err(err) => {
                        warn!("Failed to serialize event: {}", err);
                        return;
                    }
                };
                if let Err(err) = callback.call1(&JsValue::NULL, &value) {
                    warn!("Observer threw: {:?}", err);
                }
            });
        });
    }

    /// Apply new props; returns the names of the setters that ran
    pub fn update(&self, props: JsValue) -> Result<Vec<JsValue>, JsValue> {
        let props: DisplayProps = from_js_or_default(props, "display props")?;
        let changes = self.with(|display| display.update(props)).unwrap_or_default();
        Ok(changes
            .iter()
            .map(|change| JsValue::from_str(&format!("{:?}", change)))
            .collect())
    }

    pub fn props(&self) -> Result<JsValue, JsValue> {
        let props = self.peek(|display| display.props().clone());
        serde_wasm_bindgen::to_value(&props).map_err(|e| to_js_error("Failed to serialize props", e))
    }

    #[wasm_bindgen(js_name = setBasis)]
    pub fn set_basis(&self, basis: &Basis) {
        let b = *basis.inner();
        self.with(|display| display.set_basis(b.b1, b.b2));
    }

    /// Current primal basis as `{ b1, b2 }`
    #[wasm_bindgen(js_name = getBasis)]
    pub fn get_basis(&self) -> Result<JsValue, JsValue> {
        let basis = self.peek(|display| display.engine().map(|engine| engine.state().basis)).flatten();
        serde_wasm_bindgen::to_value(&basis.map(BasisData::from))
            .map_err(|e| to_js_error("Failed to serialize basis", e))
    }

    /// Animate to a new scale; the configured duration is used when omitted
    #[wasm_bindgen(js_name = setScale)]
    pub fn set_scale(&self, scale: f64, duration_ms: Option<f64>) {
        self.with(|display| display.set_scale(scale, duration_ms));
    }

    /// Set the vector reduced modulo the dual lattice; omit both to clear
    #[wasm_bindgen(js_name = setModVector)]
    pub fn set_mod_vector(&self, x: Option<f64>, y: Option<f64>) {
        let vec = match (x, y) {
            (Some(x), Some(y)) => Some(Vector2::new(x, y)),
            _ => None,
        };
        self.with(|display| display.set_mod_vector(vec));
    }

    pub fn relayout(&self, animated: bool) {
        self.with(|display| display.relayout(animated));
    }

    #[wasm_bindgen(js_name = becameVisible)]
    pub fn became_visible(&self, animated: bool) {
        self.with(|display| display.became_visible(animated));
    }

    /// SVG markup of the current frame
    pub fn svg(&self) -> Option<String> {
        self.peek(|display| display.engine()?.current_frame().map(|frame| frame.to_svg()))
            .flatten()
    }

    #[wasm_bindgen(js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.peek(|display| display.is_mounted()).unwrap_or(true)
    }

    /// Tear down the engine; false when already destroyed
    pub fn destroy(&self) -> bool {
        self.with(|display| display.unmount()).unwrap_or(false)
    }
}

/// CVP radius slider with a soft cap at 1.0
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, Default)]
pub struct WasmRadiusControl {
    inner: RadiusControl,
}

#[wasm_bindgen]
impl WasmRadiusControl {
    #[wasm_bindgen(constructor)]
    pub fn new(value: f64) -> WasmRadiusControl {
        WasmRadiusControl {
            inner: RadiusControl::new(value),
        }
    }

    pub fn value(&self) -> f64 {
        self.inner.value()
    }

    #[wasm_bindgen(js_name = isUnlocked)]
    pub fn is_unlocked(&self) -> bool {
        self.inner.is_unlocked()
    }

    /// Apply a slider input and return the factor to hand to the display
    pub fn input(&mut self, raw: f64) -> f64 {
        self.inner.input(raw)
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }
}
