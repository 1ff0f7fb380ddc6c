//! Utility functions for WASM bindings
//!
//! Helper functions for conversion between Rust and JavaScript types

use log::{Level, LevelFilter, Metadata, Record};
use wasm_bindgen::prelude::*;

/// Set panic hook for better error messages in the browser console
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Log a message to the browser console
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    pub fn log(s: &str);

    #[wasm_bindgen(js_namespace = console, js_name = warn)]
    pub fn warn(s: &str);
}

/// Macro for logging from Rust to browser console
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => {
        $crate::utils::log(&format_args!($($t)*).to_string())
    };
}

/// Convert any displayable error into a JavaScript error value
pub fn to_js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, err))
}

/// Routes `log` records to the browser console
struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}: {}", record.level(), record.target(), record.args());
        match record.level() {
            Level::Error | Level::Warn => warn(&line),
            _ => log(&line),
        }
    }

    fn flush(&self) {}
}

/// Install the console logger; later calls are no-ops
pub fn init_console_logger() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Info);
    }
}
