//! C interface for hosts that load the autosplitter dynamically
//!
//! Strings returned by these functions are owned by the caller and must be
//! released with [`kingpin_autosplitter_free_string`].

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::config::AutosplitterConfig;
use crate::games::kingpin::{self, Kingpin, KingpinAutosplitter};
use crate::games::GameMetadata;
use crate::memory::SystemProcessFinder;
use crate::{AutosplitterError, Result};

static AUTOSPLITTER: Lazy<Mutex<Option<KingpinAutosplitter>>> = Lazy::new(|| Mutex::new(None));

fn into_c_string(s: String) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

fn error_string(e: AutosplitterError) -> *mut c_char {
    log::error!("{}", e);
    into_c_string(e.to_string())
}

/// Error wrapped as `{"error": "..."}` for functions that otherwise return JSON
fn error_json(e: AutosplitterError) -> String {
    log::error!("{}", e);
    serde_json::json!({ "error": e.to_string() }).to_string()
}

/// Parse a configuration passed by the host; null means the defaults
fn parse_config(config_toml: *const c_char) -> Result<AutosplitterConfig> {
    if config_toml.is_null() {
        return Ok(AutosplitterConfig::default());
    }
    let text = unsafe { CStr::from_ptr(config_toml) }.to_string_lossy();
    AutosplitterConfig::from_toml_str(&text)
}

fn with_autosplitter<T>(f: impl FnOnce(&mut KingpinAutosplitter) -> T) -> Result<T> {
    let mut guard = AUTOSPLITTER.lock();
    guard.as_mut().map(f).ok_or(AutosplitterError::NotInitialized)
}

/// Initialize (or re-initialize) the autosplitter from a TOML configuration.
/// Returns null on success or an error message.
#[no_mangle]
pub extern "C" fn kingpin_autosplitter_init(config_toml: *const c_char) -> *mut c_char {
    let config = match parse_config(config_toml) {
        Ok(config) => config,
        Err(e) => return error_string(e),
    };

    match kingpin::create_autosplitter(&config, Arc::new(SystemProcessFinder)) {
        Ok(autosplitter) => {
            *AUTOSPLITTER.lock() = Some(autosplitter);
            std::ptr::null_mut()
        }
        Err(e) => error_string(e),
    }
}

/// Run one tick. Returns the tick result as JSON, `{"error": "..."}` if it
/// could not be serialized, or null if not initialized.
#[no_mangle]
pub extern "C" fn kingpin_autosplitter_update() -> *mut c_char {
    match with_autosplitter(|a| serde_json::to_string(&a.tick())) {
        Ok(Ok(json)) => into_c_string(json),
        Ok(Err(e)) => into_c_string(error_json(e.into())),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Reset per-run progress
#[no_mangle]
pub extern "C" fn kingpin_autosplitter_reset() {
    let _ = with_autosplitter(|a| a.reset());
}

/// Get the autosplitter state as JSON ("{}" if not initialized)
#[no_mangle]
pub extern "C" fn kingpin_autosplitter_state_json() -> *mut c_char {
    let json = with_autosplitter(|a| serde_json::to_string(a.state()).ok())
        .ok()
        .flatten()
        .unwrap_or_else(|| "{}".to_string());
    into_c_string(json)
}

/// Get the game metadata (names, process names, capabilities, event types) as JSON
#[no_mangle]
pub extern "C" fn kingpin_autosplitter_metadata_json() -> *mut c_char {
    let metadata = with_autosplitter(|a| GameMetadata::of(a.game()))
        .unwrap_or_else(|_| GameMetadata::of(&Kingpin::new()));
    into_c_string(serde_json::to_string(&metadata).unwrap_or_else(|_| "{}".to_string()))
}

/// Detach and drop the autosplitter
#[no_mangle]
pub extern "C" fn kingpin_autosplitter_shutdown() {
    if let Some(mut autosplitter) = AUTOSPLITTER.lock().take() {
        autosplitter.detach();
    }
}

/// Free a string returned by the autosplitter
#[no_mangle]
pub extern "C" fn kingpin_autosplitter_free_string(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            let _ = CString::from_raw(s);
        }
    }
}

/// Get library version
#[no_mangle]
pub extern "C" fn kingpin_autosplitter_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
