//! FFI bindings for Synheart Reps
//!
//! This module provides C-compatible functions for calling the rep counter from
//! other languages. Each call session gets its own counter handle; there is no
//! shared session state on the Rust side. All functions use C strings
//! (null-terminated) and return allocated memory that must be freed by the
//! caller using `reps_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::CounterConfig;
use crate::error::RepError;
use crate::pipeline::{count_reps_with_config, RepCounter};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Parse an optional config pointer; NULL means defaults
unsafe fn config_from_ptr(config_json: *const c_char) -> Result<CounterConfig, RepError> {
    if config_json.is_null() {
        return Ok(CounterConfig::default());
    }
    match cstr_to_string(config_json) {
        Some(json) => CounterConfig::from_json(&json),
        None => Err(RepError::InvalidConfig(
            "config is not valid UTF-8".to_string(),
        )),
    }
}

fn to_json_cstr<T: serde::Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Count reps in an NDJSON frame stream and return a JSON array of rep records.
///
/// # Safety
/// - `frames_ndjson` must be a valid null-terminated C string.
/// - `config_json` may be NULL (defaults) or a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `reps_free_string`.
/// - Returns NULL on error; call `reps_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn reps_count_frames(
    frames_ndjson: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let frames = match cstr_to_string(frames_ndjson) {
        Some(s) => s,
        None => {
            set_last_error("Invalid frames string pointer");
            return ptr::null_mut();
        }
    };

    let config = match config_from_ptr(config_json) {
        Ok(c) => c,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    match count_reps_with_config(&frames, &config) {
        Ok(records) => to_json_cstr(&records),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Counter API
// ============================================================================

/// Opaque handle to one session's RepCounter
pub struct RepCounterHandle {
    counter: RepCounter,
}

/// Create a new counter for one session.
///
/// # Safety
/// - `config_json` may be NULL (defaults) or a valid null-terminated C string.
/// - Returns a pointer to a newly allocated counter that must be freed with
///   `reps_counter_free`.
/// - Returns NULL on invalid configuration.
#[no_mangle]
pub unsafe extern "C" fn reps_counter_new(config_json: *const c_char) -> *mut RepCounterHandle {
    clear_last_error();

    let counter = match config_from_ptr(config_json).and_then(RepCounter::with_config) {
        Ok(c) => c,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    Box::into_raw(Box::new(RepCounterHandle { counter }))
}

/// Free a counter.
///
/// # Safety
/// - `counter` must be a valid pointer returned by `reps_counter_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn reps_counter_free(counter: *mut RepCounterHandle) {
    if !counter.is_null() {
        drop(Box::from_raw(counter));
    }
}

/// Process one pose.frame.v1 JSON frame.
///
/// Returns the rep record JSON when the frame completed a rep, or the string
/// `null` when it did not.
///
/// # Safety
/// - `counter` must be a valid pointer returned by `reps_counter_new`.
/// - `frame_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `reps_free_string`.
/// - Returns NULL on error; call `reps_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn reps_counter_process_frame(
    counter: *mut RepCounterHandle,
    frame_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if counter.is_null() {
        set_last_error("Null counter pointer");
        return ptr::null_mut();
    }

    let handle = &mut *counter;

    let frame = match cstr_to_string(frame_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid frame string pointer");
            return ptr::null_mut();
        }
    };

    match handle.counter.process_frame_json(&frame) {
        Ok(record) => to_json_cstr(&record),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Get the running workout summary as JSON.
///
/// # Safety
/// - `counter` must be a valid pointer returned by `reps_counter_new`.
/// - Returns a newly allocated string that must be freed with `reps_free_string`.
/// - Returns NULL on error; call `reps_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn reps_counter_summary(counter: *const RepCounterHandle) -> *mut c_char {
    clear_last_error();

    if counter.is_null() {
        set_last_error("Null counter pointer");
        return ptr::null_mut();
    }

    let handle = &*counter;
    to_json_cstr(&handle.counter.summary())
}

/// Close the session and return its final summary as JSON.
///
/// # Safety
/// - `counter` must be a valid pointer returned by `reps_counter_new`.
/// - Returns a newly allocated string that must be freed with `reps_free_string`.
/// - Returns NULL on error; call `reps_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn reps_counter_finish(counter: *mut RepCounterHandle) -> *mut c_char {
    clear_last_error();

    if counter.is_null() {
        set_last_error("Null counter pointer");
        return ptr::null_mut();
    }

    let handle = &mut *counter;
    to_json_cstr(&handle.counter.finish())
}

/// Start the counter's session over, keeping its id.
///
/// # Safety
/// - `counter` must be a valid pointer returned by `reps_counter_new`.
/// - Returns 0 on success, non-zero on error.
#[no_mangle]
pub unsafe extern "C" fn reps_counter_reset(counter: *mut RepCounterHandle) -> i32 {
    clear_last_error();

    if counter.is_null() {
        set_last_error("Null counter pointer");
        return -1;
    }

    let handle = &mut *counter;
    handle.counter.reset();
    0
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by a reps function.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a reps function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn reps_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next reps function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn reps_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn reps_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::squat_frame;

    fn squat_json(hip: f64) -> CString {
        CString::new(serde_json::to_string(&squat_frame(hip, 510.0)).unwrap()).unwrap()
    }

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        reps_free_string(ptr);
        s
    }

    #[test]
    fn test_ffi_counter_lifecycle() {
        unsafe {
            let counter = reps_counter_new(ptr::null());
            assert!(!counter.is_null());

            let down = squat_json(500.0);
            let up = squat_json(400.0);

            let first = take_string(reps_counter_process_frame(counter, down.as_ptr()));
            assert_eq!(first, "null");

            let second = take_string(reps_counter_process_frame(counter, up.as_ptr()));
            let record: serde_json::Value = serde_json::from_str(&second).unwrap();
            assert_eq!(record["exercise"], "squats");
            assert_eq!(record["form_quality"], "good");
            assert_eq!(record["rep_number"], 1);

            let summary = take_string(reps_counter_summary(counter));
            let summary: serde_json::Value = serde_json::from_str(&summary).unwrap();
            assert_eq!(summary["total_reps"], 1);
            let session_id = summary["session_id"].clone();

            assert_eq!(reps_counter_reset(counter), 0);
            let summary = take_string(reps_counter_finish(counter));
            let summary: serde_json::Value = serde_json::from_str(&summary).unwrap();
            assert_eq!(summary["total_reps"], 0);
            assert_eq!(summary["session_id"], session_id);
            assert!(summary["ended_at"].is_string());

            reps_counter_free(counter);
        }
    }

    #[test]
    fn test_ffi_count_frames() {
        unsafe {
            let ndjson = format!(
                "{}\n{}\n",
                serde_json::to_string(&squat_frame(500.0, 510.0)).unwrap(),
                serde_json::to_string(&squat_frame(400.0, 510.0)).unwrap()
            );
            let frames = CString::new(ndjson).unwrap();
            let config = CString::new(r#"{"session": {"reps_per_set": 1}}"#).unwrap();

            let result = take_string(reps_count_frames(frames.as_ptr(), config.as_ptr()));
            let records: serde_json::Value = serde_json::from_str(&result).unwrap();
            assert_eq!(records.as_array().unwrap().len(), 1);
            assert_eq!(records[0]["set_complete"], true);
            assert_eq!(records[0]["rest_secs"], 60);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        unsafe {
            let bad_config = CString::new(r#"{"detector": {"priority": []}}"#).unwrap();
            let counter = reps_counter_new(bad_config.as_ptr());
            assert!(counter.is_null());

            let error = reps_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.contains("priority"));

            let counter = reps_counter_new(ptr::null());
            let invalid = CString::new("not json").unwrap();
            assert!(reps_counter_process_frame(counter, invalid.as_ptr()).is_null());
            assert!(!reps_last_error().is_null());
            reps_counter_free(counter);

            assert!(reps_counter_process_frame(ptr::null_mut(), invalid.as_ptr()).is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = reps_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
