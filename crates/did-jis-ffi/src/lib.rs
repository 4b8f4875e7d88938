//! Flat C ABI over [`did_jis`], for embedded hosts and anything else that
//! cannot link Rust directly.
//!
//! The surface is handle-based: [`did_engine_new`] and
//! [`did_engine_from_secret`] hand out an opaque engine pointer that every
//! other call takes, and [`did_engine_free`] tears it down. Every returned
//! string is a fresh NUL-terminated allocation owned by the caller and
//! released through [`did_free_string`], nothing else; [`did_version`]
//! alone returns a static that must not be freed. Failure is reported as a
//! null pointer or `false`, with a `tracing` debug event naming the reason,
//! and never by unwinding across the boundary.

use std::ffi::{c_char, CStr, CString};
use std::ptr;
use std::str::FromStr as _;

use did_jis::{Did, DidDocument, DidEngine};
use tracing::debug;

/// Capacity `did_parse` assumes for its method buffer, NUL included.
pub const METHOD_BUF_LEN: usize = 32;
/// Capacity `did_parse` assumes for its id buffer, NUL included.
pub const ID_BUF_LEN: usize = 256;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

/// Borrows a C string as UTF-8, logging why it was rejected.
///
/// # Safety
/// `ptr` must be null or point to a valid NUL-terminated string.
unsafe fn borrow_str<'a>(ptr: *const c_char, what: &str) -> Option<&'a str> {
	if ptr.is_null() {
		debug!("{what} pointer is null");
		return None;
	}
	match unsafe { CStr::from_ptr(ptr) }.to_str() {
		Ok(s) => Some(s),
		Err(_) => {
			debug!("{what} is not valid UTF-8");
			None
		}
	}
}

/// # Safety
/// `engine` must be null or a pointer returned by [`did_engine_new`] or
/// [`did_engine_from_secret`] that has not been freed.
unsafe fn borrow_engine<'a>(engine: *const DidEngine) -> Option<&'a DidEngine> {
	if engine.is_null() {
		debug!("engine handle is null");
		return None;
	}
	Some(unsafe { &*engine })
}

/// Hands a string to the caller, who owns it until [`did_free_string`].
fn transfer_string(s: String) -> *mut c_char {
	match CString::new(s) {
		Ok(s) => s.into_raw(),
		Err(_) => {
			debug!("string contains an interior NUL byte");
			ptr::null_mut()
		}
	}
}

/// Copies `value` NUL-terminated into `buf` of `capacity` bytes, `false` if
/// it had to truncate.
///
/// # Safety
/// `buf` must be valid for writes of `capacity` bytes.
unsafe fn write_truncated(value: &str, buf: *mut c_char, capacity: usize) -> bool {
	let bytes = value.as_bytes();
	let copied = bytes.len().min(capacity - 1);
	unsafe {
		ptr::copy_nonoverlapping(bytes.as_ptr(), buf.cast::<u8>(), copied);
		*buf.add(copied) = 0;
	}
	if copied < bytes.len() {
		debug!(
			"a component of {} bytes was truncated to the buffer capacity of {capacity}",
			bytes.len()
		);
		return false;
	}
	true
}

/// Creates an engine around a fresh keypair. Free with [`did_engine_free`].
#[no_mangle]
pub extern "C" fn did_engine_new() -> *mut DidEngine {
	Box::into_raw(Box::new(DidEngine::new()))
}

/// Creates an engine from a 64-hex-char secret; null if the secret is
/// malformed. Free with [`did_engine_free`].
///
/// # Safety
/// `secret_hex` must be null or point to a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn did_engine_from_secret(secret_hex: *const c_char) -> *mut DidEngine {
	let Some(secret_hex) = (unsafe { borrow_str(secret_hex, "secret") }) else {
		return ptr::null_mut();
	};
	match DidEngine::from_secret_hex(secret_hex) {
		Ok(engine) => Box::into_raw(Box::new(engine)),
		Err(err) => {
			debug!("rejected secret import: {err}");
			ptr::null_mut()
		}
	}
}

/// Tears an engine down. Null is a no-op.
///
/// # Safety
/// `engine` must be null or a pointer returned by [`did_engine_new`] or
/// [`did_engine_from_secret`] that has not already been freed.
#[no_mangle]
pub unsafe extern "C" fn did_engine_free(engine: *mut DidEngine) {
	if engine.is_null() {
		return;
	}
	drop(unsafe { Box::from_raw(engine) });
}

/// The engine's public key as 64 lowercase hex chars. Free the result with
/// [`did_free_string`].
///
/// # Safety
/// `engine` must be null or a live engine pointer.
#[no_mangle]
pub unsafe extern "C" fn did_get_public_key(engine: *const DidEngine) -> *mut c_char {
	let Some(engine) = (unsafe { borrow_engine(engine) }) else {
		return ptr::null_mut();
	};
	transfer_string(engine.public_key_hex())
}

/// The engine's public key in multibase form. Free the result with
/// [`did_free_string`].
///
/// # Safety
/// `engine` must be null or a live engine pointer.
#[no_mangle]
pub unsafe extern "C" fn did_get_public_key_multibase(engine: *const DidEngine) -> *mut c_char {
	let Some(engine) = (unsafe { borrow_engine(engine) }) else {
		return ptr::null_mut();
	};
	transfer_string(engine.public_key_multibase())
}

/// Mints `did:jis:<id>`; null if `id` is empty. Free the result with
/// [`did_free_string`].
///
/// # Safety
/// `engine` must be null or a live engine pointer; `id` must be null or
/// point to a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn did_create(engine: *const DidEngine, id: *const c_char) -> *mut c_char {
	let Some(engine) = (unsafe { borrow_engine(engine) }) else {
		return ptr::null_mut();
	};
	let Some(id) = (unsafe { borrow_str(id, "id") }) else {
		return ptr::null_mut();
	};
	match engine.create_did(id) {
		Ok(did) => transfer_string(did.into_string()),
		Err(err) => {
			debug!("rejected DID creation: {err}");
			ptr::null_mut()
		}
	}
}

/// Mints the DID derived from the engine's public key. Free the result
/// with [`did_free_string`].
///
/// # Safety
/// `engine` must be null or a live engine pointer.
#[no_mangle]
pub unsafe extern "C" fn did_create_from_key(engine: *const DidEngine) -> *mut c_char {
	let Some(engine) = (unsafe { borrow_engine(engine) }) else {
		return ptr::null_mut();
	};
	transfer_string(engine.create_did_from_key().into_string())
}

/// Splits a DID into its method and id, written NUL-terminated into caller
/// buffers of at least [`METHOD_BUF_LEN`] and [`ID_BUF_LEN`] bytes.
///
/// Returns `false` for malformed DIDs and also when a component did not
/// fit whole; a truncated component is still written NUL-terminated, never
/// past its capacity.
///
/// # Safety
/// `did` must be null or point to a valid NUL-terminated string; `method`
/// and `id` must be null or valid for writes of [`METHOD_BUF_LEN`] and
/// [`ID_BUF_LEN`] bytes respectively.
#[no_mangle]
pub unsafe extern "C" fn did_parse(did: *const c_char, method: *mut c_char, id: *mut c_char) -> bool {
	let Some(did) = (unsafe { borrow_str(did, "did") }) else {
		return false;
	};
	if method.is_null() || id.is_null() {
		debug!("output buffer pointer is null");
		return false;
	}
	let parsed = match Did::from_str(did) {
		Ok(parsed) => parsed,
		Err(err) => {
			debug!("rejected DID: {err}");
			return false;
		}
	};
	// write both components even if one truncates, so the buffers always
	// hold defined contents
	let method_fit = unsafe { write_truncated(parsed.method(), method, METHOD_BUF_LEN) };
	let id_fit = unsafe { write_truncated(parsed.id(), id, ID_BUF_LEN) };
	method_fit && id_fit
}

/// Whether `did` is a well-formed `did:jis` identifier.
///
/// # Safety
/// `did` must be null or point to a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn did_is_valid(did: *const c_char) -> bool {
	let Some(did) = (unsafe { borrow_str(did, "did") }) else {
		return false;
	};
	Did::is_valid_jis(did)
}

/// Issues the signed identity document for `did` as compact JSON; null if
/// `did` is empty. Free the result with [`did_free_string`].
///
/// # Safety
/// `engine` must be null or a live engine pointer; `did` must be null or
/// point to a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn did_create_document(
	engine: *const DidEngine,
	did: *const c_char,
) -> *mut c_char {
	let Some(engine) = (unsafe { borrow_engine(engine) }) else {
		return ptr::null_mut();
	};
	let Some(did) = (unsafe { borrow_str(did, "did") }) else {
		return ptr::null_mut();
	};
	match engine.create_document(did) {
		Ok(json) => transfer_string(json),
		Err(err) => {
			debug!("rejected document creation: {err}");
			ptr::null_mut()
		}
	}
}

/// Signs `message` with the engine key, returning the 128-hex-char
/// signature. Free the result with [`did_free_string`].
///
/// # Safety
/// `engine` must be null or a live engine pointer; `message` must be null
/// or point to a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn did_sign(engine: *const DidEngine, message: *const c_char) -> *mut c_char {
	let Some(engine) = (unsafe { borrow_engine(engine) }) else {
		return ptr::null_mut();
	};
	let Some(message) = (unsafe { borrow_str(message, "message") }) else {
		return ptr::null_mut();
	};
	transfer_string(engine.sign(message.as_bytes()))
}

/// Checks a hex signature over `message` against the engine's own key.
///
/// # Safety
/// `engine` must be null or a live engine pointer; `message` and
/// `signature` must be null or point to valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn did_verify(
	engine: *const DidEngine,
	message: *const c_char,
	signature: *const c_char,
) -> bool {
	let Some(engine) = (unsafe { borrow_engine(engine) }) else {
		return false;
	};
	let Some(message) = (unsafe { borrow_str(message, "message") }) else {
		return false;
	};
	let Some(signature) = (unsafe { borrow_str(signature, "signature") }) else {
		return false;
	};
	engine.verify(message.as_bytes(), signature)
}

/// Checks a hex signature over `message` against a caller-supplied hex
/// public key, with no engine involved.
///
/// # Safety
/// All three arguments must be null or point to valid NUL-terminated
/// strings.
#[no_mangle]
pub unsafe extern "C" fn did_verify_with_key(
	message: *const c_char,
	signature: *const c_char,
	public_key_hex: *const c_char,
) -> bool {
	let Some(message) = (unsafe { borrow_str(message, "message") }) else {
		return false;
	};
	let Some(signature) = (unsafe { borrow_str(signature, "signature") }) else {
		return false;
	};
	let Some(public_key_hex) = (unsafe { borrow_str(public_key_hex, "public key") }) else {
		return false;
	};
	DidEngine::verify_with_key(message.as_bytes(), signature, public_key_hex)
}

/// Releases a string returned by this library. Null is a no-op.
///
/// # Safety
/// `s` must be null or a string returned by this library that has not
/// already been freed.
#[no_mangle]
pub unsafe extern "C" fn did_free_string(s: *mut c_char) {
	if s.is_null() {
		return;
	}
	drop(unsafe { CString::from_raw(s) });
}

/// The library version as a static string. Do **not** free it.
#[no_mangle]
pub extern "C" fn did_version() -> *const c_char {
	VERSION.as_ptr().cast()
}
