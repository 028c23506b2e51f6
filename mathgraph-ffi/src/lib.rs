use mathgraph_core::node::Node;
use mathgraph_core::parser::parse;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_double};
use std::ptr;

/// A parsed expression behind an opaque handle.
///
/// Parsing never fails from the host's point of view: a malformed expression
/// produces a handle whose evaluator returns `NaN` everywhere, which the
/// host draws as an empty curve.
pub struct ExprHandle {
    body: Option<Node>,
}

#[no_mangle]
pub unsafe extern "C" fn mathgraph_expr_parse(expr: *const c_char) -> *mut ExprHandle {
    let body = CStr::from_ptr(expr)
        .to_str()
        .ok()
        .and_then(|s| parse(s).ok());
    Box::into_raw(Box::new(ExprHandle { body }))
}

#[no_mangle]
pub unsafe extern "C" fn mathgraph_expr_is_valid(handle: *mut ExprHandle) -> bool {
    (*handle).body.is_some()
}

#[no_mangle]
pub unsafe extern "C" fn mathgraph_expr_eval(handle: *mut ExprHandle, x: c_double) -> c_double {
    match &(*handle).body {
        Some(node) => node.eval(x),
        None => f64::NAN,
    }
}

/// Returns the canonical display string, or null for a handle that did not
/// parse. The caller must release it with `mathgraph_str_free`.
#[no_mangle]
pub unsafe extern "C" fn mathgraph_expr_display(handle: *mut ExprHandle) -> *mut c_char {
    match &(*handle).body {
        Some(node) => CString::new(node.to_string())
            .map(CString::into_raw)
            .unwrap_or(ptr::null_mut()),
        None => ptr::null_mut(),
    }
}

#[no_mangle]
pub unsafe extern "C" fn mathgraph_str_free(s: *mut c_char) {
    if !s.is_null() {
        // let the compiler drop the string
        let _ = CString::from_raw(s);
    }
}

#[no_mangle]
pub unsafe extern "C" fn mathgraph_expr_free(handle: *mut ExprHandle) {
    // let the compiler drop the box
    let _ = Box::from_raw(handle);
}
