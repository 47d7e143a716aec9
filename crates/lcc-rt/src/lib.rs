//! Runtime support for programs instrumented by `count-libcalls`.
//!
//! Instrumented code calls [`__noinstrument_count_libcall`] with the name of
//! the library function it is about to call. The counts are printed to
//! stderr once, when the process exits.
//!
//! Counting is serialized by a lock, so counts from concurrent threads are
//! never lost. The report reads the table at exit without waiting for other
//! threads: calls made by threads still running at that point may or may not
//! be included.

use std::ffi::{CStr, c_char};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

mod report;
mod store;

pub use report::*;
pub use store::*;

/// Exported name of the counting entry point.
pub const ENTRY_SYMBOL: &str = "__noinstrument_count_libcall";

static COUNTERS: CounterStore = CounterStore::new();
static REPORTED: AtomicBool = AtomicBool::new(false);

/// The process-wide counter table.
#[must_use]
pub fn counters() -> &'static CounterStore {
    &COUNTERS
}

/// Count one call to the library function named by `funcname`.
///
/// Null pointers are ignored. Names that are not valid UTF-8 are counted
/// under their lossy conversion.
///
/// # Safety
///
/// `funcname` must be null or point to a NUL-terminated string that stays
/// valid for the duration of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn __noinstrument_count_libcall(funcname: *const c_char) {
    if funcname.is_null() {
        return;
    }
    hook::ensure_registered();
    let name = unsafe { CStr::from_ptr(funcname) };
    COUNTERS.record(&name.to_string_lossy());
}

/// Print the counter table to stderr, unless it was already printed.
///
/// Returns `true` if this call printed the report. Output errors are
/// ignored.
pub fn report_once() -> bool {
    if REPORTED.swap(true, Ordering::AcqRel) {
        return false;
    }
    let snapshot = COUNTERS.snapshot();
    let _ = write_report(&mut io::stderr().lock(), &snapshot);
    true
}

extern "C" fn print_libcall_counters() {
    report_once();
}

extern "C" fn register_report() {
    // SAFETY: `print_libcall_counters` is a plain `extern "C" fn()`.
    unsafe {
        libc::atexit(print_libcall_counters);
    }
}

/// Exit hook registration.
///
/// On ELF and Mach-O targets a static constructor registers the report with
/// `atexit` at load time, so the header is printed even if nothing was
/// counted. Elsewhere the report is registered on the first counted call.
#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_vendor = "apple"
))]
mod hook {
    #[used]
    #[cfg_attr(target_vendor = "apple", unsafe(link_section = "__DATA,__mod_init_func"))]
    #[cfg_attr(not(target_vendor = "apple"), unsafe(link_section = ".init_array"))]
    static REGISTER_REPORT: extern "C" fn() = super::register_report;

    pub const fn ensure_registered() {}
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_vendor = "apple"
)))]
mod hook {
    use std::sync::Once;

    static REGISTER: Once = Once::new();

    pub fn ensure_registered() {
        REGISTER.call_once(|| super::register_report());
    }
}
