//! Panic capture for per-image isolation.
//!
//! `catch_unwind` only hands back the payload, so a chained panic hook
//! records where the panic was raised on the panicking thread.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

thread_local! {
    static LAST_LOCATION: RefCell<Option<String>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

/// A caught panic: its message and, when known, the `file:line` it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub message: String,
    pub location: Option<String>,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} at {}", self.message, location),
            None => f.write_str(&self.message),
        }
    }
}

fn install_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if let Some(location) = info.location() {
                LAST_LOCATION.with(|slot| {
                    *slot.borrow_mut() = Some(format!("{}:{}", location.file(), location.line()));
                });
            }
            previous(info);
        }));
    });
}

/// Run `f`, turning a panic into a [`Fault`] instead of unwinding further.
pub fn catch<T>(f: impl FnOnce() -> T) -> Result<T, Fault> {
    install_hook();
    LAST_LOCATION.with(|slot| slot.borrow_mut().take());
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| Fault {
        message: panic_message(payload.as_ref()),
        location: LAST_LOCATION.with(|slot| slot.borrow_mut().take()),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
