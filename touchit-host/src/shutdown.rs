//! Signal-driven shutdown
//!
//! SIGINT and SIGTERM only raise a flag; the poll loop checks it once per
//! iteration and returns, so the session is dropped on the normal path.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_signal(_: libc::c_int) {
    SHUTDOWN.store(true, Ordering::SeqCst);
}

/// Route SIGINT and SIGTERM to the shutdown flag
pub fn install() -> io::Result<()> {
    for signal in [libc::SIGINT, libc::SIGTERM] {
        // SAFETY: the handler only stores to an atomic, which is
        // async-signal-safe.
        let previous = unsafe {
            libc::signal(
                signal,
                handle_signal as extern "C" fn(libc::c_int) as libc::sighandler_t,
            )
        };
        if previous == libc::SIG_ERR {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

/// Flag handed to the poll loop
pub fn flag() -> &'static AtomicBool {
    &SHUTDOWN
}
