use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use log::{debug, warn};

use super::state::StopHandle;
use crate::core::error::Result;

static STOP_FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();

extern "C" fn on_termination(_signal: libc::c_int) {
    // Only an atomic store: anything else is not async-signal-safe.
    if let Some(flag) = STOP_FLAG.get() {
        flag.store(false, Ordering::Relaxed);
    }
}

/// Routes SIGINT and SIGTERM to `handle`. The first handle bound for the
/// process wins; later calls keep it and log a warning.
pub fn forward_termination(handle: &StopHandle) -> Result<()> {
    let flag = handle.flag();
    let bound = STOP_FLAG.get_or_init(|| Arc::clone(&flag));
    if !Arc::ptr_eq(bound, &flag) {
        warn!("Termination signals already routed to another run");
        return Ok(());
    }

    for signal in [libc::SIGINT, libc::SIGTERM] {
        let handler = on_termination as extern "C" fn(libc::c_int);
        let previous =
            unsafe { libc::signal(signal, handler as libc::sighandler_t) };
        if previous == libc::SIG_ERR {
            return Err(io::Error::last_os_error().into());
        }
    }

    debug!("Forwarding SIGINT/SIGTERM to the main loop");
    Ok(())
}
