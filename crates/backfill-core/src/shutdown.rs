//! Graceful stop between rows via atomic flag

use std::sync::atomic::AtomicBool;

/// Global shutdown flag: set by SIGTERM/SIGINT handler, polled before each row
pub fn shutdown_flag() -> &'static AtomicBool {
    static FLAG: AtomicBool = AtomicBool::new(false);
    &FLAG
}
