// initialize.rs - Reference-counted libyara initialization.

use std::sync::{Mutex, PoisonError};

use log::{debug, warn};

use crate::error::YaraError;
use crate::ffi;

static INIT_MUTEX: Mutex<()> = Mutex::new(());

/// Keeps libyara initialized while alive.
///
/// libyara counts `yr_initialize` calls and only tears down on the matching
/// last `yr_finalize`, so any number of tokens may coexist. Every
/// [`Compiler`](crate::Compiler) and [`Rules`](crate::Rules) holds one.
#[derive(Debug)]
pub struct InitializationToken {
    _private: (),
}

impl InitializationToken {
    pub fn new() -> Result<InitializationToken, YaraError> {
        let _guard = INIT_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
        YaraError::from_code(unsafe { ffi::yr_initialize() })?;
        debug!("libyara initialized");
        Ok(InitializationToken { _private: () })
    }
}

impl Drop for InitializationToken {
    fn drop(&mut self) {
        let _guard = INIT_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
        match YaraError::from_code(unsafe { ffi::yr_finalize() }) {
            Ok(()) => debug!("libyara finalized"),
            Err(e) => warn!("libyara finalization failed: {}", e),
        }
    }
}
