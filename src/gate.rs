//! Bounded readiness gate
//!
//! Composition depends on a document provider that may not be ready at call
//! time (the host page may still be loading, or an embedding application may
//! construct documents lazily). [`poll_until`] is the one-shot gate in front
//! of that dependency: it probes at a fixed interval until the probe yields a
//! value or the deadline elapses. The probe is never called again after its
//! first success, and a timeout is reported once, as an error.

use crate::error::{Error, Result};
use log::{debug, error};
use std::thread;
use std::time::{Duration, Instant};

/// Poll `probe` at `interval` until it yields a value or `max_wait` elapses.
///
/// The probe runs immediately on entry, so a dependency that is already
/// available never incurs a sleep. On timeout the elapsed wait is reported
/// via an error-level diagnostic and [`Error::GateTimeout`].
pub fn poll_until<T, F>(interval: Duration, max_wait: Duration, mut probe: F) -> Result<T>
where
  F: FnMut() -> Option<T>,
{
  let start = Instant::now();
  loop {
    if let Some(value) = probe() {
      debug!("gate: dependency available after {:?}", start.elapsed());
      return Ok(value);
    }
    if start.elapsed() >= max_wait {
      let waited_ms = start.elapsed().as_millis() as u64;
      error!("gate: dependency not available after {waited_ms}ms, aborting");
      return Err(Error::GateTimeout { waited_ms });
    }
    thread::sleep(interval);
  }
}
