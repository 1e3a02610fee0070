//! Default generator and entry point functions.

#![cfg(feature = "global_gen")]
#![cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]

use std::sync;

use crate::{Generator, InitError, Xid};
use inner::GlobalGenInner;

/// Returns the lock handle of process-wide global generator, creating one if none exists.
fn lock_global_gen() -> sync::MutexGuard<'static, GlobalGenInner> {
    static G: sync::OnceLock<sync::Mutex<GlobalGenInner>> = sync::OnceLock::new();
    G.get_or_init(Default::default)
        .lock()
        .expect("xid: could not lock global generator")
}

/// Returns the process-wide global generator, creating one on first use.
///
/// The global generator is seeded from the operating system's random source. If that fails, every
/// call returns the same error; the global generator never degrades silently. On Unix, the
/// generator is recreated when the process ID changes (i.e., upon process forks), so a forked child
/// embeds its own process ID and a freshly seeded machine discriminator and counter.
pub fn global_generator() -> Result<sync::Arc<Generator>, InitError> {
    lock_global_gen().get(std::process::id())
}

/// Generates a new ID with the global generator.
///
/// # Panics
///
/// Panics if the global generator could not be initialized. Use [`try_xid()`] to handle the
/// error instead.
///
/// # Examples
///
/// ```rust
/// let x = xid::xid();
/// println!("{}", x); // e.g., "cirourjjtoj371ols490"
/// println!("{:?}", x.as_bytes()); // as 12-byte big-endian array
///
/// let xid_string: String = xid::xid().to_string();
/// ```
pub fn xid() -> Xid {
    try_xid().expect("xid: could not initialize global generator")
}

/// Generates a new ID with the global generator, or returns the error that prevented its
/// initialization.
pub fn try_xid() -> Result<Xid, InitError> {
    global_generator().map(|g| g.generate())
}

mod inner {
    use std::sync::Arc;

    use crate::{Generator, InitError};

    /// A thin wrapper to reset the state when the process ID changes (i.e., upon Unix forks).
    #[derive(Debug)]
    pub struct GlobalGenInner {
        #[cfg_attr(not(unix), allow(dead_code))]
        pid: u32,
        generator: Result<Arc<Generator>, InitError>,
    }

    impl Default for GlobalGenInner {
        fn default() -> Self {
            Self {
                pid: std::process::id(),
                generator: Generator::new().map(Arc::new),
            }
        }
    }

    impl GlobalGenInner {
        /// Returns the current generator, recreating it on Unix if `pid` differs from the process
        /// ID recorded at its creation.
        pub fn get(&mut self, pid: u32) -> Result<Arc<Generator>, InitError> {
            #[cfg(unix)]
            if self.pid != pid {
                log::debug!(
                    "process id changed from {} to {}; reseeding xid generator",
                    self.pid,
                    pid
                );
                *self = Default::default();
                self.pid = pid;
            }
            #[cfg(not(unix))]
            let _ = pid;
            self.generator.clone()
        }
    }

    #[cfg(unix)]
    #[cfg(test)]
    mod tests {
        use super::GlobalGenInner;
        use std::sync::Arc;

        /// Keeps generator while process ID is unchanged
        #[test]
        fn keeps_generator_while_process_id_is_unchanged() {
            let mut inner = GlobalGenInner::default();
            let pid = std::process::id();
            let first = inner.get(pid).unwrap();
            let second = inner.get(pid).unwrap();
            assert!(Arc::ptr_eq(&first, &second));
            let (a, b) = (first.generate(), second.generate());
            assert_eq!(b.counter(), (a.counter() + 1) & 0xff_ffff);
            assert_eq!(a.machine(), b.machine());
        }

        /// Reseeds generator when process ID changes
        #[test]
        fn reseeds_generator_when_process_id_changes() {
            let mut inner = GlobalGenInner::default();
            let pid = std::process::id();
            let parent = inner.get(pid).unwrap();
            let child = inner.get(pid.wrapping_add(1)).unwrap();
            assert!(!Arc::ptr_eq(&parent, &child));
            assert!(!child.is_degraded());

            let again = inner.get(pid.wrapping_add(1)).unwrap();
            assert!(Arc::ptr_eq(&child, &again));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{global_generator, xid};

    const N_SAMPLES: usize = 100_000;
    thread_local!(static SAMPLES: Vec<String> = (0..N_SAMPLES).map(|_| xid().into()).collect());

    /// Generates canonical string
    #[test]
    fn generates_canonical_string() {
        let re = regex::Regex::new(r"^[0-9a-v]{19}[0g]$").unwrap();
        SAMPLES.with(|samples| {
            for e in samples {
                assert!(re.is_match(e));
            }
        });
    }

    /// Generates 100k identifiers without collision
    #[test]
    fn generates_100k_identifiers_without_collision() {
        use std::collections::HashSet;
        SAMPLES.with(|samples| {
            let s: HashSet<&String> = samples.iter().collect();
            assert_eq!(s.len(), N_SAMPLES);
        });
    }

    /// Embeds global discriminators
    #[test]
    fn embeds_global_discriminators() {
        let g = global_generator().unwrap();
        assert!(!g.is_degraded());
        assert_eq!(g.pid(), std::process::id() as u16);
        for _ in 0..1_000 {
            let e = xid();
            assert!(!e.is_zero());
            assert_eq!(e.machine(), g.machine());
            assert_eq!(e.pid(), g.pid());
        }
    }

    /// Encodes up-to-date timestamp
    #[test]
    fn encodes_up_to_date_timestamp() {
        use std::time;
        for _ in 0..10_000 {
            let ts_now = time::SystemTime::now()
                .duration_since(time::UNIX_EPOCH)
                .expect("clock may have gone backwards")
                .as_secs() as i64;
            let timestamp = xid().timestamp() as i64;
            assert!((ts_now - timestamp).abs() <= 1);
        }
    }

    /// Generates no IDs sharing same timestamp and counters under multithreading
    #[test]
    fn generates_no_ids_sharing_same_timestamp_and_counters_under_multithreading(
    ) -> Result<(), Box<dyn std::error::Error>> {
        use std::{collections::HashSet, sync::mpsc, thread};

        let (tx, rx) = mpsc::channel();
        for _ in 0..4 {
            let tx = tx.clone();
            thread::Builder::new()
                .spawn(move || {
                    for _ in 0..10_000 {
                        tx.send(xid()).unwrap();
                    }
                })
                .map_err(|err| format!("failed to spawn thread: {:?}", err))?;
        }
        drop(tx);

        let mut s = HashSet::new();
        while let Ok(e) = rx.recv() {
            s.insert(e);
        }

        assert_eq!(s.len(), 4 * 10_000);
        Ok(())
    }
}
