//! Generator state and related types.

#[cfg(not(feature = "std"))]
use core as std;

use std::{fmt, num::NonZeroU32, sync::atomic};

use rand::RngCore;

use crate::{id::MAX_COUNTER, Xid};

/// Represents the state that mints new IDs: a machine discriminator, a process discriminator, and
/// a 24-bit counter shared by every caller of the instance.
///
/// The discriminators are fixed at construction and the counter is an atomic integer, so a single
/// instance can be shared across threads by reference or [`Arc`](std::sync::Arc) without further
/// locking. Independent instances (e.g., one per tenant, or one per sandbox that lacks an ambient
/// process identity) keep independent counters.
///
/// # Examples
///
/// ```rust
/// use std::{sync, thread};
/// use xid::Generator;
///
/// let g = sync::Arc::new(Generator::new()?);
/// thread::scope(|s| {
///     for i in 0..4 {
///         let g = sync::Arc::clone(&g);
///         s.spawn(move || {
///             for _ in 0..8 {
///                 println!("{} by thread {}", g.generate(), i);
///                 thread::yield_now();
///             }
///         });
///     }
/// });
/// # Ok::<(), xid::InitError>(())
/// ```
#[derive(Debug)]
pub struct Generator {
    machine: [u8; 3],
    pid: u16,
    counter: atomic::AtomicU32,
    degraded: bool,
}

impl Generator {
    /// Creates a generator seeded from the operating system's random source, using the OS process
    /// ID as the process discriminator.
    ///
    /// Returns an error if the random source is unavailable.
    #[cfg(feature = "std")]
    #[cfg_attr(docsrs, doc(cfg(feature = "std")))]
    pub fn new() -> Result<Self, InitError> {
        Self::from_rng(&mut rand::rngs::OsRng, Some(std::process::id()))
    }

    /// Creates a generator like [`Generator::new()`], resolving an initialization failure
    /// according to `fallback`.
    #[cfg(feature = "std")]
    #[cfg_attr(docsrs, doc(cfg(feature = "std")))]
    pub fn with_fallback(fallback: Fallback) -> Result<Self, InitError> {
        fallback.apply(Self::new())
    }

    /// Creates a generator that draws the machine discriminator and the counter seed from `rng`.
    ///
    /// `pid` is truncated to its low 16 bits. When it is `None` or zero, the process discriminator
    /// is drawn from `rng` as well.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use xid::Generator;
    ///
    /// let g = Generator::from_rng(&mut StdRng::seed_from_u64(42), Some(0x1_2345))?;
    /// assert_eq!(g.pid(), 0x2345);
    /// assert_eq!(g.generate().pid(), 0x2345);
    /// # Ok::<(), xid::InitError>(())
    /// ```
    pub fn from_rng<R: RngCore + ?Sized>(rng: &mut R, pid: Option<u32>) -> Result<Self, InitError> {
        let mut seed = [0u8; 6];
        rng.try_fill_bytes(&mut seed)?;
        let [m0, m1, m2, c0, c1, c2] = seed;

        let pid = match pid {
            Some(pid) if pid > 0 => pid as u16,
            _ => random_pid(rng)?,
        };

        log::debug!(
            "xid generator initialized: machine={:02x}{:02x}{:02x} pid={}",
            m0,
            m1,
            m2,
            pid
        );
        Ok(Self::from_parts(
            [m0, m1, m2],
            pid,
            u32::from_be_bytes([0, c0, c1, c2]),
        ))
    }

    /// Creates a generator from explicit field values.
    ///
    /// `counter` is the value the counter holds before the next ID is minted; only its low 24 bits
    /// are used.
    pub const fn from_parts(machine: [u8; 3], pid: u16, counter: u32) -> Self {
        Self {
            machine,
            pid,
            counter: atomic::AtomicU32::new(counter & MAX_COUNTER),
            degraded: false,
        }
    }

    /// Creates a deterministic, best-effort generator with zero machine and process
    /// discriminators and a zero counter seed.
    ///
    /// IDs minted by degraded generators in different processes collide whenever they share a
    /// timestamp. [`Generator::is_degraded()`] distinguishes such an instance from a seeded one.
    pub const fn degraded() -> Self {
        Self {
            machine: [0; 3],
            pid: 0,
            counter: atomic::AtomicU32::new(0),
            degraded: true,
        }
    }

    /// Returns the machine discriminator embedded in every ID from this generator.
    pub const fn machine(&self) -> [u8; 3] {
        self.machine
    }

    /// Returns the process discriminator embedded in every ID from this generator.
    pub const fn pid(&self) -> u16 {
        self.pid
    }

    /// Returns true if this generator was created by [`Generator::degraded()`].
    pub const fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Increments the counter and returns the incremented value, wrapping from `0xffffff` to zero.
    pub fn next_counter(&self) -> u32 {
        // the stored value wraps at 2^32, a multiple of 2^24, so masking yields the 24-bit wrap
        self.counter
            .fetch_add(1, atomic::Ordering::Relaxed)
            .wrapping_add(1)
            & MAX_COUNTER
    }

    /// Generates a new ID from the current wall-clock time.
    ///
    /// # Panics
    ///
    /// Panics if the system clock reports a time before the Unix epoch.
    #[cfg(feature = "std")]
    #[cfg_attr(docsrs, doc(cfg(feature = "std")))]
    pub fn generate(&self) -> Xid {
        use std::time;
        self.generate_core(
            time::SystemTime::now()
                .duration_since(time::UNIX_EPOCH)
                .expect("clock may have gone backwards")
                .as_secs() as u32,
        )
    }

    /// Generates a new ID from the `unix_ts_sec` passed.
    ///
    /// This is the clock-independent primitive behind [`Generator::generate()`], available in
    /// `no_std` environments.
    pub fn generate_core(&self, unix_ts_sec: u32) -> Xid {
        Xid::from_fields(unix_ts_sec, self.machine, self.pid, self.next_counter())
    }
}

/// Draws the process discriminator from `rng` for hosts that expose no process ID.
fn random_pid<R: RngCore + ?Sized>(rng: &mut R) -> Result<u16, InitError> {
    let mut buf = [0u8; 2];
    rng.try_fill_bytes(&mut buf)?;
    log::debug!("process id unavailable; using random pid discriminator");
    Ok(u16::from_be_bytes(buf))
}

/// Specifies how [`Generator::with_fallback()`] handles an unavailable random source.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Fallback {
    /// Returns the initialization error.
    #[default]
    Fail,

    /// Returns [`Generator::degraded()`] instead of an error.
    Degrade,
}

impl Fallback {
    /// Resolves the result of a generator initialization according to this policy.
    pub fn apply(self, result: Result<Generator, InitError>) -> Result<Generator, InitError> {
        match (result, self) {
            (Err(err), Fallback::Degrade) => {
                log::warn!("{}; falling back to degraded xid generator", err);
                Ok(Generator::degraded())
            }
            (result, _) => result,
        }
    }
}

/// Error initializing a generator because the random source failed.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct InitError {
    code: Option<NonZeroU32>,
}

impl InitError {
    /// Returns the error code reported by the random source, if any.
    pub const fn code(&self) -> Option<NonZeroU32> {
        self.code
    }
}

impl From<rand::Error> for InitError {
    fn from(err: rand::Error) -> Self {
        Self { code: err.code() }
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not read random source")?;
        if let Some(code) = self.code {
            write!(f, " (code {})", code)?;
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl std::error::Error for InitError {}
