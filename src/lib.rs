//! Globally unique, time-sortable 12-byte identifiers
//!
//! ```rust
//! use xid::xid;
//!
//! let x = xid();
//! println!("{}", x); // e.g. "cirourjjtoj371ols490"
//! println!("{:?}", x.as_bytes()); // as 12-byte big-endian array
//! ```
//!
//! # Field and bit layout
//!
//! This library produces identifiers with the following byte layout:
//!
//! ```text
//! +---+---+---+---+---+---+---+---+---+---+---+---+
//! | 0 | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 | 9 |10 |11 |
//! +---+---+---+---+---+---+---+---+---+---+---+---+
//! |   timestamp   |  machine  |  pid  |  counter  |
//! +---+---+---+---+---+---+---+---+---+---+---+---+
//! ```
//!
//! Where:
//!
//! - The 32-bit big-endian `timestamp` field holds the Unix time in seconds.
//! - The 24-bit `machine` field is a random discriminator drawn once per generator from a
//!   cryptographically strong random source.
//! - The 16-bit big-endian `pid` field holds the low 16 bits of the process ID, or random bits
//!   where the host exposes no process ID.
//! - The 24-bit big-endian `counter` field is seeded randomly and incremented by one for each new
//!   ID, wrapping around to zero after `0xffffff`.
//!
//! Identifiers sort by creation time both as bytes and as strings, except when the counter wraps
//! within a second or IDs come from different generators within the same second.
//!
//! # Text representation
//!
//! The canonical string representation is 20 characters of the alphabet
//! `0123456789abcdefghijklmnopqrstuv`, each encoding five bits of the 96-bit big-endian value
//! padded with four zero bits at the end. The alphabet is in ascending ASCII order, so the strings
//! sort the same way as the bytes.
//!
//! ```rust
//! use xid::Xid;
//!
//! let x = "9m4e2mr0ui3e8a215n4g".parse::<Xid>()?;
//! assert_eq!(x.timestamp(), 1300816219);
//! assert_eq!(x.machine(), [0x60, 0xf4, 0x86]);
//! assert_eq!(x.pid(), 0xe428);
//! assert_eq!(x.counter(), 4271561);
//! # Ok::<(), xid::ParseError>(())
//! ```
//!
//! # Crate features
//!
//! Default features:
//!
//! - `std` enables the system clock, the OS random source and process ID, and `String`
//!   conversions. Without `std`, this crate supports `no_std` environments through
//!   [`Generator::from_parts()`], [`Generator::from_rng()`], and [`Generator::generate_core()`].
//! - `global_gen` (implies `std`) enables the process-wide default generator behind [`xid()`].
//!
//! Optional features:
//!
//! - `serde` enables serialization as a string in human-readable formats and as a 12-byte byte
//!   string in compact formats.

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod id;
pub use id::{ParseError, TryIntoXid, Xid};

pub mod generator;
pub use generator::{Fallback, Generator, InitError};

mod global_gen;
#[cfg(feature = "global_gen")]
pub use global_gen::{global_generator, try_xid, xid};
