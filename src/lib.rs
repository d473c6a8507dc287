//! Prefixed, time-sortable unique identifiers on top of a [Twitter's Snowflake]
//! style generator.
//!
//! An identifier is a caller-chosen prefix followed by the 63-bit snowflake id
//! in 16 lowercase hex characters, e.g. `wks-00b1f4c5e2c07000`. Identifiers
//! from one generator sort as strings in the order they were taken.
//!
//! ## Quickstart
//!
//! Add the following to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! snowflake_idgen = "0.1"
//! ```
//!
//! Use the library like this:
//!
//! ```
//! use snowflake_idgen::{IdGenerator, Snowflake};
//!
//! let generator = IdGenerator::with_builder("wks-", Snowflake::builder().worker_tag(7));
//! let id = generator.take().unwrap();
//! assert!(id.starts_with("wks-"));
//! assert_eq!(id.len(), 20);
//! ```
//!
//! `IdGenerator::new(prefix)` derives the worker tag from the host's private
//! ip address instead. That default can collide between hosts; configure
//! explicit tags when instances must never collide.
//!
//! ## Concurrent use
//!
//! IdGenerator is thread-safe. `clone` it before moving to another thread:
//! ```
//! use snowflake_idgen::{IdGenerator, Snowflake};
//! use std::thread;
//!
//! let generator = IdGenerator::with_builder("wks-", Snowflake::builder().worker_tag(1));
//!
//! let mut children = Vec::new();
//! for _ in 0..10 {
//!     let thread_generator = generator.clone();
//!     children.push(thread::spawn(move || {
//!         println!("{}", thread_generator.take().unwrap());
//!     }));
//! }
//!
//! for child in children {
//!     child.join().unwrap();
//! }
//! ```
//!
//! [Twitter's Snowflake]: https://blog.twitter.com/2010/announcing-snowflake

mod builder;
mod codec;
mod error;
mod generator;
mod snowflake;
mod time;

pub use crate::snowflake::*;
pub use builder::*;
pub use codec::*;
pub use error::*;
pub use generator::*;
pub use time::*;
