//! # lww-dict
//!
//! A state-based last-writer-wins element dictionary.
//!
//! Replicas of an [`LWWDict`] are mutated independently with caller-supplied
//! logical timestamps and reconciled by merging full state. Merging is
//! commutative, associative and idempotent, so replicas converge no matter
//! in which order, or how often, states are exchanged.
//!
//! ## `no_std` Support
//!
//! This crate supports `no_std` environments with the `alloc` crate.
//! Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! lww-dict = { version = "0.1", default-features = false }
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use lww_dict::prelude::*;
//!
//! let mut phone = LWWDict::new();
//! phone.put("theme".to_string(), "dark", 1);
//!
//! let mut laptop = LWWDict::new();
//! laptop.put("theme".to_string(), "light", 2);
//! laptop.delete("draft".to_string(), 2);
//!
//! phone.merge(&laptop);
//! laptop.merge(&phone);
//!
//! assert_eq!(phone, laptop);
//! assert_eq!(phone.get(&"theme".to_string()).value(), Some(&b"light"[..]));
//! ```
//!
//! ## Visibility
//!
//! Every key holds its greatest put and its greatest tombstone. A key is
//! visible when its put is newer than its tombstone. On an exact timestamp
//! tie the replica's [`Bias`] decides; every replica must use the same bias.
//!
//! ## The `Crdt` Trait
//!
//! [`LWWDict`] implements [`Crdt`] for full-state merges, [`DeltaCrdt`] for
//! shipping only what a peer is missing, and [`events::OpCrdt`] for replaying
//! individual operations.
//!
//! ## Logging
//!
//! Merges and compactions emit `tracing` events at `trace` and `debug` level.
//! The crate never installs a subscriber.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

mod bias;
mod crdt;
mod dict;
mod item;

pub mod compaction;
pub mod events;
pub mod prelude;

pub use bias::Bias;
pub use crdt::{Crdt, DeltaCrdt};
pub use dict::{LWWDict, LWWDictDelta, Lookup};
pub use item::Item;
