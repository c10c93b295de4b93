//! Value Codec Module
//!
//! Converts cached values to and from their durable text form.
//!
//! ## Format
//! Values are stored as compact JSON with object keys in sorted order at
//! every nesting level, so equal values always encode to identical text:
//!
//! ```text
//! {"b":1,"a":{"y":2,"x":3}}   ──encode──▶   {"a":{"x":3,"y":2},"b":1}
//! ```
//!
//! The same text feeds [`state_hash`], so a hash computed by one process can
//! be checked by another.

mod fingerprint;
mod value;

pub use fingerprint::state_hash;
pub use value::{decode, encode};
