#![warn(missing_debug_implementations, missing_docs, rust_2018_idioms)]
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! A URI/URN component splitter that keeps raw and percent-encoded octets apart.
//!
//! A literal is first brought into canonical form as an [`EString`], in which
//! `%41` and `A` are the same text while `%2F` and `/` are not. It is then
//! split into its [RFC 3986] components by a [`UriParser`] using
//! delimiter-driven slicing over a moving [`Cursor`](extract::Cursor).
//!
//! See the documentation of [`Uri`] for more details.
//!
//! [RFC 3986]: https://datatracker.ietf.org/doc/html/rfc3986/
//! [`EString`]: pct_enc::EString
//! [`UriParser`]: parse::UriParser
//!
//! # Examples
//!
//! ```
//! use uri_parts::Uri;
//!
//! let uri = Uri::parse_str("urn:example:animal:ferret:nose")?;
//! let c = uri.components();
//! assert_eq!(c.scheme().unwrap().as_str(), "urn");
//! assert!(c.authority().is_none());
//! assert_eq!(c.path(), "example:animal:ferret:nose");
//! assert_eq!(uri.to_string(), "urn:example:animal:ferret:nose");
//! # Ok::<_, uri_parts::ParseError<String>>(())
//! ```
//!
//! # Feature flags
//!
//! All features except `std` are disabled by default.
//!
//! - `std`: Enables `std` support. This includes [`Error`] implementations
//!   and the [`lines`] reader. Implies `impl-error`.
//!
//! - `impl-error`: Enables [`Error`] implementations for `no_std` users.
//!
//! - `serde`: Enables `serde` support for [`EString`] and [`Uri`].
//!
//! - `log`: Emits parser decisions through the [`log`](https://docs.rs/log) facade.
//!
//! [`Error`]: core::error::Error

extern crate alloc;

#[cfg(feature = "impl-error")]
use core::error::Error;

mod log;

pub mod component;
pub mod error;
pub mod extract;
pub mod parse;
pub mod pct_enc;

mod uri;
pub use uri::{QueryPairs, Uri};

#[cfg(feature = "std")]
mod lines;
#[cfg(feature = "std")]
pub use lines::{lines, Lines};

pub use error::{ParseError, ParseErrorKind};
