// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # QuotaBar Fetch
//!
//! Page acquisition and HTTP host APIs for the QuotaBar application.
//!
//! ## Host APIs
//!
//! - [`host::render`] - Renderers returning the visible text of a page
//! - [`host::process`] - Subprocess execution with a kill-on-timeout deadline
//! - [`host::http`] - HTTP client with tracing and domain allowlist
//!
//! ## Acquisition
//!
//! [`SingleFlight`] wraps a renderer with one slot per [`Target`] and a
//! timeout. A second request for a busy target is rejected, not queued.
//!
//! ```ignore
//! use quotabar_fetch::{CommandRenderer, SingleFlight, Target};
//!
//! let renderer = CommandRenderer::from_command_line(&command, timeout)?;
//! let flight = SingleFlight::new(renderer);
//!
//! match flight.acquire_or_none(Target::Usage, url).await? {
//!     Some(page) => println!("{}", page.text),
//!     None => println!("busy, try again later"),
//! }
//! ```

pub mod acquire;
pub mod backoff;
pub mod error;
pub mod host;

// Errors
pub use error::{FetchError, HttpError, ProcessError};

// Host APIs
pub use host::{
    http::{HttpClient, ResponseExt},
    process::{ProcessOutput, ProcessRunner},
    render::{CommandRenderer, FileRenderer, PageRenderer, RenderedPage, StaticRenderer},
};

// Acquisition
pub use acquire::{FlightToken, SingleFlight, Target, DEFAULT_ACQUIRE_TIMEOUT};
pub use backoff::BackoffPolicy;
