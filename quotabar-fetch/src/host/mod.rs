//! Host APIs for QuotaBar.
//!
//! - [`http`] - HTTP client with tracing and domain allowlist
//! - [`process`] - Subprocess execution for rendering commands
//! - [`render`] - Page renderers producing visible page text

pub mod http;
pub mod process;
pub mod render;

pub use http::{HttpClient, ResponseExt};
pub use process::{ProcessOutput, ProcessRunner};
pub use render::{CommandRenderer, FileRenderer, PageRenderer, RenderedPage, StaticRenderer};
