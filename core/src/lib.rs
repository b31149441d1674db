//! Client core for the posts resource of a WordPress-style REST API.
//!
//! # Overview
//! `PostApi` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network (host-does-IO pattern). `PostClient` pairs
//! it with a `Transport` to run list / find / create / update / delete as
//! ordinary method calls.
//!
//! # Design
//! - `PostApi` is stateless: it holds the base URL and collection path.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and every step is testable without a server.
//! - Non-2xx responses go through `classify`, which picks `NotFound`,
//!   `Validation` or a generic HTTP error from the status code alone.
//! - HTML content is carried verbatim from wire to `Post::content_html`.
//!
//! ```no_run
//! use wpclient_core::{ClientConfig, DeleteOptions, ListOptions, PostClient, PostFields};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PostClient::from_config(&ClientConfig::from_env()?);
//! let post = client.create_post(&PostFields::new().title("Hello").status("draft"))?;
//! let latest = client.list_posts(&ListOptions::per_page(10))?;
//! assert!(latest.len() <= 10);
//! client.delete_post(post.id, DeleteOptions::default())?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod mapper;
pub mod transport;
pub mod types;

pub use api::PostApi;
pub use classify::{classify, Classification};
pub use client::PostClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, FieldError, TransportError, ValidationErrors};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{DeleteOptions, ListOptions, Post, PostFields, PostId};
