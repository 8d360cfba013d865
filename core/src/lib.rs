//! Blocking client for the public Clash of Clans REST API.
//!
//! # Overview
//! `CocClient` exposes one method per API endpoint (players, clans, wars,
//! leagues, locations, rankings, labels, gold pass). Every method funnels
//! into a single `RequestPipeline` that builds the URL, retries on 429 and
//! transient transport failures with exponential backoff, and maps HTTP
//! statuses onto `ApiError`.
//!
//! # Design
//! - The HTTP library sits behind the one-method `Transport` trait;
//!   `UreqTransport` (feature `ureq-transport`, on by default) is the stock
//!   implementation and tests substitute scripted ones.
//! - Configuration is immutable once the client exists; the token is kept
//!   out of `ClientConfig` and redacted from `Debug` output.
//! - Responses are passed through as `serde_json::Value` without schema
//!   validation.
//!
//! ```no_run
//! use coc_core::{CocClient, Paging};
//!
//! let client = CocClient::new("<api token>")?;
//! let members = client.list_clan_members("#2GPVUQYPJ", Paging::limit(50))?;
//! println!("{}", members["items"].as_array().map_or(0, Vec::len));
//! # Ok::<(), coc_core::ApiError>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod paging;
pub mod pipeline;
pub mod tag;
#[cfg(feature = "ureq-transport")]
pub mod transport;
pub mod types;

pub use client::CocClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{ApiError, ApiResult, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Query, Transport};
pub use paging::Paging;
pub use pipeline::{RequestPipeline, Sleeper};
pub use tag::normalize_tag;
#[cfg(feature = "ureq-transport")]
pub use transport::UreqTransport;
pub use types::{ClanSearch, VerifyTokenRequest, WarFrequency};
