// ABOUTME: Client for the video-listing API and the rate-limited topic collection loop.
// ABOUTME: Re-exports the public API: Client, ClientBuilder, Query, FetchPolicy, FetchError, collect_videos.

//! holofeed-fetch - sequential, rate-limited fetching of video listings.
//!
//! # Example
//!
//! ```no_run
//! use holofeed_fetch::{collect_videos, Client, FetchError, FetchPolicy, Query};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), FetchError> {
//!     let client = Client::builder().api_key("my-key").build()?;
//!     let videos = collect_videos(&client, &Query::default(), &FetchPolicy::default()).await?;
//!     println!("{} videos", videos.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod collect;
pub mod error;
pub mod options;
pub mod resource;

pub use crate::client::{Client, VideoSource};
pub use crate::collect::{collect_videos, fetch_with_repair};
pub use crate::error::{ErrorCode, FetchError};
pub use crate::options::{ClientBuilder, FetchPolicy, Options, Query, API_KEY_HEADER, DEFAULT_BASE_URL};
