//! Kitplus Net - Cached network image loading
//!
//! This crate loads remote images into [`ImageView`]s on top of
//! `kitplus-core`'s decoders and dispatch queues.
//!
//! # Module Structure
//!
//! - `loader` - [`ImageLoader`], the load flow and its configuration
//! - `cache` - URL-keyed response cache ([`UrlCache`], in-memory LRU)
//! - `transport` - HTTP GET seam ([`Transport`], blocking reqwest client)
//! - `error` - [`LoadError`]
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use kitplus_core::MainQueue;
//! use kitplus_net::{ImageLoader, ImageView, LoadOptions, LoaderConfig};
//!
//! let queue = MainQueue::new();
//! let loader = ImageLoader::new(&LoaderConfig::default(), queue.handle())?;
//! let view = Arc::new(ImageView::new());
//! loader.load(&view, "https://example.com/a.png", None, LoadOptions::default(),
//!     Some(|image: Arc<_>| println!("loaded")));
//! queue.run_next(std::time::Duration::from_secs(30));
//! ```

mod cache;
mod error;
mod loader;
mod transport;

pub use cache::{MemoryUrlCache, UrlCache};
pub use error::LoadError;
pub use loader::{ImageLoader, ImageView, LoadOptions, LoaderConfig};
pub use transport::{HttpResponse, ReqwestTransport, Transport};

/// Get the version of the crate
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
