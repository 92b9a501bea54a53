//! Loading remote images into image views.
//!
//! # Flow
//!
//! 1. With caching enabled, the cache is consulted synchronously. A cached
//!    body that decodes is delivered on the foreground queue.
//! 2. Otherwise the placeholder is shown immediately and one request runs on
//!    the background pool.
//! 3. A response with status below 300 whose body decodes is cached (when
//!    caching is enabled) and delivered on the foreground queue.
//!
//! Failures are logged and the completion is not called. Concurrent loads of
//! the same URL each issue their own request.

use std::sync::{Arc, Mutex};

use kitplus_core::{background, decode, DecodedImage, MainHandle};
use serde::{Deserialize, Serialize};

use crate::cache::{MemoryUrlCache, UrlCache};
use crate::error::LoadError;
use crate::transport::{HttpResponse, ReqwestTransport, Transport};

/// Settings for [`ImageLoader::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Request timeout in seconds (default: 30s)
    pub timeout_secs: u64,
    /// Cached responses kept in memory (default: 100)
    pub cache_capacity: usize,
    /// Largest body that is cached (default: 10MB)
    pub max_cache_entry_bytes: usize,
    pub user_agent: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            cache_capacity: 100,
            max_cache_entry_bytes: 10 * 1024 * 1024,
            user_agent: format!("kitplus/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Read from and write to the cache. When false the response is not stored.
    pub should_cache: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { should_cache: true }
    }
}

/// Holds the image currently displayed. Shared between the caller and
/// in-flight loads.
#[derive(Debug, Default)]
pub struct ImageView {
    image: Mutex<Option<Arc<DecodedImage>>>,
}

impl ImageView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self) -> Option<Arc<DecodedImage>> {
        self.image
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set_image(&self, image: Option<Arc<DecodedImage>>) {
        *self.image.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = image;
    }
}

/// Fetches images over a [`Transport`], caching bodies in a [`UrlCache`].
#[derive(Clone)]
pub struct ImageLoader {
    transport: Arc<dyn Transport>,
    cache: Arc<dyn UrlCache>,
    main: MainHandle,
}

impl ImageLoader {
    /// Loader with a reqwest transport and an in-memory LRU cache.
    pub fn new(config: &LoaderConfig, main: MainHandle) -> Result<Self, LoadError> {
        let transport = ReqwestTransport::new(config)?;
        let cache = MemoryUrlCache::new(config.cache_capacity, config.max_cache_entry_bytes);
        Ok(Self::with_parts(Arc::new(transport), Arc::new(cache), main))
    }

    pub fn with_parts(
        transport: Arc<dyn Transport>,
        cache: Arc<dyn UrlCache>,
        main: MainHandle,
    ) -> Self {
        Self {
            transport,
            cache,
            main,
        }
    }

    pub fn cache(&self) -> &Arc<dyn UrlCache> {
        &self.cache
    }

    /// Load `url` into `view`.
    ///
    /// Must be called on the foreground thread; `view` and `completion` are
    /// only touched there.
    pub fn load<F>(
        &self,
        view: &Arc<ImageView>,
        url: &str,
        placeholder: Option<Arc<DecodedImage>>,
        options: LoadOptions,
        completion: Option<F>,
    ) where
        F: FnOnce(Arc<DecodedImage>) + Send + 'static,
    {
        if options.should_cache {
            if let Some(image) = self.cached_image(url) {
                log::debug!("cache hit for {url}");
                self.deliver(view, image, completion);
                return;
            }
        }

        view.set_image(placeholder);

        let loader = self.clone();
        let view = Arc::clone(view);
        let url = url.to_string();
        background(move || match loader.fetch(&url) {
            Ok((image, response)) => {
                if options.should_cache {
                    loader.cache.store(&url, response);
                }
                loader.deliver(&view, Arc::new(image), completion);
            }
            Err(e) => log::warn!("failed to load image from {url}: {e}"),
        });
    }

    /// Fetch and decode `url` on the calling thread, bypassing the cache.
    pub fn fetch_image(&self, url: &str) -> Result<DecodedImage, LoadError> {
        self.fetch(url).map(|(image, _)| image)
    }

    fn fetch(&self, url: &str) -> Result<(DecodedImage, HttpResponse), LoadError> {
        let response = self.transport.get(url)?;
        if !response.is_success() {
            return Err(LoadError::HttpStatus(response.status));
        }
        let image = decode(&response.body)?;
        Ok((image, response))
    }

    fn cached_image(&self, url: &str) -> Option<Arc<DecodedImage>> {
        let response = self.cache.cached_response(url)?;
        match decode(&response.body) {
            Ok(image) => Some(Arc::new(image)),
            Err(e) => {
                log::debug!("cached body for {url} does not decode: {e}");
                None
            }
        }
    }

    fn deliver<F>(&self, view: &Arc<ImageView>, image: Arc<DecodedImage>, completion: Option<F>)
    where
        F: FnOnce(Arc<DecodedImage>) + Send + 'static,
    {
        let view = Arc::clone(view);
        let delivered = self.main.dispatch(move || {
            view.set_image(Some(Arc::clone(&image)));
            if let Some(callback) = completion {
                callback(image);
            }
        });
        if delivered.is_err() {
            log::warn!("main queue closed, dropping loaded image");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kitplus_core::encode::encode_png;
    use kitplus_core::MainQueue;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    type Completion = fn(Arc<DecodedImage>);

    /// Transport answering from a fixed table and counting requests.
    struct MockTransport {
        responses: HashMap<String, HttpResponse>,
        calls: AtomicUsize,
    }

    impl MockTransport {
        fn new(entries: &[(&str, u16, Vec<u8>)]) -> Arc<Self> {
            let responses = entries
                .iter()
                .map(|(url, status, body)| {
                    (
                        url.to_string(),
                        HttpResponse {
                            status: *status,
                            body: body.clone(),
                        },
                    )
                })
                .collect();
            Arc::new(Self {
                responses,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Transport for MockTransport {
        fn get(&self, url: &str) -> Result<HttpResponse, LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| LoadError::Network(format!("no route to {url}")))
        }
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        encode_png(&DecodedImage::new(width, height, vec![90u8; (width * height * 4) as usize]))
            .unwrap()
    }

    fn setup(
        entries: &[(&str, u16, Vec<u8>)],
    ) -> (MainQueue, Arc<MockTransport>, Arc<MemoryUrlCache>, ImageLoader) {
        let queue = MainQueue::new();
        let transport = MockTransport::new(entries);
        let cache = Arc::new(MemoryUrlCache::new(8, 1 << 20));
        let loader = ImageLoader::with_parts(transport.clone(), cache.clone(), queue.handle());
        (queue, transport, cache, loader)
    }

    fn width_of(view: &ImageView) -> Option<u32> {
        view.image().map(|i| i.width)
    }

    #[test]
    fn test_miss_shows_placeholder_then_image() {
        let (queue, transport, cache, loader) = setup(&[("https://x/a.png", 200, png(6, 4))]);
        let view = Arc::new(ImageView::new());
        let completed = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&completed);
        loader.load(
            &view,
            "https://x/a.png",
            Some(Arc::new(DecodedImage::new(1, 1, vec![0; 4]))),
            LoadOptions::default(),
            Some(move |image: Arc<DecodedImage>| sink.lock().unwrap().push(image.width)),
        );

        // Placeholder is visible before the foreground queue runs
        assert_eq!(width_of(&view), Some(1));

        assert!(queue.run_until(Duration::from_secs(5), || !completed.lock().unwrap().is_empty()));
        assert_eq!(*completed.lock().unwrap(), vec![6]);
        assert_eq!(width_of(&view), Some(6));
        assert_eq!(transport.calls(), 1);
        assert!(cache.cached_response("https://x/a.png").is_some());
    }

    #[test]
    fn test_hit_skips_network() {
        let (queue, transport, cache, loader) = setup(&[]);
        cache.store(
            "https://x/cached.png",
            HttpResponse {
                status: 200,
                body: png(3, 3),
            },
        );
        let view = Arc::new(ImageView::new());
        let done = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&done);
        loader.load(
            &view,
            "https://x/cached.png",
            None,
            LoadOptions::default(),
            Some(move |_: Arc<DecodedImage>| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(queue.run_pending(), 1);
        assert_eq!(done.load(Ordering::SeqCst), 1);
        assert_eq!(width_of(&view), Some(3));
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_second_load_served_from_cache() {
        let (queue, transport, _cache, loader) = setup(&[("https://x/b.png", 200, png(2, 2))]);
        let view = Arc::new(ImageView::new());

        loader.load::<Completion>(&view, "https://x/b.png", None, LoadOptions::default(), None);
        assert!(queue.run_until(Duration::from_secs(5), || view.image().is_some()));

        view.set_image(None);
        loader.load::<Completion>(&view, "https://x/b.png", None, LoadOptions::default(), None);
        assert_eq!(queue.run_pending(), 1);
        assert_eq!(width_of(&view), Some(2));
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn test_caching_disabled_always_fetches() {
        let (queue, transport, cache, loader) = setup(&[("https://x/c.png", 200, png(2, 2))]);
        let view = Arc::new(ImageView::new());
        let options = LoadOptions { should_cache: false };

        for expected in 1..=2 {
            view.set_image(None);
            loader.load::<Completion>(&view, "https://x/c.png", None, options, None);
            assert!(queue.run_until(Duration::from_secs(5), || view.image().is_some()));
            assert_eq!(transport.calls(), expected);
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn test_http_error_keeps_placeholder_and_skips_completion() {
        let (queue, transport, cache, loader) = setup(&[("https://x/404.png", 404, png(2, 2))]);
        let view = Arc::new(ImageView::new());
        let called = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&called);
        loader.load(
            &view,
            "https://x/404.png",
            Some(Arc::new(DecodedImage::new(1, 1, vec![0; 4]))),
            LoadOptions::default(),
            Some(move |_: Arc<DecodedImage>| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert!(!queue.run_next(Duration::from_millis(300)));
        assert!(transport.calls() <= 1);
        assert_eq!(called.load(Ordering::SeqCst), 0);
        assert_eq!(width_of(&view), Some(1));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_undecodable_body_is_not_delivered() {
        let (queue, _transport, cache, loader) =
            setup(&[("https://x/text", 200, b"<html>nope</html>".to_vec())]);
        let view = Arc::new(ImageView::new());

        loader.load::<Completion>(&view, "https://x/text", None, LoadOptions::default(), None);

        assert!(!queue.run_next(Duration::from_millis(300)));
        assert!(view.image().is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_undecodable_cache_entry_falls_back_to_network() {
        let (queue, transport, cache, loader) = setup(&[("https://x/d.png", 200, png(5, 5))]);
        cache.store(
            "https://x/d.png",
            HttpResponse {
                status: 200,
                body: b"garbage".to_vec(),
            },
        );
        let view = Arc::new(ImageView::new());

        loader.load::<Completion>(&view, "https://x/d.png", None, LoadOptions::default(), None);
        assert!(queue.run_until(Duration::from_secs(5), || view.image().is_some()));
        assert_eq!(transport.calls(), 1);
        assert_eq!(width_of(&view), Some(5));
    }

    #[test]
    fn test_concurrent_loads_are_not_deduplicated() {
        let (queue, transport, _cache, loader) = setup(&[("https://x/e.png", 200, png(2, 2))]);
        let first = Arc::new(ImageView::new());
        let second = Arc::new(ImageView::new());

        loader.load::<Completion>(&first, "https://x/e.png", None, LoadOptions::default(), None);
        loader.load::<Completion>(&second, "https://x/e.png", None, LoadOptions::default(), None);

        assert!(queue.run_until(Duration::from_secs(5), || {
            first.image().is_some() && second.image().is_some()
        }));
        assert_eq!(transport.calls(), 2);
    }

    #[test]
    fn test_fetch_image_reports_reasons() {
        let (_queue, _transport, _cache, loader) = setup(&[
            ("https://x/ok.png", 200, png(4, 2)),
            ("https://x/moved", 301, Vec::new()),
            ("https://x/bad", 200, vec![1, 2, 3]),
        ]);

        assert_eq!(loader.fetch_image("https://x/ok.png").unwrap().width, 4);
        assert!(matches!(
            loader.fetch_image("https://x/moved"),
            Err(LoadError::HttpStatus(301))
        ));
        assert!(matches!(
            loader.fetch_image("https://x/bad"),
            Err(LoadError::Decode(_))
        ));
        assert!(matches!(
            loader.fetch_image("https://x/missing"),
            Err(LoadError::Network(_))
        ));
    }

    #[test]
    fn test_config_defaults_and_json() {
        let config: LoaderConfig = serde_json::from_str(r#"{"timeout_secs":5}"#).unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.cache_capacity, 100);
        assert!(config.user_agent.starts_with("kitplus/"));

        let queue = MainQueue::new();
        assert!(ImageLoader::new(&config, queue.handle()).is_ok());
    }
}
