use std::time::Duration;

use futures_util::future::LocalBoxFuture;
use hnav_router::{ContentError, ContentItem, ContentSource, Timer};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Response, Window};

use super::globals::js_error;

#[derive(Debug, thiserror::Error)]
pub(crate) enum FetchError {
    #[error("{0}")]
    Network(String),
    #[error("status {0}")]
    Status(u16),
}

pub(crate) async fn fetch_text(window: &Window, url: &str) -> Result<String, FetchError> {
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| FetchError::Network(js_error(e)))?;
    let response: Response = response
        .dyn_into()
        .map_err(|_| FetchError::Network("fetch did not resolve to a Response".to_owned()))?;

    if !response.ok() {
        return Err(FetchError::Status(response.status()));
    }

    let body = response.text().map_err(|e| FetchError::Network(js_error(e)))?;
    let text = JsFuture::from(body)
        .await
        .map_err(|e| FetchError::Network(js_error(e)))?;

    text.as_string()
        .ok_or_else(|| FetchError::Network("response body is not text".to_owned()))
}

/// Content resources are JSON arrays served next to the page.
#[derive(Debug, Clone)]
pub(crate) struct FetchContentSource {
    window: Window,
}

impl FetchContentSource {
    pub(crate) fn new(window: Window) -> Self {
        Self { window }
    }
}

impl ContentSource for FetchContentSource {
    fn load(&self, resource: &str) -> LocalBoxFuture<'static, Result<Vec<ContentItem>, ContentError>> {
        let window = self.window.clone();
        let resource = resource.to_owned();

        Box::pin(async move {
            let text = fetch_text(&window, &resource).await.map_err(|e| match e {
                FetchError::Network(reason) => ContentError::Network {
                    resource: resource.clone(),
                    reason,
                },
                FetchError::Status(status) => ContentError::Status {
                    resource: resource.clone(),
                    status,
                },
            })?;

            serde_json::from_str(&text).map_err(|e| ContentError::Malformed {
                resource,
                reason: e.to_string(),
            })
        })
    }
}

/// `setTimeout` as a future.
#[derive(Debug, Clone)]
pub(crate) struct BrowserTimer {
    window: Window,
}

impl BrowserTimer {
    pub(crate) fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Timer for BrowserTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let window = self.window.clone();
        let ms = duration.as_millis().min(i32::MAX as u128) as i32;

        Box::pin(async move {
            let promise = js_sys::Promise::new(&mut |resolve, _reject| {
                if let Err(e) = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms) {
                    tracing::warn!("setTimeout failed: {}", js_error(e));
                }
            });

            // a resolved timeout carries no value
            let _ = JsFuture::from(promise).await;
        })
    }
}
