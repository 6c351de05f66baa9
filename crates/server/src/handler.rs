use std::error::Error;
use std::fmt;

use async_trait::async_trait;
use http::{Method, Request};
use matchit::Router;
use tracing::{debug, error, info};

use asis_document::{Translate, TranslateError};

use crate::response::AsisResponse;

/// The single route every document is served from.
const DOCUMENT_ROUTE: &str = "/{*path}";
const PATH_PARAM: &str = "path";

#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, req: Request<()>) -> AsisResponse;
}

/// Serves `/<relative path>` from a [`Translate`] implementation.
///
/// - `404 Not Found` with `File Not Found` when the document can't be read
/// - `500 Internal Server Error` with the error chain when it can't be translated
/// - `405 Method Not Allowed` for anything but `GET` and `HEAD`
pub struct DocumentHandler<T> {
    translator: T,
    router: Router<()>,
}

impl<T> fmt::Debug for DocumentHandler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentHandler").field("route", &DOCUMENT_ROUTE).finish_non_exhaustive()
    }
}

impl<T: Translate> DocumentHandler<T> {
    pub fn new(translator: T) -> Self {
        let mut router = Router::new();
        router.insert(DOCUMENT_ROUTE, ()).expect("document route is a valid pattern");
        Self { translator, router }
    }

    fn respond(&self, path: &str) -> AsisResponse {
        let Some(relative) = self.relative_path(path) else {
            debug!(path, "no document addressed");
            return AsisResponse::not_found();
        };

        match self.translator.translate(&relative) {
            Ok(parsed) => AsisResponse::from(parsed),
            Err(e @ TranslateError::NotFound { .. }) => {
                info!(path, cause = %e, "document not found");
                AsisResponse::not_found()
            }
            Err(e) => {
                error!(path, cause = %e, "translate document error");
                AsisResponse::internal_error(&diagnostic(&e))
            }
        }
    }

    /// Percent decoded tail of the wildcard route.
    fn relative_path(&self, path: &str) -> Option<String> {
        let matched = self.router.at(path).ok()?;
        let tail = matched.params.get(PATH_PARAM).filter(|tail| !tail.is_empty())?;
        urlencoding::decode(tail).ok().map(|decoded| decoded.into_owned())
    }
}

#[async_trait]
impl<T> Handler for DocumentHandler<T>
where
    T: Translate + Send + Sync,
{
    async fn call(&self, req: Request<()>) -> AsisResponse {
        let path = req.uri().path();
        debug!(method = %req.method(), path, "receive request");

        match *req.method() {
            Method::GET => self.respond(path),
            Method::HEAD => self.respond(path).head_only(),
            _ => AsisResponse::method_not_allowed(),
        }
    }
}

/// The error followed by its sources, one `caused by:` line each.
fn diagnostic(e: &dyn Error) -> String {
    let mut text = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        text.push_str("\ncaused by: ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
