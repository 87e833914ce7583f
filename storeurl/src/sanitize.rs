use std::sync::OnceLock;

use anyhow::Context as _;

use crate::{
    rewrite::{GcsRewriter, S3Rewriter, SchemeRewriter},
    scheme::{Scheme, scheme_of},
};

type DynRewriter = Box<dyn SchemeRewriter + Send + Sync>;

/// Normalizes URLs into their canonical form.
///
/// Trailing slashes are removed, then the URL is handed to the first
/// registered [`SchemeRewriter`] whose scheme matches.
/// URLs without a matching rewriter are passed through.
///
/// The sanitizer never fails.
pub struct UrlSanitizer {
    rewriters: Vec<DynRewriter>,
}

impl Default for UrlSanitizer {
    /// A sanitizer with the S3 and GCS rewriters registered.
    fn default() -> Self {
        Self::new().with_default_rewriters()
    }
}

impl std::fmt::Debug for UrlSanitizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSanitizer")
            .field("schemes", &self.schemes())
            .finish()
    }
}

impl UrlSanitizer {
    /// Create a sanitizer without any rewriters.
    ///
    /// Use [`Self::default`] for the standard set.
    pub fn new() -> Self {
        Self {
            rewriters: Vec::new(),
        }
    }

    pub fn register_rewriter<R: SchemeRewriter + Send + Sync + 'static>(&mut self, rewriter: R) {
        self.rewriters.push(Box::new(rewriter));
    }

    pub fn with_rewriter(mut self, rewriter: DynRewriter) -> Self {
        self.rewriters.push(rewriter);
        self
    }

    /// Append the S3 and GCS rewriters.
    ///
    /// Rewriters registered before this call take precedence over them.
    pub fn with_default_rewriters(self) -> Self {
        self.with_rewriter(Box::new(GcsRewriter))
            .with_rewriter(Box::new(S3Rewriter))
    }

    /// Schemes of the registered rewriters, in dispatch order.
    pub fn schemes(&self) -> Vec<&str> {
        self.rewriters.iter().map(|r| r.scheme()).collect()
    }

    pub fn sanitize(&self, url: &str) -> String {
        let url = url.trim_end_matches('/');

        let Some(scheme) = scheme_of(url) else {
            return url.to_string();
        };

        for rewriter in &self.rewriters {
            if rewriter.scheme() == scheme {
                return rewriter.rewrite(url);
            }
        }
        url.to_string()
    }

    /// Same as [`Self::sanitize`], but wraps the output in a [`CanonicalUrl`].
    pub fn canonicalize(&self, url: &str) -> CanonicalUrl {
        CanonicalUrl(self.sanitize(url))
    }
}

pub(crate) fn default_sanitizer() -> &'static UrlSanitizer {
    static SANITIZER: OnceLock<UrlSanitizer> = OnceLock::new();
    SANITIZER.get_or_init(UrlSanitizer::default)
}

/// Sanitize a URL with the default [`UrlSanitizer`].
///
/// * trailing slashes are removed
/// * `gs://<rest>` becomes `https://storage.googleapis.com/<rest>`
/// * `s3://<bucket>/<key>` becomes `https://<bucket>.s3.amazonaws.com/<key>`
/// * everything else is passed through
///
/// Idempotent: `sanitize(&sanitize(u)) == sanitize(u)`.
///
/// An S3 URL without a key (`s3://bucket/`) yields no trailing slash
/// (`https://bucket.s3.amazonaws.com`), unlike a literal rewrite, so the
/// output stays stable under a second pass.
pub fn sanitize(url: &str) -> String {
    default_sanitizer().sanitize(url)
}

/// Output of the [`UrlSanitizer`].
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    /// Sanitize a URL with the default [`UrlSanitizer`].
    pub fn new(url: &str) -> Self {
        default_sanitizer().canonicalize(url)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn scheme(&self) -> Option<Scheme> {
        Scheme::detect(&self.0)
    }

    /// Parse into a [`url::Url`].
    ///
    /// Fails for pass-through inputs that are not valid URLs.
    pub fn to_url(&self) -> Result<url::Url, anyhow::Error> {
        url::Url::parse(&self.0).with_context(|| format!("invalid canonical URL '{}'", self.0))
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CanonicalUrl> for String {
    fn from(url: CanonicalUrl) -> Self {
        url.0
    }
}
