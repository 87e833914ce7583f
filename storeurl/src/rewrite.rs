use crate::scheme::Scheme;

const S3_GLOBAL_HOST_SUFFIX: &str = "s3.amazonaws.com";
const GCS_NATIVE_PREFIX: &str = "gs://";
const GCS_HTTPS_PREFIX: &str = "https://storage.googleapis.com/";

/// Rewrites a provider-native URL into its long-form HTTPS equivalent.
///
/// Used by the [`crate::UrlSanitizer`], which dispatches on the URL scheme.
pub trait SchemeRewriter {
    /// The scheme handled by this rewriter.
    ///
    /// eg: "s3", "gs"
    ///
    /// [`Self::rewrite`] is only called for URLs with this exact scheme.
    fn scheme(&self) -> &str;

    /// Rewrite the URL.
    ///
    /// Output for URLs with a scheme other than [`Self::scheme`] is unspecified,
    /// but implementations must not panic.
    fn rewrite(&self, url: &str) -> String;
}

/// Rewrites `s3://<bucket>/<key>` to `https://<bucket>.s3.amazonaws.com/<key>`.
#[derive(Clone, Copy, Debug, Default)]
pub struct S3Rewriter;

impl SchemeRewriter for S3Rewriter {
    fn scheme(&self) -> &str {
        Scheme::S3_STR
    }

    fn rewrite(&self, url: &str) -> String {
        s3_to_https(url)
    }
}

/// Rewrites `gs://<rest>` to `https://storage.googleapis.com/<rest>`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GcsRewriter;

impl SchemeRewriter for GcsRewriter {
    fn scheme(&self) -> &str {
        Scheme::GS_STR
    }

    fn rewrite(&self, url: &str) -> String {
        gs_to_https(url)
    }
}

/// Replaces a leading `<scheme>://` with a fixed prefix.
///
/// eg: scheme `r2` with prefix `https://acct.r2.cloudflarestorage.com/`
/// rewrites `r2://bucket/key` to `https://acct.r2.cloudflarestorage.com/bucket/key`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefixRewriter {
    scheme: String,
    prefix: String,
}

impl PrefixRewriter {
    pub fn new(scheme: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl SchemeRewriter for PrefixRewriter {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn rewrite(&self, url: &str) -> String {
        match url
            .strip_prefix(self.scheme.as_str())
            .and_then(|rest| rest.strip_prefix("://"))
        {
            Some(rest) => format!("{}{rest}", self.prefix),
            None => url.to_string(),
        }
    }
}

/// Convert a native S3 URL into a virtual-hosted-style HTTPS URL.
///
/// The third `/`-separated token (after `s3:` and the empty token) is the
/// bucket, all following tokens form the key path.
///
/// An empty key path produces no trailing slash, so the output is stable
/// under [`crate::sanitize`].
pub fn s3_to_https(url: &str) -> String {
    let mut parts = url.split('/');
    let bucket = parts.nth(2).unwrap_or_default();
    let path = parts.collect::<Vec<_>>().join("/");

    if path.is_empty() {
        format!("https://{bucket}.{S3_GLOBAL_HOST_SUFFIX}")
    } else {
        format!("https://{bucket}.{S3_GLOBAL_HOST_SUFFIX}/{path}")
    }
}

/// Convert a native GCS URL into a `storage.googleapis.com` HTTPS URL.
///
/// Only the leading `gs://` is replaced, the remainder is kept as-is.
/// URLs without the prefix are returned unchanged.
pub fn gs_to_https(url: &str) -> String {
    match url.strip_prefix(GCS_NATIVE_PREFIX) {
        Some(rest) => format!("{GCS_HTTPS_PREFIX}{rest}"),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_s3_to_https() {
        assert_eq!(
            s3_to_https("s3://my-bucket/path/to/obj.zarr"),
            "https://my-bucket.s3.amazonaws.com/path/to/obj.zarr"
        );
        assert_eq!(
            s3_to_https("s3://my-bucket/key"),
            "https://my-bucket.s3.amazonaws.com/key"
        );
        assert_eq!(
            s3_to_https("s3://my-bucket"),
            "https://my-bucket.s3.amazonaws.com"
        );
        // Empty segments inside the key are kept.
        assert_eq!(
            s3_to_https("s3://b//double"),
            "https://b.s3.amazonaws.com//double"
        );
    }

    #[test]
    fn test_s3_to_https_short_input_does_not_panic() {
        assert_eq!(s3_to_https("s3:"), "https://.s3.amazonaws.com");
        assert_eq!(s3_to_https(""), "https://.s3.amazonaws.com");
    }

    #[test]
    fn test_gs_to_https() {
        assert_eq!(
            gs_to_https("gs://my-bucket/path/to/obj"),
            "https://storage.googleapis.com/my-bucket/path/to/obj"
        );
        assert_eq!(
            gs_to_https("gs://my-bucket"),
            "https://storage.googleapis.com/my-bucket"
        );
        assert_eq!(
            gs_to_https("gs://b/nested/gs://x"),
            "https://storage.googleapis.com/b/nested/gs://x",
            "only the leading prefix is replaced"
        );
        assert_eq!(gs_to_https("https://x"), "https://x");
    }

    #[test]
    fn test_prefix_rewriter() {
        let r = PrefixRewriter::new("r2", "https://acct.r2.cloudflarestorage.com/");
        assert_eq!(r.scheme(), "r2");
        assert_eq!(
            r.rewrite("r2://bucket/key"),
            "https://acct.r2.cloudflarestorage.com/bucket/key"
        );
        assert_eq!(r.rewrite("r2:/bucket"), "r2:/bucket");
        assert_eq!(r.rewrite("s3://bucket"), "s3://bucket");
    }

    #[test]
    fn test_rewriter_schemes() {
        assert_eq!(S3Rewriter.scheme(), "s3");
        assert_eq!(GcsRewriter.scheme(), "gs");
        assert_eq!(
            S3Rewriter.rewrite("s3://b/k"),
            "https://b.s3.amazonaws.com/k"
        );
        assert_eq!(
            GcsRewriter.rewrite("gs://b/k"),
            "https://storage.googleapis.com/b/k"
        );
    }
}
