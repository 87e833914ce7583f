use crate::{
    address::{AddressMatch, AddressParser, GrammarKind, default_parser},
    error::AddressError,
    sanitize::{CanonicalUrl, UrlSanitizer, default_sanitizer},
};

/// Cloud provider hosting a store.
#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    AmazonS3,
    GoogleCloudStorage,
    AzureBlob,
    /// Unrecognized host, or a custom grammar.
    Other,
}

impl From<&GrammarKind> for Provider {
    fn from(kind: &GrammarKind) -> Self {
        match kind {
            GrammarKind::S3VirtualHosted
            | GrammarKind::S3AccessPoint
            | GrammarKind::S3Native
            | GrammarKind::S3VirtualHostedGlobal => Self::AmazonS3,
            GrammarKind::GcsHttps => Self::GoogleCloudStorage,
            GrammarKind::AzureBlob => Self::AzureBlob,
            GrammarKind::Custom(_) => Self::Other,
        }
    }
}

/// A resolved store location.
///
/// Produced by [`resolve`] or a [`Resolver`].
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StoreLocation {
    /// The URL as supplied by the caller.
    pub url: String,
    pub sanitized_url: CanonicalUrl,
    pub provider: Provider,
    pub bucket: Option<String>,
    pub key: Option<String>,
}

impl StoreLocation {
    fn new(url: &str, sanitized_url: CanonicalUrl, address: Option<AddressMatch>) -> Self {
        let (provider, bucket, key) = match address {
            Some(AddressMatch {
                grammar,
                bucket,
                key,
            }) => (Provider::from(&grammar), Some(bucket), Some(key)),
            None => (Provider::Other, None, None),
        };

        Self {
            url: url.to_string(),
            sanitized_url,
            provider,
            bucket,
            key,
        }
    }

    pub fn address(&self) -> Option<(&str, &str)> {
        Some((self.bucket.as_deref()?, self.key.as_deref()?))
    }
}

/// Sanitizes URLs and parses the canonical form.
///
/// [`Resolver::default`] behaves like [`resolve`].
#[derive(Debug, Default)]
pub struct Resolver {
    sanitizer: UrlSanitizer,
    parser: AddressParser,
}

impl Resolver {
    pub fn new(sanitizer: UrlSanitizer, parser: AddressParser) -> Self {
        Self { sanitizer, parser }
    }

    pub fn sanitizer(&self) -> &UrlSanitizer {
        &self.sanitizer
    }

    pub fn parser(&self) -> &AddressParser {
        &self.parser
    }

    /// Never fails: unrecognized URLs resolve with [`Provider::Other`] and
    /// no bucket or key.
    pub fn resolve(&self, url: &str) -> StoreLocation {
        let sanitized_url = self.sanitizer.canonicalize(url);
        let address = self.parser.parse(sanitized_url.as_str());
        StoreLocation::new(url, sanitized_url, address)
    }

    /// Like [`Self::resolve`], but fails if several grammars disagree on the
    /// canonical URL. See [`AddressParser::parse_strict`].
    pub fn resolve_strict(&self, url: &str) -> Result<StoreLocation, AddressError> {
        let sanitized_url = self.sanitizer.canonicalize(url);
        let address = self.parser.parse_strict(sanitized_url.as_str())?;
        Ok(StoreLocation::new(url, sanitized_url, address))
    }
}

/// Sanitize a URL and parse the canonical form with the default
/// [`crate::UrlSanitizer`] and [`crate::AddressParser`].
///
/// Never fails: unrecognized URLs resolve with [`Provider::Other`] and
/// no bucket or key.
pub fn resolve(url: &str) -> StoreLocation {
    let sanitized_url = default_sanitizer().canonicalize(url);
    let address = default_parser().parse(sanitized_url.as_str());
    StoreLocation::new(url, sanitized_url, address)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_resolve_s3_native() {
        let loc = resolve("s3://my-bucket/data/store.zarr/");
        assert_eq!(
            loc,
            StoreLocation {
                url: "s3://my-bucket/data/store.zarr/".to_string(),
                sanitized_url: CanonicalUrl::new("https://my-bucket.s3.amazonaws.com/data/store.zarr"),
                provider: Provider::AmazonS3,
                bucket: Some("my-bucket".to_string()),
                key: Some("/data/store.zarr".to_string()),
            }
        );
        assert_eq!(loc.address(), Some(("my-bucket", "/data/store.zarr")));
    }

    #[test]
    fn test_resolve_gcs_native() {
        let loc = resolve("gs://carbonplan-share/maps-demo/2d/prec-regrid");
        assert_eq!(
            loc.sanitized_url.as_str(),
            "https://storage.googleapis.com/carbonplan-share/maps-demo/2d/prec-regrid"
        );
        assert_eq!(loc.provider, Provider::GoogleCloudStorage);
        assert_eq!(
            loc.address(),
            Some(("carbonplan-share", "maps-demo/2d/prec-regrid"))
        );
    }

    #[test]
    fn test_resolve_azure() {
        let loc = resolve("https://mycontainer.blob.core.windows.net/foo/");
        assert_eq!(loc.provider, Provider::AzureBlob);
        assert_eq!(loc.address(), Some(("mycontainer", "/foo")));
    }

    #[test]
    fn test_resolve_unrecognized() {
        let url = "https://ncsa.osn.xsede.org/Pangeo/pangeo-forge/HadISST-feedstock/hadisst.zarr";
        let loc = resolve(url);
        assert_eq!(loc.sanitized_url.as_str(), url);
        assert_eq!(loc.provider, Provider::Other);
        assert_eq!(loc.address(), None);
    }

    #[test]
    fn test_resolve_empty_bucket() {
        for url in ["gs:///k", "s3:///k", "https://storage.googleapis.com/"] {
            let loc = resolve(url);
            assert_eq!(loc.provider, Provider::Other, "{url}");
            assert_eq!(loc.bucket, None, "{url}");
            assert_eq!(loc.key, None, "{url}");
        }
        assert_eq!(
            resolve("gs:///k").sanitized_url.as_str(),
            "https://storage.googleapis.com//k"
        );
    }

    #[test]
    fn test_resolve_gcs_host_in_path() {
        let loc = resolve("https://example.com/mirror/storage.googleapis.com/b/k");
        assert_eq!(loc.provider, Provider::Other);
        assert_eq!(loc.address(), None);
    }

    #[test]
    fn test_resolver_custom() {
        let resolver = Resolver::new(
            UrlSanitizer::new()
                .with_rewriter(Box::new(crate::PrefixRewriter::new(
                    "r2",
                    "https://acct.r2.cloudflarestorage.com/",
                )))
                .with_default_rewriters(),
            AddressParser::new()
                .with_grammar(Box::new(
                    crate::grammar::PatternGrammar::new(
                        "r2",
                        r"^https://acct\.r2\.cloudflarestorage\.com/(?P<bucket>[^/]+)(?P<key>/.*)?$",
                    )
                    .unwrap(),
                ))
                .with_default_grammars(),
        );

        let loc = resolver.resolve("r2://data/x/y/");
        assert_eq!(
            loc.sanitized_url.as_str(),
            "https://acct.r2.cloudflarestorage.com/data/x/y"
        );
        assert_eq!(loc.provider, Provider::Other);
        assert_eq!(loc.address(), Some(("data", "/x/y")));

        assert_eq!(resolver.resolve("s3://b/k"), resolve("s3://b/k"));
        assert_eq!(Resolver::default().resolve("gs://b/k"), resolve("gs://b/k"));
    }

    #[test]
    fn test_resolve_strict() {
        let overlapping = crate::grammar::PatternGrammar::new(
            "any-host",
            r"^https://(?P<bucket>[^./]+)\.[^/]+(?P<key>/.*)?$",
        )
        .unwrap();
        let resolver = Resolver::new(
            UrlSanitizer::default(),
            AddressParser::default().with_grammar(Box::new(overlapping)),
        );

        assert_eq!(
            resolver.resolve_strict("s3://b/k").unwrap().address(),
            Some(("b", "/k"))
        );
        let err = resolver
            .resolve_strict("https://storage.googleapis.com/b/k")
            .unwrap_err();
        assert!(matches!(err, AddressError::Ambiguous { .. }));
        assert_eq!(
            resolver
                .resolve_strict("https://localhost/x")
                .unwrap()
                .address(),
            None
        );
    }

    #[test]
    fn test_location_serialization() {
        let loc = resolve("s3://b/k");
        assert_eq!(
            serde_json::to_value(&loc).unwrap(),
            serde_json::json!({
                "url": "s3://b/k",
                "sanitized_url": "https://b.s3.amazonaws.com/k",
                "provider": "amazon_s3",
                "bucket": "b",
                "key": "/k",
            })
        );
    }
}
