//! The built-in address grammars.
//!
//! Host labels never contain `.` or `/`, and the key is the remainder after
//! the host: either empty or starting with `/`.

use std::sync::OnceLock;

use anyhow::{Context as _, bail};
use regex::Regex;

use super::{AddressGrammar, AddressMatch, GrammarKind};
use crate::error::AddressError;

// https://bucket-name.s3.region-code.amazonaws.com/key-name
const S3_VIRTUAL_HOSTED: &str =
    r"^https?://(?P<bucket>[^./]+)\.s3\.(?P<region>[^./]+)\.amazonaws\.com(?P<key>/.*)?$";
// https://AccessPointName-AccountId.s3-accesspoint.region.amazonaws.com/key-name
const S3_ACCESS_POINT: &str = r"^https?://(?P<bucket>[^./]+)-(?P<account>[^./]+)\.s3-accesspoint\.(?P<region>[^./]+)\.amazonaws\.com(?P<key>/.*)?$";
// s3://bucket-name/key-name
const S3_NATIVE: &str = r"^s3://(?P<bucket>[^./]+)(?P<key>.*)$";
// https://bucket-name.s3.amazonaws.com/key-name
const S3_VIRTUAL_HOSTED_GLOBAL: &str =
    r"^https?://(?P<bucket>[^./]+)\.s3\.amazonaws\.com(?P<key>/.*)?$";
// https://container.blob.core.windows.net/key-name
const AZURE_BLOB: &str =
    r"^https?://(?P<bucket>[^./]+)\.blob\.core\.windows\.net(?P<key>/.*)?$";

// https://storage.googleapis.com/bucket-name/key-name
const GCS_HTTPS: &str = r"^https?://storage\.googleapis\.com/";

/// Host prefix required by [`parse_gcs_https`].
pub const GCS_HOST_PREFIX: &str = "storage.googleapis.com/";

fn capture(
    cell: &OnceLock<Regex>,
    pattern: &'static str,
    kind: GrammarKind,
    url: &str,
) -> Option<AddressMatch> {
    let re = cell.get_or_init(|| Regex::new(pattern).expect("grammar pattern must compile"));
    captures_to_match(re, kind, url)
}

fn captures_to_match(re: &Regex, kind: GrammarKind, url: &str) -> Option<AddressMatch> {
    let caps = re.captures(url)?;
    let bucket = caps.name("bucket")?.as_str();
    if bucket.is_empty() {
        return None;
    }
    let key = caps.name("key").map_or("", |m| m.as_str());
    Some(AddressMatch::new(kind, bucket, key))
}

/// `http(s)://<bucket>.s3.<region>.amazonaws.com<key>`
#[derive(Clone, Copy, Debug, Default)]
pub struct S3VirtualHosted;

impl AddressGrammar for S3VirtualHosted {
    fn kind(&self) -> GrammarKind {
        GrammarKind::S3VirtualHosted
    }

    fn parse(&self, url: &str) -> Option<AddressMatch> {
        static RE: OnceLock<Regex> = OnceLock::new();
        capture(&RE, S3_VIRTUAL_HOSTED, self.kind(), url)
    }
}

/// `http(s)://<name>-<account>.s3-accesspoint.<region>.amazonaws.com<key>`
///
/// The access point name is reported as the bucket.
/// It extends up to the last `-` of the first label.
#[derive(Clone, Copy, Debug, Default)]
pub struct S3AccessPoint;

impl AddressGrammar for S3AccessPoint {
    fn kind(&self) -> GrammarKind {
        GrammarKind::S3AccessPoint
    }

    fn parse(&self, url: &str) -> Option<AddressMatch> {
        static RE: OnceLock<Regex> = OnceLock::new();
        capture(&RE, S3_ACCESS_POINT, self.kind(), url)
    }
}

/// `s3://<bucket><key>`
///
/// The bucket ends at the first `.` or `/`.
#[derive(Clone, Copy, Debug, Default)]
pub struct S3Native;

impl AddressGrammar for S3Native {
    fn kind(&self) -> GrammarKind {
        GrammarKind::S3Native
    }

    fn parse(&self, url: &str) -> Option<AddressMatch> {
        static RE: OnceLock<Regex> = OnceLock::new();
        capture(&RE, S3_NATIVE, self.kind(), url)
    }
}

/// `http(s)://<bucket>.s3.amazonaws.com<key>`
#[derive(Clone, Copy, Debug, Default)]
pub struct S3VirtualHostedGlobal;

impl AddressGrammar for S3VirtualHostedGlobal {
    fn kind(&self) -> GrammarKind {
        GrammarKind::S3VirtualHostedGlobal
    }

    fn parse(&self, url: &str) -> Option<AddressMatch> {
        static RE: OnceLock<Regex> = OnceLock::new();
        capture(&RE, S3_VIRTUAL_HOSTED_GLOBAL, self.kind(), url)
    }
}

/// `https://storage.googleapis.com/<bucket>/<key>`
///
/// Only applies to URLs whose host is `storage.googleapis.com`, and
/// requires a non-empty bucket segment.
#[derive(Clone, Copy, Debug, Default)]
pub struct GcsHttps;

impl AddressGrammar for GcsHttps {
    fn kind(&self) -> GrammarKind {
        GrammarKind::GcsHttps
    }

    fn parse(&self, url: &str) -> Option<AddressMatch> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(GCS_HTTPS).expect("grammar pattern must compile"));
        if !re.is_match(url) {
            return None;
        }
        parse_gcs_https(url).ok().filter(|m| !m.bucket.is_empty())
    }
}

/// `http(s)://<container>.blob.core.windows.net<key>`
///
/// The container is reported as the bucket.
#[derive(Clone, Copy, Debug, Default)]
pub struct AzureBlob;

impl AddressGrammar for AzureBlob {
    fn kind(&self) -> GrammarKind {
        GrammarKind::AzureBlob
    }

    fn parse(&self, url: &str) -> Option<AddressMatch> {
        static RE: OnceLock<Regex> = OnceLock::new();
        capture(&RE, AZURE_BLOB, self.kind(), url)
    }
}

/// A grammar defined at runtime by a regular expression.
///
/// The pattern must have a `bucket` named group, and may have a `key` group.
/// A missing `key` group, or one that did not participate, yields an empty key.
/// Matches with an empty bucket are discarded.
///
/// Matches are reported as [`GrammarKind::Custom`] with the grammar name.
#[derive(Clone, Debug)]
pub struct PatternGrammar {
    name: String,
    re: Regex,
}

impl PatternGrammar {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, anyhow::Error> {
        let name = name.into();
        if name.is_empty() {
            bail!("grammar name must not be empty");
        }
        let re = Regex::new(pattern)
            .with_context(|| format!("invalid pattern for grammar '{name}'"))?;
        if !re.capture_names().flatten().any(|n| n == "bucket") {
            bail!("pattern for grammar '{name}' has no 'bucket' group");
        }
        Ok(Self { name, re })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        self.re.as_str()
    }
}

impl AddressGrammar for PatternGrammar {
    fn kind(&self) -> GrammarKind {
        GrammarKind::Custom(self.name.clone())
    }

    fn parse(&self, url: &str) -> Option<AddressMatch> {
        captures_to_match(&self.re, self.kind(), url)
    }
}

/// Parse a `storage.googleapis.com` URL into bucket and key.
///
/// The path after [`GCS_HOST_PREFIX`] is split on the first `/`: the first
/// segment is the bucket, the remainder (without leading `/`) is the key.
/// A path without `/` yields an empty key.
///
/// Precondition: the URL must contain [`GCS_HOST_PREFIX`].
/// Fails with [`AddressError::MissingHost`] otherwise.
pub fn parse_gcs_https(url: &str) -> Result<AddressMatch, AddressError> {
    let (_, path) = url
        .split_once(GCS_HOST_PREFIX)
        .ok_or_else(|| AddressError::MissingHost {
            url: url.to_string(),
            host: GCS_HOST_PREFIX,
        })?;
    let (bucket, key) = path.split_once('/').unwrap_or((path, ""));
    Ok(AddressMatch::new(GrammarKind::GcsHttps, bucket, key))
}
