/// Separator between a URL scheme and the rest of the URL.
pub(crate) const SCHEME_SEPARATOR: &str = "://";

/// Extract the scheme of a URL: everything before the first `://`.
///
/// Returns `None` if the URL has no `://` separator.
///
/// No validation of the scheme characters is performed.
pub fn scheme_of(url: &str) -> Option<&str> {
    url.split_once(SCHEME_SEPARATOR).map(|(scheme, _)| scheme)
}

/// URL scheme, as relevant for object store URLs.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Native Amazon S3 scheme: `s3://<bucket>/<key>`.
    S3,
    /// Native Google Cloud Storage scheme: `gs://<bucket>/<key>`.
    Gs,
    Https,
    Http,
    Other(String),
}

impl Scheme {
    pub const S3_STR: &'static str = "s3";
    pub const GS_STR: &'static str = "gs";

    /// Detect the scheme of a URL.
    ///
    /// Returns `None` if the URL has no scheme (see [`scheme_of`]).
    pub fn detect(url: &str) -> Option<Self> {
        scheme_of(url).map(Self::from)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::S3 => Self::S3_STR,
            Self::Gs => Self::GS_STR,
            Self::Https => "https",
            Self::Http => "http",
            Self::Other(s) => s,
        }
    }

    /// Returns true for provider-native short schemes (`s3`, `gs`).
    pub fn is_native(&self) -> bool {
        matches!(self, Self::S3 | Self::Gs)
    }
}

// Matching is case-sensitive: the native rewrites are literal prefix operations.
impl From<&str> for Scheme {
    fn from(value: &str) -> Self {
        match value {
            Self::S3_STR => Self::S3,
            Self::GS_STR => Self::Gs,
            "https" => Self::Https,
            "http" => Self::Http,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
