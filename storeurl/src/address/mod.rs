pub mod grammar;

use std::sync::OnceLock;

pub use self::grammar::parse_gcs_https;
use crate::error::AddressError;

/// Identifies the grammar that produced an [`AddressMatch`].
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GrammarKind {
    /// `https://<bucket>.s3.<region>.amazonaws.com/<key>`
    S3VirtualHosted,
    /// `https://<name>-<account>.s3-accesspoint.<region>.amazonaws.com/<key>`
    S3AccessPoint,
    /// `s3://<bucket>/<key>`
    S3Native,
    /// `https://<bucket>.s3.amazonaws.com/<key>`
    S3VirtualHostedGlobal,
    /// `https://storage.googleapis.com/<bucket>/<key>`
    GcsHttps,
    /// `https://<container>.blob.core.windows.net/<key>`
    AzureBlob,
    /// A grammar registered by the user.
    Custom(String),
}

/// Bucket (or container) and key extracted from a URL.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AddressMatch {
    pub grammar: GrammarKind,
    pub bucket: String,
    /// Remaining object path.
    ///
    /// May be empty, but is never absent for a match.
    pub key: String,
}

impl AddressMatch {
    pub fn new(grammar: GrammarKind, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            grammar,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    fn same_address(&self, other: &Self) -> bool {
        self.bucket == other.bucket && self.key == other.key
    }
}

/// A single URL address grammar.
///
/// See [`grammar`] for the built-in implementations.
pub trait AddressGrammar {
    fn kind(&self) -> GrammarKind;

    /// Try to match the URL.
    ///
    /// Must return `None` if the grammar does not apply, and must never panic.
    fn parse(&self, url: &str) -> Option<AddressMatch>;
}

impl<G: AddressGrammar + ?Sized> AddressGrammar for Box<G> {
    fn kind(&self) -> GrammarKind {
        (**self).kind()
    }

    fn parse(&self, url: &str) -> Option<AddressMatch> {
        (**self).parse(url)
    }
}

pub(crate) type DynGrammar = Box<dyn AddressGrammar + Send + Sync>;

/// Ordered list of address grammars.
///
/// Grammars are evaluated in registration order; the first match wins.
pub struct AddressParser {
    grammars: Vec<DynGrammar>,
}

impl Default for AddressParser {
    /// All built-in grammars.
    ///
    /// The region-less S3 host is tried before the regional one, so it takes
    /// precedence should both ever apply.
    fn default() -> Self {
        Self::new().with_default_grammars()
    }
}

impl std::fmt::Debug for AddressParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressParser")
            .field("grammars", &self.kinds())
            .finish()
    }
}

impl AddressParser {
    /// Create a parser without any grammars.
    pub fn new() -> Self {
        Self {
            grammars: Vec::new(),
        }
    }

    pub fn register_grammar<G: AddressGrammar + Send + Sync + 'static>(&mut self, grammar: G) {
        self.grammars.push(Box::new(grammar));
    }

    pub fn with_grammar(mut self, grammar: DynGrammar) -> Self {
        self.grammars.push(grammar);
        self
    }

    /// Append the built-in grammars.
    ///
    /// Grammars registered before this call take precedence over them.
    pub fn with_default_grammars(self) -> Self {
        self.with_grammar(Box::new(grammar::S3VirtualHostedGlobal))
            .with_grammar(Box::new(grammar::S3VirtualHosted))
            .with_grammar(Box::new(grammar::S3AccessPoint))
            .with_grammar(Box::new(grammar::S3Native))
            .with_grammar(Box::new(grammar::GcsHttps))
            .with_grammar(Box::new(grammar::AzureBlob))
    }

    /// Kinds of the registered grammars, in evaluation order.
    pub fn kinds(&self) -> Vec<GrammarKind> {
        self.grammars.iter().map(|g| g.kind()).collect()
    }

    /// Wrap all registered grammars in a [`crate::wrapper::trace::TracedGrammar`].
    #[cfg(feature = "tracing")]
    pub fn traced(self) -> Self {
        let grammars = self
            .grammars
            .into_iter()
            .map(|g| Box::new(crate::wrapper::trace::TracedGrammar::new(g)) as DynGrammar)
            .collect();
        Self { grammars }
    }

    /// Return the match of the first applicable grammar.
    pub fn parse(&self, url: &str) -> Option<AddressMatch> {
        self.grammars.iter().find_map(|g| g.parse(url))
    }

    /// Return the matches of all applicable grammars, in evaluation order.
    pub fn parse_all(&self, url: &str) -> Vec<AddressMatch> {
        self.grammars.iter().filter_map(|g| g.parse(url)).collect()
    }

    /// Like [`Self::parse`], but fails if multiple grammars apply and
    /// disagree on bucket or key.
    pub fn parse_strict(&self, url: &str) -> Result<Option<AddressMatch>, AddressError> {
        let mut matches = self.parse_all(url);
        let Some(first) = matches.first() else {
            return Ok(None);
        };

        if matches.iter().all(|m| m.same_address(first)) {
            Ok(Some(matches.swap_remove(0)))
        } else {
            Err(AddressError::Ambiguous {
                url: url.to_string(),
                matches,
            })
        }
    }
}

pub(crate) fn default_parser() -> &'static AddressParser {
    static PARSER: OnceLock<AddressParser> = OnceLock::new();
    PARSER.get_or_init(AddressParser::default)
}

/// Parse a URL into `(bucket, key)` with the default [`AddressParser`].
///
/// Both are `None` if no grammar applies.
pub fn parse_address(url: &str) -> (Option<String>, Option<String>) {
    match default_parser().parse(url) {
        Some(m) => (Some(m.bucket), Some(m.key)),
        None => (None, None),
    }
}
