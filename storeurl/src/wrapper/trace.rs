use crate::{AddressGrammar, AddressMatch, GrammarKind};

/// Wrapper for an address grammar that logs attempts with the `tracing` crate.
///
/// * Attempts that do not apply are logged at the `TRACE` level
/// * Matches are logged at the `DEBUG` level, including bucket and key
///
/// See [`crate::AddressParser::traced`] to wrap a whole parser.
#[derive(Debug)]
pub struct TracedGrammar<G> {
    inner: G,
}

impl<G> TracedGrammar<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> G {
        self.inner
    }
}

impl<G> AddressGrammar for TracedGrammar<G>
where
    G: AddressGrammar,
{
    fn kind(&self) -> GrammarKind {
        self.inner.kind()
    }

    fn parse(&self, url: &str) -> Option<AddressMatch> {
        match self.inner.parse(url) {
            Some(m) => {
                tracing::debug!(
                    grammar = ?m.grammar,
                    url,
                    bucket = &m.bucket,
                    key = &m.key,
                    "address::match"
                );
                Some(m)
            }
            None => {
                tracing::trace!(grammar = ?self.inner.kind(), url, "address::no_match");
                None
            }
        }
    }
}
