use crate::address::AddressMatch;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// A parser with a host precondition was called on a URL that does not
    /// contain the required host.
    ///
    /// This is a caller bug: gate on the host before calling.
    #[error("URL '{url}' does not contain the required host '{host}'")]
    MissingHost { url: String, host: &'static str },

    /// More than one grammar matched the URL with differing results.
    #[error("URL '{url}' is ambiguous: matched by {} grammars", .matches.len())]
    Ambiguous {
        url: String,
        matches: Vec<AddressMatch>,
    },
}
