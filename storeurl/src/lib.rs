//! Cloud object store URL normalization.
//!
//! Two independent capabilities:
//!
//! * [`sanitize`] rewrites provider-native URLs (`s3://`, `gs://`) into their
//!   canonical HTTPS form, and passes everything else through with trailing
//!   slashes removed.
//! * [`AddressParser`] decomposes a recognized URL into a bucket and key.
//!
//! [`resolve`] combines both into a [`StoreLocation`]. A [`Resolver`] does the
//! same with custom rewriters ([`PrefixRewriter`]) and grammars
//! ([`grammar::PatternGrammar`]) registered ahead of the built-in ones.

mod address;
mod error;
mod location;
mod rewrite;
mod sanitize;
mod scheme;
#[cfg(feature = "tracing")]
pub mod wrapper;

pub use self::{
    address::{
        AddressGrammar, AddressMatch, AddressParser, GrammarKind, grammar, parse_address,
        parse_gcs_https,
    },
    error::AddressError,
    location::{Provider, Resolver, StoreLocation, resolve},
    rewrite::{
        GcsRewriter, PrefixRewriter, S3Rewriter, SchemeRewriter, gs_to_https, s3_to_https,
    },
    sanitize::{CanonicalUrl, UrlSanitizer, sanitize},
    scheme::{Scheme, scheme_of},
};
