//! Custom scheme rewrites and address grammars for storeurl.
//!
//! A [`StoreUrlConfig`] registers extra [`storeurl::PrefixRewriter`]s and
//! [`storeurl::grammar::PatternGrammar`]s ahead of the built-in ones.
//! See [`load_config`] for the file location and format.

use std::collections::HashSet;

use anyhow::{Context as _, bail};
use storeurl::{AddressParser, PrefixRewriter, Resolver, UrlSanitizer, grammar::PatternGrammar};

mod fs;

pub use self::fs::{ConfigSource, LoadedConfig, default_config_path, load_config, parse_config};
#[cfg(feature = "tokio")]
pub use self::fs::load_config_async;

/// Schemes rewritten by [`UrlSanitizer::with_default_rewriters`].
const BUILTIN_SCHEMES: &[&str] = &["gs", "s3"];

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct StoreUrlConfig {
    /// Fail on URLs matched by several grammars with differing results.
    pub strict: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rewrites: Vec<RewriteRule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub grammars: Vec<GrammarRule>,
}

/// Rewrite `<scheme>://<rest>` to `<prefix><rest>`.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RewriteRule {
    pub scheme: String,
    pub prefix: String,
}

impl RewriteRule {
    pub fn new(scheme: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            prefix: prefix.into(),
        }
    }
}

/// A named regular expression with a `bucket` and an optional `key` group.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GrammarRule {
    pub name: String,
    pub pattern: String,
}

impl GrammarRule {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }
}

impl StoreUrlConfig {
    pub fn with_rewrite(mut self, rule: RewriteRule) -> Self {
        self.rewrites.push(rule);
        self
    }

    pub fn with_grammar(mut self, rule: GrammarRule) -> Self {
        self.grammars.push(rule);
        self
    }

    /// Build a sanitizer with the configured rewrites ahead of the built-in ones.
    ///
    /// Rejects rules that would make sanitizing non-idempotent: a prefix must
    /// not start with a scheme that is itself rewritten.
    pub fn build_sanitizer(&self) -> Result<UrlSanitizer, anyhow::Error> {
        let rewritten = self
            .rewrites
            .iter()
            .map(|r| r.scheme.as_str())
            .chain(BUILTIN_SCHEMES.iter().copied())
            .collect::<HashSet<_>>();

        let mut seen = HashSet::new();
        let mut sanitizer = UrlSanitizer::new();
        for (index, rule) in self.rewrites.iter().enumerate() {
            validate_rewrite(rule, &rewritten, &mut seen)
                .with_context(|| format!("invalid rewrite at index {index}"))?;
            sanitizer.register_rewriter(PrefixRewriter::new(&rule.scheme, &rule.prefix));
        }
        Ok(sanitizer.with_default_rewriters())
    }

    /// Build a parser with the configured grammars ahead of the built-in ones.
    pub fn build_parser(&self) -> Result<AddressParser, anyhow::Error> {
        let mut seen = HashSet::new();
        let mut parser = AddressParser::new();
        for (index, rule) in self.grammars.iter().enumerate() {
            if !seen.insert(rule.name.as_str()) {
                bail!("duplicate grammar '{}' at index {index}", rule.name);
            }
            let grammar = PatternGrammar::new(&rule.name, &rule.pattern)
                .with_context(|| format!("invalid grammar at index {index}"))?;
            parser.register_grammar(grammar);
        }
        Ok(parser.with_default_grammars())
    }

    pub fn build_resolver(&self) -> Result<Resolver, anyhow::Error> {
        Ok(Resolver::new(self.build_sanitizer()?, self.build_parser()?))
    }
}

fn validate_rewrite<'a>(
    rule: &'a RewriteRule,
    rewritten: &HashSet<&str>,
    seen: &mut HashSet<&'a str>,
) -> Result<(), anyhow::Error> {
    let scheme = rule.scheme.as_str();
    if scheme.is_empty() || scheme.contains([':', '/']) {
        bail!("scheme '{scheme}' must be non-empty and must not contain ':' or '/'");
    }
    if !seen.insert(scheme) {
        bail!("duplicate rewrite for scheme '{scheme}'");
    }
    if rule.prefix.is_empty() {
        bail!("prefix for scheme '{scheme}' must not be empty");
    }
    match storeurl::scheme_of(&rule.prefix) {
        Some(target) if rewritten.contains(target) => {
            bail!(
                "prefix '{}' uses the rewritten scheme '{target}'",
                rule.prefix
            );
        }
        _ => Ok(()),
    }
}
