// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

mod charset;
mod escape;
mod group;
mod resolver;
mod scanner;

use std::{collections::BTreeMap, sync::Arc};

use serde::Serialize;
use tracing::debug;

use crate::{
    chain::{ChainIter, TokenChain},
    error::{Diagnostic, Error},
    printer,
    profile::Profile,
    token::{Token, TokenId},
};

use scanner::Scanner;

/// The result of lexing one pattern.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct Lexed {
    pub(crate) pattern: String,
    pub(crate) chain: TokenChain,
    pub(crate) errors: Vec<Diagnostic>,

    // capturing group openers, in the order of their capture numbers
    pub(crate) capture_groups: Vec<TokenId>,

    // non-numeric group names, the last group of a name wins
    pub(crate) named_groups: BTreeMap<String, TokenId>,
}

impl Lexed {
    /// The first token of the chain, `None` for an empty pattern.
    pub fn head(&self) -> Option<TokenId> {
        self.chain.head()
    }

    pub fn iter(&self) -> ChainIter<'_> {
        self.chain.iter()
    }

    pub fn get(&self, id: TokenId) -> Option<&Token> {
        self.chain.get(id)
    }

    pub fn chain(&self) -> &TokenChain {
        &self.chain
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The source text covered by the token.
    pub fn text(&self, id: TokenId) -> Option<String> {
        let token = self.chain.get(id)?;
        Some(
            self.pattern
                .chars()
                .skip(token.start)
                .take(token.length)
                .collect(),
        )
    }

    /// The token errors, in chain order.
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn capture_groups(&self) -> &[TokenId] {
        &self.capture_groups
    }

    pub fn named_groups(&self) -> &BTreeMap<String, TokenId> {
        &self.named_groups
    }

    /// One line per token, for logs and snapshots.
    pub fn debug_text(&self) -> String {
        printer::print_lexed(self)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(Error::Serialize)
    }
}

/// Lexes `pattern` under `profile`.
///
/// Never fails: problems are reported as token errors, see
/// [`Lexed::errors`].
pub fn parse(pattern: &str, profile: &Profile) -> Lexed {
    Scanner::new(pattern, profile).scan()
}

struct CacheEntry {
    pattern: String,
    lexed: Lexed,
}

/// A lexer bound to one profile, remembering the last result.
pub struct Lexer {
    // never replaced, so a cached result always belongs to this profile
    profile: Arc<Profile>,
    cache: Option<CacheEntry>,
}

impl Lexer {
    pub fn new(profile: Profile) -> Self {
        Self::with_shared_profile(Arc::new(profile))
    }

    pub fn with_shared_profile(profile: Arc<Profile>) -> Self {
        Self {
            profile,
            cache: None,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Lexes `pattern`, returning the cached result when the same pattern
    /// was lexed last.
    pub fn parse(&mut self, pattern: &str) -> &Lexed {
        let stale = self
            .cache
            .as_ref()
            .is_some_and(|entry| entry.pattern != pattern);
        if stale {
            self.cache = None;
        }

        match &self.cache {
            Some(_) => debug!(pattern, "cache hit"),
            None => debug!(pattern, "cache miss"),
        }

        let profile = &self.profile;
        let entry = self.cache.get_or_insert_with(|| CacheEntry {
            pattern: pattern.to_owned(),
            lexed: parse(pattern, profile),
        });

        &entry.lexed
    }
}
