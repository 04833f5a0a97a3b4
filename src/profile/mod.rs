// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

mod core;
mod javascript;
mod overrides;

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{error::Error, tables, token::TokenKind};

pub use overrides::{ConfigOverrides, NameSetOverride, ProfileOverrides};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    Global,
    CaseInsensitive,
    Multiline,
    DotAll,
    Unicode,
    Sticky,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    CaseInsensitive,
    FreeSpacing,
    DotAll,
    Multiline,
    SameName,
    SwitchLazy,
    NoAutoCapture,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct ProfileConfig {
    // `\1(a)`
    pub forward_ref: bool,
    // `(\1a|b)+`
    pub nested_ref: bool,
    // whether a bare `\c` is an error or decomposes into literals
    pub ctrl_code_err: bool,
    // whether `\1`..`\7` fall back to octal escapes when no group matches
    pub ref_to_octal_always: bool,
    // the minimum number of hex digits after `\x`
    pub hex_escape_min_digits: usize,
    pub max_code_point: u32,
}

/// The capability table of a regex dialect.
///
/// The lexer never branches on the dialect name, every dialect difference
/// is expressed by the fields below.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct Profile {
    pub name: String,
    pub delimiter: char,
    pub flags: BTreeMap<char, FlagKind>,
    pub esc_char_codes: BTreeMap<char, u32>,
    pub esc_char_specials: BTreeMap<char, TokenKind>,
    pub special_chars: BTreeMap<char, TokenKind>,

    // canonical names, general categories by their short name
    pub unicode_scripts: BTreeSet<String>,
    pub unicode_categories: BTreeSet<String>,
    pub posix_classes: BTreeSet<String>,

    pub modes: BTreeMap<char, ModeKind>,
    pub disabled: BTreeSet<TokenKind>,
    pub unquantifiable: BTreeSet<TokenKind>,

    // opener kinds whose closing `)` can not be quantified
    pub unquantifiable_close: BTreeSet<TokenKind>,

    pub config: ProfileConfig,
}

impl Profile {
    /// The full-featured, PCRE-like profile every dialect derives from.
    pub fn core() -> Self {
        self::core::core_profile()
    }

    /// The JavaScript dialect as supported by a current engine.
    pub fn javascript() -> Self {
        Self::javascript_with_probe(&ModernEngine)
    }

    /// The JavaScript dialect, with the availability of flags decided by
    /// the given host engine probe.
    pub fn javascript_with_probe(probe: &dyn FlagProbe) -> Self {
        Self::core().apply(&javascript::javascript_overrides(probe))
    }

    pub fn from_dialect(dialect: Dialect) -> Self {
        match dialect {
            Dialect::Core => Self::core(),
            Dialect::JavaScript => Self::javascript(),
        }
    }

    /// Returns a new profile with the overrides applied on top of this one.
    pub fn apply(&self, overrides: &ProfileOverrides) -> Self {
        let mut profile = self.clone();
        overrides.apply_to(&mut profile);
        profile
    }

    pub fn is_enabled(&self, kind: TokenKind) -> bool {
        !self.disabled.contains(&kind)
    }

    pub fn flag(&self, c: char) -> Option<FlagKind> {
        self.flags.get(&c).copied()
    }

    /// Finds a general category of this profile by its short or long
    /// name, returning the short name.
    pub fn find_unicode_category(&self, name: &str) -> Option<&str> {
        self.unicode_categories
            .get(name)
            .or_else(|| {
                tables::find_unicode_category(name)
                    .and_then(|short| self.unicode_categories.get(short))
            })
            .map(String::as_str)
    }

    pub fn find_unicode_script(&self, name: &str) -> Option<&str> {
        self.unicode_scripts
            .get(name)
            .or_else(|| {
                self.unicode_scripts
                    .iter()
                    .find(|script| tables::loose_equals(script, name))
            })
            .map(String::as_str)
    }

    pub fn is_posix_class(&self, name: &str) -> bool {
        self.posix_classes.contains(name)
    }
}

/// The dialects shipped with the crate.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Dialect {
    Core,
    JavaScript,
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "core" | "pcre" => Ok(Dialect::Core),
            "javascript" | "js" => Ok(Dialect::JavaScript),
            _ => Err(Error::UnknownDialect(s.to_owned())),
        }
    }
}

/// Reports which pattern flags the host regex engine accepts.
pub trait FlagProbe {
    fn supports_flag(&self, flag: char) -> bool;
}

impl<F> FlagProbe for F
where
    F: Fn(char) -> bool,
{
    fn supports_flag(&self, flag: char) -> bool {
        self(flag)
    }
}

/// A probe for an engine supporting every standard flag.
pub struct ModernEngine;

impl FlagProbe for ModernEngine {
    fn supports_flag(&self, flag: char) -> bool {
        matches!(flag, 'd' | 'g' | 'i' | 'm' | 's' | 'u' | 'v' | 'y')
    }
}
