// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::{error::Error, tables, token::TokenKind};

use super::{FlagKind, ModeKind, Profile};

/// A partial profile, applied on top of a base profile to define a dialect.
///
/// In the char-keyed tables a `null` value removes the entry from the base
/// table and any other value adds or replaces it, e.g.
///
/// ```json
/// {
///     "name": "legacy",
///     "flags": { "s": null, "y": null },
///     "esc_char_codes": { "e": null },
///     "unicode_scripts": { "Greek": null, "Klingon": true },
///     "posix_classes": false,
///     "disable_tokens": ["namedgroup", "possessive"],
///     "config": { "forward_ref": false }
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileOverrides {
    pub name: Option<String>,
    pub delimiter: Option<char>,
    pub flags: BTreeMap<char, Option<FlagKind>>,
    pub esc_char_codes: BTreeMap<char, Option<u32>>,
    pub esc_char_specials: BTreeMap<char, Option<TokenKind>>,
    pub special_chars: BTreeMap<char, Option<TokenKind>>,
    pub unicode_scripts: Option<NameSetOverride>,
    pub unicode_categories: Option<NameSetOverride>,
    pub posix_classes: Option<NameSetOverride>,

    // replaces the whole mode table
    pub modes: Option<BTreeMap<char, ModeKind>>,

    pub disable_tokens: Vec<TokenKind>,
    pub enable_tokens: Vec<TokenKind>,

    // kinds that can not, or can again, be quantified
    pub unquantifiable: Vec<TokenKind>,
    pub quantifiable: Vec<TokenKind>,

    // opener kinds whose `)` can not, or can again, be quantified
    pub unquantifiable_close: Vec<TokenKind>,
    pub quantifiable_close: Vec<TokenKind>,

    pub config: ConfigOverrides,
}

/// Changes to one of the name sets of a profile.
///
/// `true` restores every name of the shared table, `false` empties the
/// set. Otherwise names map to `true` to be added, `null` or `false` to be
/// removed.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize)]
#[serde(untagged)]
pub enum NameSetOverride {
    All(bool),
    Names(BTreeMap<String, Option<bool>>),
}

impl NameSetOverride {
    fn apply_to<'t>(&self, set: &mut BTreeSet<String>, table: impl Iterator<Item = &'t str>) {
        match self {
            NameSetOverride::All(true) => set.extend(table.map(str::to_owned)),
            NameSetOverride::All(false) => set.clear(),
            NameSetOverride::Names(names) => {
                for (name, value) in names {
                    if *value == Some(true) {
                        set.insert(name.clone());
                    } else {
                        set.remove(name);
                    }
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    pub forward_ref: Option<bool>,
    pub nested_ref: Option<bool>,
    pub ctrl_code_err: Option<bool>,
    pub ref_to_octal_always: Option<bool>,
    pub hex_escape_min_digits: Option<usize>,
    pub max_code_point: Option<u32>,
}

impl ProfileOverrides {
    pub fn from_json(s: &str) -> Result<Self, Error> {
        serde_json::from_str(s).map_err(Error::InvalidOverrides)
    }

    pub(super) fn apply_to(&self, profile: &mut Profile) {
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(delimiter) = self.delimiter {
            profile.delimiter = delimiter;
        }

        merge_table(&mut profile.flags, &self.flags);
        merge_table(&mut profile.esc_char_codes, &self.esc_char_codes);
        merge_table(&mut profile.esc_char_specials, &self.esc_char_specials);
        merge_table(&mut profile.special_chars, &self.special_chars);

        if let Some(scripts) = &self.unicode_scripts {
            scripts.apply_to(
                &mut profile.unicode_scripts,
                tables::UNICODE_SCRIPTS.iter().copied(),
            );
        }
        if let Some(categories) = &self.unicode_categories {
            categories.apply_to(
                &mut profile.unicode_categories,
                tables::UNICODE_CATEGORIES.iter().map(|(short, _)| *short),
            );
        }
        if let Some(classes) = &self.posix_classes {
            classes.apply_to(
                &mut profile.posix_classes,
                tables::POSIX_CLASSES.iter().copied(),
            );
        }
        if let Some(modes) = &self.modes {
            profile.modes = modes.clone();
        }

        for kind in &self.disable_tokens {
            profile.disabled.insert(*kind);
        }
        for kind in &self.enable_tokens {
            profile.disabled.remove(kind);
        }

        profile.unquantifiable.extend(self.unquantifiable.iter().copied());
        for kind in &self.quantifiable {
            profile.unquantifiable.remove(kind);
        }
        profile
            .unquantifiable_close
            .extend(self.unquantifiable_close.iter().copied());
        for kind in &self.quantifiable_close {
            profile.unquantifiable_close.remove(kind);
        }

        let config = &mut profile.config;
        let overrides = &self.config;

        if let Some(v) = overrides.forward_ref {
            config.forward_ref = v;
        }
        if let Some(v) = overrides.nested_ref {
            config.nested_ref = v;
        }
        if let Some(v) = overrides.ctrl_code_err {
            config.ctrl_code_err = v;
        }
        if let Some(v) = overrides.ref_to_octal_always {
            config.ref_to_octal_always = v;
        }
        if let Some(v) = overrides.hex_escape_min_digits {
            config.hex_escape_min_digits = v;
        }
        if let Some(v) = overrides.max_code_point {
            config.max_code_point = v;
        }
    }
}

fn merge_table<V: Clone>(table: &mut BTreeMap<char, V>, overrides: &BTreeMap<char, Option<V>>) {
    for (key, value) in overrides {
        match value {
            Some(value) => {
                table.insert(*key, value.clone());
            }
            None => {
                table.remove(key);
            }
        }
    }
}
