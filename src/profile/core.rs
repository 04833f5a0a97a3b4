// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

// The core profile enables every construct the lexer recognizes,
// other dialects are derived from it by disabling features.

use std::collections::{BTreeMap, BTreeSet};

use crate::{tables, token::TokenKind};

use super::{FlagKind, ModeKind, Profile, ProfileConfig};

pub fn core_profile() -> Profile {
    let flags = BTreeMap::from([
        // not a real flag in some flavors, but a different method call
        ('g', FlagKind::Global),
        ('i', FlagKind::CaseInsensitive),
        ('m', FlagKind::Multiline),
        ('s', FlagKind::DotAll),
        ('u', FlagKind::Unicode),
        ('y', FlagKind::Sticky),
    ]);

    let esc_char_codes = BTreeMap::from([
        ('0', 0),  // null
        ('a', 7),  // bell
        ('t', 9),  // tab
        ('n', 10), // line feed
        ('v', 11), // vertical tab
        ('f', 12), // form feed
        ('r', 13), // carriage return
        ('e', 27), // escape
    ]);

    let esc_char_specials = BTreeMap::from([
        ('A', TokenKind::Bos),
        ('b', TokenKind::WordBoundary),
        ('B', TokenKind::NotWordBoundary),
        ('d', TokenKind::Digit),
        ('D', TokenKind::NotDigit),
        ('G', TokenKind::PrevMatchEnd),
        ('h', TokenKind::HWhitespace),
        ('H', TokenKind::NotHWhitespace),
        ('K', TokenKind::Keep),
        ('N', TokenKind::NotLineBreak),
        ('s', TokenKind::Whitespace),
        ('S', TokenKind::NotWhitespace),
        ('w', TokenKind::Word),
        ('W', TokenKind::NotWord),
        ('X', TokenKind::UnicodeGrapheme),
        ('Z', TokenKind::Eos),
        ('z', TokenKind::AbsEos),
    ]);

    let special_chars = BTreeMap::from([
        ('.', TokenKind::Dot),
        ('|', TokenKind::Alt),
        ('$', TokenKind::Eof),
        ('^', TokenKind::Bof),
        ('?', TokenKind::Opt),
        ('+', TokenKind::Plus),
        ('*', TokenKind::Star),
    ]);

    let modes = BTreeMap::from([
        ('i', ModeKind::CaseInsensitive),
        ('x', ModeKind::FreeSpacing),
        ('s', ModeKind::DotAll),
        ('m', ModeKind::Multiline),
        ('J', ModeKind::SameName),
        ('U', ModeKind::SwitchLazy),
        ('n', ModeKind::NoAutoCapture),
    ]);

    let unquantifiable = BTreeSet::from([
        TokenKind::Quant,
        TokenKind::Plus,
        TokenKind::Star,
        TokenKind::Opt,
        TokenKind::Lazy,
        TokenKind::Possessive,
        TokenKind::Eof,
        TokenKind::Bof,
        TokenKind::WordBoundary,
        TokenKind::NotWordBoundary,
        TokenKind::Bos,
        TokenKind::Eos,
        TokenKind::AbsEos,
        TokenKind::PrevMatchEnd,
        TokenKind::Keep,
        // group openers
        TokenKind::Group,
        TokenKind::NonCapGroup,
        TokenKind::NamedGroup,
        TokenKind::Atomic,
        TokenKind::Define,
        TokenKind::PosLookahead,
        TokenKind::NegLookahead,
        TokenKind::PosLookbehind,
        TokenKind::NegLookbehind,
        TokenKind::ModeGroup,
        TokenKind::Conditional,
        TokenKind::Condition,
        TokenKind::ConditionalGroup,
        TokenKind::Alt,
        TokenKind::ConditionalElse,
        TokenKind::Mode,
        TokenKind::Open,
        TokenKind::Close,
        TokenKind::Flag,
    ]);

    // the `)` of a condition belongs to the conditional header
    let unquantifiable_close = BTreeSet::from([TokenKind::Condition]);

    Profile {
        name: "core".to_owned(),
        delimiter: '/',
        flags,
        esc_char_codes,
        esc_char_specials,
        special_chars,
        unicode_scripts: tables::UNICODE_SCRIPTS
            .iter()
            .map(|name| (*name).to_owned())
            .collect(),
        unicode_categories: tables::UNICODE_CATEGORIES
            .iter()
            .map(|(short, _)| (*short).to_owned())
            .collect(),
        posix_classes: tables::POSIX_CLASSES
            .iter()
            .map(|name| (*name).to_owned())
            .collect(),
        modes,
        disabled: BTreeSet::new(),
        unquantifiable,
        unquantifiable_close,
        config: ProfileConfig {
            forward_ref: true,
            nested_ref: true,
            ctrl_code_err: true,
            ref_to_octal_always: false,
            hex_escape_min_digits: 0,
            max_code_point: 0x10FFFF,
        },
    }
}
