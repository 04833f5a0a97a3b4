// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::collections::BTreeMap;

use crate::token::TokenKind;

use super::{ConfigOverrides, FlagKind, FlagProbe, NameSetOverride, ProfileOverrides};

// the flags whose availability depends on the engine version
const PROBED_FLAGS: [(char, FlagKind); 2] = [('u', FlagKind::Unicode), ('y', FlagKind::Sticky)];

const REMOVED_FLAGS: [char; 1] = ['s'];

const REMOVED_ESC_CHAR_CODES: [char; 2] = ['a', 'e'];

const REMOVED_ESC_CHAR_SPECIALS: [char; 9] = ['A', 'G', 'h', 'H', 'K', 'N', 'X', 'Z', 'z'];

const DISABLED_TOKENS: [TokenKind; 25] = [
    TokenKind::UnicodeCat,
    TokenKind::NotUnicodeCat,
    TokenKind::UnicodeScript,
    TokenKind::NotUnicodeScript,
    TokenKind::PosixCharClass,
    TokenKind::EscUnicodeX,
    TokenKind::EscSequence,
    TokenKind::EscOctalO,
    TokenKind::NamedGroup,
    TokenKind::Atomic,
    TokenKind::Define,
    TokenKind::ModeGroup,
    TokenKind::NamedRef,
    TokenKind::NumRef,
    TokenKind::Recursion,
    TokenKind::Subroutine,
    TokenKind::NumSubroutine,
    TokenKind::NamedSubroutine,
    TokenKind::Possessive,
    TokenKind::Conditional,
    TokenKind::Condition,
    TokenKind::ConditionalElse,
    TokenKind::ConditionalGroup,
    TokenKind::Mode,
    TokenKind::Comment,
];

pub fn javascript_overrides(probe: &dyn FlagProbe) -> ProfileOverrides {
    let flags: BTreeMap<char, Option<FlagKind>> = PROBED_FLAGS
        .iter()
        .map(|(c, kind)| (*c, probe.supports_flag(*c).then_some(*kind)))
        .chain(REMOVED_FLAGS.iter().map(|c| (*c, None)))
        .collect();

    let mut disable_tokens = DISABLED_TOKENS.to_vec();

    // `\u{...}` is only available to engines supporting the unicode flag
    if !probe.supports_flag('u') {
        disable_tokens.push(TokenKind::EscUnicodeU);
    }

    ProfileOverrides {
        name: Some("javascript".to_owned()),
        flags,
        esc_char_codes: REMOVED_ESC_CHAR_CODES.iter().map(|c| (*c, None)).collect(),
        esc_char_specials: REMOVED_ESC_CHAR_SPECIALS
            .iter()
            .map(|c| (*c, None))
            .collect(),
        unicode_scripts: Some(NameSetOverride::All(false)),
        unicode_categories: Some(NameSetOverride::All(false)),
        posix_classes: Some(NameSetOverride::All(false)),
        modes: Some(BTreeMap::new()),
        disable_tokens,
        config: ConfigOverrides {
            forward_ref: Some(false),
            nested_ref: Some(false),
            ctrl_code_err: Some(false),
            ref_to_octal_always: Some(true),
            hex_escape_min_digits: Some(2),
            max_code_point: None,
        },
        ..ProfileOverrides::default()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{error::TokenError, lexer::parse, profile::Profile, token::TokenKind};

    #[test]
    fn test_javascript_profile() {
        let profile = Profile::javascript();

        assert_eq!(profile.name, "javascript");
        assert_eq!(profile.esc_char_codes.get(&'a'), None);
        assert_eq!(profile.esc_char_codes.get(&'n'), Some(&10));
        assert_eq!(profile.esc_char_specials.get(&'A'), None);
        assert_eq!(profile.esc_char_specials.get(&'d'), Some(&TokenKind::Digit));
        assert_eq!(profile.flag('s'), None);
        assert!(profile.unicode_scripts.is_empty());
        assert!(profile.unicode_categories.is_empty());
        assert!(profile.posix_classes.is_empty());
        assert!(profile.modes.is_empty());

        assert!(!profile.is_enabled(TokenKind::NamedGroup));
        assert!(!profile.is_enabled(TokenKind::Possessive));
        assert!(profile.is_enabled(TokenKind::PosLookbehind));
        assert!(profile.is_enabled(TokenKind::Reference));

        assert!(!profile.config.forward_ref);
        assert!(!profile.config.ctrl_code_err);
        assert!(profile.config.ref_to_octal_always);
        assert_eq!(profile.config.hex_escape_min_digits, 2);
    }

    #[test]
    fn test_dotall_flag_not_supported() {
        let lexed = parse("/a/s", &Profile::javascript());
        let flag = lexed.iter().nth(3).map(|(_, token)| token);

        assert_eq!(flag.map(|t| t.kind), Some(TokenKind::Flag));
        assert_eq!(flag.and_then(|t| t.err), Some(TokenError::NotSupported));

        // even when the engine accepts it
        let lexed = parse("/a/s", &Profile::javascript_with_probe(&|_: char| true));
        assert_eq!(
            lexed.errors().iter().map(|d| d.error).collect::<Vec<_>>(),
            vec![TokenError::NotSupported]
        );
    }
}
