// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use tracing::debug;

use crate::{
    error::TokenError,
    token::{Direction, TokenClass, TokenId, TokenKind, TokenValue},
};

use super::scanner::Scanner;

fn is_octal_digit(c: char) -> bool {
    ('0'..='7').contains(&c)
}

impl Scanner<'_> {
    /// Links every queued reference to its group, the last discovered
    /// reference first.
    pub(super) fn resolve_references(&mut self) {
        while let Some(id) = self.refs.pop() {
            let token = &self.chain[id];
            let Some(info) = token.reference() else {
                continue;
            };
            let kind = token.kind;
            let name = info.name.clone();
            let relative_index = info.relative_index;

            match self.find_group(kind, &name, relative_index) {
                Some(group) => self.link_reference(id, group),
                None => {
                    if kind == TokenKind::Reference && self.reference_to_octal(id, &name) {
                        continue;
                    }

                    debug!(name = %name, kind = %kind, "unmatched reference");
                    self.chain[id].set_err_if_none(TokenError::UnmatchedRef);
                }
            }
        }
    }

    fn find_group(&self, kind: TokenKind, name: &str, relative_index: usize) -> Option<TokenId> {
        if let Some(group) = self.named_groups.get(name) {
            return Some(*group);
        }

        if matches!(kind, TokenKind::NamedRef | TokenKind::NamedSubroutine) {
            return None;
        }

        // \g{-1} is the last group opened before the reference,
        // \g{+1} the next one after it
        let (sign, digits) = match name.strip_prefix(['-', '+']) {
            Some(digits) => (name.chars().next(), digits),
            None => (None, name),
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let number: i64 = digits.parse().ok()?;
        let relative_index = relative_index as i64;
        let index = match sign {
            Some('-') => relative_index - number + 1,
            Some(_) => relative_index + number,
            None => number,
        };

        if index < 1 {
            return None;
        }
        self.capture_groups.get(index as usize - 1).copied()
    }

    fn link_reference(&mut self, id: TokenId, group: TokenId) {
        let direction = {
            let start = self.chain[id].start;
            let group_token = &self.chain[group];

            if start < group_token.start {
                Direction::Forward
            } else if group_token
                .close
                .map_or(true, |close| start < self.chain[close].start)
            {
                Direction::Within
            } else {
                Direction::Backward
            }
        };

        // subroutine calls may run a group ahead of or around themselves
        let backreference = matches!(
            self.chain[id].kind,
            TokenKind::Reference
                | TokenKind::NamedRef
                | TokenKind::NumRef
                | TokenKind::ConditionalGroup
        );
        let supported = !backreference
            || match direction {
                Direction::Forward => self.profile.config.forward_ref,
                Direction::Within => self.profile.config.nested_ref,
                Direction::Backward => true,
            };

        let token = &mut self.chain[id];
        token.group = Some(group);
        token.related.push(group);
        if let Some(info) = token.reference_mut() {
            info.direction = Some(direction);
        }
        if !supported {
            token.set_err_if_none(TokenError::NotSupported);
        }

        debug!(
            reference = id.index(),
            group = group.index(),
            direction = ?direction,
            "reference resolved"
        );
    }

    /// Reinterprets an unmatched `\12` style reference as an escape,
    /// returns false when it stays a reference.
    fn reference_to_octal(&mut self, id: TokenId, name: &str) -> bool {
        // \12   -> escoctal 0o12
        // \12 3 -> escoctal 0o123, absorbing the literal '3'
        // \8    -> escchar '8'

        let mut chars = name.chars();
        let (kind, code) = match (chars.next(), chars.next()) {
            (Some(high), Some(low)) if is_octal_digit(high) && is_octal_digit(low) => {
                let mut code = (high as u32 - '0' as u32) * 8 + (low as u32 - '0' as u32);

                let next_digit = self.chain[id]
                    .next
                    .map(|next| &self.chain[next])
                    .filter(|next| next.kind == TokenKind::Char)
                    .and_then(|next| next.code())
                    .and_then(char::from_u32)
                    .filter(|c| is_octal_digit(*c));

                if let Some(c) = next_digit {
                    let extended = code * 8 + (c as u32 - '0' as u32);
                    if extended <= 255 {
                        self.chain.absorb_next(id);
                        code = extended;
                    }
                }
                (TokenKind::EscOctal, code)
            }
            (Some(c @ ('8' | '9')), None) => (TokenKind::EscChar, c as u32),
            (Some(c), None) if is_octal_digit(c) && self.profile.config.ref_to_octal_always => {
                (TokenKind::EscOctal, c as u32 - '0' as u32)
            }
            _ => return false,
        };

        let token = &mut self.chain[id];
        token.kind = kind;
        token.class = Some(TokenClass::Esc);
        token.value = TokenValue::Code(code);

        debug!(name, kind = %kind, code, "reference read as an escape");
        true
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{
        error::TokenError,
        lexer::{parse, Lexed},
        profile::{ConfigOverrides, Profile, ProfileOverrides},
        token::{Direction, Token, TokenClass, TokenId, TokenKind},
    };

    fn tokens(lexed: &Lexed) -> Vec<&Token> {
        lexed.iter().map(|(_, token)| token).collect()
    }

    #[test]
    fn test_backward_reference() {
        let lexed = parse("/(a)\\1/", &Profile::core());
        let reference = tokens(&lexed)[4];

        assert_eq!(reference.kind, TokenKind::Reference);
        assert_eq!(reference.class, Some(TokenClass::Ref));
        assert_eq!(reference.group, Some(TokenId(1)));
        assert_eq!(reference.related, vec![TokenId(1)]);
        assert_eq!(reference.direction(), Some(Direction::Backward));
        assert_eq!(reference.direction().map(|d| d.offset()), Some(-1));
        assert!(lexed.errors().is_empty());
    }

    #[test]
    fn test_forward_and_nested_references() {
        let lexed = parse("/\\2(a\\1)(b)/", &Profile::core());
        let tokens = tokens(&lexed);

        assert_eq!(tokens[1].group, Some(TokenId(6)));
        assert_eq!(tokens[1].direction(), Some(Direction::Forward));
        assert_eq!(tokens[4].group, Some(TokenId(2)));
        assert_eq!(tokens[4].direction(), Some(Direction::Within));
        assert!(lexed.errors().is_empty());

        // rejected by javascript
        let lexed = parse("/\\2(a\\1)(b)/", &Profile::javascript());
        assert_eq!(
            lexed
                .errors()
                .iter()
                .map(|d| (d.error, d.token))
                .collect::<Vec<_>>(),
            vec![
                (TokenError::NotSupported, TokenId(1)),
                (TokenError::NotSupported, TokenId(4))
            ]
        );
    }

    #[test]
    fn test_subroutines_ignore_reference_direction_limits() {
        let profile = Profile::core().apply(&ProfileOverrides {
            config: ConfigOverrides {
                forward_ref: Some(false),
                nested_ref: Some(false),
                ..ConfigOverrides::default()
            },
            ..ProfileOverrides::default()
        });

        let lexed = parse("/(?1)(a(?1))\\1/", &profile);
        let tokens = tokens(&lexed);

        assert_eq!(tokens[1].kind, TokenKind::Subroutine);
        assert_eq!(tokens[1].direction(), Some(Direction::Forward));
        assert_eq!(tokens[4].kind, TokenKind::Subroutine);
        assert_eq!(tokens[4].direction(), Some(Direction::Within));
        assert_eq!(tokens[6].direction(), Some(Direction::Backward));
        assert!(lexed.errors().is_empty());

        let lexed = parse("/\\1(a)/", &profile);
        assert_eq!(
            lexed
                .errors()
                .iter()
                .map(|d| (d.error, d.token))
                .collect::<Vec<_>>(),
            vec![(TokenError::NotSupported, TokenId(1))]
        );
    }

    #[test]
    fn test_relative_references() {
        let lexed = parse("/(a)(b)\\g{-1}\\g-2\\g{+1}(c)/", &Profile::core());
        let tokens = tokens(&lexed);

        assert_eq!(tokens[7].kind, TokenKind::NumRef);
        assert_eq!(tokens[7].group, Some(TokenId(4)));
        assert_eq!(tokens[8].group, Some(TokenId(1)));
        assert_eq!(tokens[9].group, Some(TokenId(10)));
        assert_eq!(tokens[9].direction(), Some(Direction::Forward));
    }

    #[test]
    fn test_named_references() {
        let lexed = parse("/(?<year>\\d)\\k<year>\\k<1>\\k<none>/", &Profile::core());
        let tokens = tokens(&lexed);

        assert_eq!(tokens[4].group, Some(TokenId(1)));
        assert_eq!(tokens[4].err, None);

        // named references never fall back to numbers
        assert_eq!(tokens[5].err, Some(TokenError::UnmatchedRef));
        assert_eq!(tokens[6].err, Some(TokenError::UnmatchedRef));
    }

    #[test]
    fn test_duplicate_group_names() {
        let lexed = parse("/(?<n>a)(?<n>b)\\k<n>/", &Profile::core());
        assert_eq!(tokens(&lexed)[7].group, Some(TokenId(4)));
    }

    #[test]
    fn test_literal_eight_and_nine() {
        let lexed = parse("/\\8\\9/", &Profile::core());
        let tokens = tokens(&lexed);

        assert_eq!(tokens[1].kind, TokenKind::EscChar);
        assert_eq!(tokens[1].class, Some(TokenClass::Esc));
        assert_eq!(tokens[1].code(), Some(56));
        assert_eq!(tokens[2].code(), Some(57));
        assert!(lexed.errors().is_empty());
    }

    #[test]
    fn test_octal_fallback() {
        let lexed = parse("/\\123+/", &Profile::core());
        let tokens = tokens(&lexed);

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[1].kind, TokenKind::EscOctal);
        assert_eq!(tokens[1].code(), Some(0o123));
        assert_eq!(tokens[1].length, 4);

        // the quantifier target moves to the surviving token
        assert_eq!(tokens[2].kind, TokenKind::Plus);
        assert_eq!(tokens[2].related, vec![TokenId(1)]);
        assert_eq!(tokens[2].prev, Some(TokenId(1)));
        assert!(lexed.errors().is_empty());

        // would exceed 255
        let lexed = parse("/\\404/", &Profile::core());
        let tokens = self::tokens(&lexed);
        assert_eq!(tokens[1].code(), Some(0o40));
        assert_eq!(tokens[1].length, 3);
        assert_eq!(tokens[2].code(), Some('4' as u32));
    }

    #[test]
    fn test_single_digit_reference_without_group() {
        let lexed = parse("/\\1/", &Profile::core());
        assert_eq!(tokens(&lexed)[1].kind, TokenKind::Reference);
        assert_eq!(tokens(&lexed)[1].err, Some(TokenError::UnmatchedRef));

        let lexed = parse("/\\1/", &Profile::javascript());
        assert_eq!(tokens(&lexed)[1].kind, TokenKind::EscOctal);
        assert_eq!(tokens(&lexed)[1].code(), Some(1));
        assert!(lexed.errors().is_empty());
    }
}
