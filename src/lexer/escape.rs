// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

// Escape sequences, in priority order:
//
// - `\` as the last char of the body
// - `\1`..`\99` outside a charset (references, possibly octal later)
// - `\k<name>`, `\k'name'`, `\k{name}`, `\g...` outside a charset
// - `\p{...}`, `\P{...}`, `\pL`, `\PL`
// - `\Q...\E`
// - `\uFFFF`, `\u{...}` (unicode flag only)
// - `\x{...}`
// - `\x`, `\xF`, `\xFF`
// - `\cA`
// - `\0`..`\377`
// - `\o{...}`
// - a bare `\c`
// - single chars, e.g. `\d`, `\n`, `\.`

use crate::{
    error::TokenError,
    tables,
    token::{ReferenceInfo, TokenClass, TokenId, TokenKind, TokenValue},
};

use super::scanner::Scanner;

/// A fixed-shape escape, before it is written into its token.
struct Escape {
    kind: TokenKind,
    length: usize,
    code: Option<u32>,
    err: Option<TokenError>,
}

impl Escape {
    fn new(kind: TokenKind, length: usize, code: u32) -> Self {
        Self {
            kind,
            length,
            code: Some(code),
            err: None,
        }
    }

    fn bad(kind: TokenKind, length: usize) -> Self {
        Self {
            kind,
            length,
            code: None,
            err: Some(TokenError::EscCharBad),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// `\w*` or `[-+]?\d\d?`
fn is_reference_name(name: &str) -> bool {
    let digits = name.strip_prefix(['-', '+']).unwrap_or(name);
    name.chars().all(is_word_char)
        || (!digits.is_empty() && digits.len() <= 2 && digits.chars().all(|c| c.is_ascii_digit()))
}

fn is_number(name: &str) -> bool {
    let digits = name.strip_prefix(['-', '+']).unwrap_or(name);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn escape_class(kind: TokenKind) -> TokenClass {
    match kind {
        TokenKind::WordBoundary
        | TokenKind::NotWordBoundary
        | TokenKind::Bos
        | TokenKind::Eos
        | TokenKind::AbsEos
        | TokenKind::PrevMatchEnd => TokenClass::Anchor,
        TokenKind::Keep => TokenClass::Special,
        TokenKind::EscChar
        | TokenKind::EscOctal
        | TokenKind::EscOctalO
        | TokenKind::EscUnicode
        | TokenKind::EscUnicodeU
        | TokenKind::EscUnicodeX
        | TokenKind::EscSequence
        | TokenKind::EscHexadecimal
        | TokenKind::EscControlChar => TokenClass::Esc,
        _ => TokenClass::CharClass,
    }
}

impl Scanner<'_> {
    pub(super) fn parse_escape(&mut self, id: TokenId) {
        // \xxxx?  //
        // ^    ^__// to here
        // |_______// current char, validated

        let index = self.chain[id].start;
        let in_charset = self.charset.is_some();

        let Some(current_char) = self.body_char(index + 1) else {
            let token = &mut self.chain[id];
            token.kind = TokenKind::EscChar;
            token.class = Some(TokenClass::Esc);
            token.err = Some(TokenError::EscCharOpen);
            return;
        };

        if !in_charset && self.parse_numeric_reference(id) {
            return;
        }

        if !in_charset && matches!(current_char, 'g' | 'k') && self.parse_named_reference(id) {
            return;
        }

        match current_char {
            'p' | 'P' => {
                self.parse_unicode_property(id);
                return;
            }
            'Q' => {
                self.parse_literal_sequence(id);
                return;
            }
            _ => {}
        }

        let escape = self
            .lex_unicode_escape(index)
            .or_else(|| self.lex_brace_hex_escape(index))
            .or_else(|| self.lex_hex_escape(index))
            .or_else(|| self.lex_control_escape(index))
            .or_else(|| self.lex_octal_escape(index))
            .or_else(|| self.lex_brace_octal_escape(index));

        let escape = match escape {
            Some(escape) => escape,
            None if current_char == 'c' => {
                if self.profile.config.ctrl_code_err {
                    Escape::bad(TokenKind::EscChar, 2)
                } else {
                    // decomposes into the literal chars `\` and `c`
                    self.parse_char(id, '\\');
                    return;
                }
            }
            None => self.lex_single_char_escape(current_char, in_charset),
        };

        let token = &mut self.chain[id];
        token.kind = escape.kind;
        token.class = Some(escape_class(escape.kind));
        token.length = escape.length;
        token.value = match escape.code {
            Some(code) => TokenValue::Code(code),
            None => TokenValue::None,
        };
        token.err = escape.err;
    }

    /// Marks the token as a reference waiting for the resolver.
    pub(super) fn set_reference(&mut self, id: TokenId, kind: TokenKind, name: &str, length: usize) {
        let relative_index = self.capture_groups.len();

        let token = &mut self.chain[id];
        token.kind = kind;
        token.class = Some(TokenClass::Ref);
        token.length = length;
        token.value = TokenValue::Reference(ReferenceInfo::new(name, relative_index));

        // a recursion always refers to the whole pattern
        if kind != TokenKind::Recursion {
            self.refs.push(id);
        }
    }

    fn parse_numeric_reference(&mut self, id: TokenId) -> bool {
        // \12  //
        // ^  ^_// to here
        // |____// current char

        let index = self.chain[id].start;

        // a leading zero is always an octal escape
        if !matches!(self.body_char(index + 1), Some('1'..='9')) {
            return false;
        }

        let digits = self.count_body_while(index + 1, |c| c.is_ascii_digit()).min(2);
        let name = self.body_substring(index + 1, index + 1 + digits);
        self.set_reference(id, TokenKind::Reference, &name, 1 + digits);
        true
    }

    fn parse_named_reference(&mut self, id: TokenId) -> bool {
        // \k<name>  //
        // ^^      ^_// to here
        // ||________// 'k' or 'g', validated
        // |_________// current char

        let index = self.chain[id].start;
        let is_g = self.body_char_equals(index + 1, 'g');
        let start = index + 2;

        let opening = self.body_char(start);
        let closing = match opening {
            Some('<') => '>',
            Some('\'') => '\'',
            Some('{') => '}',
            _ if is_g => {
                // \g1 \g-1 \g+1
                let sign = usize::from(matches!(self.body_char(start), Some('-' | '+')));
                let digits = self
                    .count_body_while(start + sign, |c| c.is_ascii_digit())
                    .min(2);
                if digits == 0 {
                    return false;
                }
                let name = self.body_substring(start, start + sign + digits);
                self.set_reference(id, TokenKind::NumRef, &name, 2 + sign + digits);
                return true;
            }
            _ => return false,
        };

        let Some(end) = self.find_body_char(start + 1, closing) else {
            return false;
        };
        let name = self.body_substring(start + 1, end);
        if !is_reference_name(&name) {
            return false;
        }

        let kind = match (is_g, opening) {
            (false, _) => TokenKind::NamedRef,
            (true, Some('{')) if is_number(&name) => TokenKind::NumRef,
            (true, Some('{')) => TokenKind::NamedRef,
            (true, _) if name == "0" => TokenKind::Recursion,
            (true, _) if is_number(&name) => TokenKind::NumSubroutine,
            (true, _) => TokenKind::NamedSubroutine,
        };

        self.set_reference(id, kind, &name, end + 1 - index);
        true
    }

    fn parse_unicode_property(&mut self, id: TokenId) {
        // \p{^Greek}  //
        // ^^        ^_// to here
        // ||__________// 'p' or 'P', validated
        // |___________// current char

        let index = self.chain[id].start;
        let upper = self.body_char_equals(index + 1, 'P');
        let start = index + 2;

        let property = match self.body_char(start) {
            Some('{') => self
                .find_body_char(start + 1, '}')
                .map(|end| (self.body_substring(start + 1, end), end + 1 - index)),
            Some(c) if c.is_ascii_alphabetic() => Some((c.to_string(), 3)),
            _ => None,
        };

        let Some((name, length)) = property else {
            let token = &mut self.chain[id];
            token.kind = TokenKind::EscChar;
            token.class = Some(TokenClass::Esc);
            token.length = 2;
            token.value = TokenValue::Code(u32::from(if upper { 'P' } else { 'p' }));
            token.err = Some(TokenError::EscCharBad);
            return;
        };

        let (negated, name) = match name.strip_prefix('^') {
            Some(rest) => (!upper, rest),
            None => (upper, name.as_str()),
        };

        // \p{Script=Greek} \p{gc=Lu}
        let (category_name, script_name) = match name.split_once('=') {
            Some(("General_Category" | "gc", value)) => (Some(value), None),
            Some(("Script" | "sc" | "Script_Extensions" | "scx", value)) => (None, Some(value)),
            Some(_) => (None, None),
            None => (Some(name), Some(name)),
        };

        let profile = self.profile;
        let recognized = category_name
            .and_then(|name| profile.find_unicode_category(name))
            .map(|unicode_id| (TokenKind::UnicodeCat, unicode_id, true))
            .or_else(|| {
                script_name
                    .and_then(|name| profile.find_unicode_script(name))
                    .map(|unicode_id| (TokenKind::UnicodeScript, unicode_id, true))
            });

        // names outside of the profile still tell the kind of property
        let found = recognized
            .or_else(|| {
                category_name
                    .and_then(tables::find_unicode_category)
                    .map(|unicode_id| (TokenKind::UnicodeCat, unicode_id, false))
            })
            .or_else(|| {
                script_name
                    .and_then(tables::find_unicode_script)
                    .map(|unicode_id| (TokenKind::UnicodeScript, unicode_id, false))
            });

        let token = &mut self.chain[id];
        token.class = Some(TokenClass::CharClass);
        token.length = length;

        match found {
            Some((kind, unicode_id, recognized)) => {
                token.kind = match (kind, negated) {
                    (TokenKind::UnicodeCat, true) => TokenKind::NotUnicodeCat,
                    (TokenKind::UnicodeScript, true) => TokenKind::NotUnicodeScript,
                    (kind, _) => kind,
                };
                token.value = TokenValue::Unicode {
                    id: unicode_id.to_owned(),
                };
                if !recognized {
                    token.err = Some(if profile.is_enabled(token.kind) {
                        TokenError::UnmatchedUnicode
                    } else {
                        TokenError::NotSupported
                    });
                }
            }
            None => {
                token.kind = if negated {
                    TokenKind::NotUnicodeCat
                } else {
                    TokenKind::UnicodeCat
                };
                token.err = Some(TokenError::UnmatchedUnicode);
            }
        }
    }

    fn parse_literal_sequence(&mut self, id: TokenId) {
        // \Q...\E  //
        // ^       ^// to here, or to the closing delimiter
        // |________// current char

        let index = self.chain[id].start;

        let mut offset = index + 2;
        let end = loop {
            match self.find_body_char(offset, '\\') {
                Some(idx) if self.body_char_equals(idx + 1, 'E') => break idx + 2,
                Some(idx) => offset = idx + 1,
                None => break self.close_index,
            }
        };

        let token = &mut self.chain[id];
        token.kind = TokenKind::EscSequence;
        token.class = Some(TokenClass::Esc);
        token.length = end - index;
    }

    /// The digits between `{` at `index` and the matching `}`, and the
    /// index after the `}`.
    fn braced_digits(&self, index: usize, radix: u32) -> Option<(String, usize)> {
        if !self.body_char_equals(index, '{') {
            return None;
        }

        let digits = self.count_body_while(index + 1, |c| c.is_digit(radix));
        if digits == 0 || !self.body_char_equals(index + 1 + digits, '}') {
            return None;
        }

        Some((
            self.body_substring(index + 1, index + 1 + digits),
            index + 2 + digits,
        ))
    }

    fn braced_escape(&self, index: usize, kind: TokenKind, radix: u32) -> Option<Escape> {
        let (digits, end) = self.braced_digits(index + 2, radix)?;
        let length = end - index;

        let code = u32::from_str_radix(&digits, radix)
            .ok()
            .filter(|code| *code <= self.profile.config.max_code_point);

        Some(match code {
            Some(code) => Escape::new(kind, length, code),
            None => Escape::bad(kind, length),
        })
    }

    fn lex_unicode_escape(&self, index: usize) -> Option<Escape> {
        if !self.body_char_equals(index + 1, 'u') {
            return None;
        }

        // \uFFFF
        if self.count_body_while(index + 2, |c| c.is_ascii_hexdigit()) >= 4 {
            let digits = self.body_substring(index + 2, index + 6);
            let code = u32::from_str_radix(&digits, 16).ok()?;
            return Some(Escape::new(TokenKind::EscUnicode, 6, code));
        }

        // \u{1F600}
        if self.unicode_flag && self.body_char_equals(index + 2, '{') {
            return Some(
                self.braced_escape(index, TokenKind::EscUnicodeU, 16)
                    .unwrap_or_else(|| Escape::bad(TokenKind::EscUnicodeU, 2)),
            );
        }

        None
    }

    fn lex_brace_hex_escape(&self, index: usize) -> Option<Escape> {
        if !self.body_char_equals(index + 1, 'x') {
            return None;
        }
        self.braced_escape(index, TokenKind::EscUnicodeX, 16)
    }

    fn lex_hex_escape(&self, index: usize) -> Option<Escape> {
        if !self.body_char_equals(index + 1, 'x') {
            return None;
        }

        let digits = self
            .count_body_while(index + 2, |c| c.is_ascii_hexdigit())
            .min(2);
        if digits < self.profile.config.hex_escape_min_digits {
            return None;
        }

        let code = if digits == 0 {
            0
        } else {
            u32::from_str_radix(&self.body_substring(index + 2, index + 2 + digits), 16).ok()?
        };
        Some(Escape::new(TokenKind::EscHexadecimal, 2 + digits, code))
    }

    fn lex_control_escape(&self, index: usize) -> Option<Escape> {
        if !self.body_char_equals(index + 1, 'c') {
            return None;
        }

        // \cA is 1, \cZ is 26
        let letter = self.body_char(index + 2).filter(|c| c.is_ascii_alphabetic())?;
        let code = letter.to_ascii_uppercase() as u32 - 64;
        Some(Escape::new(TokenKind::EscControlChar, 3, code))
    }

    fn lex_octal_escape(&self, index: usize) -> Option<Escape> {
        let mut digits = self
            .count_body_while(index + 1, |c| c.is_digit(8))
            .min(3);
        if digits == 0 {
            return None;
        }

        // shed the last digit when the value exceeds 255, e.g. `\400`
        let mut code = u32::from_str_radix(&self.body_substring(index + 1, index + 1 + digits), 8).ok()?;
        if code > 255 {
            digits -= 1;
            code >>= 3;
        }
        Some(Escape::new(TokenKind::EscOctal, 1 + digits, code))
    }

    fn lex_brace_octal_escape(&self, index: usize) -> Option<Escape> {
        if !self.body_char_equals(index + 1, 'o') {
            return None;
        }
        self.braced_escape(index, TokenKind::EscOctalO, 8)
    }

    fn lex_single_char_escape(&self, current_char: char, in_charset: bool) -> Escape {
        // `\b` is a backspace inside a charset
        if in_charset && current_char == 'b' {
            return Escape::new(TokenKind::EscChar, 2, 8);
        }

        if let Some(kind) = self.profile.esc_char_specials.get(&current_char) {
            return Escape {
                kind: *kind,
                length: 2,
                code: None,
                err: None,
            };
        }

        let code = self
            .profile
            .esc_char_codes
            .get(&current_char)
            .copied()
            .unwrap_or(current_char as u32);
        Escape::new(TokenKind::EscChar, 2, code)
    }
}
