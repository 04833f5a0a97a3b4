// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

// Token dispatch, in priority order:
//
// - index 0, the closing delimiter and the flag region
// - `(` and `)` outside a charset
// - `[`, `[:name:]` and `]`
// - `+` after a quantifier (possessive)
// - `+`, `*`
// - `{m}`, `{m,}`, `{m,n}`
// - `\` escapes
// - `?`, either optional or lazy
// - `-` between two charset members
// - everything else, literal chars and the special chars `. | ^ $`

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::{
    chain::TokenChain,
    charwithposition::PatternSource,
    error::{Diagnostic, TokenError},
    profile::{FlagKind, Profile},
    token::{Token, TokenClass, TokenId, TokenKind, TokenValue},
};

use super::Lexed;

pub(super) struct OpenGroup {
    pub id: TokenId,

    // whether the `|` of a conditional has been seen
    pub has_else: bool,
}

pub(super) struct Scanner<'a> {
    pub source: PatternSource,
    pub pattern: &'a str,
    pub profile: &'a Profile,
    pub chain: TokenChain,
    pub groups: Vec<OpenGroup>,
    pub charset: Option<TokenId>,
    pub prev: Option<TokenId>,

    // the index of the closing delimiter, or the length of the
    // pattern when there is none
    pub close_index: usize,

    // whether the flag region enables unicode mode
    pub unicode_flag: bool,

    // tokens waiting for the resolver, in discovery order
    pub refs: Vec<TokenId>,
    pub capture_groups: Vec<TokenId>,
    pub named_groups: BTreeMap<String, TokenId>,
}

impl<'a> Scanner<'a> {
    pub fn new(pattern: &'a str, profile: &'a Profile) -> Self {
        let source = PatternSource::new(pattern);

        let close_index = match source.rfind_char(profile.delimiter) {
            Some(idx) if idx > 0 => idx,
            _ => source.len(),
        };

        let unicode_flag = source
            .chars_from(close_index + 1, source.len())
            .any(|c| profile.flag(c) == Some(FlagKind::Unicode));

        Self {
            source,
            pattern,
            profile,
            chain: TokenChain::new(),
            groups: vec![],
            charset: None,
            prev: None,
            close_index,
            unicode_flag,
            refs: vec![],
            capture_groups: vec![],
            named_groups: BTreeMap::new(),
        }
    }

    /// The char at `index` if it is inside the pattern body.
    pub fn body_char(&self, index: usize) -> Option<char> {
        if index < self.close_index {
            self.source.char_at(index)
        } else {
            None
        }
    }

    pub fn body_char_equals(&self, index: usize, expected_char: char) -> bool {
        self.body_char(index) == Some(expected_char)
    }

    pub fn body_starts_with(&self, index: usize, s: &str) -> bool {
        index + s.chars().count() <= self.close_index && self.source.starts_with_at(index, s)
    }

    pub fn count_body_while<P>(&self, from: usize, predicate: P) -> usize
    where
        P: Fn(char) -> bool,
    {
        self.source.count_while(from, self.close_index, predicate)
    }

    pub fn find_body_char(&self, from: usize, c: char) -> Option<usize> {
        self.source.find_char(from, self.close_index, c)
    }

    pub fn body_substring(&self, start: usize, end: usize) -> String {
        self.source.substring(start, end.min(self.close_index))
    }

    /// The body text from `start` to the closing delimiter.
    pub fn body_rest(&self, start: usize) -> String {
        self.source.chars_from(start, self.close_index).collect()
    }

    pub fn prev_token(&self) -> Option<&Token> {
        self.prev.and_then(|id| self.chain.get(id))
    }

    pub fn scan(mut self) -> Lexed {
        debug!(
            pattern = self.pattern,
            profile = %self.profile.name,
            "lexing pattern"
        );

        let mut index = 0;
        while index < self.source.len() {
            let id = self.chain.push(Token::new(index, TokenKind::Char));

            self.classify(id);
            self.post_process(id);

            let token = &self.chain[id];
            trace!(
                start = token.start,
                length = token.length,
                kind = %token.kind,
                err = ?token.err,
                "token"
            );

            index = token.end();
            self.prev = Some(id);
        }

        while let Some(open_group) = self.groups.pop() {
            self.chain[open_group.id].err = Some(TokenError::GroupOpen);
        }

        self.resolve_references();

        if let Some(charset) = self.charset.take() {
            self.chain[charset].err = Some(TokenError::SetOpen);
        }

        let errors: Vec<Diagnostic> = self
            .chain
            .iter()
            .filter_map(|(id, token)| {
                token.err.map(|error| Diagnostic {
                    error,
                    token: id,
                    location: self.source.location(token.start, token.length),
                })
            })
            .collect();

        debug!(
            tokens = self.chain.iter().count(),
            errors = errors.len(),
            captures = self.capture_groups.len(),
            "lexing finished"
        );

        Lexed {
            pattern: self.pattern.to_owned(),
            chain: self.chain,
            errors,
            capture_groups: self.capture_groups,
            named_groups: self.named_groups,
        }
    }

    fn classify(&mut self, id: TokenId) {
        let index = self.chain[id].start;
        let Some(current_char) = self.source.char_at(index) else {
            return;
        };
        let in_charset = self.charset.is_some();

        match current_char {
            _ if index == 0 || index >= self.close_index => {
                self.parse_flag(id, current_char);
            }
            '(' if !in_charset => {
                self.parse_group(id);
            }
            ')' if !in_charset => {
                self.parse_group_close(id);
            }
            '[' if !in_charset => {
                self.parse_set(id);
            }
            '[' if self.posix_class_length(index).is_some() => {
                self.parse_posix_class(id);
            }
            ']' if in_charset => {
                self.parse_set_close(id);
            }
            '+' if !in_charset
                && self.prev_token().and_then(|t| t.class) == Some(TokenClass::Quant) =>
            {
                let prev = self.prev;
                let token = &mut self.chain[id];
                token.kind = TokenKind::Possessive;
                token.related = prev.into_iter().collect();
            }
            '+' | '*' if !in_charset => {
                let (kind, min) = if current_char == '+' {
                    (TokenKind::Plus, 1)
                } else {
                    (TokenKind::Star, 0)
                };
                let token = &mut self.chain[id];
                token.kind = kind;
                token.class = Some(TokenClass::Quant);
                token.value = TokenValue::Quantifier { min, max: None };
            }
            '{' if !in_charset && self.brace_quantifier_length(index).is_some() => {
                self.parse_brace_quantifier(id);
            }
            '\\' => {
                self.parse_escape(id);
            }
            '?' if !in_charset => {
                let prev = self.prev;
                let is_lazy = self.prev_token().and_then(|t| t.class) == Some(TokenClass::Quant);
                let token = &mut self.chain[id];
                if is_lazy {
                    token.kind = TokenKind::Lazy;
                    token.related = prev.into_iter().collect();
                } else {
                    token.kind = TokenKind::Opt;
                    token.class = Some(TokenClass::Quant);
                    token.value = TokenValue::Quantifier {
                        min: 0,
                        max: Some(1),
                    };
                }
            }
            '-' if in_charset && self.is_range_start() => {
                // validated once the next token is known
                self.chain[id].kind = TokenKind::Range;
            }
            _ => {
                self.parse_char(id, current_char);
            }
        }
    }

    fn parse_flag(&mut self, id: TokenId, current_char: char) {
        let index = self.chain[id].start;

        if index == 0 {
            self.chain[id].kind = TokenKind::Open;
        } else if index == self.close_index {
            let head = self.chain.head();
            self.chain[id].kind = TokenKind::Close;
            if let Some(head) = head {
                self.chain[id].related = vec![head];
                self.chain[head].related = vec![id];
            }
        } else {
            let supported = self.profile.flag(current_char).is_some();
            let token = &mut self.chain[id];
            token.kind = TokenKind::Flag;
            token.value = TokenValue::Flag(current_char);
            if !supported {
                token.err = Some(TokenError::NotSupported);
            }
        }
    }

    fn parse_group_close(&mut self, id: TokenId) {
        self.chain[id].kind = TokenKind::GroupClose;

        match self.groups.pop() {
            Some(open_group) => {
                self.chain[id].open = Some(open_group.id);
                self.chain[open_group.id].close = Some(id);
            }
            None => {
                self.chain[id].err = Some(TokenError::GroupClose);
            }
        }
    }

    /// Length of the `{m}`, `{m,}` or `{m,n}` quantifier starting at `index`.
    fn brace_quantifier_length(&self, index: usize) -> Option<usize> {
        // {m,n}?  //
        // ^    ^__// to here
        // |_______// current char

        let min_digits = self.count_body_while(index + 1, |c| c.is_ascii_digit());
        if min_digits == 0 {
            return None;
        }

        let mut offset = index + 1 + min_digits;
        if self.body_char_equals(offset, ',') {
            offset += 1;
            offset += self.count_body_while(offset, |c| c.is_ascii_digit());
        }

        if self.body_char_equals(offset, '}') {
            Some(offset + 1 - index)
        } else {
            None
        }
    }

    fn parse_brace_quantifier(&mut self, id: TokenId) {
        let index = self.chain[id].start;
        let Some(length) = self.brace_quantifier_length(index) else {
            return;
        };

        let inner = self.body_substring(index + 1, index + length - 1);
        let (min, max) = match inner.split_once(',') {
            None => {
                let min = parse_decimal(&inner);
                (min, Some(min))
            }
            Some((min, "")) => (parse_decimal(min), None),
            Some((min, max)) => (parse_decimal(min), Some(parse_decimal(max))),
        };

        let token = &mut self.chain[id];
        token.kind = TokenKind::Quant;
        token.class = Some(TokenClass::Quant);
        token.length = length;
        token.value = TokenValue::Quantifier { min, max };

        if matches!(max, Some(max) if max < min) {
            token.err = Some(TokenError::QuantRev);
        }
    }

    /// Literal chars, and the special chars outside a charset.
    pub fn parse_char(&mut self, id: TokenId, current_char: char) {
        let in_charset = self.charset.is_some();
        let special = if in_charset {
            None
        } else {
            self.profile.special_chars.get(&current_char).copied()
        };
        let is_delimiter = !in_charset && current_char == self.profile.delimiter;

        let token = &mut self.chain[id];
        token.length = 1;

        match special {
            Some(kind) => {
                token.kind = kind;
                token.class = match kind {
                    TokenKind::Bof | TokenKind::Eof => Some(TokenClass::Anchor),
                    TokenKind::Dot => Some(TokenClass::CharClass),
                    _ => None,
                };
                token.value = TokenValue::None;
            }
            None => {
                token.kind = TokenKind::Char;
                token.class = None;
                token.value = TokenValue::Code(current_char as u32);
            }
        }

        if is_delimiter {
            token.err = Some(TokenError::FwdSlash);
        }
    }

    fn post_process(&mut self, id: TokenId) {
        let prev = self.chain[id].prev;

        // quantifier target
        if self.chain[id].class == Some(TokenClass::Quant) {
            match prev.and_then(|prev| self.quantifier_target(prev)) {
                Some(target) => self.chain[id].related = vec![target],
                None => self.chain[id].err = Some(TokenError::QuantTarg),
            }
        }

        // alternation inside a conditional
        if self.chain[id].kind == TokenKind::Alt {
            if let Some(open_group) = self.groups.last_mut() {
                if self.chain[open_group.id].kind.is_conditional() {
                    let conditional = open_group.id;
                    let extra = open_group.has_else;
                    open_group.has_else = true;

                    let token = &mut self.chain[id];
                    token.kind = TokenKind::ConditionalElse;
                    token.class = Some(TokenClass::Special);
                    token.related = vec![conditional];
                    if extra {
                        token.err = Some(TokenError::ExtraElse);
                    }
                }
            }
        }

        // a range can only be validated once its end is known
        if let Some(prev) = prev {
            let prev_token = &self.chain[prev];
            if prev_token.kind == TokenKind::Range && prev_token.length == 1 {
                self.validate_range(prev);
            }
        }

        if self.chain[id].class.is_none() {
            if let Some(open) = self.chain[id].open {
                self.chain[id].class = self.chain[open].class;
            }
        }

        let kind = self.chain[id].kind;
        if !self.profile.is_enabled(kind) {
            self.chain[id].set_err_if_none(TokenError::NotSupported);
        }
    }

    /// The token a quantifier following `prev` applies to.
    fn quantifier_target(&self, prev: TokenId) -> Option<TokenId> {
        let prev_token = &self.chain[prev];
        if self.profile.unquantifiable.contains(&prev_token.kind) {
            return None;
        }

        match prev_token.open {
            Some(open) => {
                if self.profile.unquantifiable_close.contains(&self.chain[open].kind) {
                    None
                } else {
                    Some(open)
                }
            }
            None => Some(prev),
        }
    }
}

// saturates instead of overflowing on absurdly long numbers
pub(super) fn parse_decimal(s: &str) -> usize {
    s.chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0usize, |acc, d| {
            acc.saturating_mul(10).saturating_add(d as usize)
        })
}
