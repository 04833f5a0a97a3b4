// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::{
    error::TokenError,
    token::{TokenClass, TokenId, TokenKind, TokenValue},
};

use super::scanner::Scanner;

impl Scanner<'_> {
    pub(super) fn parse_set(&mut self, id: TokenId) {
        // [^...]  //
        // ^^______// also consume '^'
        // |_______// current char, validated

        let index = self.chain[id].start;
        let negative = self.body_char_equals(index + 1, '^');

        let token = &mut self.chain[id];
        token.class = Some(TokenClass::Set);
        if negative {
            token.kind = TokenKind::SetNot;
            token.length = 2;
        } else {
            token.kind = TokenKind::Set;
        }

        self.charset = Some(id);
    }

    pub(super) fn parse_set_close(&mut self, id: TokenId) {
        self.chain[id].kind = TokenKind::SetClose;

        if let Some(charset) = self.charset.take() {
            self.chain[id].open = Some(charset);
            self.chain[charset].close = Some(id);
        }
    }

    /// Length of the `[:name:]` or `[:^name:]` starting at `index`,
    /// only inside a charset of a profile listing POSIX classes.
    pub(super) fn posix_class_length(&self, index: usize) -> Option<usize> {
        // [:^alpha:]  //
        // ^         ^_// to here
        // |___________// current char

        if self.charset.is_none()
            || self.profile.posix_classes.is_empty()
            || !self.body_char_equals(index + 1, ':')
        {
            return None;
        }

        let mut offset = index + 2;
        if self.body_char_equals(offset, '^') {
            offset += 1;
        }
        offset += self.count_body_while(offset, |c| c.is_ascii_alphabetic());

        if self.body_starts_with(offset, ":]") {
            Some(offset + 2 - index)
        } else {
            None
        }
    }

    pub(super) fn parse_posix_class(&mut self, id: TokenId) {
        let index = self.chain[id].start;
        let Some(length) = self.posix_class_length(index) else {
            return;
        };

        let inner = self.body_substring(index + 2, index + length - 2);
        let name = inner.strip_prefix('^').unwrap_or(&inner).to_owned();
        let known = self.profile.is_posix_class(&name);

        let token = &mut self.chain[id];
        token.kind = TokenKind::PosixCharClass;
        token.class = Some(TokenClass::CharClass);
        token.length = length;
        token.value = TokenValue::Posix { name };

        if !known {
            token.err = Some(TokenError::PosixCharClassBad);
        }
    }

    /// Whether a `-` may start a range: the previous member must have a
    /// code and must not be the end of another range.
    pub(super) fn is_range_start(&self) -> bool {
        let Some(prev_token) = self.prev_token() else {
            return false;
        };

        prev_token.code().is_some()
            && matches!(
                prev_token.prev.and_then(|id| self.chain.get(id)),
                Some(token) if token.kind != TokenKind::Range
            )
    }

    /// Validates a range once its end member is known.
    ///
    /// An invalid range turns the `-` back into a literal char, a valid one
    /// links both members through their `proxy`.
    pub(super) fn validate_range(&mut self, range: TokenId) {
        // [a-z]  //
        //  ^^^___// end, the current token
        //  ||____// range
        //  |_____// start

        let (start, end) = {
            let token = &self.chain[range];
            (token.prev, token.next)
        };

        let codes = match (start, end) {
            (Some(start), Some(end)) => self.chain[start]
                .code()
                .zip(self.chain[end].code())
                .map(|codes| (start, end, codes)),
            _ => None,
        };

        match codes {
            Some((start, end, (start_code, end_code))) => {
                let token = &mut self.chain[range];
                token.class = Some(TokenClass::Set);
                token.related = vec![start, end];
                if start_code > end_code {
                    token.err = Some(TokenError::RangeRev);
                }

                self.chain[start].proxy = Some(range);
                self.chain[end].proxy = Some(range);
            }
            None => {
                self.parse_char(range, '-');
            }
        }
    }
}
