// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::ops::{Index, IndexMut};

use serde::Serialize;

use crate::token::{Token, TokenId};

/// An arena of tokens linked into a sequence through `prev`/`next`.
///
/// Tokens are never removed from the arena. A token absorbed by its
/// neighbour is only unlinked from the sequence.
#[derive(Debug, PartialEq, Eq, Clone, Default, Serialize)]
pub struct TokenChain {
    tokens: Vec<Token>,
    head: Option<TokenId>,
    tail: Option<TokenId>,
}

impl TokenChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a token to the end of the sequence.
    pub fn push(&mut self, mut token: Token) -> TokenId {
        let id = TokenId(self.tokens.len());

        token.prev = self.tail;
        token.next = None;
        self.tokens.push(token);

        match self.tail {
            Some(tail) => self[tail].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);

        id
    }

    pub fn get(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(id.0)
    }

    pub fn get_mut(&mut self, id: TokenId) -> Option<&mut Token> {
        self.tokens.get_mut(id.0)
    }

    pub fn head(&self) -> Option<TokenId> {
        self.head
    }

    pub fn tail(&self) -> Option<TokenId> {
        self.tail
    }

    /// Number of tokens in the arena, including unlinked ones.
    pub fn arena_len(&self) -> usize {
        self.tokens.len()
    }

    pub fn iter(&self) -> ChainIter<'_> {
        ChainIter {
            chain: self,
            current: self.head,
        }
    }

    /// Merges the next token into `id`.
    ///
    /// The absorbed token is unlinked and every link that pointed to it
    /// is moved to `id`. Returns the id of the absorbed token.
    pub fn absorb_next(&mut self, id: TokenId) -> Option<TokenId> {
        let absorbed = self.tokens.get(id.0)?.next?;
        let (length, after) = {
            let token = &self[absorbed];
            (token.length, token.next)
        };

        {
            let token = &mut self[id];
            token.length += length;
            token.next = after;
        }

        match after {
            Some(after) => self[after].prev = Some(id),
            None => self.tail = Some(id),
        }

        {
            let token = &mut self[absorbed];
            token.prev = None;
            token.next = None;
        }

        self.retarget(absorbed, id);
        Some(absorbed)
    }

    fn retarget(&mut self, from: TokenId, to: TokenId) {
        let replace = |link: &mut Option<TokenId>| {
            if *link == Some(from) {
                *link = Some(to);
            }
        };

        for (idx, token) in self.tokens.iter_mut().enumerate() {
            if idx == from.0 {
                continue;
            }

            replace(&mut token.open);
            replace(&mut token.close);
            replace(&mut token.group);
            replace(&mut token.proxy);

            for item in token.related.iter_mut() {
                if *item == from {
                    *item = to;
                }
            }
        }

        // a token never relates to itself
        let token = &mut self[to];
        token.related.retain(|item| *item != to);
    }
}

impl Index<TokenId> for TokenChain {
    type Output = Token;

    fn index(&self, id: TokenId) -> &Self::Output {
        &self.tokens[id.0]
    }
}

impl IndexMut<TokenId> for TokenChain {
    fn index_mut(&mut self, id: TokenId) -> &mut Self::Output {
        &mut self.tokens[id.0]
    }
}

pub struct ChainIter<'a> {
    chain: &'a TokenChain,
    current: Option<TokenId>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = (TokenId, &'a Token);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let token = self.chain.get(id)?;
        self.current = token.next;
        Some((id, token))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::token::{Token, TokenId, TokenKind};

    use super::TokenChain;

    fn build(kinds: &[TokenKind]) -> TokenChain {
        let mut chain = TokenChain::new();
        for (idx, kind) in kinds.iter().enumerate() {
            chain.push(Token::new(idx, *kind));
        }
        chain
    }

    #[test]
    fn test_push_links() {
        let chain = build(&[TokenKind::Open, TokenKind::Char, TokenKind::Close]);

        assert_eq!(chain.head(), Some(TokenId(0)));
        assert_eq!(chain.tail(), Some(TokenId(2)));
        assert_eq!(chain[TokenId(0)].prev, None);
        assert_eq!(chain[TokenId(0)].next, Some(TokenId(1)));
        assert_eq!(chain[TokenId(1)].prev, Some(TokenId(0)));
        assert_eq!(chain[TokenId(2)].next, None);

        assert_eq!(
            chain.iter().map(|(_, t)| t.kind).collect::<Vec<_>>(),
            vec![TokenKind::Open, TokenKind::Char, TokenKind::Close]
        );
        assert!(TokenChain::new().iter().next().is_none());
    }

    #[test]
    fn test_absorb_next() {
        let mut chain = build(&[
            TokenKind::Open,
            TokenKind::Reference,
            TokenKind::Char,
            TokenKind::Star,
            TokenKind::Close,
        ]);
        chain[TokenId(1)].length = 3;
        chain[TokenId(2)].start = 4;
        chain[TokenId(3)].start = 5;
        chain[TokenId(3)].related = vec![TokenId(2)];

        assert_eq!(chain.absorb_next(TokenId(1)), Some(TokenId(2)));

        assert_eq!(chain[TokenId(1)].length, 4);
        assert_eq!(chain[TokenId(1)].next, Some(TokenId(3)));
        assert_eq!(chain[TokenId(3)].prev, Some(TokenId(1)));
        assert_eq!(chain[TokenId(3)].related, vec![TokenId(1)]);
        assert_eq!(chain[TokenId(2)].prev, None);
        assert_eq!(chain[TokenId(2)].next, None);

        assert_eq!(chain.arena_len(), 5);
        assert_eq!(
            chain.iter().map(|(id, _)| id.index()).collect::<Vec<_>>(),
            vec![0, 1, 3, 4]
        );
    }

    #[test]
    fn test_absorb_tail() {
        let mut chain = build(&[TokenKind::Reference, TokenKind::Char]);
        chain.absorb_next(TokenId(0));
        assert_eq!(chain.tail(), Some(TokenId(0)));
        assert_eq!(chain.absorb_next(TokenId(0)), None);
    }
}
