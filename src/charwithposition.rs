// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::location::Location;

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct CharWithPosition {
    pub character: char,
    pub position: Location,
}

impl CharWithPosition {
    pub fn new(character: char, position: Location) -> Self {
        Self {
            character,
            position,
        }
    }
}

pub struct CharsWithPositionIter<I>
where
    I: Iterator<Item = char>,
{
    upstream: I,
    current_position: Location,
}

impl<I> CharsWithPositionIter<I>
where
    I: Iterator<Item = char>,
{
    pub fn new(upstream: I) -> Self {
        Self {
            upstream,
            current_position: Location::new_position(0, 0, 0),
        }
    }
}

impl<I> Iterator for CharsWithPositionIter<I>
where
    I: Iterator<Item = char>,
{
    type Item = CharWithPosition;

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.upstream.next()?;
        let last_position = self.current_position;

        self.current_position.index += 1;

        // free-spacing patterns may span several lines
        if c == '\n' {
            self.current_position.line += 1;
            self.current_position.column = 0;
        } else {
            self.current_position.column += 1;
        }

        Some(CharWithPosition::new(c, last_position))
    }
}

/// The pattern text as a random-access sequence of chars.
///
/// The scanner needs to look behind and far ahead (e.g. the closing
/// delimiter is located before scanning starts), so the chars are
/// collected up front rather than streamed.
#[derive(Debug, Clone)]
pub struct PatternSource {
    chars: Vec<CharWithPosition>,
    end_position: Location,
}

impl PatternSource {
    pub fn new(pattern: &str) -> Self {
        let chars: Vec<CharWithPosition> = CharsWithPositionIter::new(pattern.chars()).collect();

        let end_position = match chars.last() {
            Some(last) if last.character == '\n' => {
                Location::new_position(last.position.index + 1, last.position.line + 1, 0)
            }
            Some(last) => last.position.move_position_forward(),
            None => Location::new_position(0, 0, 0),
        };

        Self {
            chars,
            end_position,
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn char_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).map(|c| c.character)
    }

    pub fn char_at_equals(&self, index: usize, expected_char: char) -> bool {
        self.char_at(index) == Some(expected_char)
    }

    /// Checks whether the text starting at `index` begins with `s`.
    pub fn starts_with_at(&self, index: usize, s: &str) -> bool {
        let mut offset = index;
        for expected_char in s.chars() {
            if !self.char_at_equals(offset, expected_char) {
                return false;
            }
            offset += 1;
        }
        true
    }

    /// Index of the first `c` in `from..limit`.
    pub fn find_char(&self, from: usize, limit: usize, c: char) -> Option<usize> {
        let limit = limit.min(self.chars.len());
        (from..limit).find(|idx| self.chars[*idx].character == c)
    }

    /// Index of the last `c` in the whole text.
    pub fn rfind_char(&self, c: char) -> Option<usize> {
        self.chars.iter().rposition(|item| item.character == c)
    }

    /// Number of consecutive chars in `from..limit` satisfying `predicate`.
    pub fn count_while<P>(&self, from: usize, limit: usize, predicate: P) -> usize
    where
        P: Fn(char) -> bool,
    {
        let limit = limit.min(self.chars.len());
        (from..limit)
            .take_while(|idx| predicate(self.chars[*idx].character))
            .count()
    }

    pub fn substring(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        if start >= end {
            return String::new();
        }
        self.chars[start..end].iter().map(|c| c.character).collect()
    }

    pub fn chars_from(&self, start: usize, limit: usize) -> impl Iterator<Item = char> + '_ {
        let limit = limit.min(self.chars.len());
        self.chars[start.min(limit)..limit]
            .iter()
            .map(|c| c.character)
    }

    /// The range `start..start + length` with its line and column.
    pub fn location(&self, start: usize, length: usize) -> Location {
        let position = match self.chars.get(start) {
            Some(c) => c.position,
            None => self.end_position,
        };
        Location::from_position_and_length(&position, length)
    }
}
