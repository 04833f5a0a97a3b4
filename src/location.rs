// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use serde::Serialize;

/// A position or a range within the pattern text.
///
/// `index` counts chars, not bytes, so it lines up with `Token::start`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct Location {
    pub index: usize,  // The character index in the text
    pub line: usize,   // The line number (0-based index)
    pub column: usize, // The column number (0-based index)
    pub length: usize, // The length of the text range; 0 for a single position
}

impl Location {
    /// Create a new `Location` representing a single position.
    pub fn new_position(index: usize, line: usize, column: usize) -> Self {
        Self {
            index,
            line,
            column,
            length: 0,
        }
    }

    /// Create a new `Location` representing a range of text.
    pub fn new_range(index: usize, line: usize, column: usize, length: usize) -> Self {
        Self {
            index,
            line,
            column,
            length,
        }
    }

    /// Create a range `Location` from a starting position and a length.
    pub fn from_position_and_length(position: &Location, length: usize) -> Self {
        Self::new_range(position.index, position.line, position.column, length)
    }

    /// The char index just past the end of the range.
    pub fn end(&self) -> usize {
        self.index + self.length
    }

    /// Move the position forward by one character on the same line.
    pub fn move_position_forward(&self) -> Self {
        Self {
            index: self.index + 1,
            column: self.column + 1,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Location;

    #[test]
    fn test_range_from_position() {
        let position = Location::new_position(7, 1, 3);
        let range = Location::from_position_and_length(&position, 4);

        assert_eq!(range, Location::new_range(7, 1, 3, 4));
        assert_eq!(range.end(), 11);
        assert_eq!(position.end(), 7);
    }

    #[test]
    fn test_move_position_forward() {
        let position = Location::new_position(2, 0, 2);
        assert_eq!(
            position.move_position_forward(),
            Location::new_position(3, 0, 3)
        );
    }
}
