//! Module with the position type and functions.
//! A position is a struct that contains a line and column number.

use std::fmt;

/// A position in the source text.
/// The line and column numbers are 1-based.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// The line number of the position.
    pub line: usize,
    /// The column number of the position.
    pub column: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(line: usize, column: usize) -> Self {
        debug_assert!(line > 0, "line number must be greater than 0");
        debug_assert!(column > 0, "column number must be greater than 0");
        Self { line, column }
    }

    /// Get the line number of the position.
    #[inline]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Get the column number of the position.
    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line: {}, column: {}", self.line, self.column)
    }
}

/// Returns the line and column of the given byte offset in the source text.
/// Offsets past the end of the source map to the position one past the last character.
/// Error values carry byte offsets only; callers that want to render a pointer into the
/// original text resolve them with this function.
pub fn position_at(source: &str, offset: usize) -> Position {
    let mut line = 1;
    let mut column = 1;
    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    Position::new(line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position() {
        let pos = Position::new(1, 1);
        assert_eq!(pos.line(), 1);
        assert_eq!(pos.column(), 1);
        assert_eq!(format!("{}", pos), "line: 1, column: 1");
    }

    #[test]
    fn test_position_at() {
        let source = "ab\ncd\ne";
        assert_eq!(position_at(source, 0), Position::new(1, 1));
        assert_eq!(position_at(source, 1), Position::new(1, 2));
        assert_eq!(position_at(source, 3), Position::new(2, 1));
        assert_eq!(position_at(source, 6), Position::new(3, 1));
        assert_eq!(position_at(source, 100), Position::new(3, 2));
    }
}
