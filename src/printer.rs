// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::fmt::{Display, Write};

use crate::{
    lexer::Lexed,
    token::{Direction, Token, TokenClass, TokenValue},
};

impl Display for TokenClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Forward => f.write_str("forward"),
            Direction::Within => f.write_str("within"),
            Direction::Backward => f.write_str("backward"),
        }
    }
}

impl Display for TokenValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenValue::None => Ok(()),
            TokenValue::Code(code) => write!(f, "code={}", code),
            TokenValue::Group(info) => {
                write!(f, "depth={}", info.depth)?;
                if let Some(capture) = info.capture {
                    write!(f, " capture={}", capture)?;
                }
                if let Some(name) = &info.name {
                    write!(f, " name={}", name)?;
                }
                if let Some(test) = &info.test {
                    write!(f, " test={}", test.name)?;
                    if let Some(direction) = test.direction {
                        write!(f, " dir={}", direction)?;
                    }
                }
                Ok(())
            }
            TokenValue::Reference(info) => {
                write!(f, "name={}", info.name)?;
                if let Some(direction) = info.direction {
                    write!(f, " dir={}", direction)?;
                }
                Ok(())
            }
            TokenValue::Quantifier { min, max } => match max {
                Some(max) => write!(f, "min={} max={}", min, max),
                None => write!(f, "min={} max=inf", min),
            },
            TokenValue::Unicode { id } => write!(f, "unicode={}", id),
            TokenValue::Posix { name } => write!(f, "posix={}", name),
            TokenValue::Flag(c) => write!(f, "flag={}", c),
            TokenValue::Mode { enabled, disabled } => {
                write!(f, "mode=+{}-{}", enabled, disabled)
            }
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{} {}", self.start, self.end(), self.kind)?;

        if let Some(class) = self.class {
            write!(f, " ({})", class)?;
        }

        if self.value != TokenValue::None {
            write!(f, " {}", self.value)?;
        }

        if let Some(group) = self.group {
            write!(f, " group=#{}", group.index())?;
        }

        if !self.related.is_empty() {
            let ids: Vec<String> = self
                .related
                .iter()
                .map(|id| format!("#{}", id.index()))
                .collect();
            write!(f, " related=[{}]", ids.join(", "))?;
        }

        if let Some(err) = self.err {
            write!(f, " err={}", err.tag())?;
        }

        Ok(())
    }
}

/// Renders one line per token of the chain, e.g.
///
/// ```text
/// #0 "/" 0..1 open related=[#3]
/// #1 "a" 1..2 char code=97
/// #2 "*" 2..3 star (quant) min=0 max=inf related=[#1]
/// #3 "/" 3..4 close related=[#0]
/// ```
pub fn print_lexed(lexed: &Lexed) -> String {
    let mut output = String::new();

    for (id, token) in lexed.iter() {
        let text = lexed.text(id).unwrap_or_default();
        // writing to a String never fails
        let _ = writeln!(output, "#{} {:?} {}", id.index(), text, token);
    }

    output
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{lexer::parse, profile::Profile};

    #[test]
    fn test_print_lexed() {
        let lexed = parse("/a*/", &Profile::core());

        assert_eq!(
            lexed.debug_text(),
            "\
#0 \"/\" 0..1 open related=[#3]
#1 \"a\" 1..2 char code=97
#2 \"*\" 2..3 star (quant) min=0 max=inf related=[#1]
#3 \"/\" 3..4 close related=[#0]
"
        );
    }

    #[test]
    fn test_print_groups_and_errors() {
        let lexed = parse("/(?<n>x)\\k<n>{2,1}/", &Profile::core());
        let text = lexed.debug_text();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[1],
            "#1 \"(?<n>\" 1..6 namedgroup (group) depth=0 capture=1 name=n"
        );
        assert_eq!(
            lines[4],
            "#4 \"\\\\k<n>\" 8..13 namedref (ref) name=n dir=backward group=#1 related=[#1]"
        );
        assert_eq!(
            lines[5],
            "#5 \"{2,1}\" 13..18 quant (quant) min=2 max=1 related=[#4] err=quantrev"
        );
    }
}
