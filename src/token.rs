// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::TokenError;

/// Index of a token within its `TokenChain` arena.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy, Serialize)]
#[serde(transparent)]
pub struct TokenId(pub(crate) usize);

impl TokenId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(
    Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    // The opening delimiter, e.g. the first `/`.
    Open,
    // The closing delimiter.
    Close,
    // A char of the flag region after the closing delimiter.
    Flag,

    Char,
    Dot,
    Alt,
    // `$`
    Eof,
    // `^`
    Bof,

    //
    // Quantifiers
    //

    // `?`
    Opt,
    // `+`
    Plus,
    // `*`
    Star,
    // `{m}`, `{m,}` and `{m,n}`
    Quant,
    // `?` following a quantifier.
    Lazy,
    // `+` following a quantifier.
    Possessive,

    //
    // Character sets
    //
    Set,
    SetNot,
    SetClose,
    Range,
    // `[:alpha:]`, `[:^alpha:]`
    PosixCharClass,
    UnicodeCat,
    NotUnicodeCat,
    UnicodeScript,
    NotUnicodeScript,

    //
    // Escapes
    //

    // `\0`, `\12`, `\377`
    EscOctal,
    // `\o{377}`
    EscOctalO,
    // `\uFFFF`
    EscUnicode,
    // `\u{1F600}`
    EscUnicodeU,
    // `\x{1F600}`
    EscUnicodeX,
    // `\Q...\E`
    EscSequence,
    // `\xFF`
    EscHexadecimal,
    // `\cA`
    EscControlChar,
    EscChar,

    Word,
    NotWord,
    Digit,
    NotDigit,
    Whitespace,
    NotWhitespace,
    WordBoundary,
    NotWordBoundary,
    // `\A`
    Bos,
    // `\Z`
    Eos,
    // `\z`
    AbsEos,
    // `\G`
    PrevMatchEnd,
    // `\K`
    Keep,
    HWhitespace,
    NotHWhitespace,
    NotLineBreak,
    UnicodeGrapheme,

    //
    // Groups
    //
    Group,
    GroupClose,
    NonCapGroup,
    NamedGroup,
    Atomic,
    Define,
    PosLookahead,
    NegLookahead,
    PosLookbehind,
    NegLookbehind,
    // `(?i-x:...)`
    ModeGroup,

    //
    // References
    //

    // `\1`
    Reference,
    // `\k<name>`, `\g{name}`, `(?P=name)`
    NamedRef,
    // `\g{-1}`, `\g1`
    NumRef,
    // `(?R)`, `(?0)`, `\g<0>`
    Recursion,
    // `(?1)`, `(?-1)`, `(?&name)`, `(?P>name)`
    Subroutine,
    // `\g<-1>`, `\g'1'`
    NumSubroutine,
    // `\g<name>`, `\g'name'`
    NamedSubroutine,

    //
    // Conditionals and others
    //

    // `(?(?=if)then|else)`
    Conditional,
    // The lookaround that follows a conditional header.
    Condition,
    // The `|` inside a conditional.
    ConditionalElse,
    // `(?(1)then|else)`, `(?(name)then|else)`
    ConditionalGroup,
    // `(?i-x)`
    Mode,
    // `(?#...)`
    Comment,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Open => "open",
            TokenKind::Close => "close",
            TokenKind::Flag => "flag",
            TokenKind::Char => "char",
            TokenKind::Dot => "dot",
            TokenKind::Alt => "alt",
            TokenKind::Eof => "eof",
            TokenKind::Bof => "bof",
            TokenKind::Opt => "opt",
            TokenKind::Plus => "plus",
            TokenKind::Star => "star",
            TokenKind::Quant => "quant",
            TokenKind::Lazy => "lazy",
            TokenKind::Possessive => "possessive",
            TokenKind::Set => "set",
            TokenKind::SetNot => "setnot",
            TokenKind::SetClose => "setclose",
            TokenKind::Range => "range",
            TokenKind::PosixCharClass => "posixcharclass",
            TokenKind::UnicodeCat => "unicodecat",
            TokenKind::NotUnicodeCat => "notunicodecat",
            TokenKind::UnicodeScript => "unicodescript",
            TokenKind::NotUnicodeScript => "notunicodescript",
            TokenKind::EscOctal => "escoctal",
            TokenKind::EscOctalO => "escoctalo",
            TokenKind::EscUnicode => "escunicode",
            TokenKind::EscUnicodeU => "escunicodeu",
            TokenKind::EscUnicodeX => "escunicodex",
            TokenKind::EscSequence => "escsequence",
            TokenKind::EscHexadecimal => "eschexadecimal",
            TokenKind::EscControlChar => "esccontrolchar",
            TokenKind::EscChar => "escchar",
            TokenKind::Word => "word",
            TokenKind::NotWord => "notword",
            TokenKind::Digit => "digit",
            TokenKind::NotDigit => "notdigit",
            TokenKind::Whitespace => "whitespace",
            TokenKind::NotWhitespace => "notwhitespace",
            TokenKind::WordBoundary => "wordboundary",
            TokenKind::NotWordBoundary => "notwordboundary",
            TokenKind::Bos => "bos",
            TokenKind::Eos => "eos",
            TokenKind::AbsEos => "abseos",
            TokenKind::PrevMatchEnd => "prevmatchend",
            TokenKind::Keep => "keep",
            TokenKind::HWhitespace => "hwhitespace",
            TokenKind::NotHWhitespace => "nothwhitespace",
            TokenKind::NotLineBreak => "notlinebreak",
            TokenKind::UnicodeGrapheme => "unicodegrapheme",
            TokenKind::Group => "group",
            TokenKind::GroupClose => "groupclose",
            TokenKind::NonCapGroup => "noncapgroup",
            TokenKind::NamedGroup => "namedgroup",
            TokenKind::Atomic => "atomic",
            TokenKind::Define => "define",
            TokenKind::PosLookahead => "poslookahead",
            TokenKind::NegLookahead => "neglookahead",
            TokenKind::PosLookbehind => "poslookbehind",
            TokenKind::NegLookbehind => "neglookbehind",
            TokenKind::ModeGroup => "modegroup",
            TokenKind::Reference => "reference",
            TokenKind::NamedRef => "namedref",
            TokenKind::NumRef => "numref",
            TokenKind::Recursion => "recursion",
            TokenKind::Subroutine => "subroutine",
            TokenKind::NumSubroutine => "numsubroutine",
            TokenKind::NamedSubroutine => "namedsubroutine",
            TokenKind::Conditional => "conditional",
            TokenKind::Condition => "condition",
            TokenKind::ConditionalElse => "conditionalelse",
            TokenKind::ConditionalGroup => "conditionalgroup",
            TokenKind::Mode => "mode",
            TokenKind::Comment => "comment",
        }
    }

    /// Whether the token opens a construct that a `)` closes.
    pub fn is_group_opener(&self) -> bool {
        matches!(
            self,
            TokenKind::Group
                | TokenKind::NonCapGroup
                | TokenKind::NamedGroup
                | TokenKind::Atomic
                | TokenKind::Define
                | TokenKind::PosLookahead
                | TokenKind::NegLookahead
                | TokenKind::PosLookbehind
                | TokenKind::NegLookbehind
                | TokenKind::ModeGroup
                | TokenKind::Conditional
                | TokenKind::Condition
                | TokenKind::ConditionalGroup
        )
    }

    pub fn is_conditional(&self) -> bool {
        matches!(self, TokenKind::Conditional | TokenKind::ConditionalGroup)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The coarse category of a token, used for styling.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenClass {
    Quant,
    Esc,
    Anchor,
    CharClass,
    Ref,
    Group,
    Set,
    Special,
    Lookaround,
    Comment,
}

impl TokenClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenClass::Quant => "quant",
            TokenClass::Esc => "esc",
            TokenClass::Anchor => "anchor",
            TokenClass::CharClass => "charclass",
            TokenClass::Ref => "ref",
            TokenClass::Group => "group",
            TokenClass::Set => "set",
            TokenClass::Special => "special",
            TokenClass::Lookaround => "lookaround",
            TokenClass::Comment => "comment",
        }
    }
}

/// Where a reference sits relative to the group it resolves to.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    // The reference comes before the group.
    Forward,
    // The reference is inside the group.
    Within,
    // The reference follows the closed group.
    Backward,
}

impl Direction {
    pub fn offset(&self) -> i32 {
        match self {
            Direction::Forward => 1,
            Direction::Within => 0,
            Direction::Backward => -1,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct ReferenceInfo {
    /// The identifier as written, e.g. `1`, `-1`, `+2` or `name`.
    pub name: String,

    /// The number of capture groups opened before the reference.
    pub relative_index: usize,

    pub direction: Option<Direction>,
}

impl ReferenceInfo {
    pub fn new(name: &str, relative_index: usize) -> Self {
        Self {
            name: name.to_owned(),
            relative_index,
            direction: None,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct GroupInfo {
    /// Number of enclosing groups.
    pub depth: usize,

    /// The 1-based capture number, `None` for non-capturing constructs.
    pub capture: Option<usize>,

    pub name: Option<String>,

    /// The test of a conditional group, e.g. the `1` of `(?(1)...)`.
    pub test: Option<ReferenceInfo>,
}

impl GroupInfo {
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            capture: None,
            name: None,
            test: None,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenValue {
    None,
    Code(u32),
    Group(GroupInfo),
    Reference(ReferenceInfo),
    Quantifier {
        min: usize,
        // `None` for unbounded
        max: Option<usize>,
    },
    Unicode {
        id: String,
    },
    Posix {
        name: String,
    },
    Flag(char),
    Mode {
        enabled: String,
        disabled: String,
    },
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct Token {
    pub start: usize,
    pub length: usize,
    pub kind: TokenKind,
    pub class: Option<TokenClass>,

    pub prev: Option<TokenId>,
    pub next: Option<TokenId>,

    pub open: Option<TokenId>,
    pub close: Option<TokenId>,
    pub related: Vec<TokenId>,
    pub group: Option<TokenId>,
    pub proxy: Option<TokenId>,

    pub value: TokenValue,
    pub err: Option<TokenError>,
}

impl Token {
    pub fn new(start: usize, kind: TokenKind) -> Self {
        Self {
            start,
            length: 1,
            kind,
            class: None,
            prev: None,
            next: None,
            open: None,
            close: None,
            related: vec![],
            group: None,
            proxy: None,
            value: TokenValue::None,
            err: None,
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn code(&self) -> Option<u32> {
        match &self.value {
            TokenValue::Code(code) => Some(*code),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Reference(info) => Some(&info.name),
            TokenValue::Group(info) => info
                .name
                .as_deref()
                .or(info.test.as_ref().map(|test| test.name.as_str())),
            TokenValue::Posix { name } => Some(name),
            _ => None,
        }
    }

    pub fn unicode_id(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Unicode { id } => Some(id),
            _ => None,
        }
    }

    pub fn relative_index(&self) -> Option<usize> {
        self.reference().map(|info| info.relative_index)
    }

    pub fn direction(&self) -> Option<Direction> {
        self.reference().and_then(|info| info.direction)
    }

    pub fn min(&self) -> Option<usize> {
        match &self.value {
            TokenValue::Quantifier { min, .. } => Some(*min),
            _ => None,
        }
    }

    /// The upper bound of a quantifier, `Some(None)` when unbounded.
    pub fn max(&self) -> Option<Option<usize>> {
        match &self.value {
            TokenValue::Quantifier { max, .. } => Some(*max),
            _ => None,
        }
    }

    pub fn capture_index(&self) -> Option<usize> {
        match &self.value {
            TokenValue::Group(info) => info.capture,
            _ => None,
        }
    }

    pub fn depth(&self) -> Option<usize> {
        match &self.value {
            TokenValue::Group(info) => Some(info.depth),
            _ => None,
        }
    }

    /// The reference carried by the token, including the test of a
    /// conditional group.
    pub fn reference(&self) -> Option<&ReferenceInfo> {
        match &self.value {
            TokenValue::Reference(info) => Some(info),
            TokenValue::Group(GroupInfo {
                test: Some(info), ..
            }) => Some(info),
            _ => None,
        }
    }

    pub fn reference_mut(&mut self) -> Option<&mut ReferenceInfo> {
        match &mut self.value {
            TokenValue::Reference(info) => Some(info),
            TokenValue::Group(GroupInfo {
                test: Some(info), ..
            }) => Some(info),
            _ => None,
        }
    }

    /// Sets the error unless the token already carries one.
    pub fn set_err_if_none(&mut self, err: TokenError) {
        if self.err.is_none() {
            self.err = Some(err);
        }
    }
}
