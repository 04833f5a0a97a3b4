// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

mod chain;
mod charwithposition;
mod error;
mod lexer;
mod location;
mod printer;
mod profile;
mod token;

pub mod tables;

pub use chain::{ChainIter, TokenChain};
pub use error::{Diagnostic, Error, TokenError};
pub use lexer::{parse, Lexed, Lexer};
pub use location::Location;
pub use profile::{
    ConfigOverrides, Dialect, FlagKind, FlagProbe, ModeKind, ModernEngine, NameSetOverride,
    Profile, ProfileConfig, ProfileOverrides,
};
pub use token::{
    Direction, GroupInfo, ReferenceInfo, Token, TokenClass, TokenId, TokenKind, TokenValue,
};
