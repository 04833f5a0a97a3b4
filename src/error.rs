// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use serde::Serialize;
use thiserror::Error;

use crate::location::Location;
use crate::token::TokenId;

/// A problem found in the pattern text.
///
/// These are advisory: the token carrying one is still a structurally
/// valid member of the chain and scanning continues past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenError {
    #[error("Unclosed group.")]
    GroupOpen,

    #[error("Unmatched closing parenthesis.")]
    GroupClose,

    #[error("Unclosed character set.")]
    SetOpen,

    #[error("The preceding token is not quantifiable.")]
    QuantTarg,

    #[error("A conditional group can only have one else branch.")]
    ExtraElse,

    #[error("Reference to a non-existent group.")]
    UnmatchedRef,

    #[error("Unrecognized unicode category or script.")]
    UnmatchedUnicode,

    #[error("Invalid POSIX character class.")]
    PosixCharClassBad,

    #[error("Not supported by the current dialect.")]
    NotSupported,

    #[error("Incomplete escape sequence.")]
    EscCharOpen,

    #[error("Invalid escape sequence.")]
    EscCharBad,

    #[error("Range values are in the wrong order.")]
    RangeRev,

    #[error("Quantifier minimum is greater than its maximum.")]
    QuantRev,

    #[error("Unescaped forward slash. This may cause issues if copying/pasting this expression into code.")]
    FwdSlash,
}

impl TokenError {
    /// The short tag used by highlighters to select a message or style.
    pub fn tag(&self) -> &'static str {
        match self {
            TokenError::GroupOpen => "groupopen",
            TokenError::GroupClose => "groupclose",
            TokenError::SetOpen => "setopen",
            TokenError::QuantTarg => "quanttarg",
            TokenError::ExtraElse => "extraelse",
            TokenError::UnmatchedRef => "unmatchedref",
            TokenError::UnmatchedUnicode => "unmatchedunicode",
            TokenError::PosixCharClassBad => "posixcharclassbad",
            TokenError::NotSupported => "notsupported",
            TokenError::EscCharOpen => "esccharopen",
            TokenError::EscCharBad => "esccharbad",
            TokenError::RangeRev => "rangerev",
            TokenError::QuantRev => "quantrev",
            TokenError::FwdSlash => "fwdslash",
        }
    }
}

/// A token error together with where it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub error: TokenError,
    pub token: TokenId,
    pub location: Location,
}

/// Errors caused by the caller rather than by the pattern text.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown dialect \"{0}\".")]
    UnknownDialect(String),

    #[error("Invalid profile overrides: {0}")]
    InvalidOverrides(#[source] serde_json::Error),

    #[error("Can not serialize the token chain: {0}")]
    Serialize(#[source] serde_json::Error),
}
