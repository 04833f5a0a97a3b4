// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use pretty_assertions::assert_eq;
use regex_tokenlex::{
    parse, Dialect, Direction, Error, FlagKind, Lexed, Lexer, Profile, ProfileOverrides, Token,
    TokenClass, TokenError, TokenKind,
};

fn tokens(lexed: &Lexed) -> Vec<&Token> {
    lexed.iter().map(|(_, token)| token).collect()
}

fn kinds(lexed: &Lexed) -> Vec<TokenKind> {
    lexed.iter().map(|(_, token)| token.kind).collect()
}

fn error_tags(lexed: &Lexed) -> Vec<&'static str> {
    lexed.errors().iter().map(|d| d.error.tag()).collect()
}

#[test]
fn test_backreference_resolves_backward() {
    let lexed = parse("/(a)\\1/", &Profile::core());

    assert_eq!(
        kinds(&lexed),
        vec![
            TokenKind::Open,
            TokenKind::Group,
            TokenKind::Char,
            TokenKind::GroupClose,
            TokenKind::Reference,
            TokenKind::Close
        ]
    );

    let reference = tokens(&lexed)[4];
    assert_eq!(reference.group, lexed.capture_groups().first().copied());
    assert_eq!(reference.direction().map(|d| d.offset()), Some(-1));
    assert!(lexed.errors().is_empty());
}

#[test]
fn test_eight_is_a_literal() {
    let lexed = parse("/\\8/", &Profile::core());
    let token = tokens(&lexed)[1];

    assert_eq!(token.kind, TokenKind::EscChar);
    assert_eq!(token.code(), Some(56));
    assert!(lexed.errors().is_empty());
}

#[test]
fn test_ranges() {
    let lexed = parse("/[a-z]/", &Profile::core());
    let range = tokens(&lexed)[3];
    assert_eq!(range.kind, TokenKind::Range);
    assert_eq!(range.related.len(), 2);
    assert!(lexed.errors().is_empty());

    let lexed = parse("/[z-a]/", &Profile::core());
    assert_eq!(error_tags(&lexed), vec!["rangerev"]);
}

#[test]
fn test_quantifier_without_target() {
    let lexed = parse("/a**/", &Profile::core());
    assert_eq!(error_tags(&lexed), vec!["quanttarg"]);
    assert_eq!(
        Some(lexed.errors()[0].token),
        lexed.iter().nth(3).map(|(id, _)| id)
    );
}

#[test]
fn test_named_group_gating() {
    let core = parse("/(?P<name>a)/", &Profile::core());
    let js = parse("/(?P<name>a)/", &Profile::javascript());

    assert_eq!(kinds(&core), kinds(&js));
    assert!(core.errors().is_empty());
    assert_eq!(error_tags(&js), vec!["notsupported"]);
    assert_eq!(js.named_groups(), core.named_groups());
}

#[test]
fn test_idempotence() {
    let profile = Profile::core();
    for pattern in [
        "/(?<y>\\d{4})-(?<m>\\d\\d)\\k<y>/gi",
        "/[^\\w\\s-]+?|(?(?=x)a|b)/",
        "/\\123\\p{Greek}(?#c)/",
        "(unterminated[",
    ] {
        assert_eq!(parse(pattern, &profile), parse(pattern, &profile), "{}", pattern);
    }
}

#[test]
fn test_realistic_pattern() {
    let lexed = parse(
        "/^(?<user>[\\w.+-]+)@(?<host>[a-z\\d-]+(?:\\.[a-z]{2,})+)$/i",
        &Profile::core(),
    );

    assert!(lexed.errors().is_empty());
    assert_eq!(lexed.capture_groups().len(), 2);
    assert_eq!(
        lexed.named_groups().keys().collect::<Vec<_>>(),
        vec!["host", "user"]
    );

    let quantifiers: Vec<_> = tokens(&lexed)
        .into_iter()
        .filter(|token| token.class == Some(TokenClass::Quant))
        .map(|token| (token.kind, token.min(), token.max()))
        .collect();
    assert_eq!(
        quantifiers,
        vec![
            (TokenKind::Plus, Some(1), Some(None)),
            (TokenKind::Plus, Some(1), Some(None)),
            (TokenKind::Quant, Some(2), Some(None)),
            (TokenKind::Plus, Some(1), Some(None)),
        ]
    );
}

#[test]
fn test_dialect_names() {
    assert_eq!("js".parse::<Dialect>().unwrap(), Dialect::JavaScript);
    assert_eq!("PCRE".parse::<Dialect>().unwrap(), Dialect::Core);
    assert!(matches!(
        "perl".parse::<Dialect>(),
        Err(Error::UnknownDialect(name)) if name == "perl"
    ));

    assert_eq!(
        Profile::from_dialect(Dialect::JavaScript),
        Profile::javascript()
    );
}

#[test]
fn test_legacy_javascript_engine() {
    let legacy = Profile::javascript_with_probe(&|flag: char| matches!(flag, 'g' | 'i' | 'm'));

    assert_eq!(legacy.flag('u'), None);
    assert_eq!(legacy.flag('g'), Some(FlagKind::Global));
    assert!(!legacy.is_enabled(TokenKind::EscUnicodeU));

    let lexed = parse("/a/gs", &legacy);
    assert_eq!(error_tags(&lexed), vec!["notsupported"]);
    assert_eq!(tokens(&lexed)[4].kind, TokenKind::Flag);

    // without the unicode flag the braces are not part of the escape
    let lexed = parse("/\\u{41}/u", &legacy);
    assert_eq!(tokens(&lexed)[1].kind, TokenKind::EscChar);
    assert_eq!(tokens(&lexed)[1].code(), Some('u' as u32));
}

#[test]
fn test_custom_dialect_from_json() {
    let overrides = ProfileOverrides::from_json(
        r#"{
            "name": "strict",
            "delimiter": "~",
            "disable_tokens": ["lazy"],
            "config": { "forward_ref": false }
        }"#,
    )
    .unwrap();
    let profile = Profile::core().apply(&overrides);

    let lexed = parse("~\\1a+?(b)/~", &profile);
    assert_eq!(
        lexed
            .errors()
            .iter()
            .map(|d| (d.error, d.location.index))
            .collect::<Vec<_>>(),
        vec![(TokenError::NotSupported, 1), (TokenError::NotSupported, 5)]
    );

    // the slash is a plain char under this delimiter
    let slash = tokens(&lexed)[8];
    assert_eq!(slash.code(), Some('/' as u32));
    assert_eq!(slash.err, None);
}

#[test]
fn test_conditional_in_javascript_keeps_structure() {
    let lexed = parse("/(?(?=a)b|c)/", &Profile::javascript());
    let tokens = tokens(&lexed);

    assert_eq!(tokens[1].kind, TokenKind::Conditional);
    assert_eq!(tokens[2].kind, TokenKind::Condition);
    assert_eq!(tokens[6].kind, TokenKind::ConditionalElse);
    assert!(lexed
        .errors()
        .iter()
        .all(|d| d.error == TokenError::NotSupported));
    assert_eq!(lexed.errors().len(), 3);
}

#[test]
fn test_lexer_reuses_last_result() {
    let mut lexer = Lexer::new(Profile::core());

    let first: *const Lexed = lexer.parse("/(a)\\1/");
    let second: *const Lexed = lexer.parse("/(a)\\1/");
    assert_eq!(first, second);

    let lexed = lexer.parse("/\\1(a)/");
    assert_eq!(
        lexed.iter().nth(1).and_then(|(_, t)| t.direction()),
        Some(Direction::Forward)
    );
}

#[test]
fn test_debug_text_and_json() {
    let lexed = parse("/[a-c]/", &Profile::core());

    let text = lexed.debug_text();
    assert_eq!(text.lines().count(), 7);
    assert!(text.lines().nth(3).unwrap().contains("range (set)"));

    let json = lexed.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["chain"]["tokens"][3]["related"], serde_json::json!([2, 4]));
}
