// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

// Group openers, in priority order:
//
// - `(` capturing group
// - `(?:` non-capturing group
// - `(?>` atomic group
// - `(?#...)` comment
// - `(?R)`, `(?0)` recursion
// - `(?P=name)` named reference
// - `(?(DEFINE)`
// - `(?=`, `(?!`, `(?<=`, `(?<!` lookarounds, or the condition of a conditional
// - `(?'name'`, `(?P<name>`, `(?<name>` named groups
// - `(?1)`, `(?-1)`, `(?+1)`, `(?&name)`, `(?P>name)` subroutines
// - `(?(1)`, `(?(name)`, `(?(<name>)`, `(?('name')`, `(?(R)` conditional groups
// - `(?(?=` conditional header
// - `(?i-x)` inline modes, `(?i-x:` scoped modes
// - anything else is a capturing group

use crate::{
    error::TokenError,
    token::{GroupInfo, ReferenceInfo, TokenClass, TokenId, TokenKind, TokenValue},
};

use super::scanner::{OpenGroup, Scanner};

const MODE_CHARS: &str = "ixsmJUn";

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// The leading `\w+` of `s`.
fn leading_name(s: &str) -> Option<&str> {
    let end = s
        .char_indices()
        .find(|(_, c)| !is_word_char(*c))
        .map_or(s.len(), |(idx, _)| idx);

    if end == 0 {
        None
    } else {
        Some(&s[..end])
    }
}

/// Matches `{prefix}name{suffix}` at the start of `s`, returning the name
/// and the number of chars matched.
fn enclosed_name<'a>(s: &'a str, prefix: &str, suffix: char) -> Option<(&'a str, usize)> {
    let rest = s.strip_prefix(prefix)?;
    let name = leading_name(rest)?;
    if !rest[name.len()..].starts_with(suffix) {
        return None;
    }

    let length = prefix.chars().count() + name.chars().count() + 1;
    Some((name, length))
}

/// Matches `[-+]?\d\d?` followed by `suffix` at the start of `s`.
fn numeric_name(s: &str, suffix: char) -> Option<(&str, usize)> {
    let sign = usize::from(s.starts_with(['-', '+']));
    let digits = s[sign..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .count()
        .min(2);

    if digits == 0 || !s[sign + digits..].starts_with(suffix) {
        return None;
    }

    Some((&s[..sign + digits], sign + digits + 1))
}

/// The test of a conditional group, e.g. the `1)` of `(?(1)`, and whether
/// it refers to a group.
fn conditional_test(s: &str) -> Option<(&str, usize, bool)> {
    // (?(R)  (?(R1)  (?(R&name)
    if let Some(rest) = s.strip_prefix('R') {
        let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        let end = if digits > 0 {
            1 + digits
        } else if let Some(name) = rest.strip_prefix('&').and_then(leading_name) {
            2 + name.len()
        } else {
            1
        };

        if s[end..].starts_with(')') {
            let test = &s[..end];
            return Some((test, test.chars().count() + 1, false));
        }
    }

    numeric_name(s, ')')
        .or_else(|| {
            enclosed_name(s, "<", '>')
                .or_else(|| enclosed_name(s, "'", '\''))
                .filter(|(_, length)| s.chars().nth(*length) == Some(')'))
                .map(|(name, length)| (name, length + 1))
        })
        .or_else(|| enclosed_name(s, "", ')'))
        .map(|(name, length)| (name, length, true))
}

impl Scanner<'_> {
    pub(super) fn parse_group(&mut self, id: TokenId) {
        // (?xxxx  //
        // ^^^_____// rest
        // ||______// validated
        // |_______// current char

        let index = self.chain[id].start;

        if !self.body_char_equals(index + 1, '?') {
            self.open_group(id, TokenKind::Group, TokenClass::Group, 1, true, None);
            return;
        }

        let rest = self.body_rest(index + 2);

        if rest.starts_with(':') {
            self.open_group(id, TokenKind::NonCapGroup, TokenClass::Group, 3, false, None);
        } else if rest.starts_with('>') {
            self.open_group(id, TokenKind::Atomic, TokenClass::Group, 3, false, None);
        } else if let Some(length) = rest
            .strip_prefix('#')
            .and_then(|comment| comment.chars().position(|c| c == ')'))
        {
            // consume '(?#', the comment text and ')'
            let token = &mut self.chain[id];
            token.kind = TokenKind::Comment;
            token.class = Some(TokenClass::Comment);
            token.length = length + 4;
        } else if rest.starts_with("R)") || rest.starts_with("0)") {
            let name = &rest[..1];
            self.set_reference(id, TokenKind::Recursion, name, 4);
        } else if let Some((name, length)) = ["P=", "p="]
            .iter()
            .find_map(|prefix| enclosed_name(&rest, prefix, ')'))
        {
            self.set_reference(id, TokenKind::NamedRef, name, 2 + length);
        } else if rest.starts_with("(DEFINE)") {
            self.open_group(id, TokenKind::Define, TokenClass::Group, 10, false, None);
        } else if let Some(lookaround) = ["=", "!", "<=", "<!"]
            .iter()
            .find(|prefix| rest.starts_with(**prefix))
        {
            self.parse_lookaround(id, lookaround);
        } else if let Some((name, length)) = enclosed_name(&rest, "'", '\'')
            .or_else(|| enclosed_name(&rest, "P<", '>'))
            .or_else(|| enclosed_name(&rest, "<", '>'))
        {
            let name = name.to_owned();
            self.open_group(
                id,
                TokenKind::NamedGroup,
                TokenClass::Group,
                2 + length,
                true,
                Some(name),
            );
        } else if let Some((name, length)) = numeric_name(&rest, ')')
            .or_else(|| enclosed_name(&rest, "&", ')'))
            .or_else(|| enclosed_name(&rest, "P>", ')'))
        {
            self.set_reference(id, TokenKind::Subroutine, name, 2 + length);
        } else if let Some((name, length, refers_to_group)) =
            rest.strip_prefix('(').and_then(conditional_test)
        {
            self.parse_conditional_group(id, name, 3 + length, refers_to_group);
        } else if ["(?=", "(?!", "(?<=", "(?<!"]
            .iter()
            .any(|prefix| rest.starts_with(prefix))
        {
            // the condition is lexed as the next token
            self.open_group(id, TokenKind::Conditional, TokenClass::Special, 2, false, None);
        } else if !self.parse_mode(id, &rest) {
            // a `(?` matching nothing, left for the engine to reject
            self.open_group(id, TokenKind::Group, TokenClass::Group, 1, true, None);
        }
    }

    fn open_group(
        &mut self,
        id: TokenId,
        kind: TokenKind,
        class: TokenClass,
        length: usize,
        capture: bool,
        name: Option<String>,
    ) {
        let mut info = GroupInfo::new(self.groups.len());

        if capture {
            self.capture_groups.push(id);
            info.capture = Some(self.capture_groups.len());
        }

        if let Some(name) = &name {
            // a later group of the same name wins
            if !name.chars().all(|c| c.is_ascii_digit()) {
                self.named_groups.insert(name.clone(), id);
            }
        }
        info.name = name;

        let token = &mut self.chain[id];
        token.kind = kind;
        token.class = Some(class);
        token.length = length;
        token.value = TokenValue::Group(info);

        self.groups.push(OpenGroup {
            id,
            has_else: false,
        });
    }

    fn parse_lookaround(&mut self, id: TokenId, lookaround: &str) {
        let length = lookaround.len() + 2;

        match self.prev.filter(|prev| self.chain[*prev].kind == TokenKind::Conditional) {
            Some(conditional) => {
                self.open_group(id, TokenKind::Condition, TokenClass::Special, length, false, None);
                self.chain[id].proxy = Some(conditional);
                self.chain[conditional].related = vec![id];
            }
            None => {
                let kind = match lookaround {
                    "=" => TokenKind::PosLookahead,
                    "!" => TokenKind::NegLookahead,
                    "<=" => TokenKind::PosLookbehind,
                    _ => TokenKind::NegLookbehind,
                };
                self.open_group(id, kind, TokenClass::Lookaround, length, false, None);
            }
        }
    }

    fn parse_conditional_group(
        &mut self,
        id: TokenId,
        name: &str,
        length: usize,
        refers_to_group: bool,
    ) {
        // (?(name)  //
        // ^       ^_// to here
        // |_________// current char

        let relative_index = self.capture_groups.len();
        self.open_group(
            id,
            TokenKind::ConditionalGroup,
            TokenClass::Special,
            length,
            false,
            None,
        );

        if let TokenValue::Group(info) = &mut self.chain[id].value {
            info.test = Some(ReferenceInfo::new(name, relative_index));
        }

        // recursion tests refer to the whole pattern
        if refers_to_group {
            self.refs.push(id);
        }
    }

    /// `(?i-x)` and `(?i-x:`, returns false when `rest` is not a mode.
    fn parse_mode(&mut self, id: TokenId, rest: &str) -> bool {
        let letters = rest
            .chars()
            .take_while(|c| *c == '-' || MODE_CHARS.contains(*c))
            .count();

        // `(?-)` toggles nothing
        if !rest[..letters].chars().any(|c| c != '-') {
            return false;
        }

        let (kind, class) = match rest[letters..].chars().next() {
            Some(')') => (TokenKind::Mode, TokenClass::Special),
            Some(':') => (TokenKind::ModeGroup, TokenClass::Group),
            _ => return false,
        };

        let modes = &rest[..letters];
        let (enabled, disabled) = modes.split_once('-').unwrap_or((modes, ""));
        let supported = modes
            .chars()
            .filter(|c| *c != '-')
            .all(|c| self.profile.modes.contains_key(&c));

        if kind == TokenKind::ModeGroup {
            self.open_group(id, kind, class, letters + 3, false, None);
        }

        let token = &mut self.chain[id];
        token.kind = kind;
        token.class = Some(class);
        token.length = letters + 3;
        token.value = TokenValue::Mode {
            enabled: enabled.to_owned(),
            disabled: disabled.replace('-', ""),
        };

        if !supported {
            token.err = Some(TokenError::NotSupported);
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{
        error::TokenError,
        lexer::{parse, Lexed},
        profile::Profile,
        token::{Token, TokenClass, TokenId, TokenKind, TokenValue},
    };

    fn tokens(lexed: &Lexed) -> Vec<&Token> {
        lexed.iter().map(|(_, token)| token).collect()
    }

    fn kinds(lexed: &Lexed) -> Vec<TokenKind> {
        lexed.iter().map(|(_, token)| token.kind).collect()
    }

    #[test]
    fn test_capturing_groups() {
        let lexed = parse("/(a(b))(?:c)/", &Profile::core());
        let tokens = tokens(&lexed);

        assert_eq!(tokens[1].kind, TokenKind::Group);
        assert_eq!(tokens[1].capture_index(), Some(1));
        assert_eq!(tokens[1].depth(), Some(0));
        assert_eq!(tokens[1].close, Some(TokenId(6)));

        assert_eq!(tokens[3].capture_index(), Some(2));
        assert_eq!(tokens[3].depth(), Some(1));

        assert_eq!(tokens[5].kind, TokenKind::GroupClose);
        assert_eq!(tokens[5].open, Some(TokenId(3)));
        assert_eq!(tokens[5].class, Some(TokenClass::Group));

        assert_eq!(tokens[7].kind, TokenKind::NonCapGroup);
        assert_eq!(tokens[7].length, 3);
        assert_eq!(tokens[7].capture_index(), None);

        assert_eq!(lexed.capture_groups(), &[TokenId(1), TokenId(3)]);
        assert!(lexed.errors().is_empty());
    }

    #[test]
    fn test_named_group() {
        let lexed = parse("/(?P<name>a)/", &Profile::core());
        let tokens = tokens(&lexed);

        assert_eq!(tokens[1].kind, TokenKind::NamedGroup);
        assert_eq!(tokens[1].length, 9);
        assert_eq!(tokens[1].name(), Some("name"));
        assert_eq!(tokens[1].capture_index(), Some(1));
        assert_eq!(lexed.named_groups().get("name"), Some(&TokenId(1)));
        assert!(lexed.errors().is_empty());

        for pattern in ["/(?<name>a)/", "/(?'name'a)/"] {
            let lexed = parse(pattern, &Profile::core());
            assert_eq!(kinds(&lexed)[1], TokenKind::NamedGroup, "{}", pattern);
            assert_eq!(self::tokens(&lexed)[1].length, 8, "{}", pattern);
        }
    }

    #[test]
    fn test_named_group_not_supported_by_javascript() {
        let core = parse("/(?P<name>a)/", &Profile::core());
        let js = parse("/(?P<name>a)/", &Profile::javascript());

        // same structure
        assert_eq!(kinds(&core), kinds(&js));
        assert_eq!(
            tokens(&js)[1].err,
            Some(TokenError::NotSupported)
        );
        assert_eq!(js.errors().len(), 1);
    }

    #[test]
    fn test_lookarounds() {
        let lexed = parse("/(?=a)(?!b)(?<=c)(?<!d)/", &Profile::core());
        let openers: Vec<_> = tokens(&lexed)
            .into_iter()
            .filter(|token| token.class == Some(TokenClass::Lookaround) && token.open.is_none())
            .map(|token| (token.kind, token.length))
            .collect();

        assert_eq!(
            openers,
            vec![
                (TokenKind::PosLookahead, 3),
                (TokenKind::NegLookahead, 3),
                (TokenKind::PosLookbehind, 4),
                (TokenKind::NegLookbehind, 4),
            ]
        );
    }

    #[test]
    fn test_atomic_comment_define() {
        let lexed = parse("/(?>a)(?#note)(?(DEFINE)b)/", &Profile::core());
        let tokens = tokens(&lexed);

        assert_eq!(tokens[1].kind, TokenKind::Atomic);
        assert_eq!(tokens[4].kind, TokenKind::Comment);
        assert_eq!(tokens[4].class, Some(TokenClass::Comment));
        assert_eq!(tokens[4].length, 8);
        assert_eq!(tokens[5].kind, TokenKind::Define);
        assert_eq!(tokens[5].length, 10);
        assert!(lexed.errors().is_empty());
    }

    #[test]
    fn test_recursion_and_subroutines() {
        let lexed = parse("/(?<n>a)(?R)(?0)(?1)(?-1)(?&n)(?P>n)(?P=n)/", &Profile::core());
        let tokens = tokens(&lexed);

        assert_eq!(tokens[4].kind, TokenKind::Recursion);
        assert_eq!(tokens[4].class, Some(TokenClass::Ref));
        assert_eq!(tokens[4].length, 4);
        assert_eq!(tokens[4].group, None);
        assert_eq!(tokens[5].kind, TokenKind::Recursion);

        for token in &tokens[6..10] {
            assert_eq!(token.kind, TokenKind::Subroutine);
            assert_eq!(token.group, Some(TokenId(1)));
        }
        assert_eq!(tokens[10].kind, TokenKind::NamedRef);
        assert_eq!(tokens[10].length, 6);
        assert_eq!(tokens[10].group, Some(TokenId(1)));
        assert!(lexed.errors().is_empty());
    }

    #[test]
    fn test_conditional_with_condition() {
        let lexed = parse("/(?(?=a)b|c|d)/", &Profile::core());
        let tokens = tokens(&lexed);

        assert_eq!(
            kinds(&lexed),
            vec![
                TokenKind::Open,
                TokenKind::Conditional,
                TokenKind::Condition,
                TokenKind::Char,
                TokenKind::GroupClose,
                TokenKind::Char,
                TokenKind::ConditionalElse,
                TokenKind::Char,
                TokenKind::ConditionalElse,
                TokenKind::Char,
                TokenKind::GroupClose,
                TokenKind::Close
            ]
        );

        assert_eq!(tokens[1].length, 2);
        assert_eq!(tokens[1].related, vec![TokenId(2)]);
        assert_eq!(tokens[1].close, Some(TokenId(10)));
        assert_eq!(tokens[2].proxy, Some(TokenId(1)));
        assert_eq!(tokens[2].class, Some(TokenClass::Special));
        assert_eq!(tokens[4].class, Some(TokenClass::Special));
        assert_eq!(tokens[6].related, vec![TokenId(1)]);
        assert_eq!(tokens[6].err, None);
        assert_eq!(tokens[8].err, Some(TokenError::ExtraElse));
    }

    #[test]
    fn test_quantified_condition() {
        let lexed = parse("/(?(?=a)*b)/", &Profile::core());
        assert_eq!(
            lexed.errors().iter().map(|d| d.error).collect::<Vec<_>>(),
            vec![TokenError::QuantTarg]
        );
    }

    #[test]
    fn test_conditional_groups() {
        let lexed = parse("/(a)(?<n>b)(?(1)c|d)(?(<n>)e)(?(R)f)(?(-1)g)/", &Profile::core());
        let tokens = tokens(&lexed);

        let first = tokens[7];
        assert_eq!(first.kind, TokenKind::ConditionalGroup);
        assert_eq!(first.class, Some(TokenClass::Special));
        assert_eq!(first.length, 5);
        assert_eq!(first.name(), Some("1"));
        assert_eq!(first.group, Some(TokenId(1)));
        assert_eq!(tokens[9].kind, TokenKind::ConditionalElse);

        let named = tokens[12];
        assert_eq!(named.kind, TokenKind::ConditionalGroup);
        assert_eq!(named.length, 7);
        assert_eq!(named.group, Some(TokenId(4)));

        let recursion = tokens[15];
        assert_eq!(recursion.kind, TokenKind::ConditionalGroup);
        assert_eq!(recursion.group, None);

        let relative = tokens[18];
        assert_eq!(relative.group, Some(TokenId(4)));

        assert!(lexed.errors().is_empty());
    }

    #[test]
    fn test_modes() {
        let lexed = parse("/(?i-x)a(?s:b)/", &Profile::core());
        let tokens = tokens(&lexed);

        assert_eq!(tokens[1].kind, TokenKind::Mode);
        assert_eq!(tokens[1].class, Some(TokenClass::Special));
        assert_eq!(tokens[1].length, 6);
        assert_eq!(
            tokens[1].value,
            TokenValue::Mode {
                enabled: "i".to_owned(),
                disabled: "x".to_owned()
            }
        );

        assert_eq!(tokens[3].kind, TokenKind::ModeGroup);
        assert_eq!(tokens[3].length, 4);
        assert_eq!(tokens[3].close, Some(TokenId(5)));
        assert!(lexed.errors().is_empty());

        let lexed = parse("/(?i)a/", &Profile::javascript());
        assert_eq!(
            lexed.errors().iter().map(|d| d.error).collect::<Vec<_>>(),
            vec![TokenError::NotSupported]
        );
    }

    #[test]
    fn test_mode_without_letters() {
        let lexed = parse("/(?-)/", &Profile::core());
        let tokens = tokens(&lexed);

        assert_eq!(tokens[1].kind, TokenKind::Group);
        assert_eq!(tokens[1].length, 1);
        assert_eq!(tokens[2].kind, TokenKind::Opt);
        assert_eq!(tokens[2].err, Some(TokenError::QuantTarg));
        assert_eq!(tokens[3].kind, TokenKind::Char);
        assert_eq!(tokens[4].kind, TokenKind::GroupClose);

        let lexed = parse("/(?i-)/", &Profile::core());
        assert_eq!(
            kinds(&lexed),
            vec![TokenKind::Open, TokenKind::Mode, TokenKind::Close]
        );
        assert!(lexed.errors().is_empty());
    }

    #[test]
    fn test_unknown_group_falls_back_to_capture() {
        let lexed = parse("/(?z)/", &Profile::core());
        let tokens = tokens(&lexed);

        assert_eq!(tokens[1].kind, TokenKind::Group);
        assert_eq!(tokens[1].length, 1);
        assert_eq!(tokens[1].capture_index(), Some(1));
        assert_eq!(tokens[2].kind, TokenKind::Opt);
        assert_eq!(tokens[2].err, Some(TokenError::QuantTarg));
    }
}
