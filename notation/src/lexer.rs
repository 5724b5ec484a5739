use std::ops::Range;

use crate::error::ParseError;

// ---------------------------------------------------------------------------
// Token types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(f64),
    StringLit(String),
    True,
    False,
    Null,
    Undefined,

    Ident(String),
    Underscore, // _

    // Operators
    At,       // @
    Pipe,     // |
    DotDot,   // ..
    DotDotEq, // ..=
    Ellipsis, // ...
    PlusPlus, // ++
    Minus,
    Colon,
    Comma,

    // Grouping
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    HashBrace, // #{
    RBrace,
}

impl Token {
    /// How the token reads in error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number `{}`", n),
            Token::StringLit(s) => format!("string {:?}", s),
            Token::Ident(name) => format!("identifier `{}`", name),
            Token::True => "`true`".into(),
            Token::False => "`false`".into(),
            Token::Null => "`null`".into(),
            Token::Undefined => "`undefined`".into(),
            Token::Underscore => "`_`".into(),
            Token::At => "`@`".into(),
            Token::Pipe => "`|`".into(),
            Token::DotDot => "`..`".into(),
            Token::DotDotEq => "`..=`".into(),
            Token::Ellipsis => "`...`".into(),
            Token::PlusPlus => "`++`".into(),
            Token::Minus => "`-`".into(),
            Token::Colon => "`:`".into(),
            Token::Comma => "`,`".into(),
            Token::LParen => "`(`".into(),
            Token::RParen => "`)`".into(),
            Token::LBracket => "`[`".into(),
            Token::RBracket => "`]`".into(),
            Token::LBrace => "`{`".into(),
            Token::HashBrace => "`#{`".into(),
            Token::RBrace => "`}`".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: Range<usize>,
}

// ---------------------------------------------------------------------------
// Text tokenizer: raw text string → Token stream
// ---------------------------------------------------------------------------

pub fn tokenize(text: &str, file_id: usize) -> Result<Vec<Spanned>, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut tokens = Vec::new();
    let mut i = 0;

    // Map character indices to byte offsets within the text
    let byte_pos: Vec<usize> = {
        let mut bp = Vec::with_capacity(len + 1);
        let mut offset = 0;
        for c in &chars {
            bp.push(offset);
            offset += c.len_utf8();
        }
        bp.push(offset);
        bp
    };

    let at = |i: usize| chars.get(i).copied();

    while i < len {
        let c = chars[i];
        let start = i;
        let token = match c {
            ' ' | '\t' | '\n' | '\r' => {
                i += 1;
                continue;
            }

            '"' => {
                i += 1;
                let mut s = String::new();
                loop {
                    match at(i) {
                        None => {
                            return Err(ParseError::error(
                                "unterminated string literal",
                                byte_pos[start]..byte_pos[len],
                                file_id,
                            ));
                        }
                        Some('"') => {
                            i += 1;
                            break;
                        }
                        Some('\\') => {
                            let escaped = match at(i + 1) {
                                Some('n') => '\n',
                                Some('t') => '\t',
                                Some('"') => '"',
                                Some('\\') => '\\',
                                _ => {
                                    let end = byte_pos[(i + 2).min(len)];
                                    return Err(ParseError::error(
                                        "unknown escape sequence",
                                        byte_pos[i]..end,
                                        file_id,
                                    )
                                    .with_note("supported escapes are \\n, \\t, \\\" and \\\\"));
                                }
                            };
                            s.push(escaped);
                            i += 2;
                        }
                        Some(other) => {
                            s.push(other);
                            i += 1;
                        }
                    }
                }
                Token::StringLit(s)
            }

            '0'..='9' => {
                while at(i).is_some_and(|c| c.is_ascii_digit()) {
                    i += 1;
                }
                // A fraction needs a digit after the dot, so `1..5` stays a range.
                if at(i) == Some('.') && at(i + 1).is_some_and(|c| c.is_ascii_digit()) {
                    i += 1;
                    while at(i).is_some_and(|c| c.is_ascii_digit()) {
                        i += 1;
                    }
                }
                let num_str: String = chars[start..i].iter().collect();
                match num_str.parse::<f64>() {
                    Ok(n) => Token::Number(n),
                    Err(_) => {
                        return Err(ParseError::error(
                            format!("invalid number `{}`", num_str),
                            byte_pos[start]..byte_pos[i],
                            file_id,
                        ));
                    }
                }
            }

            'a'..='z' | 'A'..='Z' | '_' => {
                while at(i).is_some_and(|c| c.is_alphanumeric() || c == '_') {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                match ident.as_str() {
                    "_" => Token::Underscore,
                    "true" => Token::True,
                    "false" => Token::False,
                    "null" => Token::Null,
                    "undefined" => Token::Undefined,
                    _ => Token::Ident(ident),
                }
            }

            '.' => {
                if at(i + 1) != Some('.') {
                    return Err(ParseError::error(
                        "unexpected `.`",
                        byte_pos[i]..byte_pos[i + 1],
                        file_id,
                    )
                    .with_note("ranges are written `lo..hi` or `lo..=hi`, spreads `...rest`"));
                }
                match at(i + 2) {
                    Some('.') => {
                        i += 3;
                        Token::Ellipsis
                    }
                    Some('=') => {
                        i += 3;
                        Token::DotDotEq
                    }
                    _ => {
                        i += 2;
                        Token::DotDot
                    }
                }
            }

            '+' if at(i + 1) == Some('+') => {
                i += 2;
                Token::PlusPlus
            }

            '#' if at(i + 1) == Some('{') => {
                i += 2;
                Token::HashBrace
            }

            _ => {
                let single = match c {
                    '@' => Token::At,
                    '|' => Token::Pipe,
                    '-' => Token::Minus,
                    ':' => Token::Colon,
                    ',' => Token::Comma,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    '{' => Token::LBrace,
                    '}' => Token::RBrace,
                    _ => {
                        return Err(ParseError::error(
                            format!("unexpected character `{}`", c),
                            byte_pos[i]..byte_pos[i + 1],
                            file_id,
                        ));
                    }
                };
                i += 1;
                single
            }
        };
        tokens.push(Spanned {
            token,
            span: byte_pos[start]..byte_pos[i],
        });
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(text: &str) -> Vec<Token> {
        tokenize(text, 0)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn ranges_and_fractions() {
        assert_eq!(
            kinds("1..5 1.5..=2"),
            vec![
                Token::Number(1.0),
                Token::DotDot,
                Token::Number(5.0),
                Token::Number(1.5),
                Token::DotDotEq,
                Token::Number(2.0),
            ]
        );
    }

    #[test]
    fn spreads_and_map_braces() {
        assert_eq!(
            kinds("#{...rest}"),
            vec![
                Token::HashBrace,
                Token::Ellipsis,
                Token::Ident("rest".into()),
                Token::RBrace,
            ]
        );
    }

    #[test]
    fn keywords_and_underscores() {
        assert_eq!(
            kinds("_ _x true null undefined"),
            vec![
                Token::Underscore,
                Token::Ident("_x".into()),
                Token::True,
                Token::Null,
                Token::Undefined,
            ]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds(r#""a\"b\n""#),
            vec![Token::StringLit("a\"b\n".into())]
        );
    }

    #[test]
    fn spans_are_byte_offsets() {
        let tokens = tokenize("\"é\" @ x", 0).unwrap();
        assert_eq!(tokens[0].span, 0..4);
        assert_eq!(tokens[1].span, 5..6);
        assert_eq!(tokens[2].span, 7..8);
    }

    #[test]
    fn errors_carry_spans() {
        let err = tokenize("[1, \"open", 0).unwrap_err();
        assert_eq!(err.message, "unterminated string literal");
        assert_eq!(err.span, 4..9);

        let err = tokenize("1 $ 2", 0).unwrap_err();
        assert_eq!(err.span, 2..3);
    }
}
