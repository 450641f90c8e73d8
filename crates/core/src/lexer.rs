use crate::error::ConvertError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifiers and keywords (`def`, `custom`, `true`, ...); the parser tells them apart
    Word(String),
    /// Quoted string literal (content without quotes, escapes resolved)
    Str(String),
    /// Numeric literal, kept as written; lowering decides integer vs real
    Number(String),
    /// Path reference including its `<` `>` delimiters
    Reference(String),
    // Punctuation
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Eq,
    // End of input
    Eof,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
    pub column: u32,
}

/// Relationship declarations are not part of the supported grammar.
static CUSTOM_REL: Lazy<Regex> = Lazy::new(|| Regex::new(r"custom rel [\w:]+").unwrap());

/// Blank out `custom rel <name>` declarations before tokenizing.
///
/// The match is replaced by spaces of the same width so that line and
/// column positions reported for the rest of the file stay accurate.
pub fn strip_unsupported(src: &str) -> Cow<'_, str> {
    CUSTOM_REL.replace_all(src, |caps: &regex::Captures| {
        " ".repeat(caps[0].chars().count())
    })
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == ':' || c == '.'
}

pub fn lex(src: &str, filename: &str) -> Result<Vec<Spanned>, ConvertError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;
    let mut line: u32 = 1;
    let mut line_start = 0usize;

    while pos < chars.len() {
        let c = chars[pos];

        // Line comment (also covers the `#usda 1.0` header)
        if c == '#' {
            while pos < chars.len() && chars[pos] != '\n' {
                pos += 1;
            }
            continue;
        }

        // Whitespace
        if c.is_whitespace() {
            if c == '\n' {
                line += 1;
                line_start = pos + 1;
            }
            pos += 1;
            continue;
        }

        let tok_line = line;
        let tok_col = (pos - line_start + 1) as u32;
        let push = |tokens: &mut Vec<Spanned>, token: Token| {
            tokens.push(Spanned {
                token,
                line: tok_line,
                column: tok_col,
            });
        };

        // String literal
        if c == '"' {
            pos += 1;
            let mut s = String::new();
            loop {
                if pos >= chars.len() || chars[pos] == '\n' {
                    return Err(ConvertError::syntax(
                        filename,
                        tok_line,
                        tok_col,
                        "unterminated string literal",
                    ));
                }
                let sc = chars[pos];
                if sc == '"' {
                    pos += 1;
                    break;
                }
                if sc == '\\' {
                    pos += 1;
                    if pos >= chars.len() {
                        return Err(ConvertError::syntax(
                            filename,
                            tok_line,
                            tok_col,
                            "unterminated escape in string",
                        ));
                    }
                    match chars[pos] {
                        '"' => s.push('"'),
                        '\\' => s.push('\\'),
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        other => {
                            s.push('\\');
                            s.push(other);
                        }
                    }
                    pos += 1;
                    continue;
                }
                s.push(sc);
                pos += 1;
            }
            push(&mut tokens, Token::Str(s));
            continue;
        }

        // Path reference
        if c == '<' {
            let start = pos;
            pos += 1;
            while pos < chars.len() && chars[pos] != '>' {
                if chars[pos] == '\n' {
                    break;
                }
                pos += 1;
            }
            if pos >= chars.len() || chars[pos] != '>' {
                return Err(ConvertError::syntax(
                    filename,
                    tok_line,
                    tok_col,
                    "unterminated path reference",
                ));
            }
            if pos == start + 1 {
                return Err(ConvertError::syntax(
                    filename,
                    tok_line,
                    tok_col,
                    "empty path reference '<>'",
                ));
            }
            pos += 1; // consume '>'
            let s: String = chars[start..pos].iter().collect();
            push(&mut tokens, Token::Reference(s));
            continue;
        }

        // Number: optional sign, digits, optional fraction, optional exponent
        let signed = (c == '-' || c == '+')
            && pos + 1 < chars.len()
            && chars[pos + 1].is_ascii_digit();
        if c.is_ascii_digit() || signed {
            let start = pos;
            if signed {
                pos += 1;
            }
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            if pos + 1 < chars.len() && chars[pos] == '.' && chars[pos + 1].is_ascii_digit() {
                pos += 1; // consume '.'
                while pos < chars.len() && chars[pos].is_ascii_digit() {
                    pos += 1;
                }
            }
            if pos < chars.len() && (chars[pos] == 'e' || chars[pos] == 'E') {
                let mut exp = pos + 1;
                if exp < chars.len() && (chars[exp] == '-' || chars[exp] == '+') {
                    exp += 1;
                }
                if exp < chars.len() && chars[exp].is_ascii_digit() {
                    pos = exp;
                    while pos < chars.len() && chars[pos].is_ascii_digit() {
                        pos += 1;
                    }
                } else {
                    return Err(ConvertError::syntax(
                        filename,
                        tok_line,
                        tok_col,
                        "malformed exponent in numeric literal",
                    ));
                }
            }
            let s: String = chars[start..pos].iter().collect();
            push(&mut tokens, Token::Number(s));
            continue;
        }

        // Punctuation
        let punct = match c {
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ',' => Some(Token::Comma),
            '=' => Some(Token::Eq),
            _ => None,
        };
        if let Some(token) = punct {
            push(&mut tokens, token);
            pos += 1;
            continue;
        }

        // Identifier / keyword
        if is_name_start(c) {
            let start = pos;
            while pos < chars.len() && is_name_continue(chars[pos]) {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().collect();
            push(&mut tokens, Token::Word(word));
            continue;
        }

        return Err(ConvertError::syntax(
            filename,
            tok_line,
            tok_col,
            format!("unexpected character '{}'", c),
        ));
    }

    tokens.push(Spanned {
        token: Token::Eof,
        line,
        column: (pos - line_start + 1) as u32,
    });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;

    fn kinds(src: &str) -> Vec<Token> {
        lex(src, "t.usda")
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn header_comment_and_whitespace_are_discarded() {
        let toks = kinds("#usda 1.0\n  # a comment\n def");
        assert_eq!(toks, vec![Token::Word("def".into()), Token::Eof]);
    }

    #[test]
    fn names_keep_namespace_separators() {
        let toks = kinds("outputs:surface.connect inputs:diffuseColor");
        assert_eq!(
            toks,
            vec![
                Token::Word("outputs:surface.connect".into()),
                Token::Word("inputs:diffuseColor".into()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn numbers_are_kept_as_written() {
        let toks = kinds("42 -1.5e2 +3 0.25 1E5");
        assert_eq!(
            toks,
            vec![
                Token::Number("42".into()),
                Token::Number("-1.5e2".into()),
                Token::Number("+3".into()),
                Token::Number("0.25".into()),
                Token::Number("1E5".into()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn reference_keeps_delimiters() {
        let toks = kinds("inherits = </World/ClassA>");
        assert_eq!(
            toks,
            vec![
                Token::Word("inherits".into()),
                Token::Eq,
                Token::Reference("</World/ClassA>".into()),
                Token::Eof
            ]
        );
    }

    #[test]
    fn string_escapes_are_resolved() {
        let toks = kinds(r#""say \"hi\"""#);
        assert_eq!(toks, vec![Token::Str("say \"hi\"".into()), Token::Eof]);
    }

    #[test]
    fn positions_are_one_based() {
        let toks = lex("def\n  \"Body\"", "t.usda").unwrap();
        assert_eq!((toks[0].line, toks[0].column), (1, 1));
        assert_eq!((toks[1].line, toks[1].column), (2, 3));
    }

    #[test]
    fn unterminated_string_is_a_syntax_error() {
        let err = lex("def \"Body\n", "t.usda").unwrap_err();
        assert_eq!(err.stage, Stage::Syntax);
        assert_eq!((err.line, err.column), (1, 5));
        assert!(err.message.contains("unterminated string"));
    }

    #[test]
    fn unterminated_reference_is_a_syntax_error() {
        let err = lex("inherits = </A", "t.usda").unwrap_err();
        assert!(err.message.contains("unterminated path reference"));
    }

    #[test]
    fn unexpected_character_is_reported() {
        let err = lex("asset a = @foo.usd@", "t.usda").unwrap_err();
        assert_eq!(err.message, "unexpected character '@'");
        assert_eq!(err.column, 11);
    }

    #[test]
    fn strip_unsupported_preserves_columns() {
        let src = "custom rel material:binding\nint x = 1";
        let stripped = strip_unsupported(src);
        assert_eq!(stripped.len(), src.len());
        assert!(!stripped.contains("rel"));
        let toks = lex(&stripped, "t.usda").unwrap();
        assert_eq!((toks[0].line, toks[0].column), (2, 1));
    }

    #[test]
    fn strip_unsupported_leaves_other_text_borrowed() {
        assert!(matches!(strip_unsupported("def \"A\" {}"), Cow::Borrowed(_)));
    }
}
