use super::{describe, Parser};
use crate::ast::{MetaEntry, RawValue};
use crate::error::ConvertError;
use crate::lexer::Token;

impl<'a> Parser<'a> {
    // -- Value parsing ------------------------------------------

    /// `value := STRING | NUMBER | REFERENCE | "true" | "false"
    ///         | "[" value-list? "]" | "(" value-list? ")"`
    pub(super) fn parse_value(&mut self) -> Result<RawValue, ConvertError> {
        match self.peek().clone() {
            Token::Str(s) => {
                self.advance();
                Ok(RawValue::Str(s))
            }
            Token::Number(n) => {
                self.advance();
                Ok(RawValue::Number(n))
            }
            Token::Reference(r) => {
                self.advance();
                Ok(RawValue::Reference(r))
            }
            Token::Word(w) if w == "true" => {
                self.advance();
                Ok(RawValue::Bool(true))
            }
            Token::Word(w) if w == "false" => {
                self.advance();
                Ok(RawValue::Bool(false))
            }
            Token::LBracket => self.parse_array(Token::RBracket, true),
            Token::LParen => self.parse_array(Token::RParen, false),
            other => Err(self.err(format!("expected value, got {}", describe(&other)))),
        }
    }

    /// Comma-separated values up to `close`. Bracketed lists tolerate one
    /// trailing comma; tuples do not.
    fn parse_array(
        &mut self,
        close: Token,
        trailing_comma: bool,
    ) -> Result<RawValue, ConvertError> {
        self.advance(); // opening delimiter
        let mut items = Vec::new();
        if self.peek() == &close {
            self.advance();
            return Ok(RawValue::Array(items));
        }
        loop {
            items.push(self.parse_value()?);
            match self.peek().clone() {
                Token::Comma => {
                    self.advance();
                    if trailing_comma && self.peek() == &close {
                        self.advance();
                        break;
                    }
                }
                t if t == close => {
                    self.advance();
                    break;
                }
                other => {
                    return Err(self.err(format!(
                        "expected ',' or {} in array, got {}",
                        describe(&close),
                        describe(&other)
                    )))
                }
            }
        }
        Ok(RawValue::Array(items))
    }

    // -- Metadata -----------------------------------------------

    /// `metadata := "(" (STRING | ["prepend"] NAME "=" value)+ ")"`
    pub(super) fn parse_metadata(&mut self) -> Result<Vec<MetaEntry>, ConvertError> {
        self.expect(Token::LParen)?;
        let mut entries = Vec::new();
        loop {
            match self.peek().clone() {
                Token::RParen => break,
                Token::Str(s) => {
                    self.advance();
                    entries.push(MetaEntry::Doc(s));
                }
                Token::Word(_) => {
                    let prov = self.cur_prov();
                    let prepend =
                        self.is_word("prepend") && matches!(self.peek_nth(1), Token::Word(_));
                    if prepend {
                        self.advance();
                    }
                    let key = self.take_word()?;
                    self.expect(Token::Eq)?;
                    let value = self.parse_value()?;
                    entries.push(MetaEntry::Field {
                        prepend,
                        key,
                        value,
                        prov,
                    });
                }
                Token::Eof => return Err(self.err("unterminated metadata list")),
                other => {
                    return Err(self.err(format!(
                        "expected metadata entry, got {}",
                        describe(&other)
                    )))
                }
            }
        }
        if entries.is_empty() {
            return Err(self.err("empty metadata list"));
        }
        self.expect(Token::RParen)?;
        Ok(entries)
    }
}
