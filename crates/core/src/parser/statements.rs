use super::{describe, Parser};
use crate::ast::{Assignment, Block, Qualifiers, Specifier, Statement};
use crate::error::ConvertError;
use crate::lexer::Token;

impl<'a> Parser<'a> {
    // -- Statements ---------------------------------------------

    /// `statement := assignment | block`
    ///
    /// A statement is a block exactly when it opens with a prim specifier
    /// keyword; no property type may be spelled `def`, `class` or `over`.
    pub(super) fn parse_statement(&mut self) -> Result<Statement, ConvertError> {
        match self.peek().clone() {
            Token::Word(w) if Specifier::from_keyword(&w).is_some() => {
                Ok(Statement::Block(self.parse_block()?))
            }
            Token::Word(_) => Ok(Statement::Assignment(self.parse_assignment()?)),
            other => Err(self.err(format!("expected statement, got {}", describe(&other)))),
        }
    }

    /// `assignment := ["prepend"] ["custom"] ["uniform"] type ["[]"] NAME ["=" value]`
    fn parse_assignment(&mut self) -> Result<Assignment, ConvertError> {
        let prov = self.cur_prov();
        let mut qualifiers = Qualifiers::default();
        if self.is_word("prepend") {
            self.advance();
            qualifiers.prepend = true;
        }
        if self.is_word("custom") {
            self.advance();
            qualifiers.custom = true;
        }
        if self.is_word("uniform") {
            self.advance();
            qualifiers.uniform = true;
        }

        let type_name = self.take_word()?;
        if Specifier::from_keyword(&type_name).is_some() {
            return Err(ConvertError::syntax(
                &self.filename,
                prov.line,
                prov.column,
                format!("prim specifier '{}' cannot follow a qualifier", type_name),
            ));
        }

        let mut is_array = false;
        if self.peek() == &Token::LBracket {
            self.advance();
            if self.peek() != &Token::RBracket {
                return Err(self.err(format!(
                    "expected ']' to close array type '{}[]', got {}",
                    type_name,
                    describe(self.peek())
                )));
            }
            self.advance();
            is_array = true;
        }

        let name = self.take_word()?;
        let value = if self.peek() == &Token::Eq {
            self.advance();
            Some(self.parse_value()?)
        } else {
            None
        };

        Ok(Assignment {
            qualifiers,
            type_name,
            is_array,
            name,
            value,
            prov,
        })
    }

    /// `block := DEFTYPE NAME? STRING metadata? "{" statement* "}"`
    fn parse_block(&mut self) -> Result<Block, ConvertError> {
        let prov = self.cur_prov();
        let keyword = self.take_word()?;
        let specifier = Specifier::from_keyword(&keyword)
            .ok_or_else(|| self.err(format!("unknown prim specifier '{}'", keyword)))?;

        let type_name = if matches!(self.peek(), Token::Word(_)) {
            Some(self.take_word()?)
        } else {
            None
        };

        let name = match self.peek().clone() {
            Token::Str(s) => {
                self.advance();
                s
            }
            other => {
                return Err(self.err(format!(
                    "expected prim name string, got {}",
                    describe(&other)
                )))
            }
        };

        let metadata = if self.peek() == &Token::LParen {
            self.parse_metadata()?
        } else {
            Vec::new()
        };

        self.expect(Token::LBrace)?;
        let mut body = Vec::new();
        loop {
            match self.peek() {
                Token::RBrace => break,
                Token::Eof => {
                    return Err(self.err(format!(
                        "unterminated block \"{}\" opened at line {}",
                        name, prov.line
                    )))
                }
                _ => body.push(self.parse_statement()?),
            }
        }
        self.expect(Token::RBrace)?;

        Ok(Block {
            specifier,
            type_name,
            name,
            metadata,
            body,
            prov,
        })
    }
}
