/// Recursive-descent parser from tokens to the USDA parse tree.
/// Every node carries the position of its first token.
/// No lowering or normalization is done here -- that is the passes' job.
use crate::error::ConvertError;
use crate::lexer::{Spanned, Token};

mod statements;
mod values;

pub use crate::ast::{
    Assignment, Block, Layer, MetaEntry, Provenance, Qualifiers, RawValue, Specifier, Statement,
};

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    filename: String,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned], filename: &str) -> Self {
        Parser {
            tokens,
            pos: 0,
            filename: filename.to_owned(),
        }
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    /// Look `n` tokens past the current one without consuming anything.
    fn peek_nth(&self, n: usize) -> &Token {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)].token
    }

    fn cur_prov(&self) -> Provenance {
        let s = self.cur();
        Provenance {
            line: s.line,
            column: s.column,
        }
    }

    fn advance(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, expected: Token) -> Result<(), ConvertError> {
        if self.peek() == &expected {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!(
                "expected {}, got {}",
                describe(&expected),
                describe(self.peek())
            )))
        }
    }

    fn err(&self, msg: impl Into<String>) -> ConvertError {
        let s = self.cur();
        ConvertError::syntax(&self.filename, s.line, s.column, msg)
    }

    fn is_word(&self, w: &str) -> bool {
        matches!(self.peek(), Token::Word(x) if x == w)
    }

    fn take_word(&mut self) -> Result<String, ConvertError> {
        if let Token::Word(w) = self.peek().clone() {
            self.advance();
            Ok(w)
        } else {
            Err(self.err(format!("expected identifier, got {}", describe(self.peek()))))
        }
    }

    // -- Entry point --------------------------------------------

    /// `start := metadata? statement*`
    fn parse_layer(&mut self) -> Result<Layer, ConvertError> {
        let mut layer = Layer::default();
        if self.peek() == &Token::LParen {
            layer.metadata = self.parse_metadata()?;
        }
        while self.peek() != &Token::Eof {
            layer.statements.push(self.parse_statement()?);
        }
        Ok(layer)
    }
}

/// Human-readable token description for error messages.
fn describe(token: &Token) -> String {
    match token {
        Token::Word(w) => format!("'{}'", w),
        Token::Str(s) => format!("string \"{}\"", s),
        Token::Number(n) => format!("number {}", n),
        Token::Reference(r) => format!("reference {}", r),
        Token::LBrace => "'{'".to_owned(),
        Token::RBrace => "'}'".to_owned(),
        Token::LBracket => "'['".to_owned(),
        Token::RBracket => "']'".to_owned(),
        Token::LParen => "'('".to_owned(),
        Token::RParen => "')'".to_owned(),
        Token::Comma => "','".to_owned(),
        Token::Eq => "'='".to_owned(),
        Token::Eof => "end of input".to_owned(),
    }
}

pub fn parse(tokens: &[Spanned], filename: &str) -> Result<Layer, ConvertError> {
    let mut p = Parser::new(tokens, filename);
    p.parse_layer()
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;
    use crate::lexer;

    fn parse_src(src: &str) -> Result<Layer, ConvertError> {
        let tokens = lexer::lex(src, "test.usda")?;
        parse(&tokens, "test.usda")
    }

    fn only_block(layer: &Layer) -> &Block {
        match layer.statements.as_slice() {
            [Statement::Block(b)] => b,
            other => panic!("expected a single block, got {:?}", other),
        }
    }

    #[test]
    fn layer_metadata_is_optional() {
        let layer = parse_src("#usda 1.0\ndef Xform \"World\" {}").unwrap();
        assert!(layer.metadata.is_empty());
        assert_eq!(layer.statements.len(), 1);

        let layer = parse_src(
            "#usda 1.0\n(\n    \"exported\"\n    defaultPrim = \"World\"\n    upAxis = \"Z\"\n)\n",
        )
        .unwrap();
        assert_eq!(layer.metadata.len(), 3);
        assert!(layer.statements.is_empty());
    }

    #[test]
    fn block_with_type_metadata_and_body() {
        let layer = parse_src(
            r#"def Mesh "Body" (inherits = </ClassA>) {
                int[] faceVertexIndices = [0, 1, 2]
                custom point3f[] points = [(0,0,0), (1,0,0), (0,1,0)]
            }"#,
        )
        .unwrap();
        let b = only_block(&layer);
        assert_eq!(b.specifier, Specifier::Def);
        assert_eq!(b.type_name.as_deref(), Some("Mesh"));
        assert_eq!(b.name, "Body");
        assert_eq!(b.prov, Provenance { line: 1, column: 1 });
        match &b.metadata[..] {
            [MetaEntry::Field { key, value, .. }] => {
                assert_eq!(key, "inherits");
                assert_eq!(value, &RawValue::Reference("</ClassA>".into()));
            }
            other => panic!("unexpected metadata {:?}", other),
        }
        assert_eq!(b.body.len(), 2);
        match &b.body[1] {
            Statement::Assignment(a) => {
                assert!(a.qualifiers.custom);
                assert!(a.is_array);
                assert_eq!(a.type_name, "point3f");
                assert_eq!(a.name, "points");
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn block_without_type_name() {
        let layer = parse_src("class \"ClassA\" { }").unwrap();
        let b = only_block(&layer);
        assert_eq!(b.specifier, Specifier::Class);
        assert_eq!(b.type_name, None);
        assert_eq!(b.name, "ClassA");
    }

    #[test]
    fn nested_blocks_recurse() {
        let layer = parse_src(
            r#"over "A" {
                def "child" (inherits = </B>) { }
                def Xform "inner" { double x = 1 }
            }"#,
        )
        .unwrap();
        let b = only_block(&layer);
        assert_eq!(b.specifier, Specifier::Over);
        let nested: Vec<&str> = b
            .body
            .iter()
            .filter_map(|s| match s {
                Statement::Block(n) => Some(n.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(nested, vec!["child", "inner"]);
    }

    #[test]
    fn assignment_qualifiers_in_order() {
        let layer = parse_src("def \"A\" { prepend custom uniform token[] xformOpOrder }").unwrap();
        match &only_block(&layer).body[0] {
            Statement::Assignment(a) => {
                assert_eq!(
                    a.qualifiers,
                    Qualifiers {
                        prepend: true,
                        custom: true,
                        uniform: true
                    }
                );
                assert_eq!(a.value, None);
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn prepend_qualifier_in_metadata() {
        let layer = parse_src("def \"A\" (prepend inherits = </B>) {}").unwrap();
        match &only_block(&layer).metadata[0] {
            MetaEntry::Field { prepend, key, .. } => {
                assert!(*prepend);
                assert_eq!(key, "inherits");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_name_string_is_a_syntax_error() {
        let err = parse_src("def Xform { }").unwrap_err();
        assert_eq!(err.stage, Stage::Syntax);
        assert_eq!((err.line, err.column), (1, 11));
        assert_eq!(err.message, "expected prim name string, got '{'");
    }

    #[test]
    fn unterminated_block_is_a_syntax_error() {
        let err = parse_src("def \"A\" {\n  int x = 1\n").unwrap_err();
        assert_eq!(err.stage, Stage::Syntax);
        assert!(err.message.contains("unterminated block \"A\""));
        assert_eq!(err.line, 3);
    }

    #[test]
    fn stray_token_is_not_skipped() {
        let err = parse_src("def \"A\" { = 1 }").unwrap_err();
        assert_eq!(err.message, "expected statement, got '='");
    }

    #[test]
    fn empty_metadata_is_rejected() {
        let err = parse_src("def \"A\" () {}").unwrap_err();
        assert_eq!(err.message, "empty metadata list");
    }

    #[test]
    fn dictionary_metadata_is_unsupported() {
        let err = parse_src("def \"A\" (customData = { int x = 1 }) {}").unwrap_err();
        assert_eq!(err.stage, Stage::Syntax);
        assert!(err.message.starts_with("expected value"));
    }
}
