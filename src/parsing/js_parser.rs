use super::js_tokenizer::{Token, TokenKind, Tokenizer};
use super::{Parse, ParseError};
use crate::coord::{Pos, Span};
use crate::log;
use crate::tree::{Field, Node, Tree, TreeBuilder};

/// A parser for a subset of JavaScript, producing Babel-shaped syntax trees.
///
/// Node kinds and field names follow Babel (`FunctionDeclaration { id, params, body }`, etc.), and
/// each node's children are ordered the way Babel traverses them. Regex and template literals,
/// destructuring, modules, generators, getters/setters and labels are not supported.
#[derive(Debug, Default)]
pub struct JsParser;

impl Parse for JsParser {
    fn name(&self) -> &str {
        "JavaScript"
    }

    fn parse(&mut self, source: &str) -> Result<Tree, ParseError> {
        let result = Parser::new(source).and_then(Parser::program);
        match &result {
            Ok(tree) => log!(Debug, "Parsed {} nodes", tree.num_nodes()),
            Err(err) => log!(Debug, "Parse failed: {}", err),
        }
        result
    }
}

const KEYWORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "export", "extends", "false", "finally", "for", "function", "if", "import", "in",
    "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with", "yield",
];

/// How deeply statements and expressions may nest before parsing gives up.
const MAX_DEPTH: usize = 500;

const ASSIGNMENT_OPS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "**=", "<<=", ">>=", ">>>=", "&=", "|=", "^=",
];

/// (operator, precedence, is right associative)
fn binary_op(kind: TokenKind) -> Option<(&'static str, u8, bool)> {
    let op = match kind {
        TokenKind::Punct(op) => op,
        TokenKind::Ident("instanceof") => "instanceof",
        TokenKind::Ident("in") => "in",
        _ => return None,
    };
    let (prec, right_assoc) = match op {
        "??" => (1, false),
        "||" => (2, false),
        "&&" => (3, false),
        "|" => (4, false),
        "^" => (5, false),
        "&" => (6, false),
        "==" | "!=" | "===" | "!==" => (7, false),
        "<" | ">" | "<=" | ">=" | "instanceof" | "in" => (8, false),
        "<<" | ">>" | ">>>" => (9, false),
        "+" | "-" => (10, false),
        "*" | "/" | "%" => (11, false),
        "**" => (12, true),
        _ => return None,
    };
    Some((op, prec, right_assoc))
}

fn is_logical(op: &str) -> bool {
    matches!(op, "&&" | "||" | "??")
}

struct Parser<'s> {
    tokens: Vec<Token<'s>>,
    index: usize,
    builder: TreeBuilder,
    /// End of the most recently consumed token.
    prev_end: Pos,
    end_of_input: Pos,
    /// Statements and expressions currently being parsed. At most `MAX_DEPTH`.
    depth: usize,
}

type PResult<T> = Result<T, ParseError>;

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> PResult<Parser<'s>> {
        Ok(Parser {
            tokens: Tokenizer::new(source).collect::<PResult<Vec<_>>>()?,
            index: 0,
            builder: TreeBuilder::new(),
            prev_end: Pos::zero(),
            end_of_input: Tokenizer::end_pos(source),
            depth: 0,
        })
    }

    /*************
     * Utilities *
     *************/

    fn peek(&self) -> Option<TokenKind<'s>> {
        self.tokens.get(self.index).map(|token| token.kind)
    }

    fn peek_at(&self, ahead: usize) -> Option<TokenKind<'s>> {
        self.tokens.get(self.index + ahead).map(|token| token.kind)
    }

    fn at_punct(&self, punct: &str) -> bool {
        matches!(self.peek(), Some(TokenKind::Punct(p)) if p == punct)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(TokenKind::Ident(word)) if word == keyword)
    }

    /// The start of the next token, or the end of input.
    fn start(&self) -> Pos {
        self.tokens
            .get(self.index)
            .map(|token| token.span.start)
            .unwrap_or(self.end_of_input)
    }

    fn advance(&mut self) -> Option<Token<'s>> {
        let token = *self.tokens.get(self.index)?;
        self.index += 1;
        self.prev_end = token.span.end;
        Some(token)
    }

    fn eat_punct(&mut self, punct: &str) -> bool {
        if self.at_punct(punct) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, punct: &str) -> PResult<()> {
        if self.eat_punct(punct) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", punct)))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.tokens.get(self.index) {
            Some(token) => ParseError::new(
                token.span.start,
                format!("Expected {}, found {}.", expected, describe(token.kind)),
            ),
            None => ParseError::new(
                self.end_of_input,
                format!("Expected {}, found end of input.", expected),
            ),
        }
    }

    /// A statement ends with `;`, or implicitly before `}`, end of input, or a line break.
    fn semicolon(&mut self) -> PResult<()> {
        if self.eat_punct(";") || self.at_punct("}") {
            return Ok(());
        }
        match self.tokens.get(self.index) {
            None => Ok(()),
            Some(token) if token.newline_before => Ok(()),
            Some(_) => Err(self.unexpected("';'")),
        }
    }

    /// Runs `parse` one level deeper, failing instead of overflowing the stack.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::new(self.start(), "Nesting is too deep."));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Builds a node spanning from `start` to the end of the last consumed token.
    fn node<'f>(
        &mut self,
        kind: &str,
        start: Pos,
        text: Option<&str>,
        fields: impl IntoIterator<Item = Field<'f>>,
    ) -> Node {
        let span = Span::new(start, self.prev_end);
        self.builder
            .branch(kind, Some(span), text.map(str::to_owned), fields)
    }

    fn leaf(&mut self, kind: &str, token: Token<'s>, text: &str) -> Node {
        self.builder
            .leaf(kind, Some(token.span), Some(text.to_owned()))
    }

    /// A comma separated list of `item`s up to `close`, which is consumed. Allows a trailing comma.
    fn list(
        &mut self,
        close: &str,
        mut item: impl FnMut(&mut Self) -> PResult<Node>,
    ) -> PResult<Vec<Node>> {
        let mut items = Vec::new();
        while !self.eat_punct(close) {
            items.push(item(self)?);
            if !self.eat_punct(",") {
                self.expect_punct(close)?;
                break;
            }
        }
        Ok(items)
    }

    /**************
     * Statements *
     **************/

    fn program(mut self) -> PResult<Tree> {
        let mut body = Vec::new();
        while self.peek().is_some() {
            body.push(self.statement()?);
        }
        let span = Span::new(Pos::zero(), self.end_of_input);
        let program = self
            .builder
            .branch("Program", Some(span), None, [Field::List("body", body)]);
        Ok(self.builder.finish(program))
    }

    fn statement(&mut self) -> PResult<Node> {
        self.nested(Parser::statement_body)
    }

    fn statement_body(&mut self) -> PResult<Node> {
        let start = self.start();
        let kind = match self.peek() {
            Some(kind) => kind,
            None => return Err(self.unexpected("a statement")),
        };
        match kind {
            TokenKind::Punct("{") => self.block(),
            TokenKind::Punct(";") => {
                self.advance();
                Ok(self.node("EmptyStatement", start, None, []))
            }
            TokenKind::Ident("function") => self.function("FunctionDeclaration", true),
            TokenKind::Ident("class") => self.class(),
            TokenKind::Ident("var") | TokenKind::Ident("const") => {
                let decl = self.variable_declaration()?;
                self.finish_statement(decl, start)
            }
            TokenKind::Ident("let")
                if matches!(
                    self.peek_at(1),
                    Some(TokenKind::Ident(_) | TokenKind::Punct("[" | "{"))
                ) =>
            {
                let decl = self.variable_declaration()?;
                self.finish_statement(decl, start)
            }
            TokenKind::Ident("if") => self.if_statement(),
            TokenKind::Ident("for") => self.for_statement(),
            TokenKind::Ident("while") => {
                self.advance();
                let test = self.paren_expression()?;
                let body = self.statement()?;
                Ok(self.node(
                    "WhileStatement",
                    start,
                    None,
                    [Field::Single("test", Some(test)), Field::Single("body", Some(body))],
                ))
            }
            TokenKind::Ident("do") => {
                self.advance();
                let body = self.statement()?;
                if !self.eat_keyword("while") {
                    return Err(self.unexpected("'while'"));
                }
                let test = self.paren_expression()?;
                self.eat_punct(";");
                Ok(self.node(
                    "DoWhileStatement",
                    start,
                    None,
                    [Field::Single("test", Some(test)), Field::Single("body", Some(body))],
                ))
            }
            TokenKind::Ident("return") => {
                self.advance();
                let argument = self.optional_argument()?;
                self.semicolon()?;
                Ok(self.node(
                    "ReturnStatement",
                    start,
                    None,
                    [Field::Single("argument", argument)],
                ))
            }
            TokenKind::Ident("throw") => {
                self.advance();
                let argument = self.expression()?;
                self.semicolon()?;
                Ok(self.node(
                    "ThrowStatement",
                    start,
                    None,
                    [Field::Single("argument", Some(argument))],
                ))
            }
            TokenKind::Ident("break") => self.jump_statement("BreakStatement"),
            TokenKind::Ident("continue") => self.jump_statement("ContinueStatement"),
            TokenKind::Ident("try") => self.try_statement(),
            TokenKind::Ident("switch") => self.switch_statement(),
            TokenKind::Ident(word @ ("import" | "export")) => Err(ParseError::new(
                start,
                format!("'{}' declarations are not supported.", word),
            )),
            _ => {
                let expression = self.expression()?;
                self.semicolon()?;
                Ok(self.node(
                    "ExpressionStatement",
                    start,
                    None,
                    [Field::Single("expression", Some(expression))],
                ))
            }
        }
    }

    /// Wraps declarators in a `VariableDeclaration` statement that ends with its semicolon.
    fn finish_statement(&mut self, decl: (String, Vec<Node>), start: Pos) -> PResult<Node> {
        self.semicolon()?;
        let (kind, declarations) = decl;
        Ok(self.node(
            "VariableDeclaration",
            start,
            Some(kind.as_str()),
            [Field::List("declarations", declarations)],
        ))
    }

    fn block(&mut self) -> PResult<Node> {
        let start = self.start();
        self.expect_punct("{")?;
        let mut body = Vec::new();
        while !self.eat_punct("}") {
            if self.peek().is_none() {
                return Err(self.unexpected("'}'"));
            }
            body.push(self.statement()?);
        }
        Ok(self.node("BlockStatement", start, None, [Field::List("body", body)]))
    }

    /// `var`/`let`/`const` and its declarators, without the semicolon. Returns the keyword and
    /// the declarators, for the caller to wrap.
    fn variable_declaration(&mut self) -> PResult<(String, Vec<Node>)> {
        let keyword = match self.advance().map(|token| token.kind) {
            Some(TokenKind::Ident(keyword)) => keyword.to_owned(),
            _ => return Err(self.unexpected("a declaration")),
        };
        let mut declarations = Vec::new();
        loop {
            let start = self.start();
            let id = self.binding_identifier()?;
            let init = if self.eat_punct("=") {
                Some(self.assignment()?)
            } else {
                None
            };
            declarations.push(self.node(
                "VariableDeclarator",
                start,
                None,
                [Field::Single("id", Some(id)), Field::Single("init", init)],
            ));
            if !self.eat_punct(",") {
                break;
            }
        }
        Ok((keyword, declarations))
    }

    fn if_statement(&mut self) -> PResult<Node> {
        let start = self.start();
        self.advance();
        let test = self.paren_expression()?;
        let consequent = self.statement()?;
        let alternate = if self.eat_keyword("else") {
            Some(self.statement()?)
        } else {
            None
        };
        Ok(self.node(
            "IfStatement",
            start,
            None,
            [
                Field::Single("test", Some(test)),
                Field::Single("consequent", Some(consequent)),
                Field::Single("alternate", alternate),
            ],
        ))
    }

    fn for_statement(&mut self) -> PResult<Node> {
        let start = self.start();
        self.advance();
        self.expect_punct("(")?;
        let init = if self.at_punct(";") {
            None
        } else if self.at_keyword("var") || self.at_keyword("let") || self.at_keyword("const") {
            let init_start = self.start();
            let (kind, declarations) = self.variable_declaration()?;
            Some(self.node(
                "VariableDeclaration",
                init_start,
                Some(kind.as_str()),
                [Field::List("declarations", declarations)],
            ))
        } else {
            Some(self.expression_no_in()?)
        };
        if self.at_keyword("of") || self.at_keyword("in") {
            return Err(ParseError::new(
                self.start(),
                "'for-in' and 'for-of' loops are not supported.",
            ));
        }
        self.expect_punct(";")?;
        let test = if self.at_punct(";") {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect_punct(";")?;
        let update = if self.at_punct(")") {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect_punct(")")?;
        let body = self.statement()?;
        Ok(self.node(
            "ForStatement",
            start,
            None,
            [
                Field::Single("init", init),
                Field::Single("test", test),
                Field::Single("update", update),
                Field::Single("body", Some(body)),
            ],
        ))
    }

    fn jump_statement(&mut self, kind: &str) -> PResult<Node> {
        let start = self.start();
        self.advance();
        if let Some(token) = self.tokens.get(self.index) {
            if matches!(token.kind, TokenKind::Ident(_)) && !token.newline_before {
                return Err(ParseError::new(token.span.start, "Labels are not supported."));
            }
        }
        self.semicolon()?;
        Ok(self.node(kind, start, None, []))
    }

    fn try_statement(&mut self) -> PResult<Node> {
        let start = self.start();
        self.advance();
        let block = self.block()?;
        let handler = if self.at_keyword("catch") {
            let catch_start = self.start();
            self.advance();
            let param = if self.eat_punct("(") {
                let param = self.binding_identifier()?;
                self.expect_punct(")")?;
                Some(param)
            } else {
                None
            };
            let body = self.block()?;
            Some(self.node(
                "CatchClause",
                catch_start,
                None,
                [Field::Single("param", param), Field::Single("body", Some(body))],
            ))
        } else {
            None
        };
        let finalizer = if self.eat_keyword("finally") {
            Some(self.block()?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.unexpected("'catch' or 'finally'"));
        }
        Ok(self.node(
            "TryStatement",
            start,
            None,
            [
                Field::Single("block", Some(block)),
                Field::Single("handler", handler),
                Field::Single("finalizer", finalizer),
            ],
        ))
    }

    fn switch_statement(&mut self) -> PResult<Node> {
        let start = self.start();
        self.advance();
        let discriminant = self.paren_expression()?;
        self.expect_punct("{")?;
        let mut cases = Vec::new();
        while !self.eat_punct("}") {
            let case_start = self.start();
            let test = if self.eat_keyword("case") {
                Some(self.expression()?)
            } else if self.eat_keyword("default") {
                None
            } else {
                return Err(self.unexpected("'case' or 'default'"));
            };
            self.expect_punct(":")?;
            let mut consequent = Vec::new();
            while !(self.at_keyword("case") || self.at_keyword("default") || self.at_punct("}")) {
                if self.peek().is_none() {
                    return Err(self.unexpected("'}'"));
                }
                consequent.push(self.statement()?);
            }
            cases.push(self.node(
                "SwitchCase",
                case_start,
                None,
                [Field::Single("test", test), Field::List("consequent", consequent)],
            ));
        }
        Ok(self.node(
            "SwitchStatement",
            start,
            None,
            [
                Field::Single("discriminant", Some(discriminant)),
                Field::List("cases", cases),
            ],
        ))
    }

    /// The argument of `return`, unless the statement ends right away.
    fn optional_argument(&mut self) -> PResult<Option<Node>> {
        match self.tokens.get(self.index) {
            None => Ok(None),
            Some(token) if token.newline_before => Ok(None),
            Some(token) if matches!(token.kind, TokenKind::Punct(";") | TokenKind::Punct("}")) => {
                Ok(None)
            }
            Some(_) => Ok(Some(self.expression()?)),
        }
    }

    /*************************
     * Functions and classes *
     *************************/

    fn function(&mut self, kind: &str, requires_id: bool) -> PResult<Node> {
        let start = self.start();
        self.advance();
        if self.at_punct("*") {
            return Err(ParseError::new(self.start(), "Generators are not supported."));
        }
        let id = if requires_id || matches!(self.peek(), Some(TokenKind::Ident(_))) {
            Some(self.binding_identifier()?)
        } else {
            None
        };
        let params = self.params()?;
        let body = self.block()?;
        Ok(self.node(
            kind,
            start,
            None,
            [
                Field::Single("id", id),
                Field::List("params", params),
                Field::Single("body", Some(body)),
            ],
        ))
    }

    fn params(&mut self) -> PResult<Vec<Node>> {
        self.expect_punct("(")?;
        self.list(")", Parser::param)
    }

    fn param(&mut self) -> PResult<Node> {
        let start = self.start();
        if self.eat_punct("...") {
            let argument = self.binding_identifier()?;
            return Ok(self.node(
                "RestElement",
                start,
                None,
                [Field::Single("argument", Some(argument))],
            ));
        }
        let left = self.binding_identifier()?;
        if self.eat_punct("=") {
            let right = self.assignment()?;
            Ok(self.node(
                "AssignmentPattern",
                start,
                None,
                [Field::Single("left", Some(left)), Field::Single("right", Some(right))],
            ))
        } else {
            Ok(left)
        }
    }

    fn binding_identifier(&mut self) -> PResult<Node> {
        match self.tokens.get(self.index).copied() {
            Some(token @ Token {
                kind: TokenKind::Ident(name),
                ..
            }) if !KEYWORDS.contains(&name) => {
                self.advance();
                Ok(self.leaf("Identifier", token, name))
            }
            Some(Token {
                kind: TokenKind::Punct("{" | "["),
                span,
                ..
            }) => Err(ParseError::new(
                span.start,
                "Destructuring patterns are not supported.",
            )),
            _ => Err(self.unexpected("an identifier")),
        }
    }

    fn class(&mut self) -> PResult<Node> {
        let start = self.start();
        self.advance();
        let id = self.binding_identifier()?;
        let super_class = if self.eat_keyword("extends") {
            Some(self.call_member()?)
        } else {
            None
        };
        let body_start = self.start();
        self.expect_punct("{")?;
        let mut members = Vec::new();
        while !self.eat_punct("}") {
            if self.eat_punct(";") {
                continue;
            }
            members.push(self.class_member()?);
        }
        let body = self.node("ClassBody", body_start, None, [Field::List("body", members)]);
        Ok(self.node(
            "ClassDeclaration",
            start,
            None,
            [
                Field::Single("id", Some(id)),
                Field::Single("superClass", super_class),
                Field::Single("body", Some(body)),
            ],
        ))
    }

    fn class_member(&mut self) -> PResult<Node> {
        let start = self.start();
        let is_static = self.at_keyword("static")
            && !matches!(self.peek_at(1), Some(TokenKind::Punct("(" | "=" | ";" | "}")));
        if is_static {
            self.advance();
        }
        let text = if is_static { Some("static") } else { None };
        let key = self.property_key()?;
        if self.at_punct("(") {
            let params = self.params()?;
            let body = self.block()?;
            return Ok(self.node(
                "ClassMethod",
                start,
                text,
                [
                    Field::Single("key", Some(key)),
                    Field::List("params", params),
                    Field::Single("body", Some(body)),
                ],
            ));
        }
        let value = if self.eat_punct("=") {
            Some(self.assignment()?)
        } else {
            None
        };
        self.semicolon()?;
        Ok(self.node(
            "ClassProperty",
            start,
            text,
            [Field::Single("key", Some(key)), Field::Single("value", value)],
        ))
    }

    /// A property name: any identifier or keyword, a string, a number, or `[expression]`.
    fn property_key(&mut self) -> PResult<Node> {
        let token = match self.tokens.get(self.index).copied() {
            Some(token) => token,
            None => return Err(self.unexpected("a property name")),
        };
        match token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(self.leaf("Identifier", token, name))
            }
            TokenKind::Str(raw) => {
                self.advance();
                Ok(self.leaf("StringLiteral", token, raw))
            }
            TokenKind::Number(raw) => {
                self.advance();
                Ok(self.leaf("NumericLiteral", token, raw))
            }
            TokenKind::Punct("[") => {
                self.advance();
                let key = self.assignment()?;
                self.expect_punct("]")?;
                Ok(key)
            }
            TokenKind::Punct(_) => Err(self.unexpected("a property name")),
        }
    }

    /***************
     * Expressions *
     ***************/

    fn paren_expression(&mut self) -> PResult<Node> {
        self.expect_punct("(")?;
        let expression = self.expression()?;
        self.expect_punct(")")?;
        Ok(expression)
    }

    fn expression(&mut self) -> PResult<Node> {
        self.sequence(Parser::assignment)
    }

    /// Like `expression`, but for the head of a `for` loop.
    fn expression_no_in(&mut self) -> PResult<Node> {
        // `in` would make this a for-in loop, which is rejected by the caller.
        self.sequence(|parser| {
            let start = parser.start();
            let left = parser.binary_below_in()?;
            parser.finish_assignment(start, left)
        })
    }

    fn sequence(&mut self, mut item: impl FnMut(&mut Self) -> PResult<Node>) -> PResult<Node> {
        let start = self.start();
        let first = item(self)?;
        if !self.at_punct(",") {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat_punct(",") {
            expressions.push(item(self)?);
        }
        Ok(self.node(
            "SequenceExpression",
            start,
            None,
            [Field::List("expressions", expressions)],
        ))
    }

    fn assignment(&mut self) -> PResult<Node> {
        if self.at_arrow() {
            return self.arrow();
        }
        let start = self.start();
        let left = self.conditional()?;
        self.finish_assignment(start, left)
    }

    fn finish_assignment(&mut self, start: Pos, left: Node) -> PResult<Node> {
        let op = match self.peek() {
            Some(TokenKind::Punct(op)) if ASSIGNMENT_OPS.contains(&op) => op,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.assignment()?;
        Ok(self.node(
            "AssignmentExpression",
            start,
            Some(op),
            [Field::Single("left", Some(left)), Field::Single("right", Some(right))],
        ))
    }

    /// Whether the upcoming tokens are the parameters of an arrow function.
    fn at_arrow(&self) -> bool {
        match self.peek() {
            Some(TokenKind::Ident(name)) if !KEYWORDS.contains(&name) => {
                matches!(self.peek_at(1), Some(TokenKind::Punct("=>")))
            }
            Some(TokenKind::Punct("(")) => {
                let mut depth = 0;
                for (i, token) in self.tokens[self.index..].iter().enumerate() {
                    match token.kind {
                        TokenKind::Punct("(" | "[" | "{") => depth += 1,
                        TokenKind::Punct(")" | "]" | "}") => {
                            depth -= 1;
                            if depth == 0 {
                                return matches!(
                                    self.peek_at(i + 1),
                                    Some(TokenKind::Punct("=>"))
                                );
                            }
                        }
                        _ => (),
                    }
                }
                false
            }
            _ => false,
        }
    }

    fn arrow(&mut self) -> PResult<Node> {
        let start = self.start();
        let params = if self.at_punct("(") {
            self.params()?
        } else {
            vec![self.binding_identifier()?]
        };
        self.expect_punct("=>")?;
        let body = if self.at_punct("{") {
            self.block()?
        } else {
            self.assignment()?
        };
        Ok(self.node(
            "ArrowFunctionExpression",
            start,
            None,
            [Field::List("params", params), Field::Single("body", Some(body))],
        ))
    }

    fn conditional(&mut self) -> PResult<Node> {
        let start = self.start();
        let test = self.binary(1)?;
        if !self.eat_punct("?") {
            return Ok(test);
        }
        let consequent = self.assignment()?;
        self.expect_punct(":")?;
        let alternate = self.assignment()?;
        Ok(self.node(
            "ConditionalExpression",
            start,
            None,
            [
                Field::Single("test", Some(test)),
                Field::Single("consequent", Some(consequent)),
                Field::Single("alternate", Some(alternate)),
            ],
        ))
    }

    /// Binary operators binding at least as tightly as `min_prec`.
    fn binary(&mut self, min_prec: u8) -> PResult<Node> {
        self.binary_with(min_prec, true)
    }

    fn binary_below_in(&mut self) -> PResult<Node> {
        self.binary_with(1, false)
    }

    fn binary_with(&mut self, min_prec: u8, allow_in: bool) -> PResult<Node> {
        let start = self.start();
        let mut left = self.unary()?;
        while let Some((op, prec, right_assoc)) = self.peek().and_then(binary_op) {
            if prec < min_prec || (op == "in" && !allow_in) {
                break;
            }
            self.advance();
            let next_min = if right_assoc { prec } else { prec + 1 };
            let right = self.binary_with(next_min, allow_in)?;
            let kind = if is_logical(op) {
                "LogicalExpression"
            } else {
                "BinaryExpression"
            };
            left = self.node(
                kind,
                start,
                Some(op),
                [Field::Single("left", Some(left)), Field::Single("right", Some(right))],
            );
        }
        Ok(left)
    }

    fn unary(&mut self) -> PResult<Node> {
        self.nested(Parser::unary_body)
    }

    fn unary_body(&mut self) -> PResult<Node> {
        let start = self.start();
        let op = match self.peek() {
            Some(TokenKind::Punct(op @ ("!" | "-" | "+" | "~"))) => op,
            Some(TokenKind::Ident(op @ ("typeof" | "void" | "delete"))) => op,
            Some(TokenKind::Punct(op @ ("++" | "--"))) => {
                self.advance();
                let argument = self.unary()?;
                return Ok(self.node(
                    "UpdateExpression",
                    start,
                    Some(op),
                    [Field::Single("argument", Some(argument))],
                ));
            }
            _ => return self.postfix(),
        };
        self.advance();
        let argument = self.unary()?;
        Ok(self.node(
            "UnaryExpression",
            start,
            Some(op),
            [Field::Single("argument", Some(argument))],
        ))
    }

    fn postfix(&mut self) -> PResult<Node> {
        let start = self.start();
        let argument = self.call_member()?;
        let op = match self.tokens.get(self.index) {
            Some(Token {
                kind: TokenKind::Punct(op @ ("++" | "--")),
                newline_before: false,
                ..
            }) => *op,
            _ => return Ok(argument),
        };
        self.advance();
        Ok(self.node(
            "UpdateExpression",
            start,
            Some(op),
            [Field::Single("argument", Some(argument))],
        ))
    }

    fn call_member(&mut self) -> PResult<Node> {
        let start = self.start();
        let mut expr = if self.at_keyword("new") {
            self.new_expression()?
        } else {
            self.primary()?
        };
        loop {
            if self.at_punct(".") || self.at_punct("?.") {
                let optional = self.at_punct("?.");
                self.advance();
                if optional && (self.at_punct("(") || self.at_punct("[")) {
                    return Err(ParseError::new(
                        self.start(),
                        "Optional calls and computed members are not supported.",
                    ));
                }
                let property = self.property_name()?;
                let kind = if optional {
                    "OptionalMemberExpression"
                } else {
                    "MemberExpression"
                };
                expr = self.node(
                    kind,
                    start,
                    None,
                    [Field::Single("object", Some(expr)), Field::Single("property", Some(property))],
                );
            } else if self.eat_punct("[") {
                let property = self.expression()?;
                self.expect_punct("]")?;
                expr = self.node(
                    "MemberExpression",
                    start,
                    Some("computed"),
                    [Field::Single("object", Some(expr)), Field::Single("property", Some(property))],
                );
            } else if self.eat_punct("(") {
                let arguments = self.list(")", Parser::argument)?;
                expr = self.node(
                    "CallExpression",
                    start,
                    None,
                    [Field::Single("callee", Some(expr)), Field::List("arguments", arguments)],
                );
            } else {
                return Ok(expr);
            }
        }
    }

    fn new_expression(&mut self) -> PResult<Node> {
        let start = self.start();
        self.advance();
        let mut callee = if self.at_keyword("new") {
            self.nested(Parser::new_expression)?
        } else {
            self.primary()?
        };
        loop {
            if self.eat_punct(".") {
                let property = self.property_name()?;
                callee = self.node(
                    "MemberExpression",
                    start,
                    None,
                    [Field::Single("object", Some(callee)), Field::Single("property", Some(property))],
                );
            } else if self.eat_punct("[") {
                let property = self.expression()?;
                self.expect_punct("]")?;
                callee = self.node(
                    "MemberExpression",
                    start,
                    Some("computed"),
                    [Field::Single("object", Some(callee)), Field::Single("property", Some(property))],
                );
            } else {
                break;
            }
        }
        let arguments = if self.eat_punct("(") {
            self.list(")", Parser::argument)?
        } else {
            Vec::new()
        };
        Ok(self.node(
            "NewExpression",
            start,
            None,
            [Field::Single("callee", Some(callee)), Field::List("arguments", arguments)],
        ))
    }

    /// An identifier after `.`, which may be a keyword.
    fn property_name(&mut self) -> PResult<Node> {
        match self.tokens.get(self.index).copied() {
            Some(token @ Token {
                kind: TokenKind::Ident(name),
                ..
            }) => {
                self.advance();
                Ok(self.leaf("Identifier", token, name))
            }
            _ => Err(self.unexpected("a property name")),
        }
    }

    /// A call argument or array element.
    fn argument(&mut self) -> PResult<Node> {
        let start = self.start();
        if self.eat_punct("...") {
            let argument = self.assignment()?;
            return Ok(self.node(
                "SpreadElement",
                start,
                None,
                [Field::Single("argument", Some(argument))],
            ));
        }
        self.assignment()
    }

    fn primary(&mut self) -> PResult<Node> {
        let start = self.start();
        let token = match self.tokens.get(self.index).copied() {
            Some(token) => token,
            None => return Err(self.unexpected("an expression")),
        };
        match token.kind {
            TokenKind::Number(raw) => {
                self.advance();
                Ok(self.leaf("NumericLiteral", token, raw))
            }
            TokenKind::Str(raw) => {
                self.advance();
                Ok(self.leaf("StringLiteral", token, raw))
            }
            TokenKind::Ident(word @ ("true" | "false")) => {
                self.advance();
                Ok(self.leaf("BooleanLiteral", token, word))
            }
            TokenKind::Ident("null") => {
                self.advance();
                Ok(self.node("NullLiteral", start, None, []))
            }
            TokenKind::Ident("this") => {
                self.advance();
                Ok(self.node("ThisExpression", start, None, []))
            }
            TokenKind::Ident("function") => self.function("FunctionExpression", false),
            TokenKind::Ident(name) if !KEYWORDS.contains(&name) => {
                self.advance();
                Ok(self.leaf("Identifier", token, name))
            }
            TokenKind::Punct("(") => self.paren_expression(),
            TokenKind::Punct("[") => {
                self.advance();
                let elements = self.list("]", Parser::argument)?;
                Ok(self.node(
                    "ArrayExpression",
                    start,
                    None,
                    [Field::List("elements", elements)],
                ))
            }
            TokenKind::Punct("{") => {
                self.advance();
                let properties = self.list("}", Parser::object_member)?;
                Ok(self.node(
                    "ObjectExpression",
                    start,
                    None,
                    [Field::List("properties", properties)],
                ))
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn object_member(&mut self) -> PResult<Node> {
        let start = self.start();
        if self.eat_punct("...") {
            let argument = self.assignment()?;
            return Ok(self.node(
                "SpreadElement",
                start,
                None,
                [Field::Single("argument", Some(argument))],
            ));
        }
        let key_token = self.tokens.get(self.index).copied();
        let key = self.property_key()?;
        if self.at_punct("(") {
            let params = self.params()?;
            let body = self.block()?;
            return Ok(self.node(
                "ObjectMethod",
                start,
                None,
                [
                    Field::Single("key", Some(key)),
                    Field::List("params", params),
                    Field::Single("body", Some(body)),
                ],
            ));
        }
        if self.eat_punct(":") {
            let value = self.assignment()?;
            return Ok(self.node(
                "ObjectProperty",
                start,
                None,
                [Field::Single("key", Some(key)), Field::Single("value", Some(value))],
            ));
        }
        // Shorthand `{ name }`: the value is a second identifier over the same text.
        match key_token {
            Some(token @ Token {
                kind: TokenKind::Ident(name),
                ..
            }) if !KEYWORDS.contains(&name) => {
                let value = self.leaf("Identifier", token, name);
                Ok(self.node(
                    "ObjectProperty",
                    start,
                    Some("shorthand"),
                    [Field::Single("key", Some(key)), Field::Single("value", Some(value))],
                ))
            }
            _ => Err(self.unexpected("':'")),
        }
    }
}

fn describe(kind: TokenKind) -> String {
    match kind {
        TokenKind::Ident(word) if KEYWORDS.contains(&word) => format!("keyword '{}'", word),
        TokenKind::Ident(name) => format!("identifier '{}'", name),
        TokenKind::Number(raw) => format!("number {}", raw),
        TokenKind::Str(raw) => format!("string {}", raw),
        TokenKind::Punct(punct) => format!("'{}'", punct),
    }
}
