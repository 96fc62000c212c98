// muse-synth -- pitched music from rapidly triggered drums
// Copyright (C) 2021  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.


//! Parsing command files.
//!
//! Every non-empty line holds one command: a keyword followed by positional
//! values and `name=value,...` options. A line that fails to parse is
//! reported and skipped, so that all syntax errors of a file are found at once.

use std::{error::Error, fmt, iter::Peekable};

use logos::Logos;
use musesynth_core::{nonnan::F64N, rational::Rational};

use crate::ast::{self, Node};
use crate::lexer::{Span, Token};


#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParseError {
    span: Span,
    message: String,
}

impl ParseError {
    pub fn span(&self) -> Span {
        self.span.clone()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for ParseError {}

type Parse<T> = Result<Node<T>, ParseError>;

/// Parse a whole command file, returning all syntax errors if there are any.
pub fn parse(source: &str) -> Result<Node<ast::Root>, Vec<ParseError>> {
    let mut parser = Parser::new(source);
    let root = parser.parse_root();
    if parser.errors.is_empty() {
        Ok(root)
    } else {
        Err(parser.errors)
    }
}

pub struct Parser<'a> {
    source: &'a str,
    stream: Peekable<logos::SpannedIter<'a, Token>>,
    consumed: usize,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Parser {
            source,
            stream: Token::lexer(source).spanned().peekable(),
            consumed: 0,
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    fn peek(&mut self) -> Option<Token> {
        self.stream.peek().map(|(tok, _)| tok).copied()
    }

    fn consume(&mut self) -> Option<(Token, Span)> {
        let result = self.stream.next();
        if let Some((_, span)) = &result {
            self.consumed = span.end;
        }
        result
    }

    fn at_line_end(&mut self) -> bool {
        matches!(self.peek(), None | Some(Token::Newline))
    }

    /// Skip the remainder of a line that could not be parsed, including the line break.
    fn skip_line(&mut self) {
        while let Some((token, _)) = self.consume() {
            if token == Token::Newline {
                break;
            }
        }
    }

    fn parse_expect_token(&mut self, expected: Token) -> Parse<()> {
        match self.consume() {
            Some((token, span)) if token == expected => Ok(Node::new(span, ())),
            Some((token, span)) => Err(ParseError {
                span,
                message: format!("Expected {:?} but got {:?}", expected, token),
            }),
            None => Err(ParseError {
                span: self.consumed..self.consumed,
                message: format!("Expected {:?} but reached end of file", expected),
            }),
        }
    }

    // Parse rules

    /// Parse all commands, collecting errors instead of stopping at the first one.
    pub fn parse_root(&mut self) -> Node<ast::Root> {
        let mut commands = Vec::new();
        while let Some(token) = self.peek() {
            if token == Token::Newline {
                self.consume();
                continue;
            }
            match self.parse_command() {
                Ok(command) => commands.push(command),
                Err(error) => {
                    self.errors.push(error);
                    self.skip_line();
                }
            }
        }
        Node::new(0..self.source.len(), ast::Root { commands })
    }

    fn parse_command(&mut self) -> Parse<ast::Command> {
        let keyword = self.parse_word()?;
        let mut span = keyword.span.clone();
        let mut args = Vec::new();
        while !self.at_line_end() {
            let arg = self.parse_arg()?;
            span.end = arg.span.end;
            args.push(arg);
        }
        if self.peek().is_some() {
            self.parse_expect_token(Token::Newline)?;
        }
        Ok(Node::new(span, ast::Command { keyword, args }))
    }

    fn parse_arg(&mut self) -> Parse<ast::Arg> {
        let value = self.parse_value()?;
        let name = match value.data {
            ast::Value::Word(ref name) if self.peek() == Some(Token::Equals) => name.clone(),
            data => return Ok(Node::new(value.span, ast::Arg::Value(data))),
        };
        self.parse_expect_token(Token::Equals)?;

        let mut values = vec![self.parse_value()?];
        while self.peek() == Some(Token::Comma) {
            self.consume();
            values.push(self.parse_value()?);
        }
        let end = values.last().map_or(value.span.end, |last| last.span.end);
        Ok(Node::new(
            value.span.start..end,
            ast::Arg::Named {
                name: Node::new(value.span, name),
                values,
            },
        ))
    }

    fn parse_value(&mut self) -> Parse<ast::Value> {
        if let Some((Token::Newline, span)) = self.stream.peek() {
            return Err(ParseError {
                span: span.clone(),
                message: "Expected a value but reached end of line".into(),
            });
        }
        let (token, span) = self.consume().ok_or_else(|| ParseError {
            span: self.consumed..self.consumed,
            message: "Expected a value but reached end of file".into(),
        })?;

        let text = &self.source[span.clone()];
        let digits = text.replace('_', "");
        let value = match token {
            Token::Word => ast::Value::Word(text.into()),
            Token::LitInt => digits.parse().map(ast::Value::Int).map_err(|_| ParseError {
                span: span.clone(),
                message: format!("Integer {} is out of range", text),
            })?,
            Token::LitFloat => match digits.parse::<F64N>() {
                Ok(float) => ast::Value::Float(float),
                Err(_) => {
                    return Err(ParseError {
                        span,
                        message: format!("Invalid number {}", text),
                    })
                }
            },
            Token::LitRatio => match digits.parse::<Rational>() {
                Ok(ratio) => ast::Value::Ratio(ratio),
                Err(err) => {
                    return Err(ParseError {
                        span,
                        message: format!("Invalid fraction {}: {}", text, err),
                    })
                }
            },
            Token::Error => {
                return Err(ParseError {
                    span,
                    message: format!("Unexpected input {:?}", text),
                })
            }
            other => {
                return Err(ParseError {
                    span,
                    message: format!("Expected a value but got {:?}", other),
                })
            }
        };
        Ok(Node::new(span, value))
    }

    fn parse_word(&mut self) -> Parse<String> {
        let node = self.parse_expect_token(Token::Word)?;
        Ok(Node::new(node.span.clone(), self.source[node.span].into()))
    }
}
