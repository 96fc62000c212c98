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


//! Syntax tree of a command file.

use std::fmt;

use crate::lexer::Span;
use musesynth_core::{nonnan::F64N, rational::Rational};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<T> {
    pub span: Span,
    pub data: T,
}

impl<T> Node<T> {
    pub fn new(span: Span, data: T) -> Self {
        Node { span, data }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    pub commands: Vec<Node<Command>>,
}

/// A single line such as `note C4 1/4 glide=E4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub keyword: Node<String>,
    pub args: Vec<Node<Arg>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Value(Value),
    /// `name=value,value,...`
    Named {
        name: Node<String>,
        values: Vec<Node<Value>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Word(String),
    Int(i64),
    Float(F64N),
    Ratio(Rational),
}

impl Value {
    /// Human readable name of the kind of value, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Word(_) => "word",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Ratio(_) => "fraction",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Word(word) => write!(f, "{}", word),
            Value::Int(int) => write!(f, "{}", int),
            Value::Float(float) => write!(f, "{}", float),
            Value::Ratio(ratio) => write!(f, "{}", ratio),
        }
    }
}
