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


//! Evaluating the syntax tree into the events driving the synthesis engine.

use std::collections::VecDeque;

use musesynth_core::{
    duration,
    error::Error,
    event::{DrumPitch, Event, Harmony, NoteRequest, RestRequest},
    note::Pitch,
    rational::Rational,
};
use snafu::Snafu;

use crate::{
    ast::{self, Node},
    lexer::Span,
};

#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum EvalError {
    /// A command that is well formed, but describes an event the engine cannot handle.
    #[snafu(display("{}", error))]
    Engine { span: Span, error: Error },

    #[snafu(display("{}", message))]
    Malformed { span: Span, message: String },
}

impl EvalError {
    pub fn span(&self) -> Span {
        match self {
            EvalError::Engine { span, .. } | EvalError::Malformed { span, .. } => span.clone(),
        }
    }

    /// Attach a source span to an error raised by the engine.
    pub fn at(span: Span, error: Error) -> Self {
        EvalError::Engine { span, error }
    }
}

pub type EvalResult<T> = Result<T, EvalError>;

/// Turn every command into an event, keeping the span of the command it came from.
pub fn eval(root: &Node<ast::Root>) -> EvalResult<Vec<Node<Event>>> {
    root.data
        .commands
        .iter()
        .map(|command| {
            eval_command(command).map(|event| Node::new(command.span.clone(), event))
        })
        .collect()
}

pub fn eval_command(command: &Node<ast::Command>) -> EvalResult<Event> {
    let keyword = &command.data.keyword;
    let mut args = Args::new(command);
    let event = match keyword.data.as_str() {
        "tempo" => Event::Tempo(args.number("a tempo")?),
        "tuning" => Event::Tuning(args.number("a frequency for A4")?),
        "voices" => Event::Voices(args.count("a number of voices")?),
        "instrument" => Event::Instrument {
            voice: args.count("a voice")?,
            pitch: args.drum()?,
        },
        "preference" => Event::Preference {
            name: args.word("a preference name")?.1.to_string(),
            enabled: args.flag()?,
        },
        "note" => {
            let name = args.note_name()?;
            let mut request = NoteRequest::new(name, args.duration()?);
            if let Some((_, values)) = args.option("glide") {
                let target = single(keyword, "glide", values)?;
                request = request.with_glide(note_name(&target.span, &target.data)?);
            }
            if let Some((_, values)) = args.option("harmony") {
                request = request.with_harmony(harmony(values)?);
            }
            Event::Note(request)
        }
        "rest" => Event::Rest(RestRequest {
            duration: args.duration()?,
        }),
        other => {
            return Err(EvalError::at(
                keyword.span.clone(),
                Error::UnsupportedEventKind { kind: other.into() },
            ))
        }
    };
    args.finish()?;
    Ok(event)
}

/// The arguments of a command that have not been used yet.
struct Args<'a> {
    keyword: &'a str,
    span: Span,
    positional: VecDeque<(Span, &'a ast::Value)>,
    options: Vec<(&'a Node<String>, &'a [Node<ast::Value>])>,
}

impl<'a> Args<'a> {
    fn new(command: &'a Node<ast::Command>) -> Self {
        let mut positional = VecDeque::new();
        let mut options = Vec::new();
        for arg in &command.data.args {
            match &arg.data {
                ast::Arg::Value(value) => positional.push_back((arg.span.clone(), value)),
                ast::Arg::Named { name, values } => options.push((name, values.as_slice())),
            }
        }
        Args {
            keyword: &command.data.keyword.data,
            span: command.span.clone(),
            positional,
            options,
        }
    }

    fn malformed<T>(&self, span: Span, message: String) -> EvalResult<T> {
        Err(EvalError::Malformed { span, message })
    }

    fn next(&mut self, expected: &str) -> EvalResult<(Span, &'a ast::Value)> {
        match self.positional.pop_front() {
            Some(arg) => Ok(arg),
            None => self.malformed(
                self.span.clone(),
                format!("`{}` expects {}", self.keyword, expected),
            ),
        }
    }

    fn number(&mut self, expected: &str) -> EvalResult<f64> {
        let (span, value) = self.next(expected)?;
        match value {
            ast::Value::Int(int) => Ok(*int as f64),
            ast::Value::Float(float) => Ok(float.into_inner()),
            ast::Value::Ratio(ratio) => Ok(ratio.to_f64()),
            other => self.malformed(
                span,
                format!("Expected {} but got {} {}", expected, other.kind(), other),
            ),
        }
    }

    fn count(&mut self, expected: &str) -> EvalResult<usize> {
        let (span, value) = self.next(expected)?;
        match value {
            ast::Value::Int(int) if *int >= 0 => Ok(*int as usize),
            other => self.malformed(
                span,
                format!("Expected {} but got {}", expected, other),
            ),
        }
    }

    fn drum(&mut self) -> EvalResult<DrumPitch> {
        let (span, value) = self.next("a drum pitch")?;
        match value {
            ast::Value::Int(int) if (0..=127).contains(int) => Ok(*int as DrumPitch),
            other => self.malformed(
                span,
                format!("Expected a MIDI drum pitch between 0 and 127 but got {}", other),
            ),
        }
    }

    fn word(&mut self, expected: &str) -> EvalResult<(Span, &'a str)> {
        let (span, value) = self.next(expected)?;
        match value {
            ast::Value::Word(word) => Ok((span, word.as_str())),
            other => self.malformed(
                span,
                format!("Expected {} but got {} {}", expected, other.kind(), other),
            ),
        }
    }

    /// An optional `true` or `false`, defaulting to `true`.
    fn flag(&mut self) -> EvalResult<bool> {
        if self.positional.is_empty() {
            return Ok(true);
        }
        match self.word("true or false")? {
            (_, "true") => Ok(true),
            (_, "false") => Ok(false),
            (span, other) => self.malformed(span, format!("Expected true or false but got {}", other)),
        }
    }

    fn note_name(&mut self) -> EvalResult<String> {
        let (span, value) = self.next("a note name")?;
        note_name(&span, value)
    }

    fn duration(&mut self) -> EvalResult<Rational> {
        let (span, value) = self.next("a duration")?;
        let duration = match value {
            ast::Value::Ratio(ratio) => *ratio,
            ast::Value::Int(int) => Rational::int(*int),
            other => {
                return self.malformed(
                    span,
                    format!("Expected a duration such as 1/4 but got {}", other),
                )
            }
        };
        duration::validate(duration).map_err(|error| EvalError::at(span, error))
    }

    fn option(&mut self, name: &str) -> Option<(&'a Node<String>, &'a [Node<ast::Value>])> {
        let index = self
            .options
            .iter()
            .position(|(option, _)| option.data == name)?;
        Some(self.options.remove(index))
    }

    /// Fail if any argument was not used by the command.
    fn finish(self) -> EvalResult<()> {
        if let Some((span, value)) = self.positional.front() {
            return self.malformed(
                span.clone(),
                format!("Unexpected argument {} for `{}`", value, self.keyword),
            );
        }
        if let Some((name, _)) = self.options.first() {
            return self.malformed(
                name.span.clone(),
                format!("Unknown option {} for `{}`", name.data, self.keyword),
            );
        }
        Ok(())
    }
}

fn single<'a>(
    keyword: &Node<String>,
    option: &str,
    values: &'a [Node<ast::Value>],
) -> EvalResult<&'a Node<ast::Value>> {
    match values {
        [value] => Ok(value),
        [_, extra, ..] => Err(EvalError::Malformed {
            span: extra.span.clone(),
            message: format!("`{}` takes a single {}", keyword.data, option),
        }),
        [] => Err(EvalError::Malformed {
            span: keyword.span.clone(),
            message: format!("Missing value for {}", option),
        }),
    }
}

fn note_name(span: &Span, value: &ast::Value) -> EvalResult<String> {
    match value {
        ast::Value::Word(name) => Pitch::parse(name)
            .map(|_| name.clone())
            .map_err(|error| EvalError::at(span.clone(), error)),
        other => Err(EvalError::Malformed {
            span: span.clone(),
            message: format!("Expected a note name such as C#4 but got {}", other),
        }),
    }
}

/// `_` leaves a voice undeclared, a number sets its subdivision.
fn harmony(values: &[Node<ast::Value>]) -> EvalResult<Harmony> {
    values
        .iter()
        .map(|value| match &value.data {
            ast::Value::Word(word) if word == "_" => Ok(None),
            ast::Value::Int(count) if *count >= 0 && *count <= u32::MAX as i64 => {
                Ok(Some(*count as u32))
            }
            other => Err(EvalError::Malformed {
                span: value.span.clone(),
                message: format!("Expected a subdivision or _ but got {}", other),
            }),
        })
        .collect::<EvalResult<Vec<_>>>()
        .map(Harmony::new)
}
