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


//! Compiling a command file into a listing of score actions.

use std::io::{self, Write};

use log::{error, info};
use musesynth_engine::{action::Action, config::Config, driver::Driver};
use musesynth_lang::{
    eval::{self, EvalError},
    lexer::Span,
    line_map::LineMap,
    parser::{self, ParseError},
};
use snafu::Snafu;

#[derive(Debug, Snafu)]
pub enum CompileError {
    #[snafu(display("Found {} syntax errors", errors.len()))]
    Syntax { errors: Vec<ParseError> },

    #[snafu(display("{}", error))]
    Eval { error: EvalError },
}

impl CompileError {
    /// All problems, each with the part of the source it refers to.
    pub fn diagnostics(&self) -> Vec<(Span, String)> {
        match self {
            CompileError::Syntax { errors } => errors
                .iter()
                .map(|error| (error.span(), error.to_string()))
                .collect(),
            CompileError::Eval { error } => vec![(error.span(), error.to_string())],
        }
    }
}

/// Parse, evaluate and synthesize a command file.
pub fn compile_str(source: &str, config: Config) -> Result<Vec<Action>, CompileError> {
    let root = parser::parse(source).map_err(|errors| CompileError::Syntax { errors })?;
    let events = eval::eval(&root).map_err(|error| CompileError::Eval { error })?;

    info!("synthesizing {} events", events.len());
    let mut driver = Driver::new(config, Vec::new());
    for event in &events {
        driver
            .process(&event.data)
            .map_err(|error| CompileError::Eval {
                error: EvalError::at(event.span.clone(), error),
            })?;
    }
    Ok(driver.finish())
}

/// Like [`compile_str`], but logs every problem together with the offending source lines.
pub fn compile(input_name: &str, source: &str, config: Config) -> io::Result<Vec<Action>> {
    compile_str(source, config).map_err(|err| {
        let lines = LineMap::new(source);
        for (span, message) in err.diagnostics() {
            log_error(input_name, &lines, &span, &message);
        }
        io::Error::new(io::ErrorKind::InvalidData, err)
    })
}

/// Write one line per action.
pub fn write_listing<W: Write>(mut out: W, actions: &[Action]) -> io::Result<()> {
    for action in actions {
        writeln!(out, "{}", action)?;
    }
    out.flush()
}

fn log_error(input_name: &str, lines: &LineMap, span: &Span, message: &str) {
    use std::fmt::Write;
    let mut buf = String::new();
    let (start, end) = lines.span_pos(span);
    let _ = writeln!(&mut buf, "error: {} ({} {}-{})", message, input_name, start, end);
    let _ = write!(&mut buf, "{}", lines.highlight(span, true));
    error!("{}", buf);
}

#[cfg(test)]
mod test {
    use super::*;
    use musesynth_core::error::Error;

    fn measure(actions: &[Action]) -> i64 {
        match actions.last() {
            Some(Action::SetMeasureLength { units }) => *units,
            other => panic!("expected a measure length, got {:?}", other),
        }
    }

    #[test]
    fn compile_demo() {
        let actions = compile_str(include_str!("../demos/siren.mus"), Config::default()).unwrap();
        assert!(measure(&actions) > 0);

        let labels: Vec<_> = actions
            .iter()
            .filter_map(|action| match action {
                Action::SetTempo {
                    label: Some(label), ..
                } => Some(label.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["C4", "E4", "G4", "C4", "C5", "A3"]);

        // the snare only plays along where a harmony asks for it
        assert!(actions.iter().any(|action| matches!(
            action,
            Action::PlayUnit {
                instrument: 38,
                voice: 1,
                ..
            }
        )));
        assert!(actions.iter().any(|action| matches!(
            action,
            Action::BeginTuplet {
                actual_notes: 3,
                normal_notes: 2,
                voice: 1,
                ..
            }
        )));
    }

    #[test]
    fn listing() {
        let actions = compile_str("voices 1\nrest 3/128", Config::default()).unwrap();
        let mut out = Vec::new();
        write_listing(&mut out, &actions).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "tempo 120.000\nv0 rest 64th\nv0 rest 128th\nmeasure 3/128\n"
        );
    }

    #[test]
    fn configured_defaults() {
        let config = Config {
            default_division: 2,
            default_instrument: 35,
            display_tempos: false,
        };
        let actions = compile_str("voices 1\nnote A4 1/4", config).unwrap();
        match &actions[0] {
            Action::SetTempo { bpm, .. } => assert_eq!(*bpm, 412.5),
            other => panic!("expected a tempo, got {:?}", other),
        }
        assert_eq!(actions[1].to_string(), "v0 play 35 256th");
    }

    #[test]
    fn syntax_errors_are_collected() {
        let err = compile_str("voices 1;\nrest 1/0\n", Config::default()).unwrap_err();
        assert_eq!(err.to_string(), "Found 2 syntax errors");
        let spans: Vec<_> = err.diagnostics().into_iter().map(|(span, _)| span).collect();
        assert_eq!(spans, vec![8..9, 15..18]);
    }

    #[test]
    fn engine_errors_point_at_the_event() {
        let err = compile_str("tempo 90\nnote C4 1/4\n", Config::default()).unwrap_err();
        match err {
            CompileError::Eval {
                error: EvalError::Engine { span, error },
            } => {
                assert_eq!(span, 9..20);
                assert_eq!(error, Error::MissingVoiceConfiguration {});
            }
            other => panic!("unexpected error {:?}", other),
        }

        let err = compile("test", "voices 1\nnote C4 1/4\nvoices 2", Config::default())
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
