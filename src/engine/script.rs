//! Test script parsing
//!
//! A script is line oriented:
//!
//! ```text
//! # comment
//! Calc|add|[1,2]|ok|3
//! start_batch
//! Calc|add|[2,2]|ok|4
//! Calc|divide|[1,0]|rpcErr|1000
//! end_batch
//! ```
//!
//! Lines are parsed one at a time while the script runs, so a malformed line
//! late in a script does not discard the records already written.

use crate::utils::error::{ConformError, Result};
use serde_json::Value;
use std::io::BufRead;
use thiserror::Error;

/// Directive opening a batch
pub const START_BATCH: &str = "start_batch";
/// Directive closing and sending a batch
pub const END_BATCH: &str = "end_batch";

/// Malformed script input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected 5 '|'-separated fields, found {found}")]
    FieldCount { found: usize },

    #[error("invalid argument list '{text}': {reason}")]
    InvalidArguments { text: String, reason: String },

    #[error("start_batch while a batch is already open")]
    NestedBatch,

    #[error("end_batch without a matching start_batch")]
    UnmatchedEndBatch,

    #[error("script ended inside a batch opened at line {opened_at}")]
    UnterminatedBatch { opened_at: usize },
}

/// Expected outcome carried by a call line
///
/// Kept for downstream comparison tools; the engine never reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    pub status: String,
    pub response: String,
}

/// A parsed call
#[derive(Debug, Clone, PartialEq)]
pub struct CallDescriptor {
    pub interface: String,
    pub method: String,
    pub arguments: Vec<Value>,
    /// Argument array exactly as written in the script
    pub arguments_encoded: String,
    pub expectation: Expectation,
}

/// One executable script line
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptDirective {
    StartBatch,
    EndBatch,
    Call(CallDescriptor),
}

/// Parse one line; blank lines and comments yield `None`
pub fn parse_line(line: &str) -> std::result::Result<Option<ScriptDirective>, ParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    match line {
        START_BATCH => return Ok(Some(ScriptDirective::StartBatch)),
        END_BATCH => return Ok(Some(ScriptDirective::EndBatch)),
        _ => {}
    }

    let fields: Vec<&str> = line.split('|').collect();
    let [interface, method, arguments, status, response] = fields[..] else {
        return Err(ParseError::FieldCount {
            found: fields.len(),
        });
    };

    Ok(Some(ScriptDirective::Call(CallDescriptor {
        interface: interface.to_string(),
        method: method.to_string(),
        arguments: decode_arguments(arguments)?,
        arguments_encoded: arguments.to_string(),
        expectation: Expectation {
            status: status.to_string(),
            response: response.to_string(),
        },
    })))
}

fn decode_arguments(text: &str) -> std::result::Result<Vec<Value>, ParseError> {
    let invalid = |reason: String| ParseError::InvalidArguments {
        text: text.to_string(),
        reason,
    };

    match serde_json::from_str(text) {
        Ok(Value::Array(args)) => Ok(args),
        Ok(_) => Err(invalid("expected a JSON array".to_string())),
        Err(e) => Err(invalid(e.to_string())),
    }
}

/// A directive with its 1-based line number
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub number: usize,
    pub directive: ScriptDirective,
}

/// Lazily parses directives from a reader
pub struct ScriptReader<R> {
    lines: std::io::Lines<R>,
    number: usize,
}

impl<R: BufRead> ScriptReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            number: 0,
        }
    }

    /// Number of the last line read
    pub fn line_number(&self) -> usize {
        self.number
    }
}

impl<R: BufRead> Iterator for ScriptReader<R> {
    type Item = Result<ScriptLine>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(ConformError::Io(e))),
            };
            self.number += 1;

            match parse_line(&line) {
                Ok(Some(directive)) => {
                    return Some(Ok(ScriptLine {
                        number: self.number,
                        directive,
                    }));
                }
                Ok(None) => continue,
                Err(e) => return Some(Err(ConformError::parse(self.number, e))),
            }
        }
    }
}
