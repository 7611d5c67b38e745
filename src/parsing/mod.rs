mod js_parser;
mod js_tokenizer;

use crate::coord::Pos;
use crate::tree::Tree;
use std::fmt;

pub use js_parser::JsParser;

/// Turns source text into a [`Tree`] whose nodes carry spans (1-indexed lines, 0-indexed
/// columns).
pub trait Parse: fmt::Debug {
    fn name(&self) -> &str;

    fn parse(&mut self, source: &str) -> Result<Tree, ParseError>;
}

/// Malformed source. Fatal to the operation that needed the tree, but the previous tree (if any)
/// remains usable.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{}{message}", fmt_pos(.pos))]
pub struct ParseError {
    pub pos: Option<Pos>,
    pub message: String,
}

fn fmt_pos(pos: &Option<Pos>) -> String {
    match pos {
        Some(pos) => format!("at {}: ", pos),
        None => String::new(),
    }
}

impl ParseError {
    pub fn new(pos: Pos, message: impl Into<String>) -> ParseError {
        ParseError {
            pos: Some(pos),
            message: message.into(),
        }
    }
}
