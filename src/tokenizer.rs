//! Splits shard text into word tokens.
//!
//! Records are lines: a line break always ends a token, whatever the
//! delimiter policy. Empty pieces between adjacent delimiters are dropped.

use std::str::{Lines, SplitWhitespace};

use regex::Regex;

use crate::config::JobConfig;
use crate::error::{JobError, JobResult};

pub type Token = String;

#[derive(Clone, Debug, Default)]
pub enum DelimiterPolicy {
    /// Unicode whitespace separates words.
    #[default]
    Whitespace,
    /// Every character that is not alphanumeric separates words.
    NonAlphanumeric,
    /// Matches of the regex separate words.
    Pattern(Regex),
}

impl DelimiterPolicy {
    pub fn pattern(pattern: &str) -> JobResult<Self> {
        Regex::new(pattern)
            .map(DelimiterPolicy::Pattern)
            .map_err(|e| JobError::InvalidConfig(format!("bad delimiter pattern: {e}")))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaseNormalization {
    #[default]
    None,
    Lower,
}

impl CaseNormalization {
    fn apply(self, piece: &str) -> Token {
        match self {
            CaseNormalization::None => piece.to_string(),
            CaseNormalization::Lower => piece.to_lowercase(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Tokenizer {
    delimiter: DelimiterPolicy,
    case: CaseNormalization,
}

impl Tokenizer {
    pub fn new(delimiter: DelimiterPolicy, case: CaseNormalization) -> Self {
        Self { delimiter, case }
    }

    pub fn from_config(config: &JobConfig) -> Self {
        Self::new(config.delimiter.clone(), config.case)
    }

    /// Lazily tokenizes `text`. Each call starts from the beginning, so the
    /// same text can be walked as many times as needed.
    pub fn tokens<'a>(&'a self, text: &'a str) -> Tokens<'a> {
        Tokens {
            tokenizer: self,
            lines: text.lines(),
            current: None,
        }
    }
}

pub struct Tokens<'a> {
    tokenizer: &'a Tokenizer,
    lines: Lines<'a>,
    current: Option<Pieces<'a>>,
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(pieces) = self.current.as_mut() {
                if let Some(piece) = pieces.find(|p| !p.is_empty()) {
                    return Some(self.tokenizer.case.apply(piece));
                }
            }
            let line = self.lines.next()?;
            self.current = Some(Pieces::new(&self.tokenizer.delimiter, line));
        }
    }
}

enum Pieces<'a> {
    Whitespace(SplitWhitespace<'a>),
    NonAlphanumeric(std::str::Split<'a, fn(char) -> bool>),
    Pattern(regex::Split<'a, 'a>),
}

impl<'a> Pieces<'a> {
    fn new(delimiter: &'a DelimiterPolicy, line: &'a str) -> Self {
        match delimiter {
            DelimiterPolicy::Whitespace => Pieces::Whitespace(line.split_whitespace()),
            DelimiterPolicy::NonAlphanumeric => {
                Pieces::NonAlphanumeric(line.split(is_non_alphanumeric as fn(char) -> bool))
            }
            DelimiterPolicy::Pattern(re) => Pieces::Pattern(re.split(line)),
        }
    }
}

impl<'a> Iterator for Pieces<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        match self {
            Pieces::Whitespace(it) => it.next(),
            Pieces::NonAlphanumeric(it) => it.next(),
            Pieces::Pattern(it) => it.next(),
        }
    }
}

fn is_non_alphanumeric(c: char) -> bool {
    !c.is_alphanumeric()
}
