//! This module provides the parser for machine descriptions, utilizing the `pest` crate.
//! The grammar in `grammar.pest` splits the text into lines of tokens; this module turns
//! those lines into directives and transitions and assembles a validated `Spec`.
//!
//! ```text
//! @blank u          # directives override the book-standard defaults
//! @accept yes
//! s [> -> s [> R    # state read -> next write move
//! s 0  -> s 0  R
//! ```

use crate::{
    analyzer::analyze,
    types::{Defaults, LoadError, Move, Spec, State, Symbol, Transition},
};
use pest::{iterators::Pair, Parser as PestParser};
use pest_derive::Parser as PestParser;
use std::collections::HashMap;

/// Derives a `PestParser` for the machine description grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct DescriptionParser;

/// Where each piece of a description came from, used to point validation errors at a line.
#[derive(Debug, Default, Clone)]
pub struct SourceMap {
    /// Line of the last `@blank` directive, 0 when the default is used.
    pub blank: usize,
    /// Line of the last `@left` directive, 0 when the default is used.
    pub left: usize,
    /// Line on which each `(state, read)` transition was defined.
    pub transitions: HashMap<(State, Symbol), usize>,
}

/// A non-empty source line split into its tokens.
struct Line<'a> {
    number: usize,
    tokens: Vec<&'a str>,
}

/// Parses a machine description using the book-standard defaults.
///
/// # Returns
///
/// * `Ok(Spec)` if the description is well formed and passes validation.
/// * `Err(LoadError)` naming the offending line otherwise.
pub fn parse(input: &str) -> Result<Spec, LoadError> {
    parse_with(input, &Defaults::default())
}

/// Parses a machine description, starting from the given default tokens.
pub fn parse_with(input: &str, defaults: &Defaults) -> Result<Spec, LoadError> {
    let mut spec = Spec::with_defaults(defaults);
    let mut source = SourceMap::default();

    for line in lines(input)? {
        if line.tokens[0].starts_with('@') {
            apply_directive(&mut spec, &mut source, &line)?;
        } else {
            add_transition(&mut spec, &mut source, &line)?;
        }
    }

    analyze(&spec, &source)?;

    tracing::debug!(
        start = %spec.start,
        transitions = spec.transition_count(),
        "loaded machine description"
    );

    Ok(spec)
}

/// Runs the grammar and keeps only the lines that hold at least one token.
///
/// Every `line` pair is exactly one source line, empty or not, so lines are numbered by
/// position before the empty ones are dropped.
fn lines(input: &str) -> Result<Vec<Line<'_>>, LoadError> {
    let pairs = DescriptionParser::parse(Rule::description, input).map_err(Box::new)?;

    Ok(pairs
        .flat_map(Pair::into_inner)
        .filter(|p| p.as_rule() == Rule::line)
        .enumerate()
        .filter_map(|(index, pair)| parse_line(index + 1, pair))
        .collect())
}

fn parse_line(number: usize, pair: Pair<'_, Rule>) -> Option<Line<'_>> {
    let tokens: Vec<&str> = pair.into_inner().map(|t| t.as_str()).collect();
    if tokens.is_empty() {
        return None;
    }

    Some(Line { number, tokens })
}

/// Applies an `@name args...` line. Directive names are case-insensitive and the
/// set-valued directives replace the default set.
fn apply_directive(
    spec: &mut Spec,
    source: &mut SourceMap,
    line: &Line,
) -> Result<(), LoadError> {
    let raw_name = &line.tokens[0][1..];
    let name = raw_name.to_ascii_lowercase();
    let args = &line.tokens[1..];

    match name.as_str() {
        "blank" => {
            spec.blank = single(&name, args, line.number)?;
            source.blank = line.number;
        }
        "left" => {
            spec.left = single(&name, args, line.number)?;
            source.left = line.number;
        }
        "start" => spec.start = single(&name, args, line.number)?,
        "accept" => spec.accept = at_least_one(&name, args, line.number)?,
        "reject" => spec.reject = at_least_one(&name, args, line.number)?,
        "halt" => spec.halt = at_least_one(&name, args, line.number)?,
        _ => {
            return Err(LoadError::UnknownDirective {
                line: line.number,
                name: raw_name.to_string(),
            })
        }
    }

    Ok(())
}

fn single(directive: &str, args: &[&str], line: usize) -> Result<String, LoadError> {
    match args {
        [value] => Ok(value.to_string()),
        _ => Err(LoadError::DirectiveArity {
            line,
            directive: directive.to_string(),
            expected: "exactly 1 argument",
            found: args.len(),
        }),
    }
}

fn at_least_one(directive: &str, args: &[&str], line: usize) -> Result<Vec<State>, LoadError> {
    if args.is_empty() {
        return Err(LoadError::DirectiveArity {
            line,
            directive: directive.to_string(),
            expected: "at least 1 state",
            found: 0,
        });
    }

    Ok(args.iter().map(|s| s.to_string()).collect())
}

/// Adds a `state read -> next write move` line to the transition table.
fn add_transition(
    spec: &mut Spec,
    source: &mut SourceMap,
    line: &Line,
) -> Result<(), LoadError> {
    let &[state, read, arrow, next, write, movement] = &line.tokens[..] else {
        return Err(LoadError::MalformedTransition {
            line: line.number,
            found: line.tokens.len(),
        });
    };

    if arrow != "->" {
        return Err(LoadError::BadArrow {
            line: line.number,
            found: arrow.to_string(),
        });
    }

    let movement = movement
        .parse::<Move>()
        .map_err(|token| LoadError::InvalidMove {
            line: line.number,
            token,
        })?;

    let key = (state.to_string(), read.to_string());
    if let Some(&first) = source.transitions.get(&key) {
        return Err(LoadError::DuplicateTransition {
            line: line.number,
            first,
            state: key.0,
            symbol: key.1,
        });
    }

    spec.rules.entry(key.0.clone()).or_default().insert(
        key.1.clone(),
        Transition {
            next_state: next.to_string(),
            write: write.to_string(),
            movement,
        },
    );
    source.transitions.insert(key, line.number);

    Ok(())
}
