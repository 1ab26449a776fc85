//! This module defines the core data structures and types used throughout the simulator,
//! including the machine description (`Spec`), transitions, step outcomes and error types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::Rule;

/// A tape symbol. Any non-whitespace token; compared by exact string equality.
pub type Symbol = String;
/// A control state name.
pub type State = String;

/// The book-standard blank symbol.
pub const DEFAULT_BLANK: &str = "u";
/// The book-standard left-end marker.
pub const DEFAULT_LEFT: &str = "[>";
/// The book-standard start state.
pub const DEFAULT_START: &str = "s";
/// The book-standard accepting state.
pub const DEFAULT_ACCEPT: &str = "yes";
/// The book-standard rejecting state.
pub const DEFAULT_REJECT: &str = "no";
/// The book-standard halting state.
pub const DEFAULT_HALT: &str = "h";

/// The maximum allowed size for a machine description in bytes.
pub const MAX_DESCRIPTION_SIZE: usize = 1024 * 1024; // 1MB
/// The default number of steps a caller runs before reporting non-termination.
pub const DEFAULT_MAX_STEPS: usize = 200_000;
/// The default radius of the tape window shown in traces.
pub const DEFAULT_TRACE_RADIUS: usize = 25;
/// The largest tape window radius a trace may ask for.
pub const MAX_TRACE_RADIUS: usize = 1000;
/// The default number of cells shown when rendering the whole tape.
pub const DEFAULT_TAPE_DISPLAY: usize = 200;

/// The tokens a machine description starts from before any directive is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub blank: Symbol,
    pub left: Symbol,
    pub start: State,
    pub accept: State,
    pub reject: State,
    pub halt: State,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            blank: DEFAULT_BLANK.to_string(),
            left: DEFAULT_LEFT.to_string(),
            start: DEFAULT_START.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            reject: DEFAULT_REJECT.to_string(),
            halt: DEFAULT_HALT.to_string(),
        }
    }
}

/// A validated, immutable machine description.
///
/// The halting sets are kept in declaration order: the first halt state is the one the
/// engine falls into when a transition is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Spec {
    /// The symbol an unwritten cell reads as.
    pub blank: Symbol,
    /// The symbol permanently stored in cell 0.
    pub left: Symbol,
    /// The state the machine starts in.
    pub start: State,
    pub accept: Vec<State>,
    pub reject: Vec<State>,
    pub halt: Vec<State>,
    /// Transition table keyed by current state, then by the symbol read.
    pub rules: HashMap<State, HashMap<Symbol, Transition>>,
}

impl Default for Spec {
    fn default() -> Self {
        Self::with_defaults(&Defaults::default())
    }
}

impl Spec {
    /// Creates a spec with no transitions from the given default tokens.
    pub fn with_defaults(defaults: &Defaults) -> Self {
        Self {
            blank: defaults.blank.clone(),
            left: defaults.left.clone(),
            start: defaults.start.clone(),
            accept: vec![defaults.accept.clone()],
            reject: vec![defaults.reject.clone()],
            halt: vec![defaults.halt.clone()],
            rules: HashMap::new(),
        }
    }

    pub fn is_accept(&self, state: &str) -> bool {
        self.accept.iter().any(|s| s == state)
    }

    pub fn is_reject(&self, state: &str) -> bool {
        self.reject.iter().any(|s| s == state)
    }

    pub fn is_halt(&self, state: &str) -> bool {
        self.halt.iter().any(|s| s == state)
    }

    /// Checks whether `state` belongs to any of the three halting sets.
    pub fn is_halting(&self, state: &str) -> bool {
        self.is_accept(state) || self.is_reject(state) || self.is_halt(state)
    }

    /// The state entered when no transition applies in normal mode.
    pub fn halt_state(&self) -> &str {
        self.halt.first().map(String::as_str).unwrap_or(DEFAULT_HALT)
    }

    /// Looks up the transition for `(state, symbol)`.
    pub fn transition(&self, state: &str, symbol: &str) -> Option<&Transition> {
        self.rules.get(state).and_then(|row| row.get(symbol))
    }

    /// Returns all transitions as `(state, read, transition)` sorted by state and symbol.
    pub fn transitions(&self) -> Vec<(&str, &str, &Transition)> {
        let mut all: Vec<_> = self
            .rules
            .iter()
            .flat_map(|(state, row)| {
                row.iter()
                    .map(move |(read, t)| (state.as_str(), read.as_str(), t))
            })
            .collect();
        all.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        all
    }

    /// The number of defined transitions.
    pub fn transition_count(&self) -> usize {
        self.rules.values().map(HashMap::len).sum()
    }
}

impl FromStr for Spec {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::parse(s)
    }
}

/// The right-hand side of a transition: `next write move`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The state the machine moves to.
    pub next_state: State,
    /// The symbol written under the head.
    pub write: Symbol,
    /// The head movement applied after writing.
    pub movement: Move,
}

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    /// Move the head one cell to the left.
    Left,
    /// Move the head one cell to the right.
    Right,
    /// Keep the head on the same cell.
    Stay,
}

impl FromStr for Move {
    type Err = String;

    /// Accepts `L`/`LEFT`/`<`, `R`/`RIGHT`/`>` and `S`/`STAY`/`-`/`0`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" | "LEFT" | "<" => Ok(Move::Left),
            "R" | "RIGHT" | ">" => Ok(Move::Right),
            "S" | "STAY" | "-" | "0" => Ok(Move::Stay),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Move::Left => "L",
            Move::Right => "R",
            Move::Stay => "S",
        };
        f.write_str(s)
    }
}

/// Controls how the engine handles a missing transition.
///
/// - `Normal` (default): the machine falls into its halt state, leaving the tape untouched.
/// - `Strict`: a missing transition is a run-time error.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    Strict,
}

/// The observable result of one applied transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub next_state: State,
    pub write: Symbol,
    pub movement: Move,
}

impl From<&Transition> for Outcome {
    fn from(t: &Transition) -> Self {
        Self {
            next_state: t.next_state.clone(),
            write: t.write.clone(),
            movement: t.movement,
        }
    }
}

/// Errors raised while loading a machine description. Every parse and validation
/// error carries the 1-based source line it refers to.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("line {line}: expected transition `state read -> next write move`, found {found} token(s)")]
    MalformedTransition { line: usize, found: usize },

    #[error("line {line}: expected `->` as the third token of `state read -> next write move`, found `{found}`")]
    BadArrow { line: usize, found: String },

    #[error("line {line}: unknown directive @{name}")]
    UnknownDirective { line: usize, name: String },

    #[error("line {line}: @{directive} expects {expected}, found {found}")]
    DirectiveArity {
        line: usize,
        directive: String,
        expected: &'static str,
        found: usize,
    },

    #[error("line {line}: invalid move `{token}` (expected L/R/S)")]
    InvalidMove { line: usize, token: String },

    #[error("line {line}: duplicate transition for ({state}, {symbol}), first defined on line {first}")]
    DuplicateTransition {
        line: usize,
        first: usize,
        state: State,
        symbol: Symbol,
    },

    #[error("line {line}: blank symbol and left marker must be distinct (both are `{symbol}`)")]
    BlankIsLeftMarker { line: usize, symbol: Symbol },

    #[error("line {line}: invalid transition on left marker: ({state}, {left}) -> ({next_state}, {write}, {movement}); must write {left} and move R")]
    LeftMarkerTransition {
        line: usize,
        state: State,
        left: Symbol,
        next_state: State,
        write: Symbol,
        movement: Move,
    },

    #[error("syntax error: {0}")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),

    #[error("file error: {0}")]
    File(String),
}

impl LoadError {
    /// Returns the source line the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            LoadError::MalformedTransition { line, .. }
            | LoadError::BadArrow { line, .. }
            | LoadError::UnknownDirective { line, .. }
            | LoadError::DirectiveArity { line, .. }
            | LoadError::InvalidMove { line, .. }
            | LoadError::DuplicateTransition { line, .. }
            | LoadError::BlankIsLeftMarker { line, .. }
            | LoadError::LeftMarkerTransition { line, .. } => Some(*line),
            LoadError::Syntax(e) => match &e.line_col {
                pest::error::LineColLocation::Pos((line, _))
                | pest::error::LineColLocation::Span((line, _), _) => Some(*line),
            },
            LoadError::File(_) => None,
        }
    }
}

/// Errors raised while running a machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Only raised in `Mode::Strict`.
    #[error("missing transition for ({state}, {symbol})")]
    MissingTransition { state: State, symbol: Symbol },
}

/// Errors raised while turning an input string into tape symbols.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("input contains the blank symbol `{0}`")]
    ContainsBlank(Symbol),
    #[error("input contains the left-end marker `{0}`")]
    ContainsLeftMarker(Symbol),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_serialization() {
        let left_json = serde_json::to_string(&Move::Left).unwrap();
        let stay_json = serde_json::to_string(&Move::Stay).unwrap();

        assert_eq!(left_json, "\"Left\"");
        assert_eq!(stay_json, "\"Stay\"");

        let left: Move = serde_json::from_str(&left_json).unwrap();
        assert_eq!(left, Move::Left);
    }

    #[test]
    fn test_move_synonyms() {
        for token in ["L", "l", "LEFT", "left", "<"] {
            assert_eq!(token.parse::<Move>(), Ok(Move::Left), "{token}");
        }
        for token in ["R", "r", "Right", ">"] {
            assert_eq!(token.parse::<Move>(), Ok(Move::Right), "{token}");
        }
        for token in ["S", "s", "stay", "-", "0"] {
            assert_eq!(token.parse::<Move>(), Ok(Move::Stay), "{token}");
        }
        assert_eq!("up".parse::<Move>(), Err("up".to_string()));
    }

    #[test]
    fn test_default_spec_tokens() {
        let spec = Spec::default();

        assert_eq!(spec.blank, "u");
        assert_eq!(spec.left, "[>");
        assert_eq!(spec.start, "s");
        assert!(spec.is_accept("yes"));
        assert!(spec.is_reject("no"));
        assert!(spec.is_halt("h"));
        assert!(!spec.is_halting("s"));
        assert_eq!(spec.halt_state(), "h");
        assert_eq!(spec.transition_count(), 0);
    }

    #[test]
    fn test_halt_state_falls_back_when_empty() {
        let mut spec = Spec::default();
        spec.halt.clear();
        assert_eq!(spec.halt_state(), DEFAULT_HALT);
    }

    #[test]
    fn test_error_display() {
        let error = RuntimeError::MissingTransition {
            state: "q0".to_string(),
            symbol: "a".to_string(),
        };
        assert_eq!(error.to_string(), "missing transition for (q0, a)");

        let error = LoadError::InvalidMove {
            line: 3,
            token: "X".to_string(),
        };
        assert_eq!(error.line(), Some(3));
        assert!(error.to_string().contains("invalid move `X`"));
    }
}
