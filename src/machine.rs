//! This module defines the `Machine` struct, which simulates a single-tape Turing machine
//! on a right-infinite tape with a fixed left-end marker. It owns the tape, head position,
//! current state and step counter, and shares the read-only `Spec`.

use std::sync::Arc;

use crate::tape::Tape;
use crate::types::{Mode, Move, Outcome, RuntimeError, Spec, State, Symbol, MAX_TRACE_RADIUS};

/// The control-level status of a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Accepted,
    Rejected,
    Halted,
}

/// A window of cells around the head, used for traces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// Index of the first cell shown.
    pub lo: usize,
    /// Index of the last cell shown.
    pub hi: usize,
    /// Head position.
    pub head: usize,
    pub cells: Vec<Symbol>,
}

/// A running instance of a `Spec` on one input.
#[derive(Debug, Clone)]
pub struct Machine {
    spec: Arc<Spec>,
    tape: Tape,
    head: usize,
    state: State,
    steps: usize,
}

impl Machine {
    /// Creates a machine in the start state with the head on cell 0 and `input` in cells
    /// `1..=n`. The input must not contain the blank symbol or the left marker;
    /// `input::tokenize` enforces that.
    pub fn new(spec: impl Into<Arc<Spec>>, input: Vec<Symbol>) -> Self {
        let spec = spec.into();
        Self {
            tape: Tape::new(&spec.left, &spec.blank, input),
            head: 0,
            state: spec.start.clone(),
            steps: 0,
            spec,
        }
    }

    /// Executes a single transition.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(outcome))` if a transition was applied.
    /// * `Ok(None)` if the machine was already halted, or if no transition was defined and
    ///   `mode` is `Normal`; the machine is then in its halt state with the tape untouched.
    /// * `Err(RuntimeError::MissingTransition)` if no transition was defined in `Strict` mode.
    pub fn step(&mut self, mode: Mode) -> Result<Option<Outcome>, RuntimeError> {
        if self.is_halted() {
            return Ok(None);
        }

        let spec = Arc::clone(&self.spec);
        let read = self.read();

        let Some(transition) = spec.transition(&self.state, read) else {
            return match mode {
                Mode::Normal => {
                    tracing::debug!(
                        state = %self.state,
                        symbol = read,
                        steps = self.steps,
                        "no transition, halting"
                    );
                    self.state = spec.halt_state().to_string();
                    Ok(None)
                }
                Mode::Strict => Err(RuntimeError::MissingTransition {
                    state: self.state.clone(),
                    symbol: read.to_string(),
                }),
            };
        };

        self.tape.write(self.head, transition.write.clone());

        match transition.movement {
            Move::Left => self.head = self.head.saturating_sub(1),
            Move::Right => {
                self.head += 1;
                self.tape.visit(self.head);
            }
            Move::Stay => {}
        }

        self.state = transition.next_state.clone();
        self.steps += 1;

        tracing::trace!(
            step = self.steps,
            state = %self.state,
            head = self.head,
            "applied transition"
        );

        Ok(Some(Outcome::from(transition)))
    }

    /// Checks if the current state belongs to any halting set.
    pub fn is_halted(&self) -> bool {
        self.spec.is_halting(&self.state)
    }

    /// Classifies the current state. Accept is checked before reject, reject before halt.
    pub fn status(&self) -> Status {
        if self.spec.is_accept(&self.state) {
            Status::Accepted
        } else if self.spec.is_reject(&self.state) {
            Status::Rejected
        } else if self.spec.is_halt(&self.state) {
            Status::Halted
        } else {
            Status::Running
        }
    }

    /// Returns the machine's output: `yes` in an accepting state, `no` in a rejecting
    /// state, otherwise the tape contents after the left marker up to the last non-blank
    /// cell. Callers that ran out of steps report `/` instead of calling this.
    pub fn output(&self) -> String {
        match self.status() {
            Status::Accepted => "yes".to_string(),
            Status::Rejected => "no".to_string(),
            Status::Halted | Status::Running => self.tape.content(),
        }
    }

    /// The symbol under the head.
    pub fn read(&self) -> &str {
        self.tape.read(self.head)
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn head(&self) -> usize {
        self.head
    }

    /// Returns the number of transitions applied so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn spec(&self) -> &Arc<Spec> {
        &self.spec
    }

    /// Returns the cells within `radius` of the head, clamped at cell 0.
    /// The radius is capped at `MAX_TRACE_RADIUS`.
    pub fn window(&self, radius: usize) -> Window {
        let radius = radius.min(MAX_TRACE_RADIUS);
        let lo = self.head.saturating_sub(radius);
        let hi = self.head.saturating_add(radius);

        Window {
            lo,
            hi,
            head: self.head,
            cells: (lo..=hi).map(|pos| self.tape.read(pos).to_string()).collect(),
        }
    }

    /// Renders the tape from the left marker up to `max_len` cells.
    pub fn tape_string(&self, max_len: usize) -> String {
        self.tape.render(max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn symbols(input: &[&str]) -> Vec<Symbol> {
        input.iter().map(|s| s.to_string()).collect()
    }

    fn machine(description: &str, input: &[&str]) -> Machine {
        Machine::new(parse(description).unwrap(), symbols(input))
    }

    #[test]
    fn test_machine_creation() {
        let m = machine("", &["a", "b"]);

        assert_eq!(m.state(), "s");
        assert_eq!(m.head(), 0);
        assert_eq!(m.steps(), 0);
        assert_eq!(m.read(), "[>");
        assert_eq!(m.status(), Status::Running);
    }

    #[test]
    fn test_single_step() {
        let mut m = machine("s [> -> s [> R\ns a -> q x R", &["a", "b"]);

        let outcome = m.step(Mode::Normal).unwrap().unwrap();
        assert_eq!(outcome.next_state, "s");
        assert_eq!(outcome.write, "[>");
        assert_eq!(outcome.movement, Move::Right);
        assert_eq!(m.head(), 1);
        assert_eq!(m.read(), "a");

        m.step(Mode::Normal).unwrap();
        assert_eq!(m.state(), "q");
        assert_eq!(m.tape().read(1), "x");
        assert_eq!(m.head(), 2);
        assert_eq!(m.steps(), 2);
    }

    #[test]
    fn test_accepts_immediately() {
        let mut m = machine("@accept yes\ns [> -> yes [> R", &["a"]);

        m.step(Mode::Normal).unwrap();
        assert!(m.is_halted());
        assert_eq!(m.status(), Status::Accepted);
        assert_eq!(m.output(), "yes");
    }

    #[test]
    fn test_rejects() {
        let mut m = machine("s [> -> no [> R", &[]);

        m.step(Mode::Normal).unwrap();
        assert_eq!(m.status(), Status::Rejected);
        assert_eq!(m.output(), "no");
    }

    #[test]
    fn test_accept_is_checked_before_reject() {
        let m = machine("@accept s\n@reject s", &[]);
        assert_eq!(m.status(), Status::Accepted);
        assert_eq!(m.output(), "yes");
    }

    #[test]
    fn test_halted_machine_does_not_step() {
        let mut m = machine("@start h\nh [> -> s [> R", &["a"]);

        assert!(m.is_halted());
        assert_eq!(m.step(Mode::Strict), Ok(None));
        assert_eq!(m.steps(), 0);
        assert_eq!(m.head(), 0);
    }

    #[test]
    fn test_missing_transition_halts_implicitly() {
        let mut m = machine("", &["a", "b"]);

        assert_eq!(m.step(Mode::Normal), Ok(None));
        assert_eq!(m.state(), "h");
        assert_eq!(m.status(), Status::Halted);
        assert_eq!(m.steps(), 0);
        assert_eq!(m.output(), "ab");
    }

    #[test]
    fn test_missing_transition_uses_first_halt_state() {
        let mut m = machine("@halt done stop", &["a"]);

        m.step(Mode::Normal).unwrap();
        assert_eq!(m.state(), "done");
        assert!(m.is_halted());
    }

    #[test]
    fn test_missing_transition_in_strict_mode() {
        let mut m = machine("", &["a", "b"]);

        let error = m.step(Mode::Strict).unwrap_err();
        assert_eq!(
            error,
            RuntimeError::MissingTransition {
                state: "s".to_string(),
                symbol: "[>".to_string(),
            }
        );
        assert_eq!(m.state(), "s");
        assert!(!m.is_halted());
    }

    #[test]
    fn test_move_right_over_input_then_halt() {
        let description = "s [> -> s [> R\ns a -> s a R\ns b -> s b R\ns u -> h u S";
        let mut m = machine(description, &["a", "b"]);

        while !m.is_halted() {
            m.step(Mode::Strict).unwrap();
        }

        assert_eq!(m.steps(), 4);
        assert_eq!(m.head(), 3);
        assert_eq!(m.output(), "ab");
    }

    #[test]
    fn test_multi_character_symbols_are_concatenated() {
        let description = "s [> -> h [> R";
        let mut m = machine(description, &["ab", "cd"]);

        m.step(Mode::Normal).unwrap();
        assert_eq!(m.output(), "abcd");
    }

    #[test]
    fn test_output_drops_trailing_blanks() {
        let description = "s [> -> s [> R\ns a -> s a R\ns b -> t u L\nt a -> h a S";
        let mut m = machine(description, &["a", "b"]);

        while !m.is_halted() {
            m.step(Mode::Strict).unwrap();
        }

        assert_eq!(m.output(), "a");
    }

    #[test]
    fn test_output_keeps_interior_blanks() {
        let description = "s [> -> s [> R\ns a -> s u R\ns b -> h b S";
        let mut m = machine(description, &["a", "b"]);

        while !m.is_halted() {
            m.step(Mode::Normal).unwrap();
        }

        assert_eq!(m.output(), "ub");
    }

    #[test]
    fn test_output_of_erased_tape_is_empty() {
        let description = "s [> -> s [> R\ns a -> h u S";
        let mut m = machine(description, &["a"]);

        m.step(Mode::Normal).unwrap();
        m.step(Mode::Normal).unwrap();
        assert_eq!(m.output(), "");
    }

    #[test]
    fn test_left_moves_clamp_at_cell_zero() {
        // Built by hand: the loader would reject a left move off the marker.
        let mut spec = Spec::default();
        spec.rules.entry("s".to_string()).or_default().insert(
            "[>".to_string(),
            crate::types::Transition {
                next_state: "s".to_string(),
                write: "x".to_string(),
                movement: Move::Left,
            },
        );
        let mut m = Machine::new(spec, vec![]);

        m.step(Mode::Normal).unwrap();
        assert_eq!(m.head(), 0);
        assert_eq!(m.read(), "[>");
        assert_eq!(m.tape().read(0), "[>");
    }

    #[test]
    fn test_stay_keeps_head() {
        let mut m = machine("s [> -> s [> R\ns a -> t b S", &["a"]);

        m.step(Mode::Normal).unwrap();
        m.step(Mode::Normal).unwrap();
        assert_eq!(m.head(), 1);
        assert_eq!(m.read(), "b");
    }

    #[test]
    fn test_window() {
        let mut m = machine("s [> -> s [> R\ns a -> s a R", &["a", "a", "a"]);
        for _ in 0..3 {
            m.step(Mode::Normal).unwrap();
        }

        let window = m.window(2);
        assert_eq!(window.lo, 1);
        assert_eq!(window.hi, 5);
        assert_eq!(window.head, 3);
        assert_eq!(window.cells, symbols(&["a", "a", "a", "u", "u"]));

        let window = m.window(10);
        assert_eq!(window.lo, 0);
        assert_eq!(window.cells[0], "[>");
    }

    #[test]
    fn test_window_radius_is_capped() {
        let mut m = machine("s [> -> s [> R\ns a -> s a R", &["a"]);
        m.step(Mode::Normal).unwrap();

        let window = m.window(usize::MAX);
        assert_eq!(window.lo, 0);
        assert_eq!(window.hi, 1 + MAX_TRACE_RADIUS);
        assert_eq!(window.cells.len(), MAX_TRACE_RADIUS + 2);
        assert_eq!(window.cells[1], "a");
    }

    #[test]
    fn test_tape_string_tracks_rightmost() {
        let mut m = machine("s [> -> s [> R\ns a -> s a R\ns u -> t u L", &["a"]);
        for _ in 0..3 {
            m.step(Mode::Normal).unwrap();
        }

        assert_eq!(m.head(), 1);
        assert_eq!(m.tape_string(200), "[>au");
        assert_eq!(m.tape_string(0), "[>...");
    }

    #[test]
    fn test_machines_share_spec() {
        let spec = Arc::new(parse("s [> -> h [> R").unwrap());
        let a = Machine::new(Arc::clone(&spec), symbols(&["a"]));
        let b = Machine::new(Arc::clone(&spec), symbols(&["b"]));

        assert!(Arc::ptr_eq(a.spec(), b.spec()));
        assert_eq!(Arc::strong_count(&spec), 3);
    }
}
