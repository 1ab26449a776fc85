//! A right-infinite tape stored sparsely.
//!
//! Cell 0 always holds the left-end marker and is never stored; only non-blank cells from
//! index 1 onward are kept, so any missing cell reads as the blank symbol.

use std::collections::BTreeMap;

use crate::types::Symbol;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    left: Symbol,
    blank: Symbol,
    cells: BTreeMap<usize, Symbol>,
    rightmost: usize,
}

impl Tape {
    /// Creates a tape holding `input` in cells `1..=input.len()`.
    pub fn new(left: &str, blank: &str, input: impl IntoIterator<Item = Symbol>) -> Self {
        let mut tape = Self {
            left: left.to_string(),
            blank: blank.to_string(),
            cells: BTreeMap::new(),
            rightmost: 0,
        };

        for (i, symbol) in input.into_iter().enumerate() {
            tape.rightmost = i + 1;
            tape.write(i + 1, symbol);
        }

        tape
    }

    /// Reads the symbol at `pos`. Cell 0 always yields the left marker.
    pub fn read(&self, pos: usize) -> &str {
        if pos == 0 {
            return &self.left;
        }
        self.cells.get(&pos).unwrap_or(&self.blank)
    }

    /// Writes `symbol` at `pos`. Writes to cell 0 are ignored; writing blank frees the cell.
    pub fn write(&mut self, pos: usize, symbol: Symbol) {
        if pos == 0 {
            return;
        }
        if symbol == self.blank {
            self.cells.remove(&pos);
        } else {
            self.cells.insert(pos, symbol);
        }
    }

    /// Records that the head reached `pos`.
    pub fn visit(&mut self, pos: usize) {
        self.rightmost = self.rightmost.max(pos);
    }

    /// The highest cell index reached so far. Only used for display.
    pub fn rightmost(&self) -> usize {
        self.rightmost
    }

    /// The index of the last non-blank cell, or 0 if cells 1.. are all blank.
    pub fn last_non_blank(&self) -> usize {
        self.cells.keys().next_back().copied().unwrap_or(0)
    }

    /// The tape contents after the left marker up to the last non-blank cell.
    ///
    /// Interior blanks are rendered as the blank symbol and symbols are joined without a
    /// separator, so multi-character symbols lose their boundaries.
    pub fn content(&self) -> String {
        (1..=self.last_non_blank())
            .map(|pos| self.read(pos))
            .collect()
    }

    /// Renders the marker followed by cells up to `min(rightmost, max_len)`, with a trailing
    /// `...` when cells were cut off.
    pub fn render(&self, max_len: usize) -> String {
        let hi = self.rightmost.min(max_len);
        let mut out: String = (0..=hi).map(|pos| self.read(pos)).collect();
        if self.rightmost > hi {
            out.push_str("...");
        }
        out
    }
}
