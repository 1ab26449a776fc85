//! This module provides the checks applied to a fully assembled `Spec` before it is handed
//! to the engine. Only the left-end marker contract is enforced: missing transitions and
//! unreachable states are legal and simply cause an implicit halt at run time.

use crate::parser::SourceMap;
use crate::types::{LoadError, Move, Spec};

type Check = fn(&Spec, &SourceMap) -> Result<(), LoadError>;

/// Analyzes a `Spec` and reports the first violated check.
///
/// Checks run in order: the blank symbol must differ from the left marker, then every
/// transition reading the left marker must write it back and move right.
pub fn analyze(spec: &Spec, source: &SourceMap) -> Result<(), LoadError> {
    const CHECKS: [Check; 2] = [check_distinct_markers, check_left_marker_transitions];

    CHECKS.iter().try_for_each(|check| check(spec, source))
}

/// The blank symbol and the left-end marker must be distinct.
///
/// The error points at whichever of `@blank`/`@left` appeared last.
fn check_distinct_markers(spec: &Spec, source: &SourceMap) -> Result<(), LoadError> {
    if spec.blank == spec.left {
        return Err(LoadError::BlankIsLeftMarker {
            line: source.blank.max(source.left),
            symbol: spec.blank.clone(),
        });
    }

    Ok(())
}

/// Every transition that reads the left marker must write the left marker and move right,
/// so the head can never fall off the left end and cell 0 is never overwritten.
///
/// Transitions are examined in source order so the earliest violation is reported.
fn check_left_marker_transitions(spec: &Spec, source: &SourceMap) -> Result<(), LoadError> {
    let mut on_marker: Vec<_> = spec
        .rules
        .iter()
        .filter_map(|(state, row)| row.get(&spec.left).map(|t| (state, t)))
        .map(|(state, t)| {
            let line = source
                .transitions
                .get(&(state.clone(), spec.left.clone()))
                .copied()
                .unwrap_or_default();
            (line, state, t)
        })
        .collect();
    on_marker.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

    match on_marker
        .into_iter()
        .find(|(_, _, t)| t.write != spec.left || t.movement != Move::Right)
    {
        Some((line, state, t)) => Err(LoadError::LeftMarkerTransition {
            line,
            state: state.clone(),
            left: spec.left.clone(),
            next_state: t.next_state.clone(),
            write: t.write.clone(),
            movement: t.movement,
        }),
        None => Ok(()),
    }
}
