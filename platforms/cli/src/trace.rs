//! Step-by-step trace output.

use std::error::Error;
use std::io::Write;
use tmsim::{types::DEFAULT_TAPE_DISPLAY, Machine, RunOptions, Verdict, Window};

/// What to show in a trace.
pub struct Settings {
    /// Where the machine came from, printed in the header.
    pub name: String,
    /// The raw input string.
    pub input: String,
    pub radius: usize,
    /// Print the window every this many steps.
    pub dump_every: usize,
}

/// Runs `machine` like `tmsim::run`, printing a header, the tape window around the head
/// every `dump_every` steps, and a summary.
pub fn run(
    machine: &mut Machine,
    options: &RunOptions,
    settings: &Settings,
    out: &mut impl Write,
) -> Result<Verdict, Box<dyn Error>> {
    let spec = machine.spec().clone();
    writeln!(out, "machine={}", settings.name)?;
    writeln!(out, "blank={} left={} start={}", spec.blank, spec.left, spec.start)?;
    writeln!(
        out,
        "accept=[{}] reject=[{}] halt=[{}]",
        spec.accept.join(", "),
        spec.reject.join(", "),
        spec.halt.join(", ")
    )?;
    writeln!(out, "input={:?}", settings.input)?;
    writeln!(out)?;

    let every = settings.dump_every.max(1);
    for _ in 0..options.max_steps {
        if machine.is_halted() {
            break;
        }
        if machine.steps() % every == 0 {
            let window = machine.window(settings.radius);
            let (cells, marks) = render_window(&window);
            writeln!(
                out,
                "step={} state={} head={} window=[{}..{}]",
                machine.steps(),
                machine.state(),
                machine.head(),
                window.lo,
                window.hi
            )?;
            writeln!(out, "{}", cells)?;
            writeln!(out, "{}", marks.trim_end())?;
            writeln!(out)?;
        }
        machine.step(options.mode)?;
    }

    let verdict = Verdict::of(machine);
    match verdict {
        Verdict::Diverged => writeln!(out, "RESULT: / (did not halt within step limit)")?,
        _ => writeln!(out, "RESULT: {}", verdict)?,
    }
    writeln!(out, "STEPS: {}", machine.steps())?;
    writeln!(out, "FINAL STATE: {}", machine.state())?;
    writeln!(out, "TAPE: {}", machine.tape_string(DEFAULT_TAPE_DISPLAY))?;

    Ok(verdict)
}

/// Renders the window cells and a caret line under the head cell. Each mark is padded to
/// the width of its cell so multi-character symbols stay aligned.
fn render_window(window: &Window) -> (String, String) {
    let mut cells = String::new();
    let mut marks = String::new();

    for (offset, symbol) in window.cells.iter().enumerate() {
        let width = symbol.chars().count();
        let mark = if window.lo + offset == window.head { '^' } else { ' ' };

        cells.push_str(symbol);
        marks.push(mark);
        marks.extend(std::iter::repeat(' ').take(width.saturating_sub(1)));
    }

    (cells, marks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmsim::{parse, Mode, Symbol};

    fn settings(dump_every: usize) -> Settings {
        Settings {
            name: "test".to_string(),
            input: "ab".to_string(),
            radius: 2,
            dump_every,
        }
    }

    fn machine(description: &str) -> Machine {
        let input: Vec<Symbol> = vec!["a".to_string(), "b".to_string()];
        Machine::new(parse(description).unwrap(), input)
    }

    #[test]
    fn test_render_window_aligns_marks() {
        let window = Window {
            lo: 0,
            hi: 2,
            head: 1,
            cells: vec!["[>".to_string(), "a".to_string(), "u".to_string()],
        };

        let (cells, marks) = render_window(&window);
        assert_eq!(cells, "[>au");
        assert_eq!(marks, "  ^ ");
    }

    #[test]
    fn test_trace_output() {
        let mut m = machine("s [> -> s [> R\ns a -> h a S");
        let mut out = Vec::new();

        let verdict = run(&mut m, &RunOptions::default(), &settings(1), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(verdict, Verdict::Output("ab".to_string()));
        assert!(text.starts_with("machine=test\nblank=u left=[> start=s\n"));
        assert!(text.contains("accept=[yes] reject=[no] halt=[h]\n"));
        assert!(text.contains("step=0 state=s head=0 window=[0..2]\n[>ab\n^\n"));
        assert!(text.contains("step=1 state=s head=1 window=[0..3]\n[>abu\n  ^\n"));
        assert!(text.contains("RESULT: ab\nSTEPS: 2\nFINAL STATE: h\nTAPE: [>ab\n"));
    }

    #[test]
    fn test_trace_dump_every() {
        let mut m = machine("s [> -> s [> R\ns a -> s a R\ns b -> s b R\ns u -> h u S");
        let mut out = Vec::new();

        run(&mut m, &RunOptions::default(), &settings(2), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("step=0 "));
        assert!(!text.contains("step=1 "));
        assert!(text.contains("step=2 "));
        assert!(!text.contains("step=3 "));
    }

    #[test]
    fn test_trace_reports_divergence() {
        let mut m = machine("s [> -> s [> R\ns a -> s a R\ns b -> s b R\ns u -> s u R");
        let options = RunOptions {
            max_steps: 10,
            mode: Mode::Normal,
        };
        let mut out = Vec::new();

        let verdict = run(&mut m, &options, &settings(5), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(verdict, Verdict::Diverged);
        assert!(text.contains("RESULT: / (did not halt within step limit)\nSTEPS: 10\n"));
    }

    #[test]
    fn test_trace_strict_error() {
        let mut m = machine("s [> -> s [> R");
        let options = RunOptions {
            mode: Mode::Strict,
            ..RunOptions::default()
        };
        let mut out = Vec::new();

        let error = run(&mut m, &options, &settings(1), &mut out).unwrap_err();
        assert_eq!(error.to_string(), "missing transition for (s, a)");
    }
}
