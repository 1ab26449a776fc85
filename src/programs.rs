use crate::types::Spec;

use std::sync::Arc;

// Embedded machine descriptions
const PROGRAM_TEXTS: [(&str, &str); 4] = [
    ("successor", include_str!("../machines/successor.tm")),
    ("palindrome", include_str!("../machines/palindrome.tm")),
    ("unary-addition", include_str!("../machines/unary-addition.tm")),
    ("runaway", include_str!("../machines/runaway.tm")),
];

/// A built-in machine.
#[derive(Debug, Clone)]
pub struct Program {
    pub name: &'static str,
    /// The first comment line of the description.
    pub description: String,
    pub source: &'static str,
    pub spec: Arc<Spec>,
}

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<Program> = load();
}

fn load() -> Vec<Program> {
    PROGRAM_TEXTS
        .iter()
        .filter_map(|&(name, source)| match crate::parser::parse(source) {
            Ok(spec) => Some(Program {
                name,
                description: describe(source),
                source,
                spec: Arc::new(spec),
            }),
            Err(e) => {
                tracing::error!(program = name, error = %e, "failed to parse built-in program");
                None
            }
        })
        .collect()
}

fn describe(source: &str) -> String {
    source
        .lines()
        .find_map(|line| line.trim().strip_prefix('#'))
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its name
    pub fn get(name: &str) -> Option<&'static Program> {
        PROGRAMS.iter().find(|program| program.name == name)
    }

    /// List all program names
    pub fn names() -> Vec<&'static str> {
        PROGRAMS.iter().map(|program| program.name).collect()
    }
}
