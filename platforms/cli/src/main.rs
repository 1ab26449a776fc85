mod trace;

use clap::Parser;
use std::error::Error;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tmsim::{
    run,
    types::{DEFAULT_MAX_STEPS, DEFAULT_TRACE_RADIUS, MAX_TRACE_RADIUS},
    Machine, Mode, ProgramManager, Report, RunOptions, Spec, SpecLoader, PROGRAMS,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// A single-tape Turing machine simulator (left-end marker, blank, yes/no/h states).
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
  tmsim-cli machines/successor.tm --input 1011
  tmsim-cli --builtin palindrome --input abba --trace
  cat machines/runaway.tm | tmsim-cli --max-steps 1000")]
struct Cli {
    /// Path to a machine description (.tm).
    /// Can also be piped via stdin.
    machine: Option<PathBuf>,

    /// Run a built-in machine instead of a file
    #[arg(short, long, conflicts_with = "machine")]
    builtin: Option<String>,

    /// List the built-in machines and exit
    #[arg(long)]
    list: bool,

    /// Input x: a string of one-character symbols, or whitespace-separated symbols
    #[arg(short, long, default_value = "")]
    input: String,

    /// Step limit; a machine still running after this many steps outputs `/`
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Fail on missing transitions instead of halting
    #[arg(long)]
    strict: bool,

    /// Print a per-step trace
    #[arg(short, long)]
    trace: bool,

    /// Trace window radius
    #[arg(long, default_value_t = DEFAULT_TRACE_RADIUS, value_parser = parse_radius)]
    radius: usize,

    /// Trace: print every k steps
    #[arg(long, default_value_t = 1)]
    dump_every: usize,

    /// Print the result as JSON
    #[arg(long, conflicts_with = "trace")]
    json: bool,
}

/// Accepts a window radius between 0 and `MAX_TRACE_RADIUS`.
fn parse_radius(s: &str) -> Result<usize, String> {
    let radius: usize = s
        .parse()
        .map_err(|e| format!("`{}` is not a valid radius: {}", s, e))?;

    if radius > MAX_TRACE_RADIUS {
        return Err(format!("radius must be at most {}", MAX_TRACE_RADIUS));
    }

    Ok(radius)
}

fn main() {
    init_logging();

    let cli = Cli::parse();

    if let Err(e) = execute(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Logs go to stderr so stdout only carries the machine's output.
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn execute(cli: &Cli) -> Result<(), Box<dyn Error>> {
    if cli.list {
        for program in PROGRAMS.iter() {
            println!("{:<16} {}", program.name, program.description);
        }
        return Ok(());
    }

    let (name, spec) = load_spec(cli)?;
    let input = tmsim::tokenize(&cli.input, &spec)?;
    let mut machine = Machine::new(Arc::clone(&spec), input);

    let options = RunOptions {
        max_steps: cli.max_steps,
        mode: if cli.strict { Mode::Strict } else { Mode::Normal },
    };

    tracing::info!(machine = %name, max_steps = options.max_steps, mode = ?options.mode, "starting run");

    if cli.trace {
        let settings = trace::Settings {
            name,
            input: cli.input.clone(),
            radius: cli.radius,
            dump_every: cli.dump_every,
        };
        trace::run(&mut machine, &options, &settings, &mut io::stdout().lock())?;
        return Ok(());
    }

    let verdict = run(&mut machine, &options)?;

    if cli.json {
        let report = Report::new(&machine, &verdict);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", verdict);
    }

    Ok(())
}

/// Loads the machine from `--builtin`, a file path, or stdin, in that order.
fn load_spec(cli: &Cli) -> Result<(String, Arc<Spec>), Box<dyn Error>> {
    if let Some(name) = &cli.builtin {
        let program = ProgramManager::get(name)
            .ok_or_else(|| format!("unknown built-in machine '{}' (see --list)", name))?;
        return Ok((format!("builtin:{}", name), Arc::clone(&program.spec)));
    }

    if let Some(path) = &cli.machine {
        let spec = SpecLoader::load_file(path)?;
        return Ok((path.display().to_string(), Arc::new(spec)));
    }

    if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("failed to read from stdin: {}", e))?;
        let spec = SpecLoader::load_str(&buffer)?;
        return Ok(("<stdin>".to_string(), Arc::new(spec)));
    }

    Err("no machine given: pass a .tm file, use --builtin <NAME>, or pipe a description on stdin".into())
}
