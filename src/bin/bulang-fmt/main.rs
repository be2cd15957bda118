//! Command-line interface for bulang-fmt
//! This binary moves trailing opening braces in bulang sources onto their own line.
//!
//! Usage:
//!   bulang-fmt format `<paths>`... [--check] [--diff] [--stdout]  - Reformat files (in place by default)
//!   bulang-fmt edits `<path>` [--range `<start:end>`] [--spans]     - Print the edits as JSON
//!   bulang-fmt list-languages                                     - List registered formatters
mod files;
mod logging;

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;

use bulang_fmt::bulang::config::{FmtConfig, Loader, CONFIG_FILE_NAME};
use bulang_fmt::bulang::document::Document;
use bulang_fmt::bulang::edits::{apply_edits_with, to_text_edits_with, LineRange};
use bulang_fmt::bulang::error::FmtError;
use bulang_fmt::bulang::registry::{DocumentFormatter, FormatterRegistry};
use clap::{Arg, ArgAction, ArgMatches, Command};
use similar::TextDiff;

use files::{collect_inputs, Input};
use logging::{init_logging, DEFAULT_LOG_LEVEL};

const EXIT_CHECK_FAILED: u8 = 1;
const EXIT_ERROR: u8 = 2;

fn build_cli() -> Command {
    Command::new("bulang-fmt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Moves trailing opening braces in bulang sources onto their own line")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Configuration file layered over the defaults"),
        )
        .arg(
            Arg::new("language")
                .long("language")
                .short('l')
                .global(true)
                .help("Language id of the formatter to run (default: bulang)"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Diagnostic level when RUST_LOG is unset (e.g., 'info', 'debug')")
                .default_value(DEFAULT_LOG_LEVEL),
        )
        .subcommand(
            Command::new("format")
                .about("Reformat files or directories")
                .arg(
                    Arg::new("paths")
                        .help("Files or directories to format ('-' reads stdin)")
                        .required(true)
                        .num_args(1..),
                )
                .arg(
                    Arg::new("check")
                        .long("check")
                        .help("Write nothing; exit with status 1 if any file would change")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("diff")
                        .long("diff")
                        .help("Write nothing; print a unified diff of the changes")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("stdout")
                        .long("stdout")
                        .help("Print formatted sources instead of rewriting files")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("edits")
                .about("Print the edit instructions for a file as JSON")
                .arg(
                    Arg::new("path")
                        .help("File to inspect ('-' reads stdin)")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("range")
                        .long("range")
                        .short('r')
                        .help("Only lines START:END (0-indexed, end exclusive)")
                        .value_parser(|s: &str| s.parse::<LineRange>()),
                )
                .arg(
                    Arg::new("spans")
                        .long("spans")
                        .help("Print byte-offset spans instead of line instructions")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("list-languages").about("List registered formatters"))
}

fn main() -> ExitCode {
    let matches = build_cli().get_matches();

    let level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or(DEFAULT_LOG_LEVEL);
    init_logging(level);

    match run(&matches) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(matches: &ArgMatches) -> Result<ExitCode, FmtError> {
    let config = load_config(matches)?;
    let registry = FormatterRegistry::with_defaults();

    match matches.subcommand() {
        Some(("format", format_matches)) => {
            handle_format_command(format_matches, &config, &registry)
        }
        Some(("edits", edits_matches)) => {
            handle_edits_command(edits_matches, &config, &registry)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(("list-languages", _)) => {
            handle_list_languages_command(&registry);
            Ok(ExitCode::SUCCESS)
        }
        _ => unreachable!(),
    }
}

/// Defaults, then `bulang-fmt.toml` in the working directory, then `--config`, then flags.
fn load_config(matches: &ArgMatches) -> Result<FmtConfig, FmtError> {
    let mut loader = Loader::new().with_optional_file(CONFIG_FILE_NAME);
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(language) = matches.get_one::<String>("language") {
        loader = loader.set_override("formatting.language", language.as_str())?;
    }
    let config = loader.build()?;
    tracing::debug!(
        language = %config.formatting.language,
        extensions = ?config.files.extensions,
        recursive = config.files.recursive,
        "loaded configuration"
    );
    Ok(config)
}

fn read_input(input: &Input) -> Result<Document, FmtError> {
    match input {
        Input::Stdin => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| FmtError::io(Path::new("<stdin>"), e))?;
            Ok(Document::from_string(text))
        }
        Input::File(path) => Document::from_path(path),
    }
}

/// What `format` should do with each input
#[derive(Debug, Clone, Copy)]
struct FormatMode {
    check: bool,
    diff: bool,
    to_stdout: bool,
}

impl FormatMode {
    fn writes(&self) -> bool {
        !self.check && !self.diff
    }
}

/// Handle the format command
///
/// An input that cannot be read or written is reported and skipped; the remaining
/// inputs are still processed and the run ends with an error status.
fn handle_format_command(
    matches: &ArgMatches,
    config: &FmtConfig,
    registry: &FormatterRegistry,
) -> Result<ExitCode, FmtError> {
    let paths: Vec<String> = matches
        .get_many::<String>("paths")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let mode = FormatMode {
        check: matches.get_flag("check"),
        diff: matches.get_flag("diff"),
        to_stdout: matches.get_flag("stdout"),
    };

    let language = &config.formatting.language;
    let formatter = registry
        .get(language)
        .ok_or_else(|| FmtError::LanguageNotFound(language.to_string()))?;

    let inputs = collect_inputs(&paths, &config.files)?;
    let mut changed = Vec::new();
    let mut failures = 0usize;

    for input in &inputs {
        let name = input.display_name();
        match format_input(input, formatter, config, mode) {
            Ok(true) => changed.push(name),
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(input = %name, error = %e, "skipping input");
                eprintln!("Error: {}", e);
                failures += 1;
            }
        }
    }

    if mode.check {
        for name in &changed {
            eprintln!("Would reformat: {}", name);
        }
    }
    if failures > 0 {
        eprintln!("{} of {} inputs could not be formatted", failures, inputs.len());
        return Ok(ExitCode::from(EXIT_ERROR));
    }
    if mode.check && !changed.is_empty() {
        return Ok(ExitCode::from(EXIT_CHECK_FAILED));
    }
    Ok(ExitCode::SUCCESS)
}

/// Format one input; returns whether its text changed.
fn format_input(
    input: &Input,
    formatter: &dyn DocumentFormatter,
    config: &FmtConfig,
    mode: FormatMode,
) -> Result<bool, FmtError> {
    let name = input.display_name();
    let document = read_input(input)?;
    let edits = formatter.provide_edits(&document);
    let line_ending = config.formatting.line_ending.resolve(&document);
    let formatted = apply_edits_with(&document, &edits, line_ending);
    let is_changed = formatted != document.text();
    tracing::info!(input = %name, edits = edits.len(), changed = is_changed, "formatted");

    if mode.diff && is_changed {
        let text_diff = TextDiff::from_lines(document.text(), formatted.as_str());
        print!("{}", text_diff.unified_diff().header(&name, &name));
    }
    if !mode.writes() {
        return Ok(is_changed);
    }

    match input {
        Input::File(path) if !mode.to_stdout => {
            if is_changed {
                fs::write(path, &formatted).map_err(|e| FmtError::io(path, e))?;
            }
        }
        _ => print!("{}", formatted),
    }
    Ok(is_changed)
}

/// Handle the edits command
fn handle_edits_command(
    matches: &ArgMatches,
    config: &FmtConfig,
    registry: &FormatterRegistry,
) -> Result<(), FmtError> {
    let path = matches
        .get_one::<String>("path")
        .expect("path is a required argument");
    let input = if path == "-" {
        Input::Stdin
    } else {
        Input::File(path.into())
    };
    let document = read_input(&input)?;
    let language = &config.formatting.language;

    let edits = match matches.get_one::<LineRange>("range") {
        Some(range) => registry.provide_range_edits(language, &document, *range)?,
        None => registry.provide_edits(language, &document)?,
    };

    let json = if matches.get_flag("spans") {
        let line_ending = config.formatting.line_ending.resolve(&document);
        serde_json::to_string_pretty(&to_text_edits_with(&document, &edits, line_ending))?
    } else {
        serde_json::to_string_pretty(&edits)?
    };
    println!("{}", json);
    Ok(())
}

/// Handle the list-languages command
fn handle_list_languages_command(registry: &FormatterRegistry) {
    println!("Registered formatters:\n");

    for language in registry.list_languages() {
        println!("  {}", language);
        if let Some(formatter) = registry.get(&language) {
            println!("    {}", formatter.description());
        }
        println!();
    }
}
