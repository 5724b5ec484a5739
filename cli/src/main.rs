mod test_runner;

use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use patmat::Pattern;

const SUBCOMMANDS: &[&str] = &["match", "test", "help"];

#[derive(Parser)]
#[command(name = "patmat", version, about = "Structural pattern matching over dynamic values")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Match one value against one pattern and print the bindings
    Match(MatchArgs),

    /// Run .test.toml case files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct MatchArgs {
    /// Pattern in patmat notation, e.g. '[x, ...rest]'
    #[arg(allow_hyphen_values = true)]
    pattern: String,

    /// Value in patmat notation, e.g. '[1, 2, 3]'
    #[arg(allow_hyphen_values = true)]
    value: String,

    /// Print the normalized pattern instead of matching
    #[arg(long)]
    ast: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.toml file or directory containing them
    path: String,

    /// Run only cases in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    init_tracing();

    let cli = Cli::parse_from(with_implicit_match(std::env::args().collect()));

    match cli.command {
        Command::Match(match_args) => process::exit(do_match(match_args, cli.no_color)),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

/// `patmat '<pattern>' '<value>'` is shorthand for `patmat match ...`.
fn with_implicit_match(mut args: Vec<String>) -> Vec<String> {
    if let Some(pos) = args
        .iter()
        .skip(1)
        .position(|a| is_positional(a))
        .map(|p| p + 1)
        && !SUBCOMMANDS.contains(&args[pos].as_str())
    {
        args.insert(pos, "match".to_string());
    }
    args
}

/// Flags start with `-`; negative numbers like `-1` or `-5..5` do not count.
fn is_positional(arg: &str) -> bool {
    match arg.strip_prefix('-') {
        Some(rest) => rest.starts_with(|c: char| c.is_ascii_digit() || c == '.'),
        None => true,
    }
}

/// Logs go to stderr, and only when `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

/// Exit codes: 0 matched, 1 no match, 2 notation or consistency error.
fn do_match(args: MatchArgs, no_color: bool) -> i32 {
    let mut files = SimpleFiles::new();
    let pattern_id = files.add("<pattern>".to_string(), args.pattern.clone());
    let value_id = files.add("<value>".to_string(), args.value.clone());

    let parsed = notation::parse_pattern(&args.pattern, pattern_id)
        .and_then(|template| Ok((template, notation::parse_value(&args.value, value_id)?)));
    let (template, subject) = match parsed {
        Ok(pair) => pair,
        Err(error) => {
            emit(&files, &error.to_diagnostic(), no_color);
            return 2;
        }
    };

    let pattern = Pattern::of(template);
    if args.ast {
        println!("{:#?}", pattern);
        return 0;
    }

    match pattern.match_value(&subject) {
        Ok(Some(bindings)) => {
            for (name, value) in bindings.iter() {
                println!("{} = {}", name, value);
            }
            0
        }
        Ok(None) => {
            eprintln!("no match");
            1
        }
        Err(error) => {
            let diagnostic = Diagnostic::error()
                .with_message(error.to_string())
                .with_labels(vec![Label::primary(pattern_id, 0..args.pattern.len())]);
            emit(&files, &diagnostic, no_color);
            2
        }
    }
}

fn emit(files: &SimpleFiles<String, String>, diagnostic: &Diagnostic<usize>, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    let _ = term::emit_to_write_style(&mut writer.lock(), &config, files, diagnostic);
}
