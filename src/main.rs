// declscan: declaration extraction for C++-family headers

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use declscan::driver::ModuleRegistry;
use declscan::parser::combine::ScopeMode;
use declscan::parser::dump::write_tree;
use declscan::parser::ParserOptions;

#[derive(Parser)]
#[command(name = "declscan")]
#[command(about = "Extract declarations from C++-family headers")]
#[command(version)]
struct Cli {
    /// Header or source files to parse
    #[arg(value_name = "FILE", required_unless_present = "list_modules")]
    files: Vec<PathBuf>,

    /// Processing module to run
    #[arg(short, long, default_value = "cpp_parser_mt")]
    module: String,

    /// Treat an unmatched closing bracket inside an initializer as an error
    #[arg(long)]
    strict_scopes: bool,

    /// Print the declaration tree of every parsed file
    #[arg(short, long)]
    dump: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,

    /// List the available modules and exit
    #[arg(long)]
    list_modules: bool,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let registry = ModuleRegistry::with_builtin_modules();
    if cli.list_modules {
        for name in registry.names() {
            if let Some(module) = registry.create(name) {
                println!("{:<16} {}", name, module.description());
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let Some(module) = registry.create(&cli.module) else {
        eprintln!("Error: unknown module '{}'", cli.module);
        eprintln!("Available modules: {}", registry.names().collect::<Vec<_>>().join(", "));
        return Ok(ExitCode::FAILURE);
    };

    let options = ParserOptions {
        scope_mode: if cli.strict_scopes {
            ScopeMode::Strict
        } else {
            ScopeMode::Loose
        },
    };

    let report = module.run(&cli.files, options);

    if cli.dump {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for unit in &report.units {
            write_tree(&mut out, &unit.source, &unit.root)?;
        }
        out.flush()?;
    }

    for failure in &report.failures {
        match failure.error.line() {
            Some(line) => eprintln!("{}:{}: {}", failure.path.display(), line, failure.error),
            None => eprintln!("{}: {}", failure.path.display(), failure.error),
        }
    }

    eprintln!(
        "Parsed {} of {} files with {}.",
        report.units.len(),
        cli.files.len(),
        module.name()
    );

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}
