//! Load and validate a single handler descriptor.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use mock_http_server::descriptor::{build_handler, load_descriptor, DescriptorError};
use mock_http_server::observability::logging::build_filter;
use mock_http_server::CallbackRegistry;

#[derive(Debug, Parser)]
#[command(name = "descriptor-check", version, about = "Check that a handler descriptor loads")]
struct Cli {
    /// Descriptor file (*.handler.toml or *.handler.json)
    file: PathBuf,

    /// Only report whether the handler loaded
    #[arg(short, long)]
    suppress_print: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter("warn"))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = CallbackRegistry::default();
    let result = load_descriptor(&cli.file)
        .and_then(|descriptor| build_handler(descriptor.clone(), &registry).map(|_| descriptor));

    match result {
        Ok(descriptor) => {
            if cli.suppress_print {
                println!("Handler loaded? true");
            } else {
                match serde_json::to_string_pretty(&descriptor) {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        eprintln!("failed to render descriptor: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            if cli.suppress_print {
                println!("Handler loaded? false");
            }
            match err {
                DescriptorError::Validation { name, errors } => {
                    eprintln!("{name}: {} problem(s)", errors.len());
                    for error in errors {
                        eprintln!("  - {error}");
                    }
                }
                other => eprintln!("{other}"),
            }
            ExitCode::FAILURE
        }
    }
}
