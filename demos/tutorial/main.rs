//! # choicefig tutorial
//!
//! A toy program that opens connections to a list of files. It exists to show
//! how the four sources stack up, not to do anything useful.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example tutorial -- --connections 3 a.txt b.txt
//! ```
//!
//! | Try                          | How                                                                  |
//! |------------------------------|----------------------------------------------------------------------|
//! | Defaults                     | `cargo run --example tutorial -- a.txt`                              |
//! | Command line                 | `cargo run --example tutorial -- -c 5 --ssh a.txt`                   |
//! | Environment                  | `tutorial_connections=9 cargo run --example tutorial -- a.txt`       |
//! | YAML file                    | `connections: 19` in `~/.tutorial-config.yml`                        |
//! | XML file                     | `<config><connections>19</connections></config>` in `~/.tutorial-config.xml` |
//! | Bad value                    | `cargo run --example tutorial -- -c many a.txt`                      |
//! | Missing files                | `cargo run --example tutorial`                                       |
//! | Too many files               | `cargo run --example tutorial -- a b c d e`                          |
//! | Help                         | `cargo run --example tutorial -- --help`                             |
//! | Logging                      | `RUST_LOG=choicefig=debug cargo run --example tutorial -- a.txt`     |

mod choices;

use std::process::ExitCode;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use choicefig::{
    Choicefig, ChoicesError, CommandLineSource, EnvironmentSource, FileSource,
};

use choices::tutorial_choices;

#[derive(Debug, Deserialize)]
struct Tutorial {
    connections: i64,
    ssh: bool,
    protocol: String,
    files: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut builder = Choicefig::builder()
        .source(CommandLineSource::new().usage("tutorial [options] file..."))
        .source(EnvironmentSource::with_prefix("tutorial_"))
        .source(FileSource::yaml(".tutorial-config.yml"))
        .source(FileSource::xml(".tutorial-config.xml"));
    for choice in tutorial_choices() {
        builder = builder.choice(choice);
    }

    match builder.resolve_into::<Tutorial>() {
        Ok(tutorial) => {
            let how = if tutorial.ssh { "ssh" } else { tutorial.protocol.as_str() };
            for file in &tutorial.files {
                println!(
                    "Opening {} connection(s) to {file} over {how}.",
                    tutorial.connections
                );
            }
            ExitCode::SUCCESS
        }
        Err(ChoicesError::HelpRequested(help)) => {
            println!("{help}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
