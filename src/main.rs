use anyhow::Result;
use clap::Parser;
use topcsv::cli::{Cli, NameArg};
use topcsv::convert::{self, ConvertConfig, OutputTarget};
use topcsv::parser::{Metric, NameStyle};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let config = ConvertConfig {
        metric: if args.memory { Metric::Memory } else { Metric::Cpu },
        name_style: if args.prettify {
            NameStyle::Pretty
        } else {
            match args.names {
                NameArg::Full => NameStyle::Full,
                NameArg::FirstToken => NameStyle::FirstToken,
            }
        },
        output: if args.output_files {
            OutputTarget::StdoutAndFile
        } else {
            OutputTarget::Stdout
        },
        ..ConvertConfig::default()
    };

    // Each input is converted independently; one bad file must not take the
    // rest of the batch down with it.
    let mut failures = 0;
    for path in &args.files {
        if let Err(err) = convert::convert_file(path, &config) {
            eprintln!("topcsv: {err}");
            failures += 1;
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} file(s) failed to convert", args.files.len());
    }
    Ok(())
}
