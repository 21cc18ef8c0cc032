use std::fs;
use std::io::{self, Write};

use tablescout::Catalogue;

use crate::CliResult;

static USAGE: &str = "
Prints the bundled default rule catalogue as JSON, so it can be copied,
edited and passed back in via `detect --catalogue`.

Usage:
    tablescout dump-catalogue [options]

Common options:
    -h, --help           Display this message
    -o, --output <file>  Write output to <file> instead of stdout.
";

#[derive(Deserialize)]
struct Args {
    flag_output: Option<String>,
}

pub fn run(argv: &[&str]) -> CliResult<()> {
    let args: Args = crate::cli::get_args(USAGE, argv)?;

    let json = Catalogue::default_catalogue().to_json_pretty()?;

    match args.flag_output {
        Some(path) => fs::write(path, json)?,
        None => {
            let mut stdout = io::stdout();
            writeln!(stdout, "{json}")?;
        }
    }

    Ok(())
}
