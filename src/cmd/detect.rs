use std::fs;
use std::io::{self, Read, Write};

use tablescout::{Catalogue, Parameters};

use crate::CliResult;

static USAGE: &str = "
Discovers embedded tables in a delimited-text file and prints one
FileReport as JSON.

Usage:
    tablescout detect [options] [<input>]

detect options:
    --delimiter <arg>  The field delimiter of <input>. [default: ,]
    --params <file>    A TOML file overriding the default parameters.
    --catalogue <file> A JSON file overriding the default rule catalogue.

Common options:
    -h, --help           Display this message
    -o, --output <file>  Write output to <file> instead of stdout.
";

#[derive(Deserialize)]
struct Args {
    arg_input: Option<String>,
    flag_delimiter: String,
    flag_params: Option<String>,
    flag_catalogue: Option<String>,
    flag_output: Option<String>,
}

fn read_rows(input: Option<&str>, delimiter: u8) -> CliResult<Vec<Vec<String>>> {
    let mut raw = String::new();
    match input {
        Some(path) => {
            raw = fs::read_to_string(path)?;
        }
        None => {
            io::stdin().read_to_string(&mut raw)?;
        }
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(rows)
}

pub fn run(argv: &[&str]) -> CliResult<()> {
    let args: Args = crate::cli::get_args(USAGE, argv)?;

    let delimiter = args.flag_delimiter.as_bytes().first().copied().unwrap_or(b',');
    let rows = read_rows(args.arg_input.as_deref(), delimiter)?;

    let params = match &args.flag_params {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            Parameters::from_toml_str(&text)?
        }
        None => Parameters::default(),
    };

    let catalogue = match &args.flag_catalogue {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            Catalogue::from_json(&text)?
        }
        None => Catalogue::default_catalogue(),
    };

    log::info!("scanning {} rows for tables", rows.len());
    let report = tablescout::detect_tables(rows, &catalogue, &params)?;
    log::info!("found {} table(s)", report.tables.len());

    let json = serde_json::to_string_pretty(&report)?;

    match args.flag_output {
        Some(path) => fs::write(path, json)?,
        None => {
            let mut stdout = io::stdout();
            writeln!(stdout, "{json}")?;
        }
    }

    Ok(())
}
