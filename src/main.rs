#[macro_use]
extern crate serde_derive;

use std::env;
use std::fmt;
use std::io;
use std::process;

use docopt::Docopt;

mod cli;
mod cmd;

macro_rules! command_list {
    () => {
        "
    detect          Discover embedded tables in a delimited-text file
    dump-catalogue  Print the bundled default rule catalogue as JSON
"
    };
}

static USAGE: &str = concat!(
    "
Usage:
    tablescout [options] <command> [<args>...]
    tablescout [options]

Options:
    -h, --help    Display this message
    <command> -h  Display the command help message
    --version     Print version info and exit

Commands:",
    command_list!()
);

#[derive(Deserialize)]
struct Args {
    arg_command: Option<Command>,
}

fn main() {
    env_logger::init();

    let args: Args = Docopt::new(USAGE)
        .and_then(|d| {
            d.options_first(true)
                .version(Some(cli::version()))
                .deserialize()
        })
        .unwrap_or_else(|e| match e {
            docopt::Error::Deserialize(_) => {
                eprintln!(
                    "Please choose one of the following commands/flags:\n{}",
                    command_list!()
                );
                eprintln!(
                    "Unknown command {}!\nUse one of the commands listed above.",
                    std::env::args().nth(1).unwrap_or_else(|| "<missing>".to_string())
                );
                process::exit(1);
            }
            _ => e.exit(),
        });

    match args.arg_command {
        None => {
            println!(
                "tablescout (v{}) finds embedded tables in delimited-text files.\n\nPlease choose one of the following commands/flags:\n{}",
                cli::version(),
                command_list!()
            );
            process::exit(0);
        }
        Some(cmd) => match cmd.run() {
            Ok(()) => process::exit(0),
            Err(CliError::Flag(err)) => err.exit(),
            Err(CliError::Csv(err)) => {
                eprintln!("tablescout {}: {}", env::args().nth(1).unwrap_or_default(), err);
                process::exit(1);
            }
            Err(CliError::Io(ref err)) if err.kind() == io::ErrorKind::BrokenPipe => {
                process::exit(0);
            }
            Err(CliError::Io(err)) => {
                eprintln!("tablescout {}: {}", env::args().nth(1).unwrap_or_default(), err);
                process::exit(1);
            }
            Err(CliError::Other(msg)) => {
                eprintln!("tablescout {}: {}", env::args().nth(1).unwrap_or_default(), msg);
                process::exit(1);
            }
            Err(CliError::Help(usage, exit_code)) => {
                println!("{}", usage);
                process::exit(exit_code);
            }
        },
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum Command {
    Detect,
    DumpCatalogue,
}

impl Command {
    fn run(&self) -> CliResult<()> {
        let argv: Vec<_> = env::args().collect();
        let argv: Vec<_> = argv.iter().map(|s| &**s).collect();
        let argv = &*argv;

        match self {
            Command::Detect => cmd::detect::run(argv),
            Command::DumpCatalogue => cmd::dump_catalogue::run(argv),
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub enum CliError {
    Flag(docopt::Error),
    Csv(csv::Error),
    Io(io::Error),
    Other(String),
    Help(String, i32),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CliError::Flag(ref e) => e.fmt(f),
            CliError::Csv(ref e) => e.fmt(f),
            CliError::Io(ref e) => e.fmt(f),
            CliError::Other(ref s) => f.write_str(s),
            CliError::Help(ref s, _) => f.write_str(s),
        }
    }
}

impl From<docopt::Error> for CliError {
    fn from(err: docopt::Error) -> CliError {
        match err {
            docopt::Error::WithProgramUsage(kind, usage) => match kind.as_ref() {
                docopt::Error::Help => CliError::Help(usage, 0),
                _ => CliError::Help(format!("{usage}\n\nInvalid command! Use the -h,--help flag for more information."), 1),
            },
            _ => CliError::Flag(err),
        }
    }
}

impl From<csv::Error> for CliError {
    fn from(err: csv::Error) -> CliError {
        if !err.is_io_error() {
            return CliError::Csv(err);
        }
        match err.into_kind() {
            csv::ErrorKind::Io(v) => From::from(v),
            _ => unreachable!(),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> CliError {
        CliError::Io(err)
    }
}

impl From<String> for CliError {
    fn from(err: String) -> CliError {
        CliError::Other(err)
    }
}

impl From<tablescout::TableError> for CliError {
    fn from(err: tablescout::TableError) -> CliError {
        CliError::Other(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> CliError {
        CliError::Other(err.to_string())
    }
}
