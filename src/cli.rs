//! Small shared CLI helpers (teacher's `util::get_args`/`util::version`,
//! trimmed to what this binary's two commands need).

use docopt::Docopt;
use serde::de::DeserializeOwned;

use crate::CliResult;

pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub fn get_args<T>(usage: &str, argv: &[&str]) -> CliResult<T>
where
    T: DeserializeOwned,
{
    Docopt::new(usage)
        .and_then(|d| {
            d.argv(argv.iter().copied())
                .version(Some(version()))
                .help(true)
                .deserialize()
        })
        .map_err(From::from)
}
