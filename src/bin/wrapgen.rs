// src/bin/wrapgen.rs

use clap::Parser;
use std::process::ExitCode;

use wrapgen::cli::Cli;
use wrapgen::driver;
use wrapgen::errors::{self, Error};

fn main() -> ExitCode {
    match real_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => ExitCode::from(errors::report(&err)),
    }
}

fn real_main() -> Result<(), Error> {
    let cli = Cli::try_parse().map_err(|err| {
        // clap already renders help, version and usage errors; all of
        // them exit nonzero without an extra diagnostic line.
        let _ = err.print();
        Error::Silent
    })?;
    let header_args: Vec<String> = std::env::args().skip(1).collect();
    driver::run(&cli, &header_args.join(" "))
}
