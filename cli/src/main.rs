use std::io::{self, Write};
use std::process;

use clap::Parser;
use termcolor::{ColorChoice, ColorSpec, StandardStream, WriteColor};

mod args;
mod convert;

fn main() {
    let args = args::Args::parse();

    if let Err(msg) = convert::convert(&args) {
        // Nothing sensible is left to do if stderr is gone.
        let _ = print_error(&msg);
        process::exit(1);
    }
}

fn print_error(msg: &str) -> io::Result<()> {
    let mut w = StandardStream::stderr(ColorChoice::Always);

    let mut color = ColorSpec::new();
    color.set_fg(Some(termcolor::Color::Red));
    color.set_bold(true);
    w.set_color(&color)?;
    write!(w, "error")?;

    w.reset()?;
    writeln!(w, ": {msg}.")
}
