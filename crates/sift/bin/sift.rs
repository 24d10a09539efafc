//! The sift command-line interpreter.
//!
//! Usage:
//!   sift <expression>           Run an expression against standard input
//!   sift -f data.txt <expr>     Run against a file
//!   sift -v|-vv|-vvv <expr>     Increase debug verbosity

use std::{
    env,
    fs::File,
    io::{self, BufRead, BufReader, Write},
    process::ExitCode,
};

use sift::{Error, Session};

const USAGE: &str = "\
Usage: sift [OPTIONS] <expression>

Arguments:
  <expression>  The program text; several arguments are joined with spaces

Options:
  -v, -vv, -vvv  Debug verbosity (type, typed tree, command listing)
  -f <FILE>      Read input lines from FILE instead of standard input";

#[derive(Debug)]
struct Options {
    debug: u8,
    infile: Option<String>,
    program: String,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, Error> {
    let mut debug = 0;
    let mut infile = None;
    let mut program = String::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-v" => debug = 1,
            "-vv" => debug = 2,
            "-vvv" => debug = 3,
            "-f" => {
                let path = args.next().ok_or_else(|| {
                    Error::Usage(
                        "The '-f' command line argument expects a filename argument.".into(),
                    )
                })?;
                infile = Some(path);
            }
            _ => {
                if !program.is_empty() {
                    program.push(' ');
                }
                program.push_str(&arg);
            }
        }
    }

    if program.is_empty() {
        return Err(Error::Usage(USAGE.into()));
    }

    Ok(Options {
        debug,
        infile,
        program,
    })
}

fn open_input(infile: Option<&str>) -> Result<Box<dyn BufRead>, Error> {
    match infile {
        Some(path) => {
            let file = File::open(path)
                .map_err(|_| Error::Io(format!("Could not open input file: {}", path)))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn run_cli() -> Result<(), Error> {
    let options = parse_args(env::args().skip(1))?;

    let mut session = Session::new();
    session.set_debug(options.debug);

    let input = open_input(options.infile.as_deref())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    session.run(&options.program, input, &mut out)?;
    out.flush().map_err(Error::from)
}

fn main() -> ExitCode {
    // A panic is a bug, not a user error; report it in one line like any
    // other failure instead of dumping a backtrace.
    std::panic::set_hook(Box::new(|_| {}));

    match std::panic::catch_unwind(run_cli) {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(e)) => {
            eprintln!("ERROR: {}", e);
            ExitCode::FAILURE
        }
        Err(_) => {
            eprintln!("UNKNOWN ERROR.");
            ExitCode::FAILURE
        }
    }
}
