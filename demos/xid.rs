//! Prints new xid strings, or the fields of existing ones
//!
//! ```text
//! xid [-n count]       print `count` (default 1) new IDs
//! xid -d ID [ID ...]   print timestamp, machine, pid, and counter of each ID
//! ```

use std::{env, io, io::Write, process::ExitCode};

use xid::Xid;

enum Command {
    Generate(usize),
    Describe(Vec<String>),
}

fn main() -> io::Result<ExitCode> {
    let mut args = env::args();
    let program = args.next();
    let command = match parse_args(args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!(
                "Usage: {0} [-n count]\n       {0} -d ID [ID ...]",
                program.as_deref().unwrap_or("xid")
            );
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut buf = io::BufWriter::new(io::stdout());
    match command {
        Command::Generate(count) => {
            let g = match xid::global_generator() {
                Ok(g) => g,
                Err(err) => {
                    eprintln!("Error: {}", err);
                    return Ok(ExitCode::FAILURE);
                }
            };
            for _ in 0..count {
                writeln!(buf, "{}", g.generate())?;
            }
        }
        Command::Describe(texts) => {
            for text in texts {
                let Ok(e) = text.parse::<Xid>() else {
                    buf.flush()?;
                    eprintln!("Error: invalid xid '{}'", text);
                    return Ok(ExitCode::FAILURE);
                };
                let [m0, m1, m2] = e.machine();
                writeln!(
                    buf,
                    "{} timestamp={} machine={:02x}{:02x}{:02x} pid={} counter={}",
                    e,
                    e.timestamp(),
                    m0,
                    m1,
                    m2,
                    e.pid(),
                    e.counter()
                )?;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Command, String> {
    match args.next().as_deref() {
        None => Ok(Command::Generate(1)),
        Some("-n") => {
            let n_arg = args.next().ok_or("argument to option 'n' missing")?;
            let count = n_arg
                .parse()
                .map_err(|_| format!("invalid argument to option 'n': '{}'", n_arg))?;
            match args.next() {
                None => Ok(Command::Generate(count)),
                Some(extra) => Err(format!("unexpected argument '{}'", extra)),
            }
        }
        Some("-d") => {
            let texts: Vec<String> = args.collect();
            if texts.is_empty() {
                return Err("option 'd' requires at least one ID".to_owned());
            }
            Ok(Command::Describe(texts))
        }
        Some(arg) => Err(format!("unrecognized argument '{}'", arg)),
    }
}
