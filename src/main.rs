use mrbait::{parse_args, Cli, Environment, ParseError, Parsed};
use std::{env, io, process};

// --------------------------------------------------
fn main() {
    let host = match Environment::from_host() {
        Ok(host) => host,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    match parse_args(env::args_os(), &host, &mut io::stdout()) {
        Ok(Parsed::Help(usage)) => println!("{usage}"),
        Ok(Parsed::Version(version)) => print!("{version}"),
        Ok(Parsed::Config(config)) => {
            if let Err(e) = mrbait::run(&config) {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
        Err(e) => exit_with(e),
    }
}

// --------------------------------------------------
fn exit_with(e: ParseError) -> ! {
    eprintln!("{e}");
    if e.show_usage() {
        eprintln!("\n{}", Cli::usage());
    } else {
        eprintln!("Invalid options: exiting. See the manual or use --help");
    }
    process::exit(e.exit_code());
}
