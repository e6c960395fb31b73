use log::info;
use mrbait::{fst::parse_fst_args, FstArgs, ParseError, Parsed};
use std::{env, process};

// --------------------------------------------------
fn main() {
    match parse_fst_args(env::args_os()) {
        Ok(Parsed::Help(usage)) => println!("{usage}"),
        Ok(Parsed::Version(version)) => print!("{version}"),
        Ok(Parsed::Config(config)) => {
            info!("config = {config:#?}");
            println!(
                "Fst estimation is paused; inputs check out for popmap \"{}\"",
                config.popmap().display()
            );
        }
        Err(e) => exit_with(e),
    }
}

// --------------------------------------------------
fn exit_with(e: ParseError) -> ! {
    eprintln!("{e}");
    if e.show_usage() {
        eprintln!("\n{}", FstArgs::usage());
    } else {
        eprintln!("Invalid options: exiting. See the manual or use --help");
    }
    process::exit(e.exit_code());
}
