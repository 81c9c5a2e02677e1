use colored::Colorize;
use structopt::StructOpt;

mod parse;

pub use parse::ParseCmd;

#[derive(Debug, StructOpt)]
#[structopt(name = "vireo", about = "Parser front end for the Vireo language")]
pub struct Cli {
    #[structopt(
        long, env = "LOG_LEVEL",
        help = "Sets the log level",
        default_value = "info",
        possible_values = &["off", "error", "warn", "info", "debug", "trace"],
        global = true
    )]
    log_level: log::LevelFilter,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Parses a source file and reports its diagnostics
    Parse(ParseCmd),
}

pub fn run() {
    let cli: Cli = Cli::from_args();

    if let Err(err) = crate::logger::init(cli.log_level) {
        eprintln!("{} {}", "logger error:".red(), err);
    }

    let result = match cli.cmd {
        Command::Parse(cmd) => parse::action(cmd),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            std::process::exit(2);
        }
    }
}
