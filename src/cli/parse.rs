use anyhow::{Context, Result};
use std::time::Instant;
use structopt::StructOpt;

use crate::{
    config::VireoConfig,
    parse::{ParseOptions, Parser},
    pathlib::FilePath,
};

#[derive(Debug, StructOpt)]
pub struct ParseCmd {
    #[structopt(help = "source file to parse")]
    pub input: FilePath,

    #[structopt(long, help = "Prints the syntax tree")]
    pub dump: bool,

    #[structopt(long = "max-depth", help = "Overrides the nesting limit")]
    pub max_depth: Option<usize>,

    #[structopt(long, help = "Path to a vireo.toml to use instead of the one next to the input")]
    pub config: Option<FilePath>,
}

/// Returns whether the input parsed without errors.
pub(super) fn action(cmd: ParseCmd) -> Result<bool> {
    let start_time = Instant::now();
    let config = match &cmd.config {
        Some(path) => VireoConfig::read_from(path.as_ref())?,
        None => VireoConfig::load(cmd.input.dir().as_ref())?,
    };

    let src = cmd
        .input
        .read_to_string()
        .with_context(|| format!("reading {}", cmd.input))?;

    let mut options = ParseOptions::new(cmd.input.clone());
    config.apply(&mut options);
    if let Some(max_depth) = cmd.max_depth {
        options.max_depth = max_depth;
    }

    log::info!("Parsing {}...", cmd.input);
    let result = Parser::parse_source(&src, options);
    for diag in result.errors.iter() {
        diag.emit(&src, &cmd.input);
    }

    if cmd.dump {
        if let Some(file) = &result.value {
            print!("{}", file);
        }
    }

    let errors = result.errors.iter().filter(|d| d.is_error()).count();
    let warnings = result.errors.len() - errors;
    if errors > 0 {
        log::error!("{} error(s), {} warning(s) emitted", errors, warnings);
    } else if warnings > 0 {
        log::warn!("{} warning(s) emitted", warnings);
    }

    log::info!("Parsed in {:?}", start_time.elapsed());
    Ok(errors == 0)
}
