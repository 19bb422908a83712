use clap::{crate_authors, crate_name, crate_version, App, AppSettings};
use indicatif::ProgressBar;
use log::LevelFilter;

use pilestats::cli::{self, args};

fn main() {
    let matches = App::new(crate_name!())
        .author(crate_authors!("\n"))
        .version(crate_version!())
        .about("Per-position and per-window statistics over alignment pileups")
        .max_term_width(120)
        .setting(AppSettings::DeriveDisplayOrder)
        .args(args::all())
        .get_matches();

    let level = match matches.occurrences_of(args::core::VERBOSE) {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::from_default_env().filter_level(level).format_timestamp(None).format_target(false).init();

    let quiet = matches.is_present(args::core::QUIET);
    let factory = || {
        if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner().with_style(cli::style::parse::with_progress())
        }
    };

    if let Err(e) = cli::run(&matches, factory) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
