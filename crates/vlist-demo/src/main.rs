#![forbid(unsafe_code)]

//! vlist-demo binary entry point.

use std::env;
use std::io::{self, Write};
use std::process;

use vlist_core::logging::{self, LogFormat};
use vlist_demo::cli;
use vlist_demo::replay;

fn main() {
    let opts = cli::Opts::parse();

    let format = if opts.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    if let Err(e) = logging::init(format, "info") {
        eprintln!("{e}");
    }

    let (list, errors) = replay::list_config(&opts, |key| env::var(key).ok());
    for error in &errors {
        tracing::warn!(%error, "ignoring environment override");
    }
    tracing::info!(
        config = %list.summary_short(),
        messages = opts.messages,
        height = opts.height,
        step = opts.step,
        "replay starting"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = replay::run(&opts, list, &mut out).and_then(|summary| {
        writeln!(
            out,
            "done: {} steps, {} messages, {} pages, reached top: {}",
            summary.steps, summary.messages, summary.pages, summary.reached_top
        )
    });
    if let Err(e) = result {
        eprintln!("Output error: {e}");
        process::exit(1);
    }
}
