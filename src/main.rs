//! Segmix CLI - batch audio segment transformer

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use segmix::batch;
use segmix::cli::{optional_duration, Cli, Commands};
use segmix::ops::fade::FadeOptions;
use segmix::ops::looper::{InMemoryLoop, LoopSpec, StreamedLoop};
use segmix::ops::shuffle::ShuffleOptions;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    info!("Segmix v{}", env!("CARGO_PKG_VERSION"));

    let summary = match cli.command {
        Commands::Shuffle {
            input,
            min_duration,
            max_duration,
            num_chunks,
            remainder,
        } => {
            let opts = ShuffleOptions {
                min_duration_s: min_duration,
                max_duration_s: optional_duration(max_duration),
                num_chunks,
                remainder,
            };
            batch::run_shuffle(&input, &opts).context("shuffle batch failed")?
        }

        Commands::Fade {
            input,
            max_duration,
            fade_duration,
        } => {
            let opts = FadeOptions {
                max_duration_s: optional_duration(max_duration),
                fade_duration_s: fade_duration,
            };
            batch::run_fade(&input, &opts).context("fade batch failed")?
        }

        Commands::Loop {
            input,
            min_duration,
            max_duration,
            iterations,
            fade_duration,
            streamed,
        } => {
            let spec = LoopSpec {
                min_duration_s: min_duration,
                max_duration_s: optional_duration(max_duration),
                iterations,
                fade_s: fade_duration,
            };
            if streamed {
                // One scratch dir per run; removed on drop even on failure
                let scratch = tempfile::tempdir().context("cannot create scratch directory")?;
                let strategy = StreamedLoop::new(scratch.path());
                batch::run_loop(&input, &spec, &strategy).context("loop batch failed")?
            } else {
                batch::run_loop(&input, &spec, &InMemoryLoop).context("loop batch failed")?
            }
        }

        Commands::Silence {
            input,
            duration,
            position,
        } => batch::run_silence(&input, duration, position).context("silence batch failed")?,
    };

    println!(
        "Done: {} succeeded, {} skipped, {} failed",
        summary.succeeded, summary.skipped, summary.failed
    );

    Ok(())
}
