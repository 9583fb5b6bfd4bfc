use clap::{Parser, Subcommand};

use ferrous_score::score::main_score;
use ferrous_score::score_opt::ScoreCliOptions;

#[derive(Parser)]
#[command(name = "ferrous-score")]
#[command(about = "FerrousScore - batched alignment scoring of seed hits (Rust implementation)", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score seed hits against the reference (best per hit, or every alignment)
    Score(ScoreCliOptions),
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Score(args) => {
            // Map verbosity (1=error, 2=warning, 3=message, 4=debug, 5+=trace)
            // to Rust log levels
            let log_level = match args.verbosity {
                v if v <= 1 => log::LevelFilter::Error,
                2 => log::LevelFilter::Warn,
                3 => log::LevelFilter::Info,
                4 => log::LevelFilter::Debug,
                _ => log::LevelFilter::Trace,
            };

            env_logger::Builder::from_default_env()
                .filter_level(log_level)
                .format_timestamp(None)
                .format_target(false)
                .init();

            let opt = match args.into_opt() {
                Ok(opt) => opt,
                Err(e) => {
                    log::error!("{}", e);
                    std::process::exit(1);
                }
            };

            if let Err(errors) = opt.validate() {
                for e in &errors {
                    log::error!("Invalid parameter: {}", e);
                }
                std::process::exit(1);
            }

            // Default to number of CPU cores if not specified
            let mut num_threads = opt.n_threads.unwrap_or_else(num_cpus::get);
            let max_threads = num_cpus::get() * 2;
            if num_threads > max_threads {
                log::warn!(
                    "Thread count {} exceeds recommended maximum {}, capping at {}",
                    num_threads,
                    max_threads,
                    max_threads
                );
                num_threads = max_threads;
            }

            match rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
            {
                Ok(_) => {
                    log::debug!("Built global Rayon thread pool with {} threads", num_threads);
                }
                Err(e) => {
                    log::warn!("Failed to configure thread pool: {} (may already be initialized)", e);
                }
            }

            let thread_word = if num_threads == 1 { "thread" } else { "threads" };
            log::info!("Using {} {}", num_threads, thread_word);

            if opt.verbosity >= 3 {
                log::info!("Scoring parameters:");
                log::info!("  Mode: {}, round: {:?}", opt.mode, opt.round_mode);
                log::info!(
                    "  Match: {}, Mismatch: {}, N: {}",
                    opt.match_bonus,
                    opt.mismatch_penalty,
                    opt.n_penalty
                );
                log::info!(
                    "  Read gap: ({},{}), Reference gap: ({},{})",
                    opt.read_gap.0,
                    opt.read_gap.1,
                    opt.ref_gap.0,
                    opt.ref_gap.1
                );
                log::info!("  Band length: {}", opt.band_len);
                if args.reads.len() == 2 {
                    log::info!(
                        "  Fragment length: [{}, {}], policy: {}, anchor mate: {}",
                        opt.min_frag_len,
                        opt.max_frag_len,
                        opt.policy,
                        opt.anchor + 1
                    );
                }
            }

            if let Err(e) = main_score(&args.reference, &args.hits, &args.reads, args.output.as_deref(), &opt) {
                log::error!("{:#}", e);
                std::process::exit(1);
            }
        }
    }
}
