use clap::{Parser, Subcommand};
use std::path::PathBuf;
use timeline_probe::commands::{self, FrameRequest};

#[derive(Parser)]
#[command(name = "timeline-probe")]
#[command(about = "Inspect timeline frames, filters and clamped windows")]
struct Cli {
    /// Debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out a frame and print it as JSON
    Frame {
        /// JSON array of event records
        #[arg(long)]
        events: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        /// JSON filter criteria
        #[arg(long)]
        criteria: Option<PathBuf>,

        /// Window start, YYYY-MM-DD
        #[arg(long)]
        start: Option<String>,

        /// Window end, YYYY-MM-DD
        #[arg(long)]
        end: Option<String>,

        #[arg(long)]
        width: Option<f64>,

        #[arg(long)]
        height: Option<f64>,
    },
    /// Print the ids of the events passing the criteria
    Filter {
        #[arg(long)]
        events: PathBuf,

        #[arg(long)]
        criteria: Option<PathBuf>,
    },
    /// Clamp a window into bounds
    Clamp {
        #[arg(long)]
        start: String,

        #[arg(long)]
        end: String,

        #[arg(long)]
        bounds_start: String,

        #[arg(long)]
        bounds_end: String,

        #[arg(long)]
        min_span_days: Option<i64>,
    },
    /// Write the default config
    InitConfig {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Commands::Frame {
            events,
            config,
            criteria,
            start,
            end,
            width,
            height,
        } => commands::frame(&FrameRequest {
            events,
            config,
            criteria,
            start,
            end,
            width,
            height,
        }),
        Commands::Filter { events, criteria } => commands::filter(&events, criteria.as_deref()),
        Commands::Clamp {
            start,
            end,
            bounds_start,
            bounds_end,
            min_span_days,
        } => commands::clamp(&start, &end, &bounds_start, &bounds_end, min_span_days),
        Commands::InitConfig { output } => commands::init_config(output.as_deref()),
    };

    match result {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}
