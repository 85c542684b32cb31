use clap::{ArgAction, Parser, Subcommand};
use commands::{clear, config, consent, latest, movie, search, toplist};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "cineast")]
#[command(about = "Cineast - community movie ratings and reviews from the terminal")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to the daily-rotated log file instead of stderr
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the best (or worst) rated movies
    #[command(long_about = "Show the community top list. Movies need at least the configured number of ratings to be listed. Use --worst for the turkey list and --more to load every page up to the configured maximum.")]
    Toplist {
        /// Worst rated first
        #[arg(long, action = ArgAction::SetTrue)]
        worst: bool,

        /// Remote page to show
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Load this page and every following page up to the configured maximum
        #[arg(long, action = ArgAction::SetTrue)]
        more: bool,
    },

    /// Search movies by title, optionally filtered
    #[command(long_about = "Search the metadata backend by title and join the hits with community ratings. Each --filter switches on one criterion id (see `cineast filters`); a movie must satisfy every active criterion.")]
    Search {
        /// Title to search for
        query: String,

        /// Criterion id to activate (repeatable)
        #[arg(long = "filter", value_name = "ID")]
        filters: Vec<String>,

        /// Result page to show
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// List the available search filter ids
    Filters,

    /// Suggest titles for a prefix
    #[command(long_about = "Suggest titles starting with the given prefix. By default suggestions come from movies known to both backends; --search asks the metadata backend's title search instead.")]
    Suggest {
        prefix: String,

        /// Use raw metadata search hits
        #[arg(long, action = ArgAction::SetTrue)]
        search: bool,
    },

    /// Show one movie with its ratings and reviews
    #[command(long_about = "Show details, community score, score distribution and reviews for a movie. Without an id the current top rated movie is shown.")]
    Movie {
        /// IMDb id (e.g. tt0133093)
        id: Option<String>,

        /// Fetch the long plot text
        #[arg(long, action = ArgAction::SetTrue)]
        full_plot: bool,

        /// Review page to show
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Rate a movie anonymously (1-4)
    Rate {
        /// IMDb id
        id: String,

        /// Score from 1 to 4
        #[arg(value_parser = clap::value_parser!(u8).range(1..=4))]
        score: u8,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y', action = ArgAction::SetTrue)]
        yes: bool,
    },

    /// Write a review (prompts for anything not given)
    Review {
        /// IMDb id
        id: String,

        /// Reviewer name
        #[arg(long)]
        name: Option<String>,

        /// Score from 1 to 4
        #[arg(long)]
        score: Option<u8>,

        /// Review text (at most 150 characters)
        #[arg(long)]
        text: Option<String>,
    },

    /// Show the most recent review
    Latest {
        /// Keep polling until interrupted
        #[arg(long, action = ArgAction::SetTrue)]
        follow: bool,
    },

    /// Manage configuration and the key-service secret
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },

    /// Acknowledge the notice about remembering rated movies (--revoke shows it again)
    Consent {
        #[arg(long, action = ArgAction::SetTrue)]
        revoke: bool,
    },

    /// Clear local state
    #[command(long_about = "Clear locally stored state. Use --flags to forget which movies were rated from this client, --credentials to remove the stored key-service secret, or --all for everything including consent.")]
    Clear {
        #[arg(long, action = ArgAction::SetTrue)]
        all: bool,

        /// Forget reviewed flags
        #[arg(long, action = ArgAction::SetTrue)]
        flags: bool,

        /// Remove the stored secret
        #[arg(long, action = ArgAction::SetTrue)]
        credentials: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the current configuration (masks the secret)
    Show {
        /// Show the secret unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },

    /// Write a configuration file
    Init {
        /// Application name registered with the key service
        #[arg(long)]
        app_name: Option<String>,

        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },

    /// Store the key-service secret (prompts when omitted)
    Secret {
        #[arg(long)]
        value: Option<String>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = cli
        .log_file
        .then(|| cineast_config::PathManager::default().log_file());
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Toplist { worst, page, more } => toplist::run_toplist(worst, page, more, &output).await,
        Commands::Search { query, filters, page } => search::run_search(&query, &filters, page, &output).await,
        Commands::Filters => search::run_filters(&output),
        Commands::Suggest { prefix, search } => search::run_suggest(&prefix, search, &output).await,
        Commands::Movie { id, full_plot, page } => movie::run_movie(id.as_deref(), full_plot, page, &output).await,
        Commands::Rate { id, score, yes } => movie::run_rate(&id, score, yes, &output).await,
        Commands::Review { id, name, score, text } => movie::run_review(&id, name, score, text, &output).await,
        Commands::Latest { follow } => latest::run_latest(follow, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output).await,
        Commands::Consent { revoke } => consent::run_consent(revoke, &output),
        Commands::Clear { all, flags, credentials } => clear::run_clear(all, flags, credentials, &output),
    }
}
