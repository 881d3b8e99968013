use anyhow::Result;
use reflexmap::cli::{self, Commands, RecommendOptions};

fn main() -> Result<()> {
    let cli = cli::parse_args();
    cli::init_logging(cli.verbosity);

    match cli.command {
        Commands::Recommend {
            events,
            filter,
            delta,
            automatic,
            candidate,
            cluster,
            format,
        } => {
            let settings = cli::resolve_settings(cli.config.as_deref())?;
            let options = RecommendOptions {
                events,
                filter,
                delta,
                automatic,
                candidate,
                cluster,
                format,
            };
            cli::handle_recommend_command(&options, &settings)
        }
        Commands::Average {
            reports,
            output,
            format,
        } => cli::handle_average_command(&reports, output.as_deref(), format),
        Commands::Summarize { report, format } => cli::handle_summarize_command(&report, format),
        Commands::Init { force } => cli::handle_init_command(force),
    }
}
