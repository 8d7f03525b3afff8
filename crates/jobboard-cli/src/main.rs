//! Jobboard CLI tool.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "jobboard")]
#[command(about = "Jobboard dashboard CLI", long_about = None)]
struct Cli {
    /// Dashboard server URL
    #[arg(long, env = "JOBBOARD_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect jobs on a running dashboard
    Jobs {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Push a job update through the legacy relay
    Relay {
        /// Job payload as JSON, e.g. '{"id": 3, "status": "done"}'
        payload: String,
    },
    /// Work with job templates
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },
    /// Validate a dashboard configuration
    Validate {
        /// Path to the configuration file
        #[arg(default_value = "jobboard.kdl")]
        path: String,
    },
}

#[derive(Subcommand)]
enum JobCommands {
    /// List all jobs
    List,
    /// Show one job
    Show {
        /// Job ID
        id: String,
    },
}

#[derive(Subcommand)]
enum TemplateCommands {
    /// Render a template for a job given as JSON
    Render {
        /// Path to the template file
        template: String,
        /// Job as JSON, including its id
        job: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Jobs { command } => match command {
            JobCommands::List => {
                commands::jobs::list(&cli.api_url).await?;
            }
            JobCommands::Show { id } => {
                commands::jobs::show(&cli.api_url, &id).await?;
            }
        },
        Commands::Relay { payload } => {
            commands::relay(&cli.api_url, &payload).await?;
        }
        Commands::Template { command } => match command {
            TemplateCommands::Render { template, job } => {
                commands::render_template(&template, &job)?;
            }
        },
        Commands::Validate { path } => {
            commands::validate(&path)?;
        }
    }

    Ok(())
}
