use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use teacher_tools::assignments::RubricRequest;
use teacher_tools::config::{Config, ConfigOverrides};
use teacher_tools::controllers::{AlignmentRequest, TeacherTools};
use teacher_tools::output::render_json;
use teacher_tools::output::table::{
    render_alignment_table, render_behavior_summary_table, render_differentiation_table,
    render_rubric_table,
};
use teacher_tools::server::run_server;
use teacher_tools::standards::StandardRef;
use teacher_tools::store::open_store;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "teacher-tools",
    about = "Curriculum, assignment, study material, remediation and behavior tools"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the REST API.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
    /// Score content against a stored curriculum standard.
    Align {
        /// Record id of the standard.
        #[arg(long)]
        standard: String,
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    Rubric {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        points: u32,
        /// Record id of a standard; repeatable.
        #[arg(long = "standard")]
        standards: Vec<String>,
    },
    Differentiate {
        material_id: String,
    },
    /// Behavior summary for one student.
    Summary {
        student_name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;

    if let Commands::Config { init, show } = &cli.command {
        return handle_config_command(*init, *show, &config, &config_path);
    }
    if let Commands::Serve { host, port } = &cli.command {
        config.apply_overrides(ConfigOverrides {
            host: host.clone(),
            port: *port,
        });
        let bind = format!("{}:{}", config.server.host, config.server.port);
        let addr: SocketAddr = bind
            .parse()
            .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
        let store = open_store(&config.storage)?;
        return run_server(config, store, addr).await;
    }

    let store = open_store(&config.storage)?;
    let tools = TeacherTools::new(store, &config);

    match &cli.command {
        Commands::Align {
            standard,
            content,
            file,
        } => {
            let content = read_content(content.as_deref(), file.as_deref())?;
            let check = tools.curriculum.check_alignment(&AlignmentRequest {
                curriculum_id: Some(standard.clone()),
                content,
            })?;
            match cli.output {
                OutputFormat::Table => println!("{}", render_alignment_table(&check)),
                OutputFormat::Json => println!("{}", render_json(&check)?),
            }
        }
        Commands::Rubric {
            title,
            description,
            points,
            standards,
        } => {
            let rubric = tools.assignments.generate_rubric(&RubricRequest {
                title: title.clone(),
                description: description.clone(),
                points_possible: Some(*points),
                curriculum_standards: standards.iter().cloned().map(StandardRef::Id).collect(),
            })?;
            match cli.output {
                OutputFormat::Table => println!("{}", render_rubric_table(&rubric)),
                OutputFormat::Json => println!("{}", render_json(&rubric)?),
            }
        }
        Commands::Differentiate { material_id } => {
            let versions = tools.materials.differentiate(material_id)?;
            match cli.output {
                OutputFormat::Table => println!("{}", render_differentiation_table(&versions)),
                OutputFormat::Json => println!("{}", render_json(&versions)?),
            }
        }
        Commands::Summary { student_name } => {
            let summary = tools.behavior.summary(student_name)?;
            match cli.output {
                OutputFormat::Table => println!("{}", render_behavior_summary_table(&summary)),
                OutputFormat::Json => println!("{}", render_json(&summary)?),
            }
        }
        Commands::Config { .. } => {}
        Commands::Serve { .. } => unreachable!("serve command handled before dispatch"),
    }

    Ok(())
}

fn handle_config_command(init: bool, show: bool, config: &Config, config_path: &Path) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn read_content(content: Option<&str>, file: Option<&Path>) -> Result<String> {
    match (content, file) {
        (Some(text), _) => Ok(text.to_string()),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed reading content file: {}", path.display())),
        (None, None) => bail!("either --content or --file is required"),
    }
}
