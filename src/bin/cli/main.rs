use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use s3_repo_grabber::{
    app::{App, AppBuilder, StorageBackend},
    ConfiguredRepository, FileGrabber, RepositoryAdapter, RepositoryDescriptor, S3ClientConfig,
};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Repository id used when a base URL is given instead of a repository file
const ADHOC_REPO_ID: &str = "adhoc";

#[derive(Parser, Debug)]
#[command(name = "s3-repo-grab")]
#[command(about = "Fetch package repository files from S3 using ambient credentials", long_about = None)]
struct Cli {
    /// JSON file listing the host's repositories
    #[arg(long, env = "S3_REPO_FILE")]
    repos: Option<PathBuf>,

    /// AWS region (defaults to the environment's)
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// Endpoint for S3-compatible servers
    #[arg(long, env = "S3_ENDPOINT")]
    endpoint: Option<String>,

    /// Allow plain-HTTP endpoints
    #[arg(long, env = "S3_ALLOW_HTTP", default_value = "false")]
    allow_http: bool,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy a repository file to the local filesystem
    Grab {
        /// Repository id, or a base URL when no repository file is given
        repo: String,
        /// File URL, relative to the repository or absolute
        url: String,
        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Stream a repository file to stdout
    Cat {
        /// Repository id, or a base URL when no repository file is given
        repo: String,
        /// File URL, relative to the repository or absolute
        url: String,
    },

    /// Read a repository file into memory and report its size
    Read {
        /// Repository id, or a base URL when no repository file is given
        repo: String,
        /// File URL, relative to the repository or absolute
        url: String,
        /// Accepted for grabber compatibility; has no effect
        #[arg(long)]
        limit: Option<u64>,
    },

    /// List configured repositories and setup failures
    Repos,
}

impl Cli {
    fn init_logging(&self) -> Result<()> {
        let env_filter = EnvFilter::try_new(self.log_level.to_lowercase())
            .with_context(|| format!("invalid log level '{}'", self.log_level))?;

        // Logs go to stderr so `cat` output stays clean
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();

        Ok(())
    }

    fn s3_config(&self) -> S3ClientConfig {
        S3ClientConfig::builder()
            .maybe_region(self.region.clone())
            .maybe_endpoint(self.endpoint.clone())
            .allow_http(self.allow_http)
            .build()
    }

    fn target_repo(&self) -> Option<&str> {
        match &self.command {
            Commands::Grab { repo, .. } | Commands::Cat { repo, .. } | Commands::Read { repo, .. } => {
                Some(repo)
            }
            Commands::Repos => None,
        }
    }

    async fn build_app(&self) -> Result<App> {
        let builder =
            AppBuilder::new().with_storage_backend(StorageBackend::S3(self.s3_config()));

        let builder = match (&self.repos, self.target_repo()) {
            (Some(path), _) => builder.with_repository_file(path),
            (None, Some(base_url)) => builder.with_repositories(vec![RepositoryDescriptor::builder()
                .id(ADHOC_REPO_ID)
                .baseurl(vec![base_url.to_string()])
                .s3_enabled(true)
                .build()]),
            (None, None) => builder,
        };

        builder.build().await.context("Failed to build application")
    }
}

fn adapter<'a>(app: &'a App, repo: &str, from_file: bool) -> Result<&'a RepositoryAdapter> {
    let id = if from_file { repo } else { ADHOC_REPO_ID };

    if let Some(failure) = app.failures.iter().find(|f| f.repo_id == id) {
        bail!("repository '{}' could not be set up: {}", id, failure.error);
    }

    match app.registry.get(id) {
        Some(ConfiguredRepository::Bucket(adapter)) => Ok(adapter),
        Some(ConfiguredRepository::Plain(_)) => {
            bail!("repository '{}' is not S3-enabled", id)
        }
        None => bail!("unknown or disabled repository '{}'", id),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging()?;

    let app = cli.build_app().await?;
    let from_file = cli.repos.is_some();

    match &cli.command {
        Commands::Grab { repo, url, output } => {
            let grabber = adapter(&app, repo, from_file)?.grabber();
            let path = grabber
                .urlgrab(url, output.as_deref())
                .await
                .with_context(|| format!("Failed to grab {}", url))?;
            info!(path = %path.display(), "file written");
            println!("{}", path.display());
        }
        Commands::Cat { repo, url } => {
            let grabber = adapter(&app, repo, from_file)?.grabber();
            let mut reader = grabber
                .urlopen(url)
                .await
                .with_context(|| format!("Failed to open {}", url))?;
            let mut stdout = tokio::io::stdout();
            tokio::io::copy(&mut reader, &mut stdout)
                .await
                .context("Failed to write to stdout")?;
            stdout.flush().await?;
        }
        Commands::Read { repo, url, limit } => {
            let grabber = adapter(&app, repo, from_file)?.grabber();
            let bytes = grabber
                .urlread(url, *limit)
                .await
                .with_context(|| format!("Failed to read {}", url))?;
            println!("{} bytes", bytes.len());
        }
        Commands::Repos => {
            for repository in app.registry.iter() {
                match repository {
                    ConfiguredRepository::Bucket(adapter) => {
                        println!("{}\ts3\t{}", adapter.id(), adapter.base_url())
                    }
                    ConfiguredRepository::Plain(descriptor) => {
                        println!("{}\tplain\t{}", descriptor.id, descriptor.baseurl.join(" "))
                    }
                }
            }
            for failure in &app.failures {
                println!("{}\tfailed\t{}", failure.repo_id, failure.error);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "s3-repo-grab",
            "--region",
            "eu-west-1",
            "grab",
            "base",
            "repodata/repomd.xml",
            "-o",
            "/tmp/repomd.xml",
        ]);

        assert_eq!(cli.region.as_deref(), Some("eu-west-1"));
        assert_eq!(cli.target_repo(), Some("base"));
        match cli.command {
            Commands::Grab { url, output, .. } => {
                assert_eq!(url, "repodata/repomd.xml");
                assert_eq!(output, Some(PathBuf::from("/tmp/repomd.xml")));
            }
            other => panic!("Expected grab command, got {:?}", other),
        }
    }

    #[test]
    fn test_s3_config_from_flags() {
        let cli = Cli::parse_from([
            "s3-repo-grab",
            "--endpoint",
            "http://localhost:9000",
            "--allow-http",
            "repos",
        ]);

        let config = cli.s3_config();
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:9000"));
        assert!(config.allow_http);
        assert!(config.access_key.is_none());
    }
}
