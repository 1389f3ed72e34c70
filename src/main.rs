use anyhow::Result;
use bitstage::areas::repository::Repository;
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "BITSTAGE_LOG";

#[derive(Parser)]
#[command(
    name = "bitstage",
    version = "0.1.0",
    about = "The staging and object layer of a small version control system",
    long_about = "Stages working tree files into a binary index, stores their content \
    as content-addressed objects and builds deterministic trees from what is staged.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command creates the metadata directory, an empty index and a default \
        ignore file in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(
        name = "add",
        about = "Stage files",
        long_about = "This command stores the content of the given files and records them in the index. \
        Directories are expanded and ignored paths are skipped."
    )]
    Add {
        #[arg(index = 1, required = true, help = "The files or directories to stage")]
        paths: Vec<String>,
    },
    #[command(
        name = "rm",
        about = "Remove files from the index",
        long_about = "This command removes entries from the index. Working files and stored objects are kept."
    )]
    Rm {
        #[arg(index = 1, required = true, help = "The files or directories to remove")]
        paths: Vec<String>,
    },
    #[command(
        name = "unstage",
        about = "Keep files tracked but leave them out of the next tree"
    )]
    Unstage {
        #[arg(index = 1, required = true, help = "The files to unstage")]
        paths: Vec<String>,
    },
    #[command(
        name = "status",
        about = "Show the working tree status",
        long_about = "This command prints a two-column status code and the path of every file \
        that is untracked, modified or staged."
    )]
    Status {
        #[arg(long, help = "A committed tree to compare the working tree against")]
        tree: Option<String>,
    },
    #[command(
        name = "write-tree",
        about = "Create a tree object from the staged files"
    )]
    WriteTree,
    #[command(name = "ls-files", about = "List the files recorded in the index")]
    LsFiles {
        #[arg(short, long, help = "Show mode, object ID and staged flag")]
        stage: bool,
    },
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints the content of an object in the repository. \
        It requires the SHA of the object to be specified."
    )]
    CatFile {
        #[arg(short = 'p', long, help = "The object SHA to print")]
        sha: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file and optionally write it to the object database"
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: String,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_repository(path: &Path) -> Result<Repository> {
    Ok(Repository::new(path, Box::new(std::io::stdout()))?)
}

fn open_existing_repository(path: &Path) -> Result<Repository> {
    let repository = open_repository(path)?;
    let metadata_path = repository.config().metadata_path(repository.path());

    if !metadata_path.is_dir() {
        anyhow::bail!(
            "not a bitstage repository (missing {})",
            metadata_path.display()
        );
    }

    Ok(repository)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();
    let pwd = std::env::current_dir()?;

    match &cli.command {
        Commands::Init { path } => {
            let path = match path {
                Some(path) => pwd.join(path),
                None => pwd.clone(),
            };
            let mut repository = open_repository(&path)?;

            repository.init().await?
        }
        Commands::Add { paths } => {
            let mut repository = open_existing_repository(&pwd)?;

            repository.add(paths).await?
        }
        Commands::Rm { paths } => {
            let mut repository = open_existing_repository(&pwd)?;

            repository.rm(paths).await?
        }
        Commands::Unstage { paths } => {
            let mut repository = open_existing_repository(&pwd)?;

            repository.unstage(paths).await?
        }
        Commands::Status { tree } => {
            let mut repository = open_existing_repository(&pwd)?;

            repository.status(tree.as_deref()).await?
        }
        Commands::WriteTree => {
            let mut repository = open_existing_repository(&pwd)?;

            repository.write_tree().await?
        }
        Commands::LsFiles { stage } => {
            let mut repository = open_existing_repository(&pwd)?;

            repository.ls_files(*stage).await?
        }
        Commands::CatFile { sha } => {
            let mut repository = open_existing_repository(&pwd)?;

            repository.cat_file(sha)?
        }
        Commands::HashObject { write, file } => {
            let mut repository = open_existing_repository(&pwd)?;

            repository.hash_object(file, *write)?
        }
    }

    Ok(())
}
