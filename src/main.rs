use anyhow::Result;
use clap::{Parser, Subcommand};
use nib::areas::repository::Repository;
use nib::artifacts::objects::object_type::ObjectType;
use nib::artifacts::protocol::smart_http::Credentials;
use nib::commands::plumbing::cat_file::CatFileMode;
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "NIB_LOG";

#[derive(Parser)]
#[command(
    name = "nib",
    version,
    about = "A minimal git that can commit a flat directory and push it over smart HTTP",
    long_about = "nib keeps a git-compatible repository: loose objects, a version 2 index \
    and a single master branch. Commits hold a flat list of files, and master can be \
    pushed to any smart HTTP remote that speaks receive-pack.",
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
        long_about = "Create the repository directory (if needed) with an empty .git inside it."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        repo: PathBuf,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file as an object and optionally write it to the object database"
    )]
    HashObject {
        #[arg(
            short = 't',
            long = "type",
            default_value = "blob",
            value_parser = parse_kind,
            help = "Object kind: blob, tree or commit"
        )]
        kind: ObjectType,
        #[arg(short, long, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        path: PathBuf,
    },
    #[command(
        name = "cat-file",
        about = "Print an object or facts about it",
        long_about = "Print the object named by a hash or a unique hash prefix of at least \
        2 characters. commit, tree and blob print the raw payload after checking the kind."
    )]
    CatFile {
        #[arg(index = 1, value_enum)]
        mode: CatFileMode,
        #[arg(index = 2, help = "Object hash or unique prefix")]
        hash_prefix: String,
    },
    #[command(name = "add", about = "Stage files (directories are added recursively)")]
    Add {
        #[arg(index = 1, required = true, num_args = 1..)]
        paths: Vec<String>,
    },
    #[command(name = "ls-files", about = "List the files in the index")]
    LsFiles {
        #[arg(short, long, help = "Show mode, hash and stage number too")]
        stage: bool,
    },
    #[command(name = "commit", about = "Commit the staged files to master")]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
        #[arg(
            short,
            long,
            help = "Author as \"Name <email>\" (default: GIT_AUTHOR_NAME and GIT_AUTHOR_EMAIL)"
        )]
        author: Option<String>,
    },
    #[command(
        name = "push",
        about = "Push master to a smart HTTP remote",
        long_about = "Send every object the remote master is missing and move the remote \
        master to the local one. Only refs/heads/master is supported."
    )]
    Push {
        #[arg(index = 1, help = "Repository URL, e.g. https://example.com/user/repo.git")]
        url: String,
        #[arg(short, long, env = "GIT_USERNAME")]
        username: String,
        #[arg(short, long, env = "GIT_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

fn parse_kind(value: &str) -> Result<ObjectType, String> {
    ObjectType::try_from(value).map_err(|e| e.to_string())
}

fn open_current() -> Result<Repository> {
    let pwd = std::env::current_dir()?;
    Repository::new(&pwd, Box::new(std::io::stdout()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { repo } => {
            let mut repository = Repository::new(Path::new(&repo), Box::new(std::io::stdout()))?;
            repository.init()?;
        }
        Commands::HashObject { kind, write, path } => {
            open_current()?.hash_object(&path, kind, write)?;
        }
        Commands::CatFile { mode, hash_prefix } => {
            open_current()?.cat_file(mode, &hash_prefix)?;
        }
        Commands::Add { paths } => {
            open_current()?.add(&paths)?;
        }
        Commands::LsFiles { stage } => {
            open_current()?.ls_files(stage)?;
        }
        Commands::Commit { message, author } => {
            open_current()?.commit(&message, author.as_deref())?;
        }
        Commands::Push {
            url,
            username,
            password,
        } => {
            let credentials = Credentials::new(username, SecretString::from(password));
            open_current()?.push(&url, credentials).await?;
        }
    }

    Ok(())
}
