use anyhow::Result;
use clap::{Parser, Subcommand};
use jot::areas::repository::Repository;

#[derive(Parser)]
#[command(
    name = "jot",
    version = "0.1.0",
    about = "A content-addressed version control engine",
    long_about = "jot keeps project history as an immutable commit graph in a \
    content-addressed object store, with a staging area and a three-way merge \
    engine for combining divergent lines of work.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
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
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
        #[arg(long, help = "Create a repository without a working tree")]
        bare: bool,
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
    #[command(
        name = "add",
        about = "Stage files for the next commit",
        long_about = "This command stages files at stage 0, expanding directories and \
        clearing any conflict stages the paths carried."
    )]
    Add {
        #[arg(index = 1, required = true, help = "Files or directories to stage")]
        paths: Vec<String>,
    },
    #[command(
        name = "commit",
        about = "Record the staging area as a new commit",
        long_about = "This command creates a new commit from the staging area. During a \
        merge the message falls back to the recorded merge message."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: Option<String>,
    },
    #[command(
        name = "checkout",
        about = "Switch to another branch",
        long_about = "This command points HEAD at another branch and rebuilds the staging \
        area and working tree from that branch's snapshot."
    )]
    Checkout {
        #[arg(index = 1, help = "Branch to switch to")]
        branch: String,
    },
    #[command(name = "status", about = "Summarize the state of the working tree")]
    Status,
    #[command(
        name = "diff",
        about = "Show a name-status diff",
        long_about = "This command shows which paths changed between two snapshots: the \
        staging area and working tree by default, HEAD and the staging area with \
        --cached, or two revisions."
    )]
    Diff {
        #[arg(long, help = "Compare HEAD against the staging area")]
        cached: bool,
        #[arg(index = 1, num_args = 0..=2, help = "Revisions to compare")]
        revisions: Vec<String>,
    },
    #[command(name = "branch", about = "Create, list, or delete branches")]
    Branch {
        #[arg(index = 1, help = "Name of the branch to create")]
        name: Option<String>,
        #[arg(short, long, help = "Name of the branch to delete")]
        delete: Option<String>,
    },
    #[command(
        name = "merge",
        about = "Merge another branch or commit into the current branch",
        long_about = "This command fast-forwards when possible and otherwise performs a \
        three-way merge, staging conflicts for manual resolution."
    )]
    Merge {
        #[arg(index = 1, help = "Branch or commit to merge")]
        target: Option<String>,
        #[arg(long, help = "Abandon an in-progress merge")]
        abort: bool,
    },
}

fn open_repository() -> Result<Repository> {
    let pwd = std::env::current_dir()?;
    Ok(Repository::new(
        pwd.into_boxed_path(),
        Box::new(std::io::stdout()),
    ))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { path, bare } => {
            let path = match path {
                Some(path) => std::path::PathBuf::from(path),
                None => std::env::current_dir()?,
            };

            let repository = Repository::new(path.into_boxed_path(), Box::new(std::io::stdout()));
            repository.init(*bare)?
        }
        Commands::CatFile { sha } => open_repository()?.cat_file(sha)?,
        Commands::HashObject { write, file } => {
            open_repository()?.hash_object(file.as_ref(), *write)?
        }
        Commands::Add { paths } => open_repository()?.add(paths)?,
        Commands::Commit { message } => open_repository()?.write_commit(message.clone())?,
        Commands::Checkout { branch } => open_repository()?.checkout(branch)?,
        Commands::Status => open_repository()?.status()?,
        Commands::Diff { cached, revisions } => open_repository()?.diff(*cached, revisions)?,
        Commands::Branch { name, delete } => {
            open_repository()?.branch(name.as_deref(), delete.as_deref())?
        }
        Commands::Merge { target, abort } => {
            let repository = open_repository()?;

            match (target, abort) {
                (_, true) => repository.merge_abort()?,
                (Some(target), false) => repository.merge(target)?,
                (None, false) => anyhow::bail!("nothing to merge: provide a branch or commit"),
            }
        }
    }

    Ok(())
}
