use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use folio_core::tree::ItemKind;

/// Folio: organise LaTeX and Markdown files in nested collections.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Resource API endpoint.
    #[arg(long, global = true, env = "FOLIO_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, global = true, env = "FOLIO_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Increase verbosity (use multiple times for more).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the collection tree.
    Tree(TreeArgs),
    /// Add a collection or a file.
    Add(AddArgs),
    /// Rename a collection or a file.
    Rename(RenameArgs),
    /// Delete a collection (with everything in it) or a file.
    Delete(DeleteArgs),
    /// Print the content of a file.
    Show(ShowArgs),
    /// Replace the content of a file with a local file.
    Edit(EditArgs),
    /// Merge several files into a new file.
    Merge(MergeArgs),
    /// Append other files to the end of a file.
    Insert(InsertArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Collection,
    File,
}

impl From<KindArg> for ItemKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Collection => ItemKind::Collection,
            KindArg::File => ItemKind::File,
        }
    }
}

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Only show collections and files whose name contains this text.
    #[arg(long, short)]
    pub search: Option<String>,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[command(subcommand)]
    pub command: AddCommands,
}

#[derive(Subcommand, Debug)]
pub enum AddCommands {
    /// Add a collection, at the top level unless a parent is given.
    Collection {
        name: String,
        /// Id of the parent collection.
        #[arg(long)]
        parent: Option<String>,
    },
    /// Add an empty file to a collection.
    File {
        name: String,
        /// Id of the collection the file goes into.
        #[arg(long)]
        parent: String,
    },
}

#[derive(Args, Debug)]
pub struct RenameArgs {
    #[arg(value_enum)]
    pub kind: KindArg,
    pub id: String,
    pub name: String,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[arg(value_enum)]
    pub kind: KindArg,
    pub id: String,

    /// Do not ask for confirmation.
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    pub file_id: String,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub file_id: String,

    /// Local file whose content replaces the file's content.
    #[arg(long)]
    pub from: PathBuf,
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Existing collection that receives the merged file.
    #[arg(long, required_unless_present = "new_collection", conflicts_with = "new_collection")]
    pub into: Option<String>,

    /// Create a collection with this name for the merged file.
    #[arg(long)]
    pub new_collection: Option<String>,

    /// Parent of the collection created with --new-collection.
    #[arg(long, requires = "new_collection")]
    pub parent: Option<String>,

    /// Files to merge, in order.
    #[arg(required = true, num_args = 2..)]
    pub files: Vec<String>,
}

#[derive(Args, Debug)]
pub struct InsertArgs {
    /// File that receives the content.
    #[arg(long)]
    pub target: String,

    /// Files to insert, in order.
    #[arg(required = true)]
    pub files: Vec<String>,
}
