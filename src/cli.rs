use std::path::PathBuf;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct CLI {
    /// Override the vendor directory from `cdnvend.toml`
    #[clap(long, global = true)]
    pub(crate) vendor_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub(crate) command: CdnvendCommand,
}

#[derive(Debug, Subcommand, Clone, PartialEq)]
pub enum CdnvendCommand {
    /// Writes a default `cdnvend.toml` and creates the vendor directory
    Init,
    /// Searches the registry for libraries matching a query
    Search {
        query: String,
    },
    /// Shows registry metadata and the local install state of a library
    Info {
        library: String,
        /// Ignore the metadata cache and ask the registry again
        #[clap(long)]
        refresh: bool,
    },
    /// Lists the published versions of a library
    Versions {
        library: String,
        /// Limit the number of versions shown
        #[clap(short, long)]
        max: Option<usize>,
    },
    /// Lists the asset files of a library version: <name> or <name>@<version>
    Assets {
        library_at_version: String,
    },
    /// Downloads all asset files of a library version: <name> or <name>@<version>.
    /// Without a version the latest one is taken
    Download {
        library_at_version: String,
        /// Redownload even if the version is already installed
        #[clap(long)]
        force: bool,
    },
    /// Deletes an installed library version: <name>@<version>
    Delete {
        library_at_version: String,
    },
    /// Lists locally installed libraries and their versions
    List,
    /// Rebuilds the local-library index from the vendor directory
    Refresh,
}
