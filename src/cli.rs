use clap::Parser;

use crate::archive::{ArchiveOptions, CompressionLevel, DuplicatePolicy, WalkMode};

#[derive(Parser, Debug)]
#[command(name = "mkzip")]
#[command(version)]
#[command(about = "Build a ZIP archive from files or directory trees", long_about = None)]
#[command(after_help = "Examples:\n  \
  mkzip out.zip a.txt b.txt          archive two files as top-level entries\n  \
  mkzip -r site.zip public assets    archive two directory trees\n  \
  mkzip -r -m -l fastest - src > src.zip   mirror layout, fast, to stdout")]
pub struct Cli {
    /// Output archive path, or - for stdout
    #[arg(value_name = "OUTPUT")]
    pub output: String,

    /// Files (or directories with -r) to archive
    #[arg(value_name = "PATHS", required = true)]
    pub paths: Vec<String>,

    /// Treat PATHS as directories and archive their trees
    #[arg(short = 'r')]
    pub recurse: bool,

    /// Compression level: none, fastest, optimal or smallest
    #[arg(short = 'l', value_name = "LEVEL", default_value_t = CompressionLevel::Optimal)]
    pub level: CompressionLevel,

    /// Store each file once at its real relative path (with -r)
    #[arg(short = 'm')]
    pub mirror: bool,

    /// Fail instead of skipping when two entries share a path
    #[arg(long = "reject-duplicates")]
    pub reject_duplicates: bool,

    /// List the entries of the created archive
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn to_stdout(&self) -> bool {
        self.output == "-"
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.to_stdout()
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    pub fn archive_options(&self) -> ArchiveOptions {
        ArchiveOptions {
            level: self.level,
            walk_mode: if self.mirror {
                WalkMode::Mirror
            } else {
                WalkMode::Replicate
            },
            duplicates: if self.reject_duplicates {
                DuplicatePolicy::Reject
            } else {
                DuplicatePolicy::Skip
            },
        }
    }

    /// Default log filter when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &'static str {
        if self.is_very_quiet() {
            "error"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_map_to_default_options() {
        let cli = Cli::parse_from(["mkzip", "out.zip", "a.txt"]);
        assert!(!cli.recurse);
        assert_eq!(cli.archive_options(), ArchiveOptions::default());
        assert_eq!(cli.log_filter(), "warn");
    }

    #[test]
    fn flags_select_options() {
        let cli = Cli::parse_from([
            "mkzip",
            "-r",
            "-m",
            "-l",
            "none",
            "--reject-duplicates",
            "-",
            "src",
            "docs",
        ]);
        assert!(cli.recurse);
        assert!(cli.to_stdout());
        assert!(cli.is_quiet());
        assert_eq!(cli.paths, vec!["src", "docs"]);
        assert_eq!(
            cli.archive_options(),
            ArchiveOptions {
                level: CompressionLevel::NoCompression,
                walk_mode: WalkMode::Mirror,
                duplicates: DuplicatePolicy::Reject,
            }
        );
    }

    #[test]
    fn unknown_level_is_rejected() {
        assert!(Cli::try_parse_from(["mkzip", "-l", "ultra", "out.zip", "a"]).is_err());
    }
}
