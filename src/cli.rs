//! Command-line interface definitions and parsing
//!
//! # Commands
//!
//! - **files**: pick files or directories below a root directory
//! - **json**: pick nodes of a titled JSON tree
//! - **config**: show the configuration file location or contents
//!
//! Flags override the values loaded from the configuration file; anything
//! not given on the command line keeps its configured value.
//!
//! # Examples
//!
//! ```
//! use clap::Parser;
//! use treepick::cli::{Cli, Commands};
//!
//! let cli = Cli::try_parse_from(["treepick", "files", "--multi", "-p", "*.rs"]).unwrap();
//! assert!(matches!(cli.command, Commands::Files { .. }));
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::PickerConfig;
use crate::engine::{SelectionMode, SortDirection, SortPolicy};
use crate::node::SortField;
use crate::provider::{FileProviderConfig, FileSelection, JsonProviderConfig, TreeSelection};

#[derive(Parser, Debug)]
#[command(name = "treepick")]
#[command(about = "Pick files or JSON tree nodes interactively", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Only print picked ids
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Read configuration from this file instead of the default location
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse the process arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Browse the filesystem
    #[command(visible_alias = "f")]
    Files {
        /// Directory to start in (must lie inside the root)
        #[arg(value_name = "DIR")]
        start: Option<PathBuf>,

        #[command(flatten)]
        source: FileArgs,

        #[command(flatten)]
        picker: PickerArgs,
    },

    /// Browse a JSON document
    #[command(visible_alias = "j")]
    Json {
        /// Document to browse
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        source: JsonArgs,

        #[command(flatten)]
        picker: PickerArgs,
    },

    /// Inspect the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Print the configuration file path
    Path,
    /// Print the effective configuration as TOML
    Show,
}

/// Engine options shared by every source
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct PickerArgs {
    /// Allow picking several nodes
    #[arg(short = 'm', long = "multi")]
    pub multi: bool,

    /// Commit as soon as a single node is tapped
    #[arg(long = "one-tap")]
    pub one_tap: bool,

    /// Allow committing with nothing picked
    #[arg(long = "allow-empty")]
    pub allow_empty: bool,

    /// Sort siblings by this field
    #[arg(short = 's', long = "sort", value_enum, value_name = "FIELD")]
    pub sort: Option<SortField>,

    /// Reverse the sort direction
    #[arg(short = 'r', long = "reverse")]
    pub reverse: bool,

    /// Keep the source order
    #[arg(long = "no-sort", conflicts_with_all = ["sort", "reverse"])]
    pub no_sort: bool,

    /// Refuse to descend more than this many levels
    #[arg(long = "max-depth", value_name = "N")]
    pub max_depth: Option<usize>,
}

impl PickerArgs {
    /// Overlay the flags on `base`
    ///
    /// `default_sort` applies when neither the flags nor `base` name an
    /// ordering.
    #[must_use]
    pub fn apply(&self, base: PickerConfig, default_sort: Option<SortPolicy>) -> PickerConfig {
        let direction = if self.reverse {
            SortDirection::Reverse
        } else {
            SortDirection::Normal
        };
        let sort = if self.no_sort {
            None
        } else if let Some(field) = self.sort {
            Some(SortPolicy::new(field, direction))
        } else {
            base.sort.or(default_sort).map(|policy| {
                if self.reverse {
                    SortPolicy::new(policy.field, policy.direction.flipped())
                } else {
                    policy
                }
            })
        };

        let mode = if self.multi {
            SelectionMode::Multi
        } else {
            base.selection_mode
        };
        let max_depth = self.max_depth.or(base.max_depth);
        let one_tap = base.one_tap_commit || self.one_tap;
        let allow_empty = base.allow_empty_commit || self.allow_empty;

        base.with_mode(mode)
            .with_sort(sort)
            .with_one_tap_commit(one_tap)
            .with_allow_empty_commit(allow_empty)
            .with_max_depth(max_depth)
    }
}

/// Filesystem source flags
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct FileArgs {
    /// Never browse above this directory
    #[arg(long = "root", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Directory to show when the root cannot be read
    #[arg(long = "fallback", value_name = "DIR")]
    pub fallback: Option<PathBuf>,

    /// Which entries may be picked
    #[arg(long = "select", value_enum, value_name = "KIND")]
    pub selection: Option<FileSelection>,

    /// File name pattern (glob, or regex with `re:` prefix); repeatable
    #[arg(short = 'p', long = "pattern", value_name = "PATTERN")]
    pub patterns: Vec<String>,

    /// Show hidden entries
    #[arg(short = 'a', long = "all")]
    pub show_hidden: bool,
}

impl FileArgs {
    /// Overlay the flags on `base`
    #[must_use]
    pub fn apply(
        &self,
        mut base: FileProviderConfig,
        start: Option<PathBuf>,
    ) -> FileProviderConfig {
        if let Some(root) = &self.root {
            base.root.clone_from(root);
        }
        if start.is_some() {
            base.start = start;
        }
        if self.fallback.is_some() {
            base.fallback.clone_from(&self.fallback);
        }
        if let Some(selection) = self.selection {
            base.selection = selection;
        }
        if !self.patterns.is_empty() {
            base.patterns.clone_from(&self.patterns);
        }
        base.show_hidden |= self.show_hidden;
        base
    }
}

/// JSON source flags
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonArgs {
    /// Key holding node titles
    #[arg(long = "title-key", value_name = "KEY")]
    pub title_key: Option<String>,

    /// Key holding node subtitles
    #[arg(long = "subtitle-key", value_name = "KEY")]
    pub subtitle_key: Option<String>,

    /// Key holding the children array
    #[arg(long = "children-key", value_name = "KEY")]
    pub children_key: Option<String>,

    /// Title format, `%s` is replaced by the title
    #[arg(long = "title-mask", value_name = "MASK")]
    pub title_mask: Option<String>,

    /// Subtitle format, `%s` is replaced by the subtitle
    #[arg(long = "subtitle-mask", value_name = "MASK")]
    pub subtitle_mask: Option<String>,

    /// Label of the up row
    #[arg(long = "back-label", value_name = "LABEL")]
    pub back_label: Option<String>,

    /// Which nodes may be picked
    #[arg(long = "select", value_enum, value_name = "KIND")]
    pub selection: Option<TreeSelection>,
}

impl JsonArgs {
    /// Overlay the flags on `base`
    #[must_use]
    pub fn apply(&self, mut base: JsonProviderConfig) -> JsonProviderConfig {
        if let Some(key) = &self.title_key {
            base.title_key.clone_from(key);
        }
        if let Some(key) = &self.children_key {
            base.children_key.clone_from(key);
        }
        let optional = [
            (&self.subtitle_key, &mut base.subtitle_key),
            (&self.title_mask, &mut base.title_mask),
            (&self.subtitle_mask, &mut base.subtitle_mask),
            (&self.back_label, &mut base.back_label),
        ];
        for (flag, target) in optional {
            if flag.is_some() {
                target.clone_from(flag);
            }
        }
        if let Some(selection) = self.selection {
            base.selection = selection;
        }
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_files_command_flags() {
        let cli = parse(&[
            "treepick", "files", "/home", "--root", "/", "-p", "*.png", "-p", "re:.*\\.jpe?g",
            "--select", "files", "-m", "-a",
        ]);
        let Commands::Files { start, source, picker } = cli.command else {
            panic!("expected files command");
        };
        assert_eq!(start, Some(PathBuf::from("/home")));
        assert_eq!(source.patterns.len(), 2);
        assert_eq!(source.selection, Some(FileSelection::Files));
        assert!(source.show_hidden);
        assert!(picker.multi);
    }

    #[test]
    fn test_json_command_and_global_flags() {
        let cli = parse(&[
            "treepick", "-q", "json", "tree.json", "--children-key", "items", "--select",
            "leaves-only", "--sort", "has-children",
        ]);
        assert!(cli.quiet);
        let Commands::Json { file, source, picker } = cli.command else {
            panic!("expected json command");
        };
        assert_eq!(file, PathBuf::from("tree.json"));
        assert_eq!(source.children_key.as_deref(), Some("items"));
        assert_eq!(source.selection, Some(TreeSelection::LeavesOnly));
        assert_eq!(picker.sort, Some(SortField::HasChildren));
    }

    #[test]
    fn test_no_sort_conflicts_with_sort() {
        assert!(Cli::try_parse_from(["treepick", "files", "--no-sort", "--sort", "name"]).is_err());
    }

    #[test]
    fn test_config_subcommand() {
        let cli = parse(&["treepick", "config", "path"]);
        assert!(matches!(cli.command, Commands::Config(ConfigCommands::Path)));
    }

    #[test]
    fn test_picker_args_apply() {
        let default_sort = Some(SortPolicy::default());
        let base = PickerConfig::new().with_max_depth(Some(3));

        let plain = PickerArgs::default().apply(base.clone(), default_sort);
        assert_eq!(plain.sort, default_sort);
        assert_eq!(plain.max_depth, Some(3));
        assert_eq!(plain.selection_mode, SelectionMode::Single);

        let reversed = PickerArgs {
            reverse: true,
            multi: true,
            ..PickerArgs::default()
        }
        .apply(base.clone(), default_sort);
        assert_eq!(
            reversed.sort,
            Some(SortPolicy::new(SortField::Name, SortDirection::Reverse))
        );
        assert_eq!(reversed.selection_mode, SelectionMode::Multi);

        let unsorted = PickerArgs {
            no_sort: true,
            ..PickerArgs::default()
        }
        .apply(base.clone(), default_sort);
        assert!(unsorted.sort.is_none());

        let by_size = PickerArgs {
            sort: Some(SortField::Size),
            ..PickerArgs::default()
        }
        .apply(base, None);
        assert_eq!(
            by_size.sort,
            Some(SortPolicy::new(SortField::Size, SortDirection::Normal))
        );
    }

    #[test]
    fn test_source_args_apply() {
        let files = FileArgs {
            patterns: vec!["*.rs".into()],
            ..FileArgs::default()
        }
        .apply(FileProviderConfig::default(), Some(PathBuf::from("/tmp")));
        assert_eq!(files.root, PathBuf::from("/"));
        assert_eq!(files.start, Some(PathBuf::from("/tmp")));
        assert_eq!(files.patterns, vec!["*.rs"]);

        let json = JsonArgs {
            subtitle_key: Some("code".into()),
            back_label: Some("Back".into()),
            ..JsonArgs::default()
        }
        .apply(JsonProviderConfig::default());
        assert_eq!(json.title_key, "title");
        assert_eq!(json.subtitle_key.as_deref(), Some("code"));
        assert_eq!(json.back_label.as_deref(), Some("Back"));
        assert!(json.title_mask.is_none());
    }
}
