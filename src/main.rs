//! viewsync - Entry Point

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::info;
use viewsync::config::ResolvedConfig;
use viewsync::model::error::{CodecError, ViewError};
use viewsync::model::{column_ids, ColumnId, ColumnSizing, SortMode};
use viewsync::sync::{FileStorage, HistoryMode, MemoryHistory};
use viewsync::table::{TableOptions, TableView};
use viewsync::view_state::{ScrollAlign, WindowController};

/// viewsync - inspect table view state from the command line
#[derive(Parser, Debug)]
#[command(name = "viewsync")]
#[command(version)]
#[command(about = "Decode view-state URLs, inspect stored layouts and compute render windows")]
pub struct Args {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON file backing layout storage
    #[arg(long, global = true)]
    pub storage: Option<PathBuf>,

    /// How URL writes land in history
    #[arg(long, global = true, value_enum)]
    pub history_mode: Option<HistoryArg>,

    /// Search debounce window in milliseconds
    #[arg(long, global = true)]
    pub debounce_ms: Option<u64>,

    #[allow(missing_docs)]
    #[command(subcommand)]
    pub command: Command,
}

/// CLI spelling of [`HistoryMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HistoryArg {
    /// Rewrite the current entry
    Replace,
    /// Add an entry per change
    Push,
}

impl From<HistoryArg> for HistoryMode {
    fn from(arg: HistoryArg) -> Self {
        match arg {
            HistoryArg::Replace => HistoryMode::Replace,
            HistoryArg::Push => HistoryMode::Push,
        }
    }
}

/// Subcommands.
#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Print the query a table would hand its data provider for a URL query string
    Decode {
        /// Query string, with or without a leading `?`
        query: String,

        /// Read the sort parameter as a multi-sort list
        #[arg(long)]
        multi_sort: bool,
    },

    /// Print the stored column layout of a table
    Layout {
        /// Table identity
        table_id: String,

        /// Columns in natural order, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        columns: Vec<String>,

        /// Move a column onto another column's position and persist the result
        #[arg(long = "move", num_args = 2, value_names = ["SOURCE", "TARGET"])]
        move_column: Option<Vec<String>>,

        /// Forget the stored order and widths
        #[arg(long, conflicts_with = "move_column")]
        reset: bool,
    },

    /// Print the render window for a collection of uniform rows
    Window {
        /// Number of rows
        #[arg(long)]
        rows: usize,

        /// Scroll offset in pixels
        #[arg(long, default_value_t = 0, conflicts_with = "index")]
        offset: usize,

        /// Scroll so this row is visible instead of using `--offset`
        #[arg(long)]
        index: Option<usize>,

        /// Viewport height in pixels
        #[arg(long, default_value_t = 600)]
        viewport: usize,

        /// Row height in pixels (defaults to the configured estimate)
        #[arg(long)]
        row_height: Option<usize>,

        /// Rows rendered beyond each edge (defaults to the configured overscan)
        #[arg(long)]
        overscan: Option<usize>,
    },
}

#[derive(Serialize)]
struct LayoutReport<'a> {
    table_id: &'a str,
    column_order: &'a [ColumnId],
    column_sizing: &'a ColumnSizing,
}

fn main() -> Result<(), ViewError> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = viewsync::config::load_config_with_precedence(args.config.clone())?;
        let merged = viewsync::config::merge_config(config_file);
        let with_env = viewsync::config::apply_env_overrides(merged)?;
        viewsync::config::apply_cli_overrides(
            with_env,
            args.storage.clone(),
            args.history_mode.map(HistoryMode::from),
            args.debounce_ms,
        )
    };

    viewsync::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let output = run(args.command, &config)?;
    println!("{output}");

    Ok(())
}

fn run(command: Command, config: &ResolvedConfig) -> Result<String, ViewError> {
    match command {
        Command::Decode { query, multi_sort } => {
            let config = ResolvedConfig {
                search_in_url: true,
                ..config.clone()
            };
            let options = TableOptions {
                sort_mode: if multi_sort { SortMode::Multi } else { SortMode::Single },
                ..TableOptions::new("cli", Vec::new())
            };
            let history = Rc::new(MemoryHistory::new(&query));
            let table = TableView::new(options, &config, Some(history), None);
            to_json(&table.query())
        }
        Command::Layout {
            table_id,
            columns,
            move_column,
            reset,
        } => {
            let storage = Rc::new(FileStorage::open(&config.storage_path)?);
            let options = TableOptions::new(table_id.as_str(), column_ids(columns));
            let mut table = TableView::new(options, config, None, Some(storage));

            if let Some([source, target]) = move_column.as_deref() {
                let moved = table
                    .column_order_mut()
                    .move_column(&ColumnId::from(source.as_str()), &ColumnId::from(target.as_str()));
                info!(%source, %target, moved, "column move requested");
            }
            if reset {
                table.column_order_mut().reset_order();
                table.column_sizing_mut().reset_sizes();
            }

            let report = LayoutReport {
                table_id: &table_id,
                column_order: table.column_order().order(),
                column_sizing: table.column_sizing().sizes(),
            };
            to_json(&report)
        }
        Command::Window {
            rows,
            offset,
            index,
            viewport,
            row_height,
            overscan,
        } => {
            let mut options = config.window_options();
            if let Some(height) = row_height {
                options.estimate_row_height = height;
            }
            if let Some(overscan) = overscan {
                options.overscan = overscan;
            }
            let mut controller = WindowController::new(rows, options);
            controller.on_resize(viewport);
            let window = match index {
                Some(index) => controller.scroll_to_index(index, ScrollAlign::Auto),
                None => controller.on_scroll(offset),
            };
            to_json(&window)
        }
    }
}

fn to_json(value: &impl Serialize) -> Result<String, ViewError> {
    Ok(serde_json::to_string_pretty(value).map_err(CodecError::encode)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewsync::model::error::StorageError;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).expect("valid arguments")
    }

    #[test]
    fn test_help_does_not_error() {
        let result = Args::try_parse_from(["viewsync", "--help"]);
        let err = result.expect_err("help short-circuits parsing");
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_does_not_error() {
        let result = Args::try_parse_from(["viewsync", "--version"]);
        let err = result.expect_err("version short-circuits parsing");
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Args::try_parse_from(["viewsync"]).is_err());
    }

    #[test]
    fn test_decode_parses_query_and_flag() {
        let args = parse(&["viewsync", "decode", "filter_status=active", "--multi-sort"]);
        assert_eq!(
            args.command,
            Command::Decode {
                query: "filter_status=active".to_string(),
                multi_sort: true,
            }
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&[
            "viewsync",
            "decode",
            "",
            "--history-mode",
            "push",
            "--debounce-ms",
            "50",
            "--config",
            "/custom/config.toml",
        ]);
        assert_eq!(args.history_mode, Some(HistoryArg::Push));
        assert_eq!(args.debounce_ms, Some(50));
        assert_eq!(args.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_history_mode_rejects_unknown_value() {
        let result = Args::try_parse_from(["viewsync", "--history-mode", "jump", "decode", ""]);
        let err = result.expect_err("unknown mode");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_layout_splits_columns_and_move() {
        let args = parse(&[
            "viewsync", "layout", "users", "--columns", "id,name,email", "--move", "id", "email",
        ]);
        assert_eq!(
            args.command,
            Command::Layout {
                table_id: "users".to_string(),
                columns: vec!["id".into(), "name".into(), "email".into()],
                move_column: Some(vec!["id".into(), "email".into()]),
                reset: false,
            }
        );
    }

    #[test]
    fn test_window_offset_conflicts_with_index() {
        let result = Args::try_parse_from([
            "viewsync", "window", "--rows", "10", "--offset", "5", "--index", "3",
        ]);
        let err = result.expect_err("conflicting flags");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_decode_prints_view_query() {
        let command = Command::Decode {
            query: r#"?filter_status=active&sort=[{"field":"age","direction":"desc"}]"#.to_string(),
            multi_sort: true,
        };

        let output = run(command, &ResolvedConfig::default()).expect("decode succeeds");
        let json: serde_json::Value = serde_json::from_str(&output).expect("valid json");

        assert_eq!(json["filters"]["status"], "active");
        assert_eq!(json["sort"][0]["field"], "age");
        assert_eq!(json["sort"][0]["direction"], "desc");
        assert_eq!(json["search"], "");
    }

    #[test]
    fn test_decode_reads_search_from_url() {
        let command = Command::Decode {
            query: "search=bob".to_string(),
            multi_sort: false,
        };

        let output = run(command, &ResolvedConfig::default()).expect("decode succeeds");
        let json: serde_json::Value = serde_json::from_str(&output).expect("valid json");

        assert_eq!(json["search"], "bob");
    }

    #[test]
    fn test_window_prints_geometry() {
        let command = Command::Window {
            rows: 1_000,
            offset: 400,
            index: None,
            viewport: 200,
            row_height: Some(20),
            overscan: Some(2),
        };

        let output = run(command, &ResolvedConfig::default()).expect("window succeeds");
        let json: serde_json::Value = serde_json::from_str(&output).expect("valid json");

        assert_eq!(json["start_index"], 18);
        assert_eq!(json["end_index"], 32);
        assert_eq!(json["total_height"], 20_000);
    }

    #[test]
    fn test_layout_persists_moves_to_file() {
        let path = std::env::temp_dir().join("viewsync_cli_layout_test.json");
        let _ = std::fs::remove_file(&path);
        let config = ResolvedConfig {
            storage_path: path.clone(),
            ..ResolvedConfig::default()
        };
        let layout = |move_column: Option<Vec<String>>| Command::Layout {
            table_id: "users".to_string(),
            columns: vec!["id".into(), "name".into(), "email".into()],
            move_column,
            reset: false,
        };

        run(layout(Some(vec!["id".into(), "email".into()])), &config).expect("move succeeds");
        let output = run(layout(None), &config).expect("read succeeds");
        let json: serde_json::Value = serde_json::from_str(&output).expect("valid json");

        assert_eq!(json["column_order"], serde_json::json!(["name", "email", "id"]));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_layout_reports_unreadable_storage_as_storage_error() {
        let config = ResolvedConfig {
            storage_path: std::env::temp_dir(),
            ..ResolvedConfig::default()
        };
        let command = Command::Layout {
            table_id: "users".to_string(),
            columns: vec!["id".into()],
            move_column: None,
            reset: false,
        };

        let err = run(command, &config).expect_err("a directory is not a storage file");

        assert!(matches!(err, ViewError::Storage(StorageError::Io { .. })));
    }
}
