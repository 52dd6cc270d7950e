use crate::config::ImportOverrides;
use crate::utils::logger::LogFormat;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "attendance-etl")]
#[command(about = "Import spreadsheet attendance against an employee roster and build attendance reports")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Validate a rows file against the roster, optionally committing it to the store
    Import(ImportArgs),
    /// Build a daily or monthly attendance report from the store
    Report {
        #[command(subcommand)]
        kind: ReportKind,
    },
    /// Set attendance by hand for one employee, or for everyone still unmarked that day
    Mark(MarkArgs),
    /// Write a sample upload sheet
    Template(TemplateArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    /// Attendance rows (.csv, .tsv or .json)
    #[arg(long)]
    pub rows: Option<String>,

    /// Employee roster (.csv or .json)
    #[arg(long)]
    pub roster: Option<String>,

    /// Date for rows without one (YYYY-MM-DD, default today)
    #[arg(long)]
    pub date: Option<String>,

    /// Attendance store (.json)
    #[arg(long)]
    pub store: Option<String>,

    /// Directory for the import bundle
    #[arg(long)]
    pub output: Option<String>,

    /// Append valid records to the store instead of only previewing
    #[arg(long)]
    pub commit: bool,

    /// Commit valid rows even when other rows failed validation
    #[arg(long, requires = "commit")]
    pub allow_partial: bool,

    #[arg(long, help = "Log CPU and memory use per phase")]
    pub monitor: bool,
}

impl From<ImportArgs> for ImportOverrides {
    fn from(args: ImportArgs) -> Self {
        ImportOverrides {
            rows_file: args.rows,
            roster_file: args.roster,
            fallback_date: args.date,
            store_path: args.store,
            output_path: args.output,
            commit: args.commit,
            allow_partial: args.allow_partial,
            monitor: args.monitor.then_some(true),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ReportSource {
    /// Employee roster (.csv or .json)
    #[arg(long)]
    pub roster: Option<String>,

    /// Attendance store (.json)
    #[arg(long)]
    pub store: Option<String>,

    /// Directory for the exported CSV
    #[arg(long)]
    pub output: Option<String>,

    /// Restrict the report to one employee id
    #[arg(long)]
    pub employee: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ReportKind {
    Daily {
        /// Day to report (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        #[command(flatten)]
        source: ReportSource,
    },
    Monthly {
        /// Month to report (YYYY-MM)
        #[arg(long)]
        month: String,

        #[command(flatten)]
        source: ReportSource,
    },
    /// Every roster employee for one day, including those not marked yet
    Roster {
        /// Day to show (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        #[command(flatten)]
        source: ReportSource,
    },
}

#[derive(Debug, Clone, Args)]
pub struct MarkArgs {
    /// Day to mark (YYYY-MM-DD, default today)
    #[arg(long)]
    pub date: Option<String>,

    /// Present/Absent, P/A, 1/0 or Yes/No
    #[arg(long)]
    pub status: String,

    /// Employee id to mark
    #[arg(long, required_unless_present = "all_unmarked", conflicts_with = "all_unmarked")]
    pub employee: Option<String>,

    /// Mark every employee without a record for the day
    #[arg(long)]
    pub all_unmarked: bool,

    /// Employee roster (.csv or .json)
    #[arg(long)]
    pub roster: Option<String>,

    /// Attendance store (.json)
    #[arg(long)]
    pub store: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct TemplateArgs {
    /// Date written into the sample rows (YYYY-MM-DD, default today)
    #[arg(long)]
    pub date: Option<String>,

    /// Directory for the template
    #[arg(long)]
    pub output: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_command() {
        let cli = CliConfig::try_parse_from([
            "attendance-etl",
            "import",
            "--rows",
            "march.csv",
            "--roster",
            "roster.json",
            "--date",
            "2024-03-01",
            "--commit",
            "--allow-partial",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        let Command::Import(args) = cli.command else {
            panic!("expected import");
        };
        let overrides = ImportOverrides::from(args);
        assert_eq!(overrides.rows_file.as_deref(), Some("march.csv"));
        assert_eq!(overrides.fallback_date.as_deref(), Some("2024-03-01"));
        assert!(overrides.commit && overrides.allow_partial);
        assert_eq!(overrides.monitor, None);
    }

    #[test]
    fn test_allow_partial_requires_commit() {
        let parsed = CliConfig::try_parse_from(["attendance-etl", "import", "--allow-partial"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_report_commands() {
        let cli = CliConfig::try_parse_from([
            "attendance-etl",
            "report",
            "monthly",
            "--month",
            "2024-04",
            "--employee",
            "7",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.log_format, LogFormat::Json);
        match cli.command {
            Command::Report {
                kind: ReportKind::Monthly { month, source },
            } => {
                assert_eq!(month, "2024-04");
                assert_eq!(source.employee.as_deref(), Some("7"));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(CliConfig::try_parse_from(["attendance-etl", "report", "daily"]).is_err());
    }

    #[test]
    fn test_mark_command_targets() {
        let cli = CliConfig::try_parse_from([
            "attendance-etl",
            "mark",
            "--date",
            "2024-03-01",
            "--status",
            "A",
            "--employee",
            "2",
        ])
        .unwrap();
        let Command::Mark(args) = cli.command else {
            panic!("expected mark");
        };
        assert_eq!(args.employee.as_deref(), Some("2"));
        assert!(!args.all_unmarked);

        let cli = CliConfig::try_parse_from(["attendance-etl", "mark", "--status", "present", "--all-unmarked"]).unwrap();
        let Command::Mark(args) = cli.command else {
            panic!("expected mark");
        };
        assert!(args.all_unmarked);
        assert_eq!(args.date, None);

        // exactly one target
        assert!(CliConfig::try_parse_from(["attendance-etl", "mark", "--status", "P"]).is_err());
        assert!(CliConfig::try_parse_from([
            "attendance-etl",
            "mark",
            "--status",
            "P",
            "--employee",
            "1",
            "--all-unmarked"
        ])
        .is_err());
    }
}
