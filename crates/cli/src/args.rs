//! Command-line arguments and usage text

use clap::Parser;
use std::path::{Path, PathBuf};

/// Arguments that print the usage text, wherever they appear
const HELP_ARGS: [&str; 4] = ["h", "help", "-h", "--help"];

/// autobackup - keep timestamped backups of a file while it is edited
#[derive(Parser, Debug)]
#[command(name = "autobackup")]
#[command(version, disable_help_flag = true, args_override_self = true)]
pub struct Cli {
    /// The file to watch for changes
    pub file: PathBuf,

    /// Maximum number of backups to keep
    #[arg(short = 'm', long = "max", allow_negative_numbers = true)]
    pub max_backups: Option<i64>,

    /// Minimum minutes between the newest backup and the current file
    #[arg(short = 't', long = "time", allow_negative_numbers = true)]
    pub minutes: Option<i64>,

    /// Config file (default: <config dir>/autobackup/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug diagnostics on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// True when no arguments were given or any of them asks for help
pub fn wants_help<S: AsRef<str>>(args: &[S]) -> bool {
    args.is_empty() || args.iter().any(|a| HELP_ARGS.contains(&a.as_ref()))
}

/// The watched file must be the first argument; flags only follow it
pub fn file_is_first<S: AsRef<str>>(args: &[S], cli: &Cli) -> bool {
    args.first()
        .is_some_and(|first| Path::new(first.as_ref()) == cli.file)
}

pub fn usage() -> String {
    let mut text = String::new();
    text.push_str("\nUsage:\n\n");
    text.push_str("autobackup {h | help | -h | --help}\n");
    text.push_str("\tPrints this help text.\n");
    text.push_str("autobackup file_path [-m max_backups] [-t minutes_between_backups] [--config path] [-v]\n");
    text.push_str("\tfile_path: The file to watch for changes.\n");
    text.push_str("\t-m, --max: Optional. Default is 10. The maximum number of backups to create - older\n");
    text.push_str("\t\tbackups made during this run of the program will be deleted.\n");
    text.push_str("\t-t, --time: Optional. Default is 10. The minimum amount of time in minutes that has\n");
    text.push_str("\t\tto have passed between the most recent backup and the current file in order\n");
    text.push_str("\t\tfor a new backup to be created.\n");
    text.push_str("\t--config: Optional. TOML file with [policy] and [watch] defaults.\n");
    text.push_str("\t-v, --verbose: Optional. Print debug diagnostics to stderr.\n\n");
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("autobackup").chain(args.iter().copied()))
    }

    #[test]
    fn test_help_detection() {
        assert!(wants_help::<&str>(&[]));
        assert!(wants_help(&["file.txt", "--help"]));
        assert!(wants_help(&["h"]));
        assert!(!wants_help(&["file.txt", "-m", "3"]));
        assert!(!wants_help(&["hh"]));
    }

    #[test]
    fn test_flags_in_any_order() {
        let cli = parse(&["notes.txt", "-t", "5", "--max", "3"]).unwrap();
        assert_eq!(cli.file, PathBuf::from("notes.txt"));
        assert_eq!(cli.max_backups, Some(3));
        assert_eq!(cli.minutes, Some(5));

        let cli = parse(&["notes.txt"]).unwrap();
        assert_eq!(cli.max_backups, None);
        assert_eq!(cli.minutes, None);
    }

    #[test]
    fn test_repeated_flag_keeps_last_value() {
        let cli = parse(&["notes.txt", "-m", "2", "-t", "1", "--max", "5"]).unwrap();
        assert_eq!(cli.max_backups, Some(5));
        assert_eq!(cli.minutes, Some(1));
    }

    #[test]
    fn test_file_must_come_first() {
        let args = ["-m", "3", "notes.txt"];
        let cli = parse(&args).unwrap();
        assert!(!file_is_first(&args, &cli));

        let args = ["notes.txt", "-m", "3"];
        let cli = parse(&args).unwrap();
        assert!(file_is_first(&args, &cli));
    }

    #[test]
    fn test_negative_values_reach_validation() {
        let cli = parse(&["notes.txt", "-m", "-1"]).unwrap();
        assert_eq!(cli.max_backups, Some(-1));
    }

    #[test]
    fn test_bad_values_rejected() {
        assert!(parse(&["notes.txt", "-m", "many"]).is_err());
        assert!(parse(&["notes.txt", "-t"]).is_err());
        assert!(parse(&["notes.txt", "-m", "1.5"]).is_err());
    }

    #[test]
    fn test_usage_mentions_every_flag() {
        let text = usage();
        for flag in ["-m, --max", "-t, --time", "--config", "{h | help | -h | --help}"] {
            assert!(text.contains(flag), "missing {flag}");
        }
    }
}
