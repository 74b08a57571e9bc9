use clap::Parser;
use std::path::PathBuf;
use tagsort::config::TagsortConfig;

#[derive(Parser, Debug, Default)]
#[command(name = "tagsort", version)]
#[command(
    about = "Rename and sort tagged files into folders according to rules in a schema",
    long_about = None
)]
pub struct Cli {
    /// Load the config file at this path
    #[arg(short = 'C', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Process hidden files (and folders, with --recursive)
    #[arg(short = 'H', long)]
    pub hidden: bool,

    /// Folder with input files, may be repeated
    #[arg(short, long = "input", value_name = "PATH")]
    pub input: Vec<PathBuf>,

    /// File of regex patterns (one per line) naming files to ignore, may be repeated
    #[arg(short = 'I', long = "ignore", value_name = "FILE")]
    pub ignore: Vec<PathBuf>,

    /// Descend into subfolders of input folders
    #[arg(short = 'R', long)]
    pub recursive: bool,

    /// Root folder to output files to, may be repeated (output is duplicated to each)
    #[arg(short, long = "output", value_name = "PATH")]
    pub output: Vec<PathBuf>,

    /// Organize in place, using the first input folder for output
    #[arg(short = 'O', long)]
    pub organize: bool,

    /// Tag group file (tagsort or TagSpaces format), may be repeated
    #[arg(short, long = "groups", value_name = "FILE")]
    pub groups: Vec<PathBuf>,

    /// Schema file, may be repeated (earlier files take priority)
    #[arg(short, long = "schema", value_name = "FILE")]
    pub schema: Vec<PathBuf>,

    /// Files matching no movement filter go to the output root
    #[arg(short = 'A', long)]
    pub all_match_root: bool,

    /// Delete empty folders in input folders
    #[arg(long)]
    pub clean_in: bool,

    /// Delete empty folders in output folders
    #[arg(long)]
    pub clean_out: bool,

    /// Delete empty folders in input and output folders
    #[arg(short, long)]
    pub clean: bool,

    /// Count a failed forced rename as a failure to name the file
    #[arg(short = 'F', long)]
    pub fail_forced_rename: bool,

    /// Keep originals by copying instead of moving
    #[arg(short, long)]
    pub keep: bool,

    /// Only move files, do not rename them
    #[arg(short, long)]
    pub move_only: bool,

    /// Move files even when they could not be renamed
    #[arg(short = 'M', long)]
    pub move_all: bool,

    /// Only rename files, do not move them
    #[arg(short = 'n', long)]
    pub rename_only: bool,

    /// Try to rename every file, not only those matching an unnamed pattern
    #[arg(short = 'N', long)]
    pub rename_manual: bool,

    /// Log what would happen without touching any file
    #[arg(short, long)]
    pub trial: bool,

    /// Print everything
    #[arg(long)]
    pub debug: bool,

    /// Also write the log to this file
    #[arg(short, long = "log", value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Overwrite the log file instead of appending to it
    #[arg(short = 'L', long)]
    pub overwrite_log: bool,

    /// Silence warnings about names Windows cannot store
    #[arg(short = 'P', long)]
    pub posix: bool,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Print every action taken
    #[arg(short, long)]
    pub verbose: bool,

    /// Overwrite files and folders in the way (data loss can occur)
    #[arg(long)]
    pub force: bool,
}

impl Cli {
    /// The command line options in config file shape.
    pub fn to_config(&self) -> TagsortConfig {
        TagsortConfig {
            input_folders: self.input.clone(),
            ignore_files: self.ignore.clone(),
            recursive: self.recursive,
            hidden: self.hidden,
            output_folders: self.output.clone(),
            organize: self.organize,
            group_files: self.groups.clone(),
            schema_files: self.schema.clone(),
            all_match_root: self.all_match_root,
            clean_input: self.clean_in,
            clean_output: self.clean_out,
            clean: self.clean,
            keep: self.keep,
            move_only: self.move_only,
            rename_only: self.rename_only,
            move_all: self.move_all,
            rename_manual: self.rename_manual,
            fail_forced_rename: self.fail_forced_rename,
            trial: self.trial,
            posix: self.posix,
            verbose: self.verbose,
            quiet: self.quiet,
            debug: self.debug,
            log_file: self.log.clone(),
            overwrite_log: self.overwrite_log,
            force: self.force,
        }
    }

    /// Folders that may hold a `.tagsortrc`, outputs first.
    pub fn config_search_folders(&self) -> Vec<PathBuf> {
        self.output.iter().chain(self.input.iter()).cloned().collect()
    }
}
