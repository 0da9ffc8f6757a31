//! The main module contains the code to process the command line for the mutatrix
//! program and run the mutation-testing pipeline.

mod runner;

use chrono::Local;
use clap::{Args, CommandFactory, Parser};
use env_logger::TimestampPrecision;
use log::LevelFilter;
use mutatrix_lib::config::{
    ConfigOptions, ExecOptions, FileConfig, FileOptions, FilterOptions, GeneralOptions,
    MutatorOptions, Options, TestOptions, DEFAULT_TIMEOUT,
};
use std::io::Write;
use std::path::PathBuf;
use std::process;

/// Everything went fine.
pub const RETURN_OK: i32 = 0;

/// Help was requested because no targets were given.
pub const RETURN_HELP: i32 = 1;

/// The run failed.
pub const RETURN_ERROR: i32 = 3;

#[derive(Parser)]
#[command(name = "mutatrix", author, version, long_about = None)]
#[command(about = "Mutation testing for Rust source code")]
struct MutatrixCommand {
    /// Files or directories holding the source to mutate
    targets: Vec<String>,

    #[command(flatten)]
    general: GeneralCLArgs,

    #[command(flatten)]
    files: FilesCLArgs,

    #[command(flatten)]
    mutator: MutatorCLArgs,

    #[command(flatten)]
    filter: FilterCLArgs,

    #[command(flatten)]
    exec: ExecCLArgs,

    #[command(flatten)]
    test: TestCLArgs,
}

/// General arguments.
#[derive(Args, Debug, Clone)]
struct GeneralCLArgs {
    /// Verbose log output
    #[arg(long)]
    verbose: bool,

    /// Debug log output, implies --verbose
    #[arg(long)]
    debug: bool,

    /// Path to a YAML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not remove the tmp folder where all mutations are saved to
    #[arg(long)]
    do_not_remove_tmp_folder: bool,
}

/// Arguments controlling file handling.
#[derive(Args, Debug, Clone)]
struct FilesCLArgs {
    /// List found files and exit
    #[arg(long)]
    list_files: bool,

    /// Print the ASTs of all given files and exit
    #[arg(long)]
    print_ast: bool,

    /// File(s) holding blacklisted mutation checksums
    #[arg(long)]
    blacklist: Vec<PathBuf>,
}

/// Arguments controlling mutator selection.
#[derive(Args, Debug, Clone)]
struct MutatorCLArgs {
    /// List all available mutators and exit
    #[arg(long)]
    list_mutators: bool,

    /// Disable mutator by name or using * as a suffix pattern
    #[arg(long = "disable-mutators")]
    disable_mutators: Vec<String>,
}

/// Arguments controlling node filtering.
#[derive(Args, Debug, Clone)]
struct FilterCLArgs {
    /// Only mutate functions whose name matches this regex
    #[arg(long = "match")]
    match_pattern: Option<String>,
}

/// Arguments controlling test execution.
#[derive(Args, Debug, Clone)]
struct ExecCLArgs {
    /// Execute this command for every mutation instead of the built-in test runner
    #[arg(long, default_value = "")]
    exec: String,

    /// Skip the execution of tests, just enumerate mutants
    #[arg(long)]
    no_exec: bool,

    /// Sets a timeout for the command execution, in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT)]
    exec_timeout: u64,
}

/// Arguments controlling the test runner.
#[derive(Args, Debug, Clone)]
struct TestCLArgs {
    /// Run tests for the whole workspace, not just the package under mutation
    #[arg(long = "test-recursive")]
    recursive: bool,
}

impl MutatrixCommand {
    /// Convert the parsed command line into the library options tree.
    fn to_options(&self) -> Options {
        Options {
            general: GeneralOptions {
                verbose: self.general.verbose || self.general.debug,
                debug: self.general.debug,
                config: self.general.config.clone(),
                do_not_remove_tmp_folder: self.general.do_not_remove_tmp_folder,
            },
            files: FileOptions {
                list_files: self.files.list_files,
                print_ast: self.files.print_ast,
                blacklist: self.files.blacklist.clone(),
            },
            mutator: MutatorOptions {
                list_mutators: self.mutator.list_mutators,
                disable_mutators: self.mutator.disable_mutators.clone(),
            },
            filter: FilterOptions {
                match_pattern: self.filter.match_pattern.clone(),
            },
            exec: ExecOptions {
                exec: self.exec.exec.clone(),
                no_exec: self.exec.no_exec,
                timeout: self.exec.exec_timeout,
            },
            test: TestOptions {
                recursive: self.test.recursive,
            },
            config: ConfigOptions::default(),
            targets: self.targets.clone(),
        }
    }
}

fn exit_error(message: String) -> i32 {
    eprintln!("{}", message);

    RETURN_ERROR
}

fn main_cmd() -> i32 {
    let command = MutatrixCommand::parse();
    let mut options = command.to_options();

    if let Some(config_path) = options.general.config.clone() {
        let file_config = match FileConfig::load(&config_path) {
            Ok(config) => config,
            Err(error) => {
                return exit_error(format!(
                    "Could not read config file {:?}: {}",
                    config_path, error
                ))
            }
        };
        options.apply_file_config(&file_config);
    }

    let level = if options.general.debug {
        LevelFilter::Debug
    } else if options.general.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    let _ = env_logger::builder()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .format_timestamp(Some(TimestampPrecision::Seconds))
        .filter_level(level)
        .try_init();

    if options.targets.is_empty() && !options.mutator.list_mutators {
        let _ = MutatrixCommand::command().print_help();
        return RETURN_HELP;
    }

    match runner::run(&options) {
        Ok(code) => code,
        Err(error) => exit_error(error.to_string()),
    }
}

fn main() {
    process::exit(main_cmd());
}
