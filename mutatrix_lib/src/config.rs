//! The `config` module holds the options tree shared by the command line and the
//! YAML configuration file.  Command-line values take precedence; the file fills in
//! whatever the command line left unset.

use crate::error::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// The default per-mutant test timeout in seconds.
pub const DEFAULT_TIMEOUT: u64 = 10;

/// General options.
#[derive(Debug, Clone, Default)]
pub struct GeneralOptions {
    pub verbose: bool,
    pub debug: bool,
    pub config: Option<PathBuf>,
    pub do_not_remove_tmp_folder: bool,
}

/// File handling options.
#[derive(Debug, Clone, Default)]
pub struct FileOptions {
    pub list_files: bool,
    pub print_ast: bool,
    pub blacklist: Vec<PathBuf>,
}

/// Mutator selection options.
#[derive(Debug, Clone, Default)]
pub struct MutatorOptions {
    pub list_mutators: bool,
    pub disable_mutators: Vec<String>,
}

/// Node filtering options.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Only mutate functions whose name matches this regex.
    pub match_pattern: Option<String>,
}

/// Test execution options.
#[derive(Debug, Clone)]
pub struct ExecOptions {
    /// The external test command; empty means the internal runner.
    pub exec: String,
    pub no_exec: bool,
    pub timeout: u64,
}

impl Default for ExecOptions {
    fn default() -> Self {
        ExecOptions {
            exec: String::new(),
            no_exec: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Test scoping options.
#[derive(Debug, Clone, Default)]
pub struct TestOptions {
    pub recursive: bool,
}

/// Options only settable through the configuration file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    /// Suppress per-mutant console lines and the final score line.
    pub silent_mode: bool,
}

/// The full options tree.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub general: GeneralOptions,
    pub files: FileOptions,
    pub mutator: MutatorOptions,
    pub filter: FilterOptions,
    pub exec: ExecOptions,
    pub test: TestOptions,
    pub config: ConfigOptions,

    /// The package/path selectors left over on the command line.
    pub targets: Vec<String>,
}

/// The YAML configuration document.  Every field is optional; only present fields
/// overlay the options tree.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub verbose: Option<bool>,
    pub debug: Option<bool>,
    pub do_not_remove_tmp_folder: Option<bool>,
    pub blacklist: Option<Vec<PathBuf>>,
    pub disable_mutators: Option<Vec<String>>,
    pub match_pattern: Option<String>,
    pub exec: Option<String>,
    pub no_exec: Option<bool>,
    pub timeout: Option<u64>,
    pub test_recursive: Option<bool>,
    pub silent_mode: Option<bool>,
}

impl FileConfig {
    /// Parse the YAML document at `path`.
    pub fn load(path: &Path) -> Result<FileConfig> {
        let content = fs::read_to_string(path)?;
        let config: FileConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

impl Options {
    /// Overlay the configuration file onto these options.  The command line wins:
    /// a file value only lands where the command line kept the default.
    pub fn apply_file_config(&mut self, config: &FileConfig) {
        self.general.verbose |= config.verbose.unwrap_or(false);
        self.general.debug |= config.debug.unwrap_or(false);
        self.general.do_not_remove_tmp_folder |=
            config.do_not_remove_tmp_folder.unwrap_or(false);

        if self.files.blacklist.is_empty() {
            if let Some(blacklist) = &config.blacklist {
                self.files.blacklist = blacklist.clone();
            }
        }
        if self.mutator.disable_mutators.is_empty() {
            if let Some(disabled) = &config.disable_mutators {
                self.mutator.disable_mutators = disabled.clone();
            }
        }
        if self.filter.match_pattern.is_none() {
            self.filter.match_pattern = config.match_pattern.clone();
        }
        if self.exec.exec.is_empty() {
            if let Some(exec) = &config.exec {
                self.exec.exec = exec.clone();
            }
        }
        self.exec.no_exec |= config.no_exec.unwrap_or(false);
        if self.exec.timeout == DEFAULT_TIMEOUT {
            if let Some(timeout) = config.timeout {
                self.exec.timeout = timeout;
            }
        }
        self.test.recursive |= config.test_recursive.unwrap_or(false);
        self.config.silent_mode |= config.silent_mode.unwrap_or(false);

        // Debug output implies verbose output.
        if self.general.debug {
            self.general.verbose = true;
        }
    }
}
