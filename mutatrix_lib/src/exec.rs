//! The `exec` module is the execution harness: it materializes a mutant in the
//! working tree, runs the configured test command, and classifies the outcome.
//!
//! Two modes exist.  Internal mode swaps the mutant over the original file and runs
//! the native test runner (`cargo test`) against the package owning the file, with a
//! compile phase first so a mutant that does not compile classifies as Skipped.
//! External mode runs a user command with the `MUTATE_*` environment contract and
//! inherited stdio.
//!
//! In both modes the original file is back in place before this module returns —
//! including on panic, through a drop guard.  Failing to restore is fatal: the
//! user's working tree would be left inconsistent.

use crate::error::{MutatrixError, Result};
use similar::{DiffTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

/// How one mutant fared against the test suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The tests failed: the mutant was detected.
    Killed,

    /// The tests passed: the mutant went undetected.
    Escaped,

    /// The mutant did not compile.
    Skipped,

    /// The test process exited abnormally (unknown code, timeout, signal).
    Errored,
}

/// Exit codes of the contract shared with external test commands: 0 means the
/// tests failed (mutant killed), 1 means they passed (mutant escaped), 2 means the
/// mutant did not compile.
const EXIT_KILLED: i32 = 0;
const EXIT_ESCAPED: i32 = 1;
const EXIT_SKIPPED: i32 = 2;

impl Classification {
    /// Translate an external command's exit code.
    fn from_exit_code(code: i32) -> Classification {
        match code {
            EXIT_KILLED => Classification::Killed,
            EXIT_ESCAPED => Classification::Escaped,
            EXIT_SKIPPED => Classification::Skipped,
            _ => Classification::Errored,
        }
    }
}

/// Options controlling one test invocation.
pub struct ExecConfig<'a> {
    /// The user's test command; empty means internal mode.
    pub command: Option<&'a str>,

    /// Per-mutant wall clock timeout in seconds.
    pub timeout: u64,

    /// Run the tests of the whole workspace instead of one package.
    pub recursive: bool,

    pub verbose: bool,
    pub debug: bool,
}

/// Compute the unified diff between original and mutated source, and the 1-based
/// line of the first changed hunk.
pub fn unified_diff(original: &str, mutated: &str) -> (String, usize) {
    let diff = TextDiff::from_lines(original, mutated);

    let text = diff
        .unified_diff()
        .context_radius(3)
        .header("Original", "New")
        .to_string();

    let start_line = diff
        .ops()
        .iter()
        .find(|op| op.tag() != DiffTag::Equal)
        .map(|op| op.old_range().start + 1)
        .unwrap_or(0);

    (text, start_line)
}

/// Locate the directory of the package that owns `file`: the nearest ancestor with
/// a `Cargo.toml`, falling back to the file's own directory.
pub fn find_package_dir(file: &Path) -> PathBuf {
    for ancestor in file.ancestors().skip(1) {
        if ancestor.join("Cargo.toml").is_file() {
            return ancestor.to_path_buf();
        }
    }

    file.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Run the tests for one materialized mutant and classify the outcome.
///
/// # Arguments
///
/// * `config` - Invocation options.
/// * `original` - The original source file in the working tree.
/// * `mutant` - The serialized mutant in the temp directory.
pub fn run_mutant(config: &ExecConfig<'_>, original: &Path, mutant: &Path) -> Result<Classification> {
    let package_dir = find_package_dir(original);

    let guard = SwapGuard::engage(original, mutant)?;

    let classification = match config.command {
        Some(command) if !command.is_empty() => {
            run_external(config, command, original, mutant, &package_dir)
        }
        _ => run_internal(config, &package_dir),
    };

    guard.disengage()?;

    classification
}

/// Internal mode: compile phase, then test phase, against the native test runner.
fn run_internal(config: &ExecConfig<'_>, package_dir: &Path) -> Result<Classification> {
    log::debug!("execute built-in test command for mutation");

    let manifest = package_dir.join("Cargo.toml");
    let timeout = Duration::from_secs(config.timeout);

    // Compile phase: a mutant that does not build is skipped, not killed.
    let mut build = Command::new("cargo");
    build.arg("test").arg("--no-run");
    apply_cargo_scope(&mut build, &manifest, config.recursive);

    match wait_with_output(build, timeout)? {
        WaitOutcome::TimedOut => return Ok(Classification::Errored),
        WaitOutcome::Exited(status, output) => {
            if !status.success() {
                if config.verbose {
                    println!("Mutation did not compile");
                }
                if config.debug {
                    println!("{}", output);
                }
                return Ok(Classification::Skipped);
            }
        }
    }

    let mut test = Command::new("cargo");
    test.arg("test");
    apply_cargo_scope(&mut test, &manifest, config.recursive);

    match wait_with_output(test, timeout)? {
        WaitOutcome::TimedOut => Ok(Classification::Errored),
        WaitOutcome::Exited(status, output) => {
            if config.debug {
                println!("{}", output);
            }
            if status.success() {
                // Tests passed: the mutant survived.
                Ok(Classification::Escaped)
            } else if status.code().is_some() {
                Ok(Classification::Killed)
            } else {
                // Killed by a signal.
                Ok(Classification::Errored)
            }
        }
    }
}

fn apply_cargo_scope(command: &mut Command, manifest: &Path, recursive: bool) {
    command.arg("--manifest-path").arg(manifest);
    if recursive {
        command.arg("--workspace");
    }
}

/// External mode: run the user command with the `MUTATE_*` environment and
/// inherited stdio, then translate the exit code.
fn run_external(
    config: &ExecConfig<'_>,
    command_line: &str,
    original: &Path,
    mutant: &Path,
    package_dir: &Path,
) -> Result<Classification> {
    log::debug!("execute {:?} for mutation", command_line);

    let mut words = command_line.split_whitespace();
    let program = match words.next() {
        Some(program) => program,
        None => return Ok(Classification::Errored),
    };

    let mut command = Command::new(program);
    command
        .args(words)
        .env("MUTATE_CHANGED", mutant)
        .env("MUTATE_ORIGINAL", original)
        .env("MUTATE_PACKAGE", package_dir)
        .env("MUTATE_TIMEOUT", config.timeout.to_string())
        .env("MUTATE_VERBOSE", config.verbose.to_string())
        .env("MUTATE_DEBUG", config.debug.to_string());
    if config.recursive {
        command.env("TEST_RECURSIVE", "true");
    }

    let child = command.spawn().map_err(|source| MutatrixError::ExecStart {
        command: command_line.to_string(),
        source,
    })?;

    match wait_child(child, Duration::from_secs(config.timeout))? {
        WaitOutcome::TimedOut => Ok(Classification::Errored),
        WaitOutcome::Exited(status, _) => match status.code() {
            Some(code) => Ok(Classification::from_exit_code(code)),
            None => Ok(Classification::Errored),
        },
    }
}

enum WaitOutcome {
    Exited(ExitStatus, String),
    TimedOut,
}

/// Spawn `command` with captured output and wait up to `timeout`.
fn wait_with_output(mut command: Command, timeout: Duration) -> Result<WaitOutcome> {
    command.stdout(Stdio::piped()).stderr(Stdio::piped());

    let program = format!("{:?}", command);
    let mut child = command.spawn().map_err(|source| MutatrixError::ExecStart {
        command: program,
        source,
    })?;

    // Drain the pipes off-thread so a chatty test run cannot deadlock the wait
    // loop on a full pipe buffer.
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_reader = std::thread::spawn(move || read_all(stdout));
    let stderr_reader = std::thread::spawn(move || read_all(stderr));

    let outcome = wait_child(child, timeout)?;

    let mut output = stdout_reader.join().unwrap_or_default();
    output.push_str(&stderr_reader.join().unwrap_or_default());

    Ok(match outcome {
        WaitOutcome::Exited(status, _) => WaitOutcome::Exited(status, output),
        WaitOutcome::TimedOut => WaitOutcome::TimedOut,
    })
}

fn read_all<R: std::io::Read>(reader: Option<R>) -> String {
    use std::io::Read;

    let mut buffer = String::new();
    if let Some(mut reader) = reader {
        let _ = reader.read_to_string(&mut buffer);
    }
    buffer
}

/// Poll `child` until it exits or `timeout` elapses; kill it on timeout.
fn wait_child(mut child: Child, timeout: Duration) -> Result<WaitOutcome> {
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(WaitOutcome::Exited(status, String::new()));
        }

        if Instant::now() >= deadline {
            child.kill()?;
            child.wait()?;
            return Ok(WaitOutcome::TimedOut);
        }

        std::thread::sleep(Duration::from_millis(50));
    }
}

/// Guard that swaps a mutant over the original file and guarantees the original is
/// put back.
///
/// Engaging renames the original aside and copies the mutant into its place.
/// `disengage` restores it on the normal path; the `Drop` impl covers panics and
/// early returns, aborting loudly when even that fails — at that point the working
/// tree no longer matches what the user had on disk.
struct SwapGuard {
    original: PathBuf,
    saved: PathBuf,
    armed: bool,
}

/// The path the original is parked at during a test run: `<original>.tmp`.
fn saved_path(original: &Path) -> PathBuf {
    let mut os = original.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}

impl SwapGuard {
    fn engage(original: &Path, mutant: &Path) -> Result<SwapGuard> {
        let saved = saved_path(original);

        fs::rename(original, &saved)?;
        if let Err(error) = fs::copy(mutant, original) {
            // Copying failed before anything ran; put the original straight back.
            let restore = fs::rename(&saved, original);
            if let Err(restore_error) = restore {
                return Err(MutatrixError::RestoreFailed {
                    path: original.to_path_buf(),
                    reason: restore_error.to_string(),
                });
            }
            return Err(MutatrixError::IO(error));
        }

        Ok(SwapGuard {
            original: original.to_path_buf(),
            saved,
            armed: true,
        })
    }

    /// Restore the original file and defuse the drop path.
    fn disengage(mut self) -> Result<()> {
        self.armed = false;

        fs::remove_file(&self.original).map_err(|e| MutatrixError::RestoreFailed {
            path: self.original.clone(),
            reason: e.to_string(),
        })?;
        fs::rename(&self.saved, &self.original).map_err(|e| MutatrixError::RestoreFailed {
            path: self.original.clone(),
            reason: e.to_string(),
        })?;

        Ok(())
    }
}

impl Drop for SwapGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let _ = fs::remove_file(&self.original);
        if let Err(error) = fs::rename(&self.saved, &self.original) {
            eprintln!(
                "FATAL: could not restore original file {}: {}; the saved copy is at {}",
                self.original.display(),
                error,
                self.saved.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exec_config(command: Option<&str>) -> ExecConfig<'_> {
        ExecConfig {
            command,
            timeout: 10,
            recursive: false,
            verbose: false,
            debug: false,
        }
    }

    fn fixture(dir: &Path) -> (PathBuf, PathBuf) {
        let original = dir.join("lib.rs");
        let mutant = dir.join("lib.rs.0");
        fs::write(&original, "fn original() {}\n").unwrap();
        fs::write(&mutant, "fn mutated() {}\n").unwrap();
        (original, mutant)
    }

    #[test]
    fn test_exec_external_exit_code_map() {
        let dir = tempfile::tempdir().unwrap();
        let (original, mutant) = fixture(dir.path());

        assert_eq!(
            run_mutant(&exec_config(Some("true")), &original, &mutant).unwrap(),
            Classification::Killed
        );
        assert_eq!(
            run_mutant(&exec_config(Some("false")), &original, &mutant).unwrap(),
            Classification::Escaped
        );
    }

    #[test]
    fn test_exec_external_skipped_and_errored_codes() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let (original, mutant) = fixture(dir.path());

        let script_path = dir.path().join("runner.sh");
        fs::write(&script_path, "#!/bin/sh\nexit 2\n").unwrap();
        let mut perms = fs::metadata(&script_path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script_path, perms).unwrap();

        let command = script_path.display().to_string();
        assert_eq!(
            run_mutant(&exec_config(Some(&command)), &original, &mutant).unwrap(),
            Classification::Skipped
        );

        fs::write(&script_path, "#!/bin/sh\nexit 7\n").unwrap();
        assert_eq!(
            run_mutant(&exec_config(Some(&command)), &original, &mutant).unwrap(),
            Classification::Errored
        );
    }

    #[test]
    fn test_exec_restores_original_in_all_cases() {
        let dir = tempfile::tempdir().unwrap();
        let (original, mutant) = fixture(dir.path());
        let pristine = fs::read(&original).unwrap();

        for command in ["true", "false"] {
            run_mutant(&exec_config(Some(command)), &original, &mutant).unwrap();
            assert_eq!(fs::read(&original).unwrap(), pristine);
            assert!(!saved_path(&original).exists());
        }
    }

    #[test]
    fn test_exec_start_failure_is_fatal_and_restores() {
        let dir = tempfile::tempdir().unwrap();
        let (original, mutant) = fixture(dir.path());
        let pristine = fs::read(&original).unwrap();

        let result = run_mutant(
            &exec_config(Some("/definitely/not/a/command")),
            &original,
            &mutant,
        );
        assert!(matches!(result, Err(MutatrixError::ExecStart { .. })));
        assert_eq!(fs::read(&original).unwrap(), pristine);
    }

    #[test]
    fn test_exec_timeout_is_errored() {
        let dir = tempfile::tempdir().unwrap();
        let (original, mutant) = fixture(dir.path());

        let config = ExecConfig {
            command: Some("sleep 30"),
            timeout: 1,
            recursive: false,
            verbose: false,
            debug: false,
        };
        assert_eq!(
            run_mutant(&config, &original, &mutant).unwrap(),
            Classification::Errored
        );
        assert!(original.exists());
    }

    #[test]
    fn test_exec_mutant_is_in_place_while_command_runs() {
        let dir = tempfile::tempdir().unwrap();
        let (original, mutant) = fixture(dir.path());

        let copy = dir.path().join("observed");
        let command = format!("cp {} {}", original.display(), copy.display());
        run_mutant(&exec_config(Some(&command)), &original, &mutant).unwrap();

        // The command saw the mutant, not the original.
        assert_eq!(fs::read(&copy).unwrap(), fs::read(&mutant).unwrap());
        assert_eq!(fs::read(&original).unwrap(), b"fn original() {}\n");
    }

    #[test]
    fn test_exec_unified_diff_start_line() {
        let original = "line one\nline two\nline three\n";
        let mutated = "line one\nline 2\nline three\n";

        let (diff, start) = unified_diff(original, mutated);
        assert_eq!(start, 2);
        assert!(diff.contains("-line two"));
        assert!(diff.contains("+line 2"));
        assert!(diff.contains("Original"));

        let (diff, start) = unified_diff(original, original);
        assert_eq!(start, 0);
        assert!(!diff.contains("@@"));
    }

    #[test]
    fn test_exec_find_package_dir() {
        let dir = tempfile::tempdir().unwrap();
        let package = dir.path().join("mypkg");
        let src = package.join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(package.join("Cargo.toml"), "[package]\n").unwrap();
        let file = src.join("lib.rs");
        fs::write(&file, "").unwrap();

        assert_eq!(find_package_dir(&file), package);
    }
}
