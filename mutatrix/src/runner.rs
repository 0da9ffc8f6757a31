//! The `runner` module drives one whole mutation-testing run: discover files,
//! build the operator set, walk every file, classify every mutant, and write the
//! report.

use crate::{RETURN_ERROR, RETURN_OK};
use log::{debug, info};
use mutatrix_lib::annotation::AnnotationProcessor;
use mutatrix_lib::astutil;
use mutatrix_lib::config::Options;
use mutatrix_lib::exec::{self, Classification, ExecConfig};
use mutatrix_lib::filter::{CapacityArgsFilter, FunctionMatchFilter, NodeFilter};
use mutatrix_lib::printer::{self, SaveOutcome};
use mutatrix_lib::report::{Mutant, MutatorInfo, Report, REPORT_FILE_NAME};
use mutatrix_lib::walker::MutationWalker;
use mutatrix_lib::{MutatorRegistry, Result, SeenSet, SourceFile, TypeIndex};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Run the whole pipeline; returns the process exit code.
pub fn run(options: &Options) -> Result<i32> {
    if options.mutator.list_mutators {
        for name in MutatorRegistry::builtin().list() {
            println!("{}", name);
        }
        return Ok(RETURN_OK);
    }

    let files = discover_files(&options.targets)?;
    if files.is_empty() {
        eprintln!("Could not find any suitable Rust source files");
        return Ok(RETURN_ERROR);
    }

    if options.files.list_files {
        for file in &files {
            println!("{}", file.display());
        }
        return Ok(RETURN_OK);
    }
    if options.files.print_ast {
        for file in &files {
            println!("{}", file.display());
            let source = SourceFile::load(file)?;
            println!("{}", astutil::dump_ast(&source.ast));
            println!();
        }
        return Ok(RETURN_OK);
    }

    let mut seen = SeenSet::new();
    for blacklist in &options.files.blacklist {
        seen.load_blacklist(blacklist)?;
    }

    let registry = MutatorRegistry::builtin();
    let mutators = registry.enabled_mutators(&options.mutator.disable_mutators);
    for (name, _) in &mutators {
        info!("Enable mutator {:?}", name);
    }

    let tmp_dir = tempfile::Builder::new().prefix("mutatrix-").tempdir()?;
    let tmp_path = tmp_dir.path().to_path_buf();
    info!("Save mutations into {:?}", tmp_path);

    let mut report = Report::new();

    for file in &files {
        info!("Mutate {:?}", file);
        mutate_file(options, &mutators, &mut seen, &mut report, &tmp_path, file)?;
    }

    if options.general.do_not_remove_tmp_folder {
        let kept = tmp_dir.into_path();
        println!("Mutations were saved in {:?}", kept);
    } else {
        tmp_dir.close()?;
        debug!("Remove {:?}", tmp_path);
    }

    report.calculate();

    if !options.exec.no_exec {
        if !options.config.silent_mode {
            println!(
                "The mutation score is {} ({} passed, {} failed, {} duplicated, {} skipped, total is {})",
                report.stats.msi,
                report.stats.killed_count,
                report.stats.escaped_count,
                report.stats.duplicated_count,
                report.stats.skipped_count,
                report.stats.total_mutants_count,
            );
        }
    } else {
        println!("Cannot do a mutation testing summary since no exec command was executed.");
    }

    report.write_to_file(Path::new(REPORT_FILE_NAME))?;
    info!("Save report into {:?}", REPORT_FILE_NAME);

    Ok(RETURN_OK)
}

/// Produce, classify, and record every mutant of one source file.
fn mutate_file(
    options: &Options,
    mutators: &[(String, Box<dyn mutatrix_lib::Mutator>)],
    seen: &mut SeenSet,
    report: &mut Report,
    tmp_path: &Path,
    file: &Path,
) -> Result<()> {
    let source = SourceFile::load(file)?;
    let types = TypeIndex::build(&source.ast);

    let mut filters: Vec<Box<dyn NodeFilter>> = vec![
        Box::new(AnnotationProcessor::collect(&source.code)),
        Box::new(CapacityArgsFilter::collect(&source.ast)),
    ];
    if let Some(pattern) = &options.filter.match_pattern {
        filters.push(Box::new(FunctionMatchFilter::from_pattern(
            pattern,
            &source.ast,
        )?));
    }

    let tmp_file = tmp_file_for(tmp_path, file);
    if let Some(parent) = tmp_file.parent() {
        fs::create_dir_all(parent)?;
    }

    let original_copy = PathBuf::from(format!("{}.original", tmp_file.display()));
    fs::copy(file, &original_copy)?;
    debug!("Save original into {:?}", original_copy);

    let original_canonical = printer::canonical_string(&source.ast);

    let mut mutation_id: usize = 0;
    let walker = MutationWalker::new(mutators, &filters, &types);
    let mut ast = source.ast.clone();

    walker.walk(&mut ast, |view| {
        let mutant_path = PathBuf::from(format!("{}.{}", tmp_file.display(), mutation_id));
        mutation_id += 1;

        let saved = match printer::save_mutant(seen, &mutant_path, view.file) {
            Ok(outcome) => outcome,
            Err(error) => {
                // A mutant we cannot materialize is dropped; the run goes on.
                log::error!("INTERNAL ERROR {}", error);
                return Ok(());
            }
        };

        let (checksum, mutated_source) = match saved {
            SaveOutcome::Duplicate { .. } => {
                debug!("{:?} is a duplicate, we ignore it", mutant_path);
                report.record_duplicated();
                return Ok(());
            }
            SaveOutcome::Saved { checksum, source } => (checksum, source),
        };
        debug!(
            "Save mutation into {:?} with checksum {}",
            mutant_path, checksum
        );

        if options.exec.no_exec {
            return Ok(());
        }

        let (diff, start_line) = exec::unified_diff(&original_canonical, &mutated_source);

        let exec_config = ExecConfig {
            command: if options.exec.exec.is_empty() {
                None
            } else {
                Some(&options.exec.exec)
            },
            timeout: options.exec.timeout,
            recursive: options.test.recursive,
            verbose: options.general.verbose,
            debug: options.general.debug,
        };
        let classification = exec::run_mutant(&exec_config, file, &mutant_path)?;
        debug!("Classified as {:?}", classification);

        let msg = format!("{:?} with checksum {}", mutant_path, checksum);
        let mut mutant = Mutant {
            mutator: MutatorInfo {
                mutator_name: view.mutator_name.to_string(),
                original_file_path: file.display().to_string(),
                original_start_line: start_line,
                original_source_code: source.code.clone(),
                mutated_source_code: mutated_source,
            },
            diff,
            process_output: String::new(),
        };

        match classification {
            Classification::Killed => {
                let out = format!("PASS {}\n", msg);
                console(options, &out);
                mutant.process_output = out;
                report.record_killed(mutant);
            }
            Classification::Escaped => {
                let out = format!("FAIL {}\n", msg);
                console(options, &out);
                mutant.process_output = out;
                report.record_escaped(mutant);
            }
            Classification::Skipped => {
                let out = format!("SKIP {}\n", msg);
                console(options, &out);
                report.record_skipped();
            }
            Classification::Errored => {
                let out = format!("UNKNOWN exit code for {}\n", msg);
                console(options, &out);
                mutant.process_output = out;
                report.record_errored(mutant);
            }
        }

        Ok(())
    })
}

fn console(options: &Options, line: &str) {
    if !options.config.silent_mode {
        print!("{}", line);
    }
}

/// Map an input file into the temp directory, keeping its path shape.
fn tmp_file_for(tmp_path: &Path, file: &Path) -> PathBuf {
    let relative = file.strip_prefix("/").unwrap_or(file);
    tmp_path.join(relative)
}

/// Expand the command-line targets into the list of source files to mutate.
///
/// Directory targets are walked recursively for `.rs` files; hidden directories and
/// cargo `target` directories are skipped.
fn discover_files(targets: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for target in targets {
        let path = Path::new(target);

        if path.is_dir() {
            let walk = WalkDir::new(path).sort_by_file_name().into_iter();
            for entry in walk.filter_entry(|e| !is_skipped_dir(e)) {
                let entry = entry.map_err(|error| {
                    mutatrix_lib::MutatrixError::IO(std::io::Error::from(error))
                })?;
                if entry.file_type().is_file()
                    && entry.path().extension().is_some_and(|ext| ext == "rs")
                {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    // The walk root is always entered, even when the target itself is hidden.
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }

    match entry.file_name().to_str() {
        Some(name) => name == "target" || (name.starts_with('.') && name.len() > 1),
        None => false,
    }
}
