//! The `report` module accumulates per-mutant records, computes the mutation score,
//! and serializes the final report.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The file the report is written to at the end of a run.
pub const REPORT_FILE_NAME: &str = "report.json";

/// Details of the operator application that produced one mutant.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MutatorInfo {
    #[serde(rename = "MutatorName")]
    pub mutator_name: String,

    #[serde(rename = "OriginalFilePath")]
    pub original_file_path: String,

    /// The 1-based line of the first changed hunk in the diff.
    #[serde(rename = "OriginalStartLine")]
    pub original_start_line: usize,

    #[serde(rename = "OriginalSourceCode")]
    pub original_source_code: String,

    #[serde(rename = "MutatedSourceCode")]
    pub mutated_source_code: String,
}

/// One classified mutant.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Mutant {
    #[serde(rename = "Mutator")]
    pub mutator: MutatorInfo,

    #[serde(rename = "Diff")]
    pub diff: String,

    #[serde(rename = "ProcessOutput")]
    pub process_output: String,
}

/// Aggregated counters over all mutants of a run.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Stats {
    #[serde(rename = "KilledCount")]
    pub killed_count: u64,

    #[serde(rename = "EscapedCount")]
    pub escaped_count: u64,

    #[serde(rename = "SkippedCount")]
    pub skipped_count: u64,

    #[serde(rename = "DuplicatedCount")]
    pub duplicated_count: u64,

    #[serde(rename = "ErrorCount")]
    pub error_count: u64,

    #[serde(rename = "TotalMutantsCount")]
    pub total_mutants_count: u64,

    /// The mutation score index: killed / (killed + escaped).
    #[serde(rename = "Msi")]
    pub msi: f64,
}

/// The whole-run report.  Killed, escaped, and errored mutants carry full records;
/// skipped and duplicated mutants only count.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Report {
    #[serde(rename = "Killed")]
    pub killed: Vec<Mutant>,

    #[serde(rename = "Escaped")]
    pub escaped: Vec<Mutant>,

    #[serde(rename = "Errored")]
    pub errored: Vec<Mutant>,

    #[serde(rename = "Stats")]
    pub stats: Stats,
}

impl Report {
    pub fn new() -> Report {
        Report::default()
    }

    pub fn record_killed(&mut self, mutant: Mutant) {
        self.killed.push(mutant);
        self.stats.killed_count += 1;
    }

    pub fn record_escaped(&mut self, mutant: Mutant) {
        self.escaped.push(mutant);
        self.stats.escaped_count += 1;
    }

    pub fn record_errored(&mut self, mutant: Mutant) {
        self.errored.push(mutant);
        self.stats.error_count += 1;
    }

    pub fn record_skipped(&mut self) {
        self.stats.skipped_count += 1;
    }

    pub fn record_duplicated(&mut self) {
        self.stats.duplicated_count += 1;
    }

    /// Compute the derived counters: the total and the mutation score index.
    ///
    /// The score is killed / (killed + escaped), or 0 when no mutant was executed;
    /// skipped and duplicated mutants do not contribute.
    pub fn calculate(&mut self) {
        let stats = &mut self.stats;

        stats.total_mutants_count = stats.killed_count
            + stats.escaped_count
            + stats.skipped_count
            + stats.duplicated_count
            + stats.error_count;

        let scored = stats.killed_count + stats.escaped_count;
        stats.msi = if scored > 0 {
            stats.killed_count as f64 / scored as f64
        } else {
            0.0
        };
    }

    /// Serialize the report as JSON into `path`.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mutant(name: &str) -> Mutant {
        Mutant {
            mutator: MutatorInfo {
                mutator_name: name.to_string(),
                original_file_path: "src/lib.rs".to_string(),
                original_start_line: 3,
                original_source_code: "fn f() -> i32 { 1 + 2 }\n".to_string(),
                mutated_source_code: "fn f() -> i32 { 1 - 2 }\n".to_string(),
            },
            diff: "-1 + 2\n+1 - 2\n".to_string(),
            process_output: "PASS \"src/lib.rs.0\"\n".to_string(),
        }
    }

    #[test]
    fn test_report_counter_identity() {
        let mut report = Report::new();
        report.record_killed(mutant("arithmetic/base"));
        report.record_killed(mutant("arithmetic/base"));
        report.record_escaped(mutant("branch/if"));
        report.record_errored(mutant("loop/break"));
        report.record_skipped();
        report.record_duplicated();
        report.record_duplicated();
        report.calculate();

        let stats = &report.stats;
        assert_eq!(stats.total_mutants_count, 7);
        assert_eq!(
            stats.killed_count
                + stats.escaped_count
                + stats.skipped_count
                + stats.duplicated_count
                + stats.error_count,
            stats.total_mutants_count
        );
    }

    #[test]
    fn test_report_msi() {
        let mut report = Report::new();
        report.record_killed(mutant("a"));
        report.record_killed(mutant("b"));
        report.record_killed(mutant("c"));
        report.record_escaped(mutant("d"));
        report.calculate();
        assert_eq!(report.stats.msi, 0.75);

        // Skipped and duplicated mutants do not move the score.
        report.record_skipped();
        report.record_duplicated();
        report.calculate();
        assert_eq!(report.stats.msi, 0.75);
        assert!(report.stats.msi >= 0.0 && report.stats.msi <= 1.0);
    }

    #[test]
    fn test_report_msi_zero_when_nothing_scored() {
        let mut report = Report::new();
        report.record_skipped();
        report.calculate();
        assert_eq!(report.stats.msi, 0.0);
    }

    #[test]
    fn test_report_json_field_names() {
        let mut report = Report::new();
        report.record_escaped(mutant("conditional/negated"));
        report.calculate();

        let json = serde_json::to_string(&report).unwrap();
        for field in [
            "\"Killed\"",
            "\"Escaped\"",
            "\"Errored\"",
            "\"Stats\"",
            "\"KilledCount\"",
            "\"EscapedCount\"",
            "\"SkippedCount\"",
            "\"DuplicatedCount\"",
            "\"ErrorCount\"",
            "\"TotalMutantsCount\"",
            "\"Msi\"",
            "\"Mutator\"",
            "\"MutatorName\"",
            "\"OriginalFilePath\"",
            "\"OriginalStartLine\"",
            "\"OriginalSourceCode\"",
            "\"MutatedSourceCode\"",
            "\"Diff\"",
            "\"ProcessOutput\"",
        ] {
            assert!(json.contains(field), "missing field {}", field);
        }
    }

    #[test]
    fn test_report_roundtrip_is_idempotent() {
        let mut report = Report::new();
        report.record_killed(mutant("numbers/incrementer"));
        report.record_escaped(mutant("branch/else"));
        report.calculate();

        let first = serde_json::to_string(&report).unwrap();
        let parsed: Report = serde_json::from_str(&first).unwrap();
        let second = serde_json::to_string(&parsed).unwrap();

        assert_eq!(first, second);
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_report_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(REPORT_FILE_NAME);

        let mut report = Report::new();
        report.record_killed(mutant("statement/remove"));
        report.calculate();
        report.write_to_file(&path).unwrap();

        let parsed: Report = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.stats.killed_count, 1);
    }
}
