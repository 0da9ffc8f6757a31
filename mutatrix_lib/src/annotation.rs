//! The `annotation` module parses in-source comment directives that exclude nodes or
//! operators from mutation.
//!
//! Three directives are recognized inside comments:
//!
//! * `mutator-disable-next-line [op1 op2 ...]` excludes the following line.
//! * `mutator-disable [op1 ...]` opens an exclusion region.
//! * `mutator-enable [...]` closes the open region.
//!
//! An empty operator list means "all operators".  Operator patterns may end in `*`
//! for a prefix match.  Regions do not nest: a disable inside an open region folds
//! into the outermost one, and an unclosed region runs to end of file.
//!
//! Because the parser does not retain comments in the syntax tree, the collect phase
//! scans the raw source text; the filter phase then maps nodes into the exclusion
//! table by their starting line.

use crate::filter::NodeFilter;
use crate::mutator::NodeRef;
use crate::registry::pattern_matches;
use std::collections::HashMap;

/// Directive marker for next-line exclusions.
pub const DISABLE_NEXT_LINE: &str = "mutator-disable-next-line";

/// Directive marker opening an exclusion region.
pub const DISABLE: &str = "mutator-disable";

/// Directive marker closing an exclusion region.
pub const ENABLE: &str = "mutator-enable";

/// One parsed directive.
#[derive(Debug, PartialEq)]
enum Directive {
    NextLine { patterns: Vec<String> },
    Disable { patterns: Vec<String> },
    Enable,
}

/// The annotation processor: a map from excluded line to the operator patterns
/// excluded there.  An empty pattern list excludes every operator on the line.
pub struct AnnotationProcessor {
    exclusions: HashMap<usize, Vec<String>>,
}

impl AnnotationProcessor {
    /// Collect all annotation directives from `source` (phase one).
    ///
    /// # Arguments
    ///
    /// * `source` - The raw text of the file, before parsing.
    pub fn collect(source: &str) -> AnnotationProcessor {
        let line_count = source.lines().count();
        let mut exclusions: HashMap<usize, Vec<String>> = HashMap::new();

        // (start line, patterns) of the currently open region, if any.
        let mut open_region: Option<(usize, Vec<String>)> = None;

        for (index, line) in source.lines().enumerate() {
            let line_number = index + 1;
            let directive = match comment_text(line).and_then(parse_directive) {
                Some(d) => d,
                None => continue,
            };

            match directive {
                Directive::NextLine { patterns } => {
                    exclude(&mut exclusions, line_number + 1, &patterns);
                }
                Directive::Disable { patterns } => {
                    // Nested disables fold into the outermost region.
                    if open_region.is_none() {
                        open_region = Some((line_number, patterns));
                    }
                }
                Directive::Enable => {
                    if let Some((start, patterns)) = open_region.take() {
                        for line in start..=line_number {
                            exclude(&mut exclusions, line, &patterns);
                        }
                    }
                }
            }
        }

        // An unmatched disable runs to end of file.
        if let Some((start, patterns)) = open_region {
            for line in start..=line_count {
                exclude(&mut exclusions, line, &patterns);
            }
        }

        AnnotationProcessor { exclusions }
    }

    /// Return true if a node starting on `line` is excluded for `mutator_name`
    /// (phase two).
    pub fn excludes(&self, line: usize, mutator_name: &str) -> bool {
        match self.exclusions.get(&line) {
            Some(patterns) => {
                patterns.is_empty() || patterns.iter().any(|p| pattern_matches(p, mutator_name))
            }
            None => false,
        }
    }
}

impl NodeFilter for AnnotationProcessor {
    fn skip(&self, node: NodeRef<'_>, mutator_name: &str) -> bool {
        self.excludes(node.start_line(), mutator_name)
    }
}

/// Record an exclusion for `line`.  Pattern lists merge; an empty list (all
/// operators) swallows any specific patterns already present.
fn exclude(exclusions: &mut HashMap<usize, Vec<String>>, line: usize, patterns: &[String]) {
    use std::collections::hash_map::Entry;

    match exclusions.entry(line) {
        Entry::Vacant(vacant) => {
            vacant.insert(patterns.to_vec());
        }
        Entry::Occupied(mut occupied) => {
            let entry = occupied.get_mut();
            if patterns.is_empty() {
                entry.clear();
            } else if !entry.is_empty() {
                entry.extend(patterns.iter().cloned());
            }
        }
    }
}

/// Extract comment text from one source line, if the line carries a comment.
fn comment_text(line: &str) -> Option<&str> {
    if let Some(position) = line.find("//") {
        let text = &line[position + 2..];
        return Some(text.trim_start_matches(['/', '!']).trim());
    }

    if let Some(start) = line.find("/*") {
        let text = &line[start + 2..];
        let end = text.find("*/").unwrap_or(text.len());
        return Some(text[..end].trim());
    }

    None
}

/// Parse one comment's text into a directive, if it is one.
fn parse_directive(text: &str) -> Option<Directive> {
    // Longest marker first: `mutator-disable` is a prefix of the next-line form.
    if let Some(rest) = strip_marker(text, DISABLE_NEXT_LINE) {
        return Some(Directive::NextLine {
            patterns: parse_patterns(rest),
        });
    }
    if strip_marker(text, ENABLE).is_some() {
        return Some(Directive::Enable);
    }
    if let Some(rest) = strip_marker(text, DISABLE) {
        return Some(Directive::Disable {
            patterns: parse_patterns(rest),
        });
    }

    None
}

/// Strip `marker` from the front of `text`, requiring a word boundary after it.
fn strip_marker<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(marker)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}

fn parse_patterns(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_next_line_all_operators() {
        let source = "fn f() {\n    // mutator-disable-next-line\n    let a = 1 + 2;\n}\n";
        let processor = AnnotationProcessor::collect(source);

        assert!(processor.excludes(3, "arithmetic/base"));
        assert!(processor.excludes(3, "numbers/incrementer"));
        assert!(!processor.excludes(2, "arithmetic/base"));
        assert!(!processor.excludes(4, "arithmetic/base"));
    }

    #[test]
    fn test_annotation_next_line_specific_operators() {
        let source = "// mutator-disable-next-line conditional/* numbers/incrementer\nlet ok = a < b;\n";
        let processor = AnnotationProcessor::collect(source);

        assert!(processor.excludes(2, "conditional/negated"));
        assert!(processor.excludes(2, "numbers/incrementer"));
        assert!(!processor.excludes(2, "numbers/decrementer"));
        assert!(!processor.excludes(2, "arithmetic/base"));
    }

    #[test]
    fn test_annotation_region() {
        let source = "\
let a = 1;
// mutator-disable loop/*
for x in 0..3 {
    touch(x);
}
// mutator-enable
let b = 2;
";
        let processor = AnnotationProcessor::collect(source);

        assert!(!processor.excludes(1, "loop/range_break"));
        for line in 2..=6 {
            assert!(processor.excludes(line, "loop/range_break"), "line {}", line);
            assert!(!processor.excludes(line, "numbers/incrementer"), "line {}", line);
        }
        assert!(!processor.excludes(7, "loop/range_break"));
    }

    #[test]
    fn test_annotation_unclosed_region_runs_to_eof() {
        let source = "let a = 1;\n// mutator-disable\nlet b = 2;\nlet c = 3;\n";
        let processor = AnnotationProcessor::collect(source);

        assert!(!processor.excludes(1, "numbers/incrementer"));
        assert!(processor.excludes(2, "numbers/incrementer"));
        assert!(processor.excludes(3, "numbers/incrementer"));
        assert!(processor.excludes(4, "numbers/incrementer"));
    }

    #[test]
    fn test_annotation_nested_disable_folds_into_outermost() {
        let source = "\
// mutator-disable
let a = 1;
// mutator-disable numbers/*
let b = 2;
// mutator-enable
let c = 3;
";
        let processor = AnnotationProcessor::collect(source);

        // The outermost (all-operator) region governs through its enable.
        for line in 1..=5 {
            assert!(processor.excludes(line, "arithmetic/base"), "line {}", line);
        }
        assert!(!processor.excludes(6, "arithmetic/base"));
    }

    #[test]
    fn test_annotation_trailing_comment_and_block_comment() {
        let source = "let a = 1; // mutator-disable-next-line\nlet b = 2;\n/* mutator-disable-next-line */\nlet c = 3;\n";
        let processor = AnnotationProcessor::collect(source);

        assert!(processor.excludes(2, "numbers/incrementer"));
        assert!(processor.excludes(4, "numbers/incrementer"));
    }

    #[test]
    fn test_annotation_marker_requires_word_boundary() {
        let source = "// mutator-disable-next-liner\nlet a = 1;\n// mutator-disablement\nlet b = 2;\n";
        let processor = AnnotationProcessor::collect(source);

        assert!(!processor.excludes(2, "numbers/incrementer"));
        assert!(!processor.excludes(4, "numbers/incrementer"));
    }
}
