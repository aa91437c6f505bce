//! Submission report
//!
//! Prints the definition ID, then for each test in definition order its
//! domains and run ID:
//!
//! ```text
//! Project: 5f2c...
//!   throughput:
//!     Domains:
//!       alpha-0.biomes.whiteblock.io
//!     ID: 9e1a...
//! ```

use std::io::{self, Write};

use crate::api::RunId;
use crate::definition::TestSpec;

const INDENT: &str = "  ";

/// Everything needed to describe a submission
pub struct Submission<'a> {
    pub definition_id: &'a str,
    pub tests: &'a [TestSpec],
    /// One name per test, or empty when DNS is disabled
    pub dns: &'a [String],
    pub run_ids: &'a [RunId],
    pub dns_zone: &'a str,
}

/// Domain of one instance of a test
pub fn domain(name: &str, instance: usize, zone: &str) -> String {
    format!("{}-{}.{}", name, instance, zone)
}

fn print_kv<W: Write>(out: &mut W, level: usize, key: &str, value: &str) -> io::Result<()> {
    let indent = INDENT.repeat(level);
    if value.is_empty() {
        writeln!(out, "{}{}:", indent, key)
    } else {
        writeln!(out, "{}{}: {}", indent, key, value)
    }
}

fn print_s<W: Write>(out: &mut W, level: usize, line: &str) -> io::Result<()> {
    writeln!(out, "{}{}", INDENT.repeat(level), line)
}

/// Write the report
pub fn write_submission<W: Write>(out: &mut W, submission: &Submission<'_>) -> io::Result<()> {
    print_kv(out, 0, "Project", submission.definition_id)?;

    for (i, (test, id)) in submission.tests.iter().zip(submission.run_ids).enumerate() {
        print_kv(out, 1, &test.name, "")?;
        if let Some(name) = submission.dns.get(i) {
            print_kv(out, 2, "Domains", "")?;
            for instance in 0..test.instances() {
                print_s(out, 3, &domain(name, instance, submission.dns_zone))?;
            }
        }
        print_kv(out, 2, "ID", &id.0)?;
    }

    Ok(())
}
