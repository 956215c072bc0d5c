use anyhow::{Context, Result};
use colored::Colorize;
use std::fmt;
use std::process::Command;
use std::time::Instant;

/// Run one `cargo` invocation that must succeed, returning its stdout.
pub fn step(label: &str, args: &[&str]) -> Result<String> {
    println!("{}", format!("  {label}...").cyan());
    let start = Instant::now();

    let output = Command::new("cargo")
        .args(args)
        .output()
        .with_context(|| format!("Failed to run cargo {}", args.join(" ")))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.status.success() {
        eprintln!("{}", format!("  ✗ {label} failed").red().bold());
        eprintln!();
        // Test failures land on stdout, compiler errors on stderr.
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            eprintln!("  {line}");
        }
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        anyhow::bail!("{label} failed");
    }

    println!(
        "{}",
        format!("  ✓ Passed in {:.2}s", start.elapsed().as_secs_f64()).green()
    );
    Ok(stdout)
}

/// Totals over every `test result:` line of a `cargo test` run.
///
/// One run prints a line per test binary, so a suite spanning several
/// targets is summed rather than reported by its first binary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TestCounts {
    pub passed: u32,
    pub failed: u32,
    pub ignored: u32,
}

impl TestCounts {
    pub fn parse(output: &str) -> Self {
        output
            .lines()
            .filter_map(|line| line.split("test result:").nth(1))
            .fold(Self::default(), |acc, result| acc.merge(Self::parse_line(result)))
    }

    /// `ok. 5 passed; 0 failed; 1 ignored; 0 measured; 0 filtered out; ...`
    fn parse_line(result: &str) -> Self {
        let mut counts = Self::default();
        for field in result.split(';') {
            let mut words = field.split_whitespace().rev();
            let (Some(label), Some(value)) = (words.next(), words.next()) else {
                continue;
            };
            let Ok(value) = value.parse::<u32>() else {
                continue;
            };
            match label {
                "passed" => counts.passed = value,
                "failed" => counts.failed = value,
                "ignored" => counts.ignored = value,
                _ => {}
            }
        }
        counts
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            passed: self.passed.saturating_add(other.passed),
            failed: self.failed.saturating_add(other.failed),
            ignored: self.ignored.saturating_add(other.ignored),
        }
    }
}

impl fmt::Display for TestCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} passed", self.passed)?;
        if self.ignored > 0 {
            write!(f, ", {} ignored", self.ignored)?;
        }
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_summed_across_binaries() {
        let output = "\
running 3 tests
test result: ok. 3 passed; 0 failed; 0 ignored; 0 measured; 0 filtered out; finished in 0.01s

running 7 tests
test result: ok. 6 passed; 0 failed; 1 ignored; 0 measured; 0 filtered out; finished in 1.20s
";
        assert_eq!(
            TestCounts::parse(output),
            TestCounts {
                passed: 9,
                failed: 0,
                ignored: 1
            }
        );
    }

    #[test]
    fn output_without_results_counts_nothing() {
        assert_eq!(TestCounts::parse("error: no test target"), TestCounts::default());
    }

    #[test]
    fn display_hides_zero_ignored_and_failed() {
        let counts = TestCounts {
            passed: 4,
            failed: 0,
            ignored: 0,
        };
        assert_eq!(counts.to_string(), "4 passed");
        let counts = TestCounts {
            passed: 4,
            failed: 1,
            ignored: 2,
        };
        assert_eq!(counts.to_string(), "4 passed, 2 ignored, 1 failed");
    }
}
