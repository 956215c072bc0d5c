use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use std::time::Instant;

use crate::cargo::{step, TestCounts};

/// Test targets of the drivers crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Suite {
    /// `#[cfg(test)]` modules beside each driver (mock buses and pins)
    Unit,
    /// Scripted bus traffic through the public API (`tests/bus_fixtures.rs`)
    Fixtures,
    /// WS2812B encoding laws (`tests/ws2812b_proptest.rs`)
    Proptest,
    /// Examples in the crate docs
    Doc,
}

impl Suite {
    pub const ALL: [Self; 4] = [Self::Unit, Self::Fixtures, Self::Proptest, Self::Doc];

    fn label(self) -> &'static str {
        match self {
            Self::Unit => "Unit tests",
            Self::Fixtures => "Bus fixtures",
            Self::Proptest => "WS2812B properties",
            Self::Doc => "Doc tests",
        }
    }

    fn target(self) -> &'static [&'static str] {
        match self {
            Self::Unit => &["--lib"],
            Self::Fixtures => &["--test", "bus_fixtures"],
            Self::Proptest => &["--test", "ws2812b_proptest"],
            Self::Doc => &["--doc"],
        }
    }

    /// Unit test paths start with the driver module (`bmx280::tests::...`),
    /// so a module name narrows the lib suite. The other suites are
    /// organised by scenario and always run whole.
    fn accepts_module_filter(self) -> bool {
        self == Self::Unit
    }

    fn cargo_args(self, module: Option<&str>) -> Vec<&str> {
        let mut args = vec!["test", "-p", "drivers"];
        args.extend_from_slice(self.target());
        if let Some(module) = module.filter(|_| self.accepts_module_filter()) {
            args.extend(["--", module]);
        }
        args
    }
}

/// Run the selected suites (all when `suites` is empty), optionally
/// limiting unit tests to one driver module such as `ads1x15`.
pub fn run(suites: &[Suite], module: Option<&str>) -> Result<()> {
    println!();
    println!("{}", "🧪 Running driver tests...".cyan().bold());
    println!();

    let total_start = Instant::now();
    let selected = if suites.is_empty() { Suite::ALL.as_slice() } else { suites };

    let mut results = Vec::with_capacity(selected.len());
    for &suite in selected {
        if module.is_some() && !suite.accepts_module_filter() {
            println!(
                "{}",
                format!("  {} run unfiltered", suite.label()).dimmed()
            );
        }
        let stdout = step(suite.label(), &suite.cargo_args(module))?;
        let counts = TestCounts::parse(&stdout);
        println!("{}", format!("    {counts}").green());
        println!();
        results.push((suite, counts));
    }

    let total = results
        .iter()
        .fold(TestCounts::default(), |acc, &(_, counts)| acc.merge(counts));

    println!("{}", "  Summary".bold());
    for (suite, counts) in &results {
        println!("    {:<20} {counts}", suite.label());
    }
    println!();
    println!(
        "{}",
        format!(
            "✓ {total} in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_filter_only_narrows_unit_tests() {
        assert_eq!(
            Suite::Unit.cargo_args(Some("bmx280")),
            ["test", "-p", "drivers", "--lib", "--", "bmx280"]
        );
        assert_eq!(
            Suite::Fixtures.cargo_args(Some("bmx280")),
            ["test", "-p", "drivers", "--test", "bus_fixtures"]
        );
    }

    #[test]
    fn doc_suite_targets_doc_tests() {
        assert_eq!(
            Suite::Doc.cargo_args(None),
            ["test", "-p", "drivers", "--doc"]
        );
    }
}
