use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

use crate::simulation::RunSummary;

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    passed: usize,
    failed: usize,
    runs: &'a [RunSummary],
}

fn pass_counts(results: &[RunSummary]) -> (usize, usize) {
    let passed = results.iter().filter(|r| r.passed).count();
    (passed, results.len() - passed)
}

pub fn generate_console_report<W: Write + ?Sized>(
    writer: &mut W,
    results: &[RunSummary],
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Simulation Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "=====================".cyan())?;

    let (passed, failed) = pass_counts(results);
    writeln!(writer, "Total runs: {}", results.len())?;
    writeln!(writer, "Passed: {}", passed.to_string().green())?;
    writeln!(writer, "Failed: {}", failed.to_string().red())?;
    writeln!(writer, "Total time: {total_duration:?}")?;
    writeln!(writer)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            writer,
            "{} seed {} ({})",
            status,
            result.seed.to_string().bold(),
            result.strategy
        )?;
        writeln!(
            writer,
            "   Stage: {} ({}), Qi {:.1}, Stones {}",
            result.stage_name, result.final_stage, result.qi, result.spirit_stones
        )?;
        writeln!(
            writer,
            "   Breakthroughs: {} ok / {} failed, Deviations: {}, Events: {} general / {} meditation",
            result.breakthroughs,
            result.failed_breakthroughs,
            result.deviations,
            result.general_events,
            result.meditation_events
        )?;
        writeln!(
            writer,
            "   Rebirths: {}, Disciples: {}, Insights: {}, Achievements: {}",
            result.rebirths,
            result.disciples,
            result.insights.len(),
            result.achievements.len()
        )?;
        for violation in &result.violations {
            writeln!(writer, "     • {}", violation.red())?;
        }
        writeln!(writer)?;
    }

    if let Some(furthest) = results.iter().max_by_key(|r| (r.rebirths, r.final_stage)) {
        writeln!(writer, "{}", "🏔  Furthest run".bright_yellow().bold())?;
        writeln!(
            writer,
            "Seed {} reached {} after {} rebirth(s)",
            furthest.seed.to_string().green(),
            furthest.stage_name,
            furthest.rebirths
        )?;
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(
    writer: &mut W,
    results: &[RunSummary],
    generated_at: DateTime<Utc>,
) -> Result<()> {
    let (passed, failed) = pass_counts(results);
    let report = JsonReport {
        generated_at: generated_at.to_rfc3339(),
        passed,
        failed,
        runs: results,
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    writer: &mut W,
    results: &[RunSummary],
    generated_at: DateTime<Utc>,
) -> Result<()> {
    writeln!(writer, "# Cultivation Simulation Results\n")?;
    writeln!(
        writer,
        "_Generated {}_\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;

    let (passed, failed) = pass_counts(results);
    writeln!(writer, "## Summary\n")?;
    writeln!(writer, "- **Total runs**: {}", results.len())?;
    writeln!(writer, "- **Passed**: {passed}")?;
    writeln!(writer, "- **Failed**: {failed}\n")?;

    writeln!(writer, "## Runs\n")?;
    writeln!(
        writer,
        "| Seed | Strategy | Stage | Qi | Rebirths | Breakthroughs | Deviations | Events | Status |"
    )?;
    writeln!(writer, "|---|---|---|---|---|---|---|---|---|")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(
            writer,
            "| {} | {} | {} | {:.1} | {} | {} | {} | {} | {} |",
            result.seed,
            result.strategy,
            result.stage_name,
            result.qi,
            result.rebirths,
            result.breakthroughs,
            result.deviations,
            result.general_events + result.meditation_events,
            status
        )?;
    }

    let failing: Vec<&RunSummary> = results.iter().filter(|r| !r.passed).collect();
    if !failing.is_empty() {
        writeln!(writer, "\n## Violations\n")?;
        for result in failing {
            writeln!(writer, "### Seed {}\n", result.seed)?;
            for violation in &result.violations {
                writeln!(writer, "- {violation}")?;
            }
            writeln!(writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Strategy;
    use chrono::TimeZone;

    fn sample(seed: u64, passed: bool) -> RunSummary {
        RunSummary {
            seed,
            strategy: Strategy::Balanced,
            duration_secs: 600,
            final_stage: 1,
            stage_name: "Qi Refining".to_string(),
            qi: 123.4,
            spirit_stones: 5,
            rebirths: 0,
            insights: vec![],
            disciples: 0,
            achievements: vec!["first_breath".to_string()],
            actions: 10,
            rejected_actions: 1,
            breakthroughs: 1,
            failed_breakthroughs: 0,
            meditations: 2,
            deviations: 0,
            general_events: 1,
            meditation_events: 0,
            danger_notices: 0,
            saves: 21,
            violations: if passed {
                vec![]
            } else {
                vec!["10ms: qi out of range (-1)".to_string()]
            },
            passed,
            elapsed: Duration::from_millis(12),
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().unwrap()
    }

    #[test]
    fn json_report_counts_runs() {
        let mut buffer = Vec::new();
        generate_json_report(&mut buffer, &[sample(1, true), sample(2, false)], fixed_time())
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["passed"], 1);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["runs"][1]["seed"], 2);
        assert_eq!(value["runs"][0]["strategy"], "balanced");
        assert!(
            value["generated_at"]
                .as_str()
                .unwrap()
                .starts_with("2024-05-01T12:00:00")
        );
    }

    #[test]
    fn markdown_report_lists_violations() {
        let mut buffer = Vec::new();
        generate_markdown_report(&mut buffer, &[sample(9, false)], fixed_time()).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("# Cultivation Simulation Results"));
        assert!(text.contains("| 9 | Balanced | Qi Refining |"));
        assert!(text.contains("qi out of range"));
    }

    #[test]
    fn console_report_names_each_seed() {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        generate_console_report(&mut buffer, &[sample(77, true)], Duration::from_secs(1)).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("seed 77"));
        assert!(text.contains("Furthest run"));
    }
}
