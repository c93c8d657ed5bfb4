//! Renders reports for the operator terminal. Successes and failures are
//! always shown together; error detail is never dropped for brevity.

use std::io::IsTerminal;

use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::model::Question;
use crate::quality::audit::{AuditReport, RecommendationLevel};
use crate::remediation::RemediationReport;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Render a full audit report as a multi-section text block.
pub fn format_audit_report(report: &AuditReport, use_colors: bool) -> String {
    let mut out = String::new();

    let accuracy = format!("{:.1}%", report.accuracy_pct);
    if use_colors {
        out.push_str(&format!(
            "Corpus: {} questions | {} valid, {} invalid ({} critical) | accuracy {}\n",
            report.total,
            report.valid.green(),
            report.invalid.red(),
            report.critical,
            if report.accuracy_pct < 80.0 {
                accuracy.red().to_string()
            } else {
                accuracy.green().to_string()
            },
        ));
    } else {
        out.push_str(&format!(
            "Corpus: {} questions | {} valid, {} invalid ({} critical) | accuracy {}\n",
            report.total, report.valid, report.invalid, report.critical, accuracy,
        ));
    }
    out.push_str(&format!(
        "Duplicate clusters: {}\n",
        report.duplicate_cluster_count
    ));

    if !report.per_entity.is_empty() {
        out.push('\n');
        out.push_str("Per entity:\n");
        for rollup in &report.per_entity {
            out.push_str(&format!(
                "  {:<20} {:>4} questions  {:>3} irrelevant  mean score {:>5.1}\n",
                rollup.entity_name,
                rollup.question_count,
                rollup.irrelevant_count,
                rollup.mean_score
            ));
        }
    }

    if !report.worst.is_empty() {
        out.push('\n');
        out.push_str(&format!("Worst offenders ({} shown):\n", report.worst.len()));
        let width = get_terminal_width().unwrap_or(100);
        let summary_width = width.saturating_sub(40).max(20);
        for entry in &report.worst {
            let line = format!(
                "  {:>3}  {:<24} {}",
                entry.score,
                truncate(&format!("{}/{}", entry.entity_id, entry.question_id), 24),
                truncate(&entry.summary, summary_width)
            );
            if use_colors && entry.score == 0 {
                out.push_str(&format!("{}\n", line.red()));
            } else {
                out.push_str(&format!("{}\n", line));
            }
        }
    }

    out.push('\n');
    out.push_str("Recommendations:\n");
    for rec in &report.recommendations {
        let tag = match rec.level {
            RecommendationLevel::Info => "INFO",
            RecommendationLevel::Warning => "WARN",
            RecommendationLevel::Critical => "CRITICAL",
        };
        if use_colors {
            let tag = match rec.level {
                RecommendationLevel::Info => tag.to_string(),
                RecommendationLevel::Warning => tag.yellow().to_string(),
                RecommendationLevel::Critical => tag.red().bold().to_string(),
            };
            out.push_str(&format!("  [{}] {}\n", tag, rec.message));
        } else {
            out.push_str(&format!("  [{}] {}\n", tag, rec.message));
        }
    }

    out
}

/// Render a remediation run: counts first, then every failure and warning.
pub fn format_remediation_report(report: &RemediationReport, use_colors: bool) -> String {
    let mut out = String::new();

    if use_colors {
        out.push_str(&format!(
            "Scanned {} | deleted {} | fixed {} | errored {}\n",
            report.scanned,
            report.deleted.green(),
            report.fixed.cyan(),
            if report.errored > 0 {
                report.errored.red().to_string()
            } else {
                report.errored.to_string()
            },
        ));
    } else {
        out.push_str(&format!(
            "Scanned {} | deleted {} | fixed {} | errored {}\n",
            report.scanned, report.deleted, report.fixed, report.errored,
        ));
    }

    for failure in &report.batch_failures {
        out.push_str(&format!(
            "  batch {} failed ({} ids): {}\n",
            failure.batch_index,
            failure.ids.len(),
            failure.error
        ));
    }

    for warning in &report.warnings {
        if use_colors {
            out.push_str(&format!("  {} {}\n", "warning:".yellow(), warning));
        } else {
            out.push_str(&format!("  warning: {}\n", warning));
        }
    }

    out
}

/// Format picked questions as a numbered table: index, difficulty, text.
pub fn format_question_table(questions: &[Question], use_colors: bool) -> String {
    if questions.is_empty() {
        return "No questions selected.".to_string();
    }

    let width = get_terminal_width().unwrap_or(100);
    let text_width = width.saturating_sub(16).max(30);

    questions
        .iter()
        .enumerate()
        .map(|(idx, q)| {
            let difficulty = format!("{:?}", q.difficulty).to_lowercase();
            let text = truncate(&q.text, text_width);
            if use_colors {
                format!("{:>3}. [{:<6}] {}", idx + 1, difficulty.cyan(), text.bold())
            } else {
                format!("{:>3}. [{:<6}] {}", idx + 1, difficulty, text)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::audit::{EntityRollup, Recommendation, WorstEntry};
    use crate::remediation::{BatchFailure, Phase};

    fn sample_report() -> AuditReport {
        AuditReport {
            total: 10,
            valid: 7,
            invalid: 3,
            critical: 1,
            accuracy_pct: 70.0,
            duplicate_cluster_count: 1,
            per_entity: vec![EntityRollup {
                entity_id: "kenya".to_string(),
                entity_name: "Kenya".to_string(),
                question_count: 10,
                irrelevant_count: 2,
                mean_score: 81.5,
            }],
            worst: vec![WorstEntry {
                question_id: "q-bad".to_string(),
                entity_id: "kenya".to_string(),
                score: 0,
                summary: "question text contains placeholder template text".to_string(),
            }],
            recommendations: vec![Recommendation {
                level: RecommendationLevel::Critical,
                message: "corpus accuracy 70.0% is below the 80% floor".to_string(),
            }],
        }
    }

    #[test]
    fn test_audit_report_plain_output() {
        let text = format_audit_report(&sample_report(), false);
        assert!(text.contains("10 questions"));
        assert!(text.contains("accuracy 70.0%"));
        assert!(text.contains("Kenya"));
        assert!(text.contains("[CRITICAL]"));
        assert!(text.contains("q-bad"));
    }

    #[test]
    fn test_remediation_report_shows_failures_and_warnings() {
        let report = RemediationReport {
            phase: Phase::Done,
            scanned: 100,
            deleted: 3,
            fixed: 1,
            errored: 2,
            batch_failures: vec![BatchFailure {
                batch_index: 1,
                ids: vec!["a".to_string(), "b".to_string()],
                error: "store is unavailable: outage".to_string(),
            }],
            warnings: vec!["verification: 2 record(s) still match the remediation target".to_string()],
        };
        let text = format_remediation_report(&report, false);
        assert!(text.contains("deleted 3"));
        assert!(text.contains("batch 1 failed (2 ids)"));
        assert!(text.contains("warning: verification"));
    }

    #[test]
    fn test_truncate_unicode_safe() {
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
        assert_eq!(truncate("short", 10), "short");
    }
}
