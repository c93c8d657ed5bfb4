//! Batched delete/fix runs against the record store.
//!
//! The run is a state machine: Idle -> Scanning -> Batching -> Applying ->
//! Verifying -> Done (or Failed when the initial scan cannot reach the
//! store). A failed batch is recorded and the run continues with the
//! remaining batches; partial failure is reported, never hidden. Batches
//! are applied serially with a fixed delay in between so a rate-limited
//! store is not hammered.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::model::{Entity, Question};
use crate::quality::duplicates::find_duplicates;
use crate::quality::relevance::RelevanceClassifier;
use crate::quality::validator::{validate, ValidationRules};
use crate::store::{Filter, RecordStore};

/// Where the state machine ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Scanning,
    Batching,
    Applying,
    Verifying,
    Done,
    Failed,
}

/// Which records a run goes after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Records that fail validation (fixed when a mechanical repair
    /// suffices, deleted otherwise).
    InvalidQuestions,
    /// Redundant members of duplicate clusters.
    Duplicates,
    /// Both of the above.
    All,
}

impl Target {
    fn includes_invalid(&self) -> bool {
        matches!(self, Target::InvalidQuestions | Target::All)
    }

    fn includes_duplicates(&self) -> bool {
        matches!(self, Target::Duplicates | Target::All)
    }
}

#[derive(Debug, Clone)]
pub struct RemediationOptions {
    /// Ids per store call.
    pub batch_size: usize,
    /// Backpressure delay between store calls. Not a correctness knob.
    pub batch_delay: Duration,
    /// Scan and plan, but apply nothing.
    pub dry_run: bool,
}

impl Default for RemediationOptions {
    fn default() -> Self {
        RemediationOptions {
            batch_size: 25,
            batch_delay: Duration::from_millis(250),
            dry_run: false,
        }
    }
}

/// One store call that failed. The run keeps going past these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    pub batch_index: usize,
    pub ids: Vec<String>,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationReport {
    pub phase: Phase,
    /// Records examined during the scan.
    pub scanned: usize,
    pub deleted: usize,
    pub fixed: usize,
    /// Records in batches whose store call failed.
    pub errored: usize,
    pub batch_failures: Vec<BatchFailure>,
    /// Post-run verification mismatches. These need operator attention but
    /// do not fail the run.
    pub warnings: Vec<String>,
}

impl RemediationReport {
    fn empty(phase: Phase) -> Self {
        RemediationReport {
            phase,
            scanned: 0,
            deleted: 0,
            fixed: 0,
            errored: 0,
            batch_failures: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// The remediation plan derived from one fresh scan.
struct Plan {
    scanned: usize,
    fixes: Vec<Question>,
    delete_ids: Vec<String>,
}

/// Run one remediation pass. The target list is always re-derived fresh
/// from the store; a stale list from a previous run is never reused.
pub async fn remediate(
    store: &dyn RecordStore,
    entities: &[Entity],
    classifier: &RelevanceClassifier,
    rules: &ValidationRules,
    target: Target,
    opts: &RemediationOptions,
) -> RemediationReport {
    info!(?target, dry_run = opts.dry_run, "remediation run starting");

    // SCANNING
    let questions = match store.query(&Filter::all()).await {
        Ok(qs) => qs,
        Err(e) => {
            warn!(error = %e, "remediation scan failed, aborting run");
            let mut report = RemediationReport::empty(Phase::Failed);
            report.warnings.push(format!("initial scan failed: {}", e));
            return report;
        }
    };

    let plan = build_plan(&questions, entities, classifier, rules, target);
    debug!(
        scanned = plan.scanned,
        fixes = plan.fixes.len(),
        deletes = plan.delete_ids.len(),
        "remediation plan derived"
    );

    let mut report = RemediationReport::empty(Phase::Done);
    report.scanned = plan.scanned;

    if opts.dry_run {
        report.warnings.push(format!(
            "dry run: would fix {} and delete {} record(s)",
            plan.fixes.len(),
            plan.delete_ids.len()
        ));
        return report;
    }

    // BATCHING + APPLYING: fixes first so a record slated for repair is
    // never deleted by a later duplicate batch in the same run.
    let batch_size = opts.batch_size.max(1);
    let mut batch_index = 0usize;

    for chunk in plan.fixes.chunks(batch_size) {
        if batch_index > 0 {
            tokio::time::sleep(opts.batch_delay).await;
        }
        match store.upsert(chunk.to_vec()).await {
            Ok(()) => report.fixed += chunk.len(),
            Err(e) => {
                warn!(batch = batch_index, error = %e, "fix batch failed, continuing");
                report.errored += chunk.len();
                report.batch_failures.push(BatchFailure {
                    batch_index,
                    ids: chunk.iter().map(|q| q.id.clone()).collect(),
                    error: e.to_string(),
                });
            }
        }
        batch_index += 1;
    }

    for chunk in plan.delete_ids.chunks(batch_size) {
        if batch_index > 0 {
            tokio::time::sleep(opts.batch_delay).await;
        }
        match store.delete(chunk).await {
            Ok(()) => report.deleted += chunk.len(),
            Err(e) => {
                warn!(batch = batch_index, error = %e, "delete batch failed, continuing");
                report.errored += chunk.len();
                report.batch_failures.push(BatchFailure {
                    batch_index,
                    ids: chunk.to_vec(),
                    error: e.to_string(),
                });
            }
        }
        batch_index += 1;
    }

    // VERIFYING: re-query and confirm the target predicate no longer
    // matches. Leftovers are surfaced as warnings, not swallowed.
    match store.query(&Filter::all()).await {
        Ok(after) => {
            let residual = build_plan(&after, entities, classifier, rules, target);
            if !residual.delete_ids.is_empty() || !residual.fixes.is_empty() {
                report.warnings.push(format!(
                    "verification: {} record(s) still match the remediation target",
                    residual.delete_ids.len() + residual.fixes.len()
                ));
            }
        }
        Err(e) => {
            report
                .warnings
                .push(format!("verification query failed: {}", e));
        }
    }

    info!(
        deleted = report.deleted,
        fixed = report.fixed,
        errored = report.errored,
        warnings = report.warnings.len(),
        "remediation run finished"
    );
    report
}

fn build_plan(
    questions: &[Question],
    entities: &[Entity],
    classifier: &RelevanceClassifier,
    rules: &ValidationRules,
    target: Target,
) -> Plan {
    let by_id: HashMap<&str, &Entity> = entities.iter().map(|e| (e.id.as_str(), e)).collect();
    let mut fixes: Vec<Question> = Vec::new();
    let mut delete_ids: Vec<String> = Vec::new();
    let mut marked: HashSet<String> = HashSet::new();

    if target.includes_invalid() {
        for q in questions {
            let entity = match by_id.get(q.entity_id.as_str()) {
                Some(e) => e,
                None => {
                    // No catalog entry to validate against: unsalvageable.
                    if marked.insert(q.id.clone()) {
                        delete_ids.push(q.id.clone());
                    }
                    continue;
                }
            };
            let result = validate(q, entity, classifier, rules);
            if result.is_valid {
                continue;
            }
            match repair(q) {
                Some(repaired) if validate(&repaired, entity, classifier, rules).is_valid => {
                    fixes.push(repaired);
                }
                _ => {
                    if marked.insert(q.id.clone()) {
                        delete_ids.push(q.id.clone());
                    }
                }
            }
        }
    }

    if target.includes_duplicates() {
        for cluster in find_duplicates(questions) {
            for id in cluster.remove {
                if marked.insert(id.clone()) {
                    delete_ids.push(id);
                }
            }
        }
    }

    Plan {
        scanned: questions.len(),
        fixes,
        delete_ids,
    }
}

/// Mechanical repair: trim surrounding whitespace everywhere and re-point
/// the correct answer at an option it matches ignoring case. Returns None
/// when nothing changed, so an unchanged invalid record falls through to
/// deletion.
fn repair(question: &Question) -> Option<Question> {
    let mut q = question.clone();
    q.text = q.text.trim().to_string();
    q.option_a = q.option_a.trim().to_string();
    q.option_b = q.option_b.trim().to_string();
    q.option_c = q.option_c.trim().to_string();
    q.option_d = q.option_d.trim().to_string();
    q.correct_answer = q.correct_answer.trim().to_string();
    q.explanation = q.explanation.trim().to_string();

    if !q.options().iter().any(|o| *o == q.correct_answer) {
        let lowered = q.correct_answer.to_lowercase();
        if let Some(matching) = q
            .options()
            .iter()
            .find(|o| o.to_lowercase() == lowered)
            .map(|o| o.to_string())
        {
            q.correct_answer = matching;
        }
    }

    let changed = q.text != question.text
        || q.option_a != question.option_a
        || q.option_b != question.option_b
        || q.option_c != question.option_c
        || q.option_d != question.option_d
        || q.correct_answer != question.correct_answer
        || q.explanation != question.explanation;

    changed.then_some(q)
}
