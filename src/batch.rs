//! Batch driver: one raw input → a sequence of generation requests.
//!
//! Items run strictly in order, one at a time, so history records land in
//! input order. A failed item is reported and the batch moves on; nothing
//! short of the caller dropping the future stops it early.

use tracing::{info, warn};

use crate::pipeline::Generator;
use crate::types::GenerationRequest;
use crate::{Result, SkaldError};

/// Upper bound accepted for `max_items`.
pub const MAX_BATCH_ITEMS: usize = 10;

/// `max_items` used when the caller does not choose one.
pub const DEFAULT_BATCH_ITEMS: usize = 3;

/// The items a raw input expands to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    items: Vec<String>,
    requested: usize,
    truncated: bool,
}

impl BatchPlan {
    /// Expand `raw` into items.
    ///
    /// Without `batch_mode` the whole input is one item, kept verbatim.
    /// With it, every non-blank line (trimmed) is an item, and anything past
    /// the first `max_items` is dropped and flagged as truncated.
    ///
    /// Fails with `EmptyInput` when nothing remains to generate, and with
    /// `InvalidInput` when batch mode is on and `max_items` is outside
    /// `1..=MAX_BATCH_ITEMS`.
    pub fn new(raw: &str, batch_mode: bool, max_items: usize) -> Result<Self> {
        if !batch_mode {
            if raw.trim().is_empty() {
                return Err(SkaldError::EmptyInput);
            }
            return Ok(Self {
                items: vec![raw.to_string()],
                requested: 1,
                truncated: false,
            });
        }

        if !(1..=MAX_BATCH_ITEMS).contains(&max_items) {
            return Err(SkaldError::InvalidInput(format!(
                "max items must be between 1 and {MAX_BATCH_ITEMS}, got {max_items}"
            )));
        }

        let mut items: Vec<String> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        if items.is_empty() {
            return Err(SkaldError::EmptyInput);
        }

        let requested = items.len();
        let truncated = requested > max_items;
        if truncated {
            items.truncate(max_items);
            warn!(requested, max_items, "batch truncated");
        }

        Ok(Self {
            items,
            requested,
            truncated,
        })
    }

    /// Items to generate, in order.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Number of items that will run.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false for a constructed plan; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items found before truncation.
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Whether items were dropped to respect `max_items`.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// One [`GenerationRequest`] per item.
    pub fn requests(&self, content_type: &str, model: &str) -> Vec<GenerationRequest> {
        self.items
            .iter()
            .map(|item| GenerationRequest::new(content_type, item.as_str(), model))
            .collect()
    }
}

/// Progress notifications emitted while a batch runs.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// One item finished, successfully or not. `index` is zero-based.
    ItemFinished {
        index: usize,
        total: usize,
        input: &'a str,
        outcome: &'a Result<String>,
    },

    /// Emitted after every item; `fraction` is `completed / total`.
    Progress {
        completed: usize,
        total: usize,
        fraction: f32,
    },

    /// The last item has been processed.
    Completed { succeeded: usize, failed: usize },
}

/// Result of one batch item.
#[derive(Debug)]
pub struct ItemOutcome {
    pub input: String,
    pub result: Result<String>,
}

/// Everything a finished batch produced.
#[derive(Debug)]
pub struct BatchReport {
    pub outcomes: Vec<ItemOutcome>,
    pub truncated: bool,
}

impl BatchReport {
    /// Items that produced text.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Items that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Run every item of `plan` through `generator`, in order.
pub async fn run_batch<F>(
    generator: &Generator,
    content_type: &str,
    model: &str,
    plan: &BatchPlan,
    mut on_event: F,
) -> BatchReport
where
    F: FnMut(BatchEvent<'_>),
{
    let total = plan.len();
    let mut outcomes = Vec::with_capacity(total);

    for (index, request) in plan.requests(content_type, model).into_iter().enumerate() {
        let result = generator.generate_request(&request).await;

        on_event(BatchEvent::ItemFinished {
            index,
            total,
            input: &request.input_text,
            outcome: &result,
        });
        let completed = index + 1;
        on_event(BatchEvent::Progress {
            completed,
            total,
            fraction: completed as f32 / total as f32,
        });

        outcomes.push(ItemOutcome {
            input: request.input_text,
            result,
        });
    }

    let report = BatchReport {
        outcomes,
        truncated: plan.truncated(),
    };
    let (succeeded, failed) = (report.succeeded(), report.failed());
    info!(succeeded, failed, "batch complete");
    on_event(BatchEvent::Completed { succeeded, failed });
    report
}
