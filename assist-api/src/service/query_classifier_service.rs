use crate::domain::classifier::ClassificationOutcome;

/// Query Classifier: a deterministic, ordered, pure-function pattern
/// matcher. No external calls, so no `async_trait` and no error path —
/// `Unknown` is always a valid, representable outcome rather than an error.
pub trait QueryClassifier: Send + Sync {
    fn classify(&self, raw_query: &str) -> ClassificationOutcome;
}
