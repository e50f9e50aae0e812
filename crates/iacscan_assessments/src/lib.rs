//! The normalised finding model shared by every scanner adapter, the
//! severity threshold rules that decide whether an assessment fails, and
//! the enrichment step that attaches partial fingerprints to findings.

pub mod assessment;
pub mod enrich;
pub mod error;
pub mod finding;
pub mod severity;
pub mod thresholds;

pub use assessment::{Assessment, Verdict};
pub use enrich::compute_partial_fingerprints;
pub use error::{ThresholdError, ThresholdErrors};
pub use finding::Finding;
pub use severity::Severity;
pub use thresholds::FailThresholds;
