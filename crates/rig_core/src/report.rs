//! Warning collection and per-operation status reporting.

use crate::error::RigError;

/// Recoverable failures gathered while an operation runs.
///
/// Every pushed warning is logged immediately; the collected list is handed
/// back to the caller in the [`OperationReport`].
#[derive(Debug, Default)]
pub struct Warnings {
    items: Vec<RigError>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: RigError) {
        log::warn!("{}", err);
        self.items.push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RigError> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<RigError> {
        self.items
    }
}

/// Terminal status of one public operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    Finished,
    FinishedWithWarnings,
    Cancelled,
}

/// What an operation hands back to the invoking context.
#[derive(Debug, Clone)]
pub struct OperationReport {
    pub operation: &'static str,
    pub status: OperationStatus,
    pub message: String,
    pub warnings: Vec<RigError>,
}

impl OperationReport {
    pub fn is_cancelled(&self) -> bool {
        self.status == OperationStatus::Cancelled
    }
}

/// Run `body` as a public operation.
///
/// Errors returned by the body cancel the operation; warnings collected before
/// the failure are kept in the report. Mutations already applied stay applied.
pub fn run_operation<F>(operation: &'static str, body: F) -> OperationReport
where
    F: FnOnce(&mut Warnings) -> Result<String, RigError>,
{
    let mut warnings = Warnings::new();
    match body(&mut warnings) {
        Ok(message) => {
            let status = if warnings.is_empty() {
                OperationStatus::Finished
            } else {
                OperationStatus::FinishedWithWarnings
            };
            log::info!("{}: {} ({} warnings)", operation, message, warnings.len());
            OperationReport {
                operation,
                status,
                message,
                warnings: warnings.into_vec(),
            }
        }
        Err(err) => {
            log::error!("{} cancelled: {}", operation, err);
            OperationReport {
                operation,
                status: OperationStatus::Cancelled,
                message: format!("Error: {}", err),
                warnings: warnings.into_vec(),
            }
        }
    }
}
