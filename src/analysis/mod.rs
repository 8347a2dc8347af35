pub mod error;
pub mod lint;

use crate::model::app_config::AppConfig;

use error::{Diagnostic, DiagnosticLevel};
use lint::run_lints;

pub struct AnalysisResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisResult {
    pub fn has_errors(&self) -> bool {
        self.count(DiagnosticLevel::Error) > 0
    }

    pub fn count(&self, level: DiagnosticLevel) -> usize {
        self.diagnostics.iter().filter(|d| d.level == level).count()
    }
}

pub fn analyze_config(config: &AppConfig) -> AnalysisResult {
    let diagnostics = run_lints(config);
    log::debug!(
        "Analysis finished: {} errors, {} warnings",
        diagnostics.iter().filter(|d| d.level == DiagnosticLevel::Error).count(),
        diagnostics.iter().filter(|d| d.level == DiagnosticLevel::Warning).count()
    );
    AnalysisResult { diagnostics }
}
