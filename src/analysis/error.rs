use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Info,
}

impl Diagnostic {
    pub fn error(msg: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Error, msg)
    }
    pub fn warning(msg: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warning, msg)
    }
    pub fn info(msg: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, msg)
    }

    fn new(level: DiagnosticLevel, msg: impl Into<String>) -> Self {
        Self {
            level,
            message: msg.into(),
            location: None,
        }
    }

    /// "pages.home.sections[2]" のような設定内の位置
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Error => write!(f, "error"),
            DiagnosticLevel::Warning => write!(f, "warning"),
            DiagnosticLevel::Info => write!(f, "info"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}: {} ({})", self.level, self.message, location),
            None => write!(f, "{}: {}", self.level, self.message),
        }
    }
}

