use console::style;
use cropdash_core::error::AdvisoryError;
use std::fmt;

/// Error with context and suggested fixes
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Backend could not be reached or answered with an error
pub fn backend_unavailable(message: &str, detail: &AdvisoryError) -> CliError {
    CliError::new(message)
        .with_context(format!("Error: {}", detail))
        .with_suggestion("Start the backend: python backend/app.py")
        .with_suggestion("Point at another backend: --base-url http://host:5000/api")
        .with_suggestion("Or try the built-in fixtures: --client memory")
        .with_help("Run: cropdash config")
}

/// Some metric endpoints failed, so no dashboard was produced
pub fn dashboard_incomplete(message: &str, error: &AdvisoryError) -> CliError {
    let failed: Vec<String> = error.failed_metrics().iter().map(|k| k.to_string()).collect();
    CliError::new(message)
        .with_context(format!(
            "{} of the metric endpoints failed.\n\nFailed: {}",
            failed.len(),
            failed.join(", ")
        ))
        .with_suggestion("Regenerate the evaluation outputs on the backend")
        .with_suggestion("Check the backend logs for the failing endpoints")
        .with_help("Run: cropdash dashboard --help")
}

/// The search settled without anything to pick
pub fn no_suggestions(query: &str) -> CliError {
    CliError::new("No matching locations")
        .with_context(format!("The search for \"{}\" returned no suggestions.", query))
        .with_suggestion("Type at least four characters")
        .with_suggestion("Try a nearby city or district name")
        .with_help("Run: cropdash search --help")
}

/// `--pick` points past the end of the suggestion list
pub fn pick_out_of_range(pick: usize, available: usize) -> CliError {
    CliError::new("Suggestion index out of range")
        .with_context(format!(
            "Requested suggestion {} but only {} available.",
            pick, available
        ))
        .with_suggestion(format!("Use --pick between 1 and {}", available))
        .with_help("Run: cropdash search <text> to list them")
}

/// Invalid configuration or input value
pub fn invalid_value(key: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid value: {}", key))
        .with_context(format!("Reason: {}", reason))
        .with_suggestion("Check the flag value or the config file for typos")
        .with_help("Run: cropdash --help")
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    let error = match error.downcast::<CliError>() {
        Ok(cli_error) => return cli_error,
        Err(error) => error,
    };

    match error.downcast_ref::<AdvisoryError>() {
        Some(e @ AdvisoryError::SnapshotIncomplete { .. }) => {
            dashboard_incomplete("Dashboard metrics incomplete", e)
        }
        Some(e) if e.is_transient() => backend_unavailable("Backend request failed", e),
        Some(
            AdvisoryError::InvalidParameter { key, reason }
            | AdvisoryError::ConfigInvalid { key, reason },
        ) => invalid_value(key, reason),
        Some(AdvisoryError::InvalidArtifact { name }) => {
            invalid_value("artifact", &format!("{} is not a report file name", name))
        }
        _ => CliError::new(format!("{:#}", error)),
    }
}
