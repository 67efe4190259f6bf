use thiserror::Error;

/// Failure raised by a generation step.
///
/// `RegenerateMap` is the only recoverable variant; the safe generator
/// driver catches it and reruns the whole configuration. The other
/// variants are programmer errors surfaced with full diagnostics.
#[derive(Debug, Error)]
pub enum StepError {
    /// A step parameter violates its documented domain.
    #[error("{step}: invalid configuration for `{parameter}`: {message}")]
    InvalidConfiguration {
        step: String,
        parameter: &'static str,
        message: String,
    },

    /// A declared required component is absent from the context.
    #[error(
        "{step}: missing required context component {type_name} \
         (tag {tag:?})"
    )]
    MissingComponent {
        step: String,
        type_name: &'static str,
        tag: Option<String>,
    },

    /// The map is unsalvageable and generation should restart from the
    /// caller's configuration.
    #[error("{step}: map must be regenerated: {reason}")]
    RegenerateMap { step: String, reason: String },
}

impl StepError {
    pub(crate) fn invalid_config(
        step: &str,
        parameter: &'static str,
        message: impl Into<String>,
    ) -> Self {
        StepError::InvalidConfiguration {
            step: step.to_owned(),
            parameter,
            message: message.into(),
        }
    }

    pub(crate) fn regenerate(
        step: &str,
        reason: impl Into<String>,
    ) -> Self {
        StepError::RegenerateMap {
            step: step.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Terminal failure from the generator driver.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The safe driver exhausted its retry budget.
    #[error("map generation failed after {attempts} attempts")]
    MapGenerationFailed {
        attempts: u32,
        #[source]
        last: StepError,
    },

    #[error(transparent)]
    Step(#[from] StepError),
}
