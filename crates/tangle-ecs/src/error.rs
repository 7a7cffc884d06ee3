/// Errors returned when an entity cannot be admitted.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// The entity's dependency declaration could not be fully resolved
    /// against the current entity pool.
    #[error("dependency for entity was not met")]
    UnmetDependency,

    /// A system refused the entity. The system's own error is kept as is and
    /// its message is shown unchanged.
    #[error("{source}")]
    Rejected {
        system: &'static str,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl EcsError {
    /// Wrap an error raised by a system's own admission logic.
    pub fn rejected(
        system: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Rejected {
            system,
            source: source.into(),
        }
    }

    pub fn is_unmet_dependency(&self) -> bool {
        matches!(self, Self::UnmetDependency)
    }
}

pub type Result<T> = std::result::Result<T, EcsError>;
