// Error types for the JFramework runtime

use std::fmt;
use thiserror::Error;

/// Boxed error raised by user component code
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type FrameworkResult<T> = Result<T, FrameworkError>;

#[derive(Error, Debug)]
pub enum FrameworkError {
    /// A capability was used on a component that is not bound to a live architecture
    #[error("Architecture not available: {0}")]
    ArchitectureNotSet(String),

    #[error("Component not registered: {0}")]
    ComponentNotRegistered(String),

    #[error("Component already registered: {0}")]
    ComponentAlreadyRegistered(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Error raised inside a component's init/deinit/execute/evaluate.
    /// Displays exactly like the wrapped error and forwards its source.
    #[error(transparent)]
    Component(#[from] BoxError),
}

/// Discriminant of [`FrameworkError`] for matching without destructuring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ArchitectureNotSet,
    ComponentNotRegistered,
    ComponentAlreadyRegistered,
    InvalidArgument,
    Component,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::ArchitectureNotSet => "architecture_not_set",
            ErrorKind::ComponentNotRegistered => "component_not_registered",
            ErrorKind::ComponentAlreadyRegistered => "component_already_registered",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::Component => "component",
        };
        f.write_str(name)
    }
}

impl FrameworkError {
    /// Wrap an error raised by user code
    ///
    /// ```
    /// use jframework_core::FrameworkError;
    ///
    /// let err = FrameworkError::component("database offline");
    /// assert_eq!(err.to_string(), "database offline");
    /// ```
    pub fn component<E: Into<BoxError>>(err: E) -> Self {
        FrameworkError::Component(err.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FrameworkError::ArchitectureNotSet(_) => ErrorKind::ArchitectureNotSet,
            FrameworkError::ComponentNotRegistered(_) => ErrorKind::ComponentNotRegistered,
            FrameworkError::ComponentAlreadyRegistered(_) => ErrorKind::ComponentAlreadyRegistered,
            FrameworkError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            FrameworkError::Component(_) => ErrorKind::Component,
        }
    }

    /// Downcast the wrapped user error, if this is a [`FrameworkError::Component`]
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            FrameworkError::Component(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Take the wrapped user error back out
    pub fn into_component(self) -> Result<BoxError, Self> {
        match self {
            FrameworkError::Component(inner) => Ok(inner),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("init failed: {reason}")]
    struct InitFailed {
        reason: &'static str,
    }

    #[test]
    fn test_messages_name_the_type() {
        let err = FrameworkError::ArchitectureNotSet("app::Counter".to_string());
        assert_eq!(err.to_string(), "Architecture not available: app::Counter");

        let err = FrameworkError::ComponentNotRegistered("app::Counter".to_string());
        assert_eq!(err.to_string(), "Component not registered: app::Counter");

        let err = FrameworkError::ComponentAlreadyRegistered("app::Counter".to_string());
        assert_eq!(err.to_string(), "Component already registered: app::Counter");
    }

    #[test]
    fn test_kinds_are_distinct() {
        assert_eq!(
            FrameworkError::ArchitectureNotSet(String::new()).kind(),
            ErrorKind::ArchitectureNotSet
        );
        assert_eq!(
            FrameworkError::InvalidArgument(String::new()).kind(),
            ErrorKind::InvalidArgument
        );
        assert_ne!(
            FrameworkError::ComponentNotRegistered(String::new()).kind(),
            FrameworkError::ComponentAlreadyRegistered(String::new()).kind()
        );
    }

    #[test]
    fn test_component_error_passes_through() {
        let err = FrameworkError::component(InitFailed { reason: "disk" });
        assert_eq!(err.kind(), ErrorKind::Component);
        assert_eq!(err.to_string(), "init failed: disk");
        assert_eq!(err.downcast_ref::<InitFailed>().map(|e| e.reason), Some("disk"));
    }

    #[derive(Debug, Error)]
    #[error("save failed")]
    struct SaveFailed {
        #[source]
        cause: std::io::Error,
    }

    #[test]
    fn test_component_error_keeps_source_chain() {
        let err = FrameworkError::component(SaveFailed {
            cause: std::io::Error::other("root"),
        });
        assert_eq!(err.to_string(), "save failed");

        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("root"));
    }

    #[test]
    fn test_boxed_error_converts_with_question_mark() {
        fn fails() -> FrameworkResult<()> {
            let quota: Result<(), BoxError> = Err("quota exceeded".into());
            quota?;
            Ok(())
        }

        let err = fails().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Component);
        assert_eq!(err.to_string(), "quota exceeded");
    }

    #[test]
    fn test_into_component() {
        let err = FrameworkError::component("boom");
        let inner = err.into_component().unwrap();
        assert_eq!(inner.to_string(), "boom");

        let err = FrameworkError::InvalidArgument("x".into());
        assert!(err.into_component().is_err());
    }
}
