//! Core error types and utilities.
//!
//! This module provides the error type shared by agents, knowledge bases and
//! registries:
//!
//! - Strongly-typed error kinds for different failure categories
//! - Builder pattern for ergonomic error construction
//! - Type-safe error source tracking with boxed trait objects

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Type alias for boxed errors that are Send + Sync.
///
/// Used for error sources so that errors can cross task boundaries while
/// a reply stream is being driven by the transport.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for core operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error kind enumeration for categorizing core errors.
///
/// Separated from [`Error`] to allow pattern matching on error categories
/// without accessing the full error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No registered entity accepts the requested id.
    NotFound,
    /// Two entities with the same id were registered.
    DuplicateId,
    /// An agent failed while producing its reply.
    Agent,
    /// A knowledge base failed while searching.
    KnowledgeBase,
    /// Internal logic errors.
    Internal,
}

impl ErrorKind {
    /// Returns the error kind as a string for categorization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::DuplicateId => "duplicate_id",
            Self::Agent => "agent",
            Self::KnowledgeBase => "knowledge_base",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core error with structured information.
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct Error {
    /// The error category/type
    kind: ErrorKind,
    /// Human-readable error message
    message: Cow<'static, str>,
    /// Entity type the error refers to, e.g. `agent`
    entity: Option<&'static str>,
    /// Optional underlying error that caused this error
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    /// Creates a new [`Error`].
    #[inline]
    fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            entity: None,
            source: None,
        }
    }

    /// Records the entity type this error refers to.
    #[inline]
    fn with_entity(mut self, entity: &'static str) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Attaches a source error to this error.
    #[inline]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the entity type for registry errors, e.g. `knowledge base`.
    #[must_use]
    #[inline]
    pub const fn entity(&self) -> Option<&'static str> {
        self.entity
    }

    /// Creates a new not-found error for the given entity type and id.
    #[inline]
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        Self::new(ErrorKind::NotFound, format!("{entity} '{id}' not found")).with_entity(entity)
    }

    /// Creates a new duplicate-id error for the given entity type and id.
    #[inline]
    pub fn duplicate_id(entity: &'static str, id: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::DuplicateId,
            format!("{entity} '{id}' is registered more than once"),
        )
        .with_entity(entity)
    }

    /// Creates a new agent error.
    #[inline]
    pub fn agent(
        agent_id: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let agent_id = agent_id.into();
        let message = message.into();
        Self::new(ErrorKind::Agent, format!("{agent_id}: {message}"))
    }

    /// Creates a new knowledge base error.
    #[inline]
    pub fn knowledge_base(
        knowledge_base_id: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        let knowledge_base_id = knowledge_base_id.into();
        let message = message.into();
        Self::new(
            ErrorKind::KnowledgeBase,
            format!("{knowledge_base_id}: {message}"),
        )
    }

    /// Creates a new internal error.
    #[inline]
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Returns `true` if this error signals a missing entity.
    #[must_use]
    #[inline]
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}
