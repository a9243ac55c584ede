use std::fmt;

/// A boxed error, as returned by request handlers and hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for mediator
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error {
    repr: ErrorRepr,
}

/// Error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request handler returned an error.
    Handler,
    /// The handler bound to the request kind expects another request type.
    TypeMismatch,
}

impl ErrorKind {
    /// Returns the description of the error kind.
    pub fn as_str(&self) -> &'static str {
        match *self {
            ErrorKind::Handler => "handler failed",
            ErrorKind::TypeMismatch => "request type mismatch",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
enum ErrorRepr {
    #[error("handler failed: `{kind}`: {source}")]
    Handler {
        kind: String,
        #[source]
        source: BoxError,
    },
    #[error("request type mismatch: `{kind}` is bound to a handler for `{bound}`, not `{requested}`")]
    TypeMismatch {
        kind: String,
        bound: &'static str,
        requested: &'static str,
    },
}

impl Error {
    pub(crate) fn handler<S: Into<String>>(kind: S, source: BoxError) -> Error {
        Error {
            repr: ErrorRepr::Handler {
                kind: kind.into(),
                source,
            },
        }
    }

    pub(crate) fn type_mismatch<S: Into<String>>(
        kind: S,
        bound: &'static str,
        requested: &'static str,
    ) -> Error {
        Error {
            repr: ErrorRepr::TypeMismatch {
                kind: kind.into(),
                bound,
                requested,
            },
        }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self.repr {
            ErrorRepr::Handler { .. } => ErrorKind::Handler,
            ErrorRepr::TypeMismatch { .. } => ErrorKind::TypeMismatch,
        }
    }

    /// Returns the request kind that was being dispatched.
    pub fn request_kind(&self) -> &str {
        match &self.repr {
            ErrorRepr::Handler { kind, .. } | ErrorRepr::TypeMismatch { kind, .. } => kind,
        }
    }

    /// Returns a reference to the error raised by the handler, if any.
    pub fn get_ref(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match &self.repr {
            ErrorRepr::Handler { source, .. } => Some(source.as_ref()),
            ErrorRepr::TypeMismatch { .. } => None,
        }
    }

    /// Consumes the error, returning the error raised by the handler, if any.
    pub fn into_inner(self) -> Option<BoxError> {
        match self.repr {
            ErrorRepr::Handler { source, .. } => Some(source),
            ErrorRepr::TypeMismatch { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug, thiserror::Error)]
    #[error("database is down")]
    struct DatabaseDown;

    #[test]
    fn handler_error_keeps_source() {
        let err = Error::handler("GetUser", Box::new(DatabaseDown));

        assert_eq!(err.kind(), ErrorKind::Handler);
        assert_eq!(err.request_kind(), "GetUser");
        assert_eq!(err.to_string(), "handler failed: `GetUser`: database is down");
        assert!(err.source().unwrap().is::<DatabaseDown>());
        assert!(err.into_inner().unwrap().downcast::<DatabaseDown>().is_ok());
    }

    #[test]
    fn type_mismatch_has_no_inner_error() {
        let err = Error::type_mismatch("Ping", "app::Ping", "other::Ping");

        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(
            err.to_string(),
            "request type mismatch: `Ping` is bound to a handler for `app::Ping`, not `other::Ping`"
        );
        assert!(err.get_ref().is_none());
        assert!(err.into_inner().is_none());
    }
}
