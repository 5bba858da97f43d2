//! Identity label resolution and the per-request log context
//!
//! Authentication is somebody else's job: an upstream middleware is expected
//! to insert a [`Principal`] into the request extensions. This module only
//! reads it back and hands the label to the logging context.

use actix_web::{dev::ServiceRequest, HttpMessage};

/// Authenticated identity attached to a request by an auth layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Display name; may be absent for anonymous-but-authenticated callers
    pub name: Option<String>,
}

impl Principal {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// Derives the identity label for a request
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, req: &ServiceRequest) -> Option<String>;
}

/// Reads the name of the [`Principal`] in the request extensions
#[derive(Debug, Clone, Copy, Default)]
pub struct PrincipalResolver;

impl IdentityResolver for PrincipalResolver {
    fn resolve(&self, req: &ServiceRequest) -> Option<String> {
        req.extensions()
            .get::<Principal>()
            .and_then(|principal| principal.name.clone())
    }
}

impl<F> IdentityResolver for F
where
    F: Fn(&ServiceRequest) -> Option<String> + Send + Sync,
{
    fn resolve(&self, req: &ServiceRequest) -> Option<String> {
        self(req)
    }
}

/// Logging context of one request, stored in its extensions
///
/// Handlers that write their own structured events can pull it out with
/// `req.extensions().get::<LogContext>()` instead of relying on span
/// inheritance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogContext {
    pub request_id: String,
    pub user_name: Option<String>,
}
