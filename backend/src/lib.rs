//! Campus records backend: users, courses, schedules, assignments and the
//! enrollment ledger behind a session-authenticated REST API.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// OpenAPI surface served by Swagger UI and the `openapi-dump` binary.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
