// Module layout (Clean Architecture style)
// - bootstrap: configuration and startup
// - infrastructure: DB/hub-client/crypto adapters
// - presentation: HTTP handlers and routing
// - application: ports, use cases and background services
// - domain: core models and the share-link state machine

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
