//! HTTP handlers.
//!
//! Each route has a single entry function dispatching on the request method;
//! unsupported methods answer `405 Method not allowed`.

pub mod health;
pub mod instance;
pub mod template;

pub use health::healthz_handler;
pub use instance::{instance_handler, EAInstance};
pub use template::{template_handler, EATemplate};
