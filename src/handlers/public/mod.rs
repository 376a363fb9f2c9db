// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, self-service registration, and the reference data the
// registration form needs before anyone is signed in.

pub mod auth;
pub mod ips;
pub mod reference;
pub mod service_tags;
