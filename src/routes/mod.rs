// Routing segregation: anonymous endpoints vs. the token-gated admin panel.

pub mod admin;
pub mod public;
