pub mod builder;
pub mod errors;
pub mod reconciler;
pub mod session;
