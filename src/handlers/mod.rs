// handlers/mod.rs - two handler tiers
//
// Public (no auth) and Protected (bearer token). Protected handlers take an
// `AuthUser` argument, which rejects the request with 401 before the
// handler body runs.
pub mod public;
pub mod protected;
