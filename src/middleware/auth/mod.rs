pub mod access;
pub mod verifier;

pub use verifier::AccountVerifier;
