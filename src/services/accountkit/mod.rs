pub mod factory;
pub mod lookup;
pub mod options;
pub mod profile;
pub mod strategy;

pub use factory::build_strategy;
pub use lookup::{TokenRequest, lookup, parse_bearer};
pub use options::{OptionsError, ResolvedOptions, StrategyOptions};
pub use profile::{PROVIDER, Profile, ProfileError, convert_profile_fields};
pub use strategy::{
    AccountKitStrategy, AuthError, Authenticated, BoxError, Verdict, Verifier, VerifyInput,
};
