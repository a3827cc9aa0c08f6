pub mod accountkit;
pub mod oauth2;
