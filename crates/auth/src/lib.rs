//! `corebank-auth` — principals, credentials, and session revocation.
//!
//! This crate is intentionally decoupled from HTTP and from the ledger:
//! it knows who a principal is and whether a presented credential can be
//! trusted, nothing about balances.

pub mod hash;
pub mod registry;
pub mod revocation;
pub mod token;
pub mod user;

pub use hash::{Argon2Hasher, CredentialHasher};
pub use registry::{NewUser, ProfileUpdate, UserRegistry};
pub use revocation::RevocationSet;
pub use token::{Claims, Hs256TokenCodec, TokenIssuer, TokenValidator};
pub use user::{Role, User};
