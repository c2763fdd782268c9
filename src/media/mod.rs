//! Storage of media retrieved with `!get`.

mod vault;

pub use crate::media::vault::MediaVault;
