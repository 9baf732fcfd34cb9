//! Contract ABI plumbing: signature/type grammar and selector hashing ([`signature`]),
//! and head/tail call-data encoding ([`encoder`]).
pub mod encoder;
pub mod signature;
