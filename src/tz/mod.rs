//! Time zones: rule-based and TZif-backed zones, and the registry holding them.
pub(crate) mod builtin;
pub mod file;
pub mod fixed;
pub(crate) mod posix;
pub mod scan;
pub mod store;
pub(crate) mod sync;
#[cfg(test)]
pub(crate) mod testing;
pub mod tzif;
pub mod zone;
