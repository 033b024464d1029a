//! Building blocks shared by the rule arithmetic and the TZif decoder.
pub(crate) mod ambiguity;
pub(crate) mod parse;
pub mod scalar;
