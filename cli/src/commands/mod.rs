pub mod diff;
pub mod info;
pub(crate) mod source;
