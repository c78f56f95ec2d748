pub(crate) mod cache;
pub(crate) mod key;
pub(crate) mod opts;
