pub(crate) mod frame;
pub(crate) mod opts;
pub(crate) mod tree;
