pub(crate) mod context;
pub(crate) mod damage;
pub(crate) mod region;
