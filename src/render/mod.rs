pub(crate) mod capabilities;
pub(crate) mod surface;
pub(crate) mod surface_pool;
pub(crate) mod target;
