pub(crate) mod canvas;
pub(crate) mod cpu_canvas;
pub(crate) mod display_list;
pub(crate) mod paint;
pub(crate) mod texture;
