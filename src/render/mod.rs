pub(crate) mod backend;
pub(crate) mod context;
pub(crate) mod dialect;
pub(crate) mod html;
pub(crate) mod renderer;
