pub(crate) mod binding;
pub(crate) mod fingerprint;
pub(crate) mod model;
pub(crate) mod parse;
