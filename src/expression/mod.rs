pub(crate) mod ast;
pub(crate) mod compiler;
pub(crate) mod date;
pub(crate) mod interp;
pub(crate) mod parser;
pub(crate) mod types;
pub(crate) mod value;
