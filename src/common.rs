pub(crate) mod capacity;
pub(crate) mod constants;
pub(crate) mod error;
pub(crate) mod random;
