pub mod form;
pub mod seed;
pub mod session;
pub mod store;
pub mod validate;
