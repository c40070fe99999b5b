pub mod api;
pub mod dom;
pub mod observer;
