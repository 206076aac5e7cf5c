pub mod allocate;
pub mod context;
pub mod helper;
