pub mod process;
pub mod register;
pub mod status;
