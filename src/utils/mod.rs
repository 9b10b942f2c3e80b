pub mod command;
pub mod io;
