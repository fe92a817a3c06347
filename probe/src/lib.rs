pub mod commands;
pub mod load;
