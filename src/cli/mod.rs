mod list;
mod root;
mod show;

pub use root::Cli;
