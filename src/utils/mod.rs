// Utility functions

pub mod filenames;

pub use filenames::*;
