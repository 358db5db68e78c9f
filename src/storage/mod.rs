pub mod layout;
pub mod scanner;
