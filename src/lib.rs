pub mod cyk;
pub mod error_handling;
pub mod generator;
pub mod grammar;
pub mod io;
pub mod normal_form;
pub mod parser;
pub mod simplify;
