/*
    Chomsky and Greibach normal forms of context-free grammars
*/

mod cnf;
mod gnf;

pub use cnf::{convert_to_cnf, is_in_cnf, to_cnf, CnfConversion};
pub use gnf::{is_in_gnf, to_gnf};
