pub mod book;
pub mod commands;
pub mod errors;
pub mod loan;
pub mod member;
pub mod value_objects;

pub use book::Book;
pub use errors::*;
pub use loan::{ClosedLoan, Loan, LoanCore, OpenLoan};
pub use member::Member;
pub use value_objects::*;
