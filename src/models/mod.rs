//! Data models for the lending server

pub mod book;
pub mod damage;
pub mod enums;
pub mod loan_event;
pub mod visitor;

// Re-export commonly used types
pub use book::{Author, Book, NewBook};
pub use damage::{DamageReport, NewDamageReport};
pub use enums::{BookStatus, DamageRate, LoanStatus};
pub use loan_event::{LoanEvent, NewLoanEvent};
pub use visitor::{NewVisitor, Visitor};
