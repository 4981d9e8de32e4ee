pub mod brain;
pub mod cors;
pub mod health_check;
pub mod librarian;
