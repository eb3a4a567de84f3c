//! Route handlers. Account creation and login are the only callers of the
//! credential model's hash and validate operations.

pub mod health;
pub mod login;
pub mod root;
pub mod types;
pub mod users;
