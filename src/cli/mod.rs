pub mod actions;
pub mod globals;
pub mod telemetry;

pub mod commands;
pub mod dispatch;
pub mod dotenv;

mod start;
pub use self::start::start;
