pub mod attendance;
pub mod core;
pub mod events;
pub mod finance;
pub mod leaves;
pub mod session;
pub mod staff;
pub mod students;
pub mod sync;
