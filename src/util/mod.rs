pub mod clock;
pub(crate) mod lock;
pub mod timezone;
