pub mod clock;
pub mod style;
