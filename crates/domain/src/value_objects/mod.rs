pub mod percentage;
pub mod price;
pub mod tick_range;

pub use percentage::Percentage;
pub use price::Price;
pub use tick_range::TickRange;
