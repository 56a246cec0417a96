pub mod month;
pub mod random;

pub use month::{date_key, days_of_month, first_of_month, last_of_month, seed_key, seed_key_in, Generator, MonthData};
pub use random::{RandomSource, SineSeries, UniformSource};
