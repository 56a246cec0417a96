pub mod month_store;

pub use month_store::MonthStore;
