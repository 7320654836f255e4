pub use self::{
    error::{Error, Result},
    revenue::{aggregate, Grain, RevenuePeriod},
    table::RawTable,
    validate::{validate, LineItem, Validated},
};

pub mod error;
pub mod pipeline;
pub mod report;
pub mod revenue;
pub mod table;
pub mod validate;
