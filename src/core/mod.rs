// Core modules implementing records, normalization, the table, and error modeling.
pub mod error;
pub mod normalize;
pub mod record;
pub mod table;
pub mod value;
