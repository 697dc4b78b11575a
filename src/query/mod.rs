pub mod executor;
pub mod template;
pub mod transaction;

pub use executor::{ArgAccessor, Args, QueryRunner};
pub use template::{parse_template, Query};
pub use transaction::with_transaction;
