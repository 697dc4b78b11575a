pub mod auto_convert;
pub mod dialect;
pub mod inbound;
pub mod outbound;
pub mod sql_type;
pub mod sqlite_dates;
pub mod value;

pub use auto_convert::auto_convert;
pub use inbound::read_column;
pub use outbound::bind_value;
pub use sql_type::SqlType;
pub use value::{FromValue, TargetKind, Value};
