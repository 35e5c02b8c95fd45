pub mod call;
pub mod call_state;

pub use call::{CallLogRow, CallRecord, CallType};
pub use call_state::{CallState, CallStateChange};
