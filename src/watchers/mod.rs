pub mod call_log;
pub mod call_state;

pub use call_log::CallLogWatcher;
pub use call_state::CallStateWatcher;
