//! Network adapters implementing application ports.

mod reqwest_dispatcher;

pub use reqwest_dispatcher::{DispatchError, ReqwestDispatcher};
