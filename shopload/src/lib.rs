#![doc = include_str!("../README.md")]

pub mod error;
pub mod profile;
pub mod profiles;
pub mod runner;
pub mod session;
#[doc(hidden)]
pub mod transaction;
pub mod transport;
pub mod user;

pub(crate) mod collector;
pub(crate) mod measurement;
pub(crate) mod timer;

pub use error::{ClientError, ProfileError, RunError, TaskError};
pub use profile::{Profile, Task, TaskResult};
pub use runner::Runner;
pub use session::Session;
pub use user::VirtualUser;

#[doc(hidden)]
pub use shopload_core as core;

pub mod prelude {
    pub use crate::error::{ClientError, RunError, TaskError};
    pub use crate::profile::{json_headers, Profile, Task, TaskResult};
    pub use crate::runner::Runner;
    pub use crate::session::Session;
    pub use crate::task;
    pub use crate::transport::{HttpTransport, Response, Transport};

    pub use shopload_core::{ProfileKind, RunConfig, RunStatistics, WaitTime};
}
