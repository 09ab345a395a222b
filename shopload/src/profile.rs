//! Weighted task tables executed by virtual users.
use crate::error::{ProfileError, TaskError};
use crate::profiles;
use crate::session::Session;
use crate::transport::{BoxFuture, Response};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use shopload_core::{ProfileKind, JSON_CONTENT_TYPE};

pub type TaskResult = Result<(), TaskError>;

pub type TaskFn = for<'a> fn(&'a mut Session) -> BoxFuture<'a, TaskResult>;

/// A single weighted action of a profile.
#[derive(Copy, Clone)]
pub struct Task {
    pub name: &'static str,
    pub weight: u32,
    pub func: TaskFn,
}

impl Task {
    pub const fn new(name: &'static str, weight: u32, func: TaskFn) -> Self {
        Self { name, weight, func }
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .finish()
    }
}

/// Build a [`Task`] from an `async fn(&mut Session) -> TaskResult`.
///
/// # Example
/// ```ignore
/// async fn get_all_orders(session: &mut Session) -> TaskResult {
///     let _ = session.get("/orders", "/orders").await;
///     Ok(())
/// }
///
/// let task = task!(3, get_all_orders);
/// ```
#[macro_export]
macro_rules! task {
    ($weight:expr, $func:ident) => {{
        fn boxed(
            session: &mut $crate::Session,
        ) -> $crate::transport::BoxFuture<'_, $crate::profile::TaskResult> {
            Box::pin($func(session))
        }
        $crate::profile::Task::new(stringify!($func), $weight, boxed)
    }};
}

/// Start hook plus weighted tasks for one kind of virtual user.
pub struct Profile {
    kind: ProfileKind,
    on_start: fn(&mut Session),
    tasks: Vec<Task>,
    index: WeightedIndex<u32>,
}

impl Profile {
    pub fn new(
        kind: ProfileKind,
        on_start: fn(&mut Session),
        tasks: Vec<Task>,
    ) -> Result<Self, ProfileError> {
        let index = WeightedIndex::new(tasks.iter().map(|t| t.weight))
            .map_err(|source| ProfileError::Weights { kind, source })?;

        Ok(Self {
            kind,
            on_start,
            tasks,
            index,
        })
    }

    /// The built-in profile for `kind`.
    pub fn builtin(kind: ProfileKind) -> Result<Self, ProfileError> {
        match kind {
            ProfileKind::Combined => profiles::combined::profile(),
            ProfileKind::Favourite => profiles::favourite::profile(),
            ProfileKind::Order => profiles::order::profile(),
            ProfileKind::Payment => profiles::payment::profile(),
        }
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn weight(&self, name: &str) -> Option<u32> {
        self.tasks.iter().find(|t| t.name == name).map(|t| t.weight)
    }

    pub fn total_weight(&self) -> u32 {
        self.tasks.iter().map(|t| t.weight).sum()
    }

    pub fn start(&self, session: &mut Session) {
        (self.on_start)(session)
    }

    /// Pick a task with probability proportional to its weight.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &Task {
        &self.tasks[self.index.sample(rng)]
    }
}

/// Fixed JSON headers every profile sets on start.
pub fn json_headers(session: &mut Session) {
    session.set_header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    session.set_header(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
}

/// Id of a record created by `request`, if the service reported one.
pub(crate) fn created_id(
    response: &Response,
    request: &'static str,
    field: &str,
) -> Result<Option<String>, TaskError> {
    response
        .created_id(field)
        .map_err(|source| TaskError::InvalidBody { request, source })
}
