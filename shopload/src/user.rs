use crate::profile::Profile;
use crate::session::Session;
use crate::transaction::record_task_error;
use shopload_core::WaitTime;
use std::sync::Arc;
#[allow(unused)]
use tracing::{debug, error, instrument, trace, warn};

/// One simulated client.
///
/// Runs its profile's start hook once, then executes weighted tasks one at a
/// time, sleeping a random [`WaitTime`] after each.
pub struct VirtualUser {
    id: usize,
    profile: Arc<Profile>,
    session: Session,
    wait: WaitTime,
}

impl VirtualUser {
    pub fn new(id: usize, profile: Arc<Profile>, session: Session, wait: WaitTime) -> Self {
        Self {
            id,
            profile,
            session,
            wait,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn start(&mut self) {
        self.profile.start(&mut self.session);
    }

    /// Pick and run a single task, returning its name.
    pub async fn step(&mut self) -> &'static str {
        let task = *self.profile.pick(self.session.rng());
        trace!("User {} running {}", self.id, task.name);

        if let Err(error) = (task.func)(&mut self.session).await {
            warn!("Task {} failed: {error}", task.name);
            record_task_error();
        }
        task.name
    }

    #[instrument(name = "user", skip_all, fields(id = self.id, profile = %self.profile.kind()))]
    pub async fn run(mut self) {
        self.start();
        debug!("User started");

        loop {
            self.step().await;
            let pause = self.wait.sample(self.session.rng());
            tokio::time::sleep(pause).await;
        }
    }
}
