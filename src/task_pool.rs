use std::fmt::Display;
use std::future::Future;
use std::panic::resume_unwind;

use anyhow::Context;
use tokio::task::{AbortHandle, JoinSet};

use crate::error::MultiError;
use crate::Result;

#[derive(Debug)]
pub struct TaskPool<T> {
    join_set: JoinSet<Result<T>>,
}

impl<T> Default for TaskPool<T> {
    fn default() -> Self {
        Self { join_set: JoinSet::new() }
    }
}

impl<T> TaskPool<T>
where
    T: Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&mut self, task: F) -> AbortHandle
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        self.join_set.spawn(task)
    }

    /// Waits for all tasks and returns their outputs, in completion order.
    ///
    /// If any task failed, all errors are returned together in a [`MultiError`] wrapped in
    /// `context`. Task panics are resumed.
    pub async fn join<C, F>(&mut self, context: F) -> Result<Vec<T>>
    where
        F: FnOnce() -> C,
        C: Display + Send + Sync + 'static,
    {
        let mut outputs = Vec::new();
        let mut errors = Vec::new();

        while let Some(join_result) = self.join_set.join_next().await {
            match join_result {
                Ok(Ok(output)) => outputs.push(output),
                Ok(Err(task_error)) => errors.push(task_error),
                Err(join_error) => match join_error.try_into_panic() {
                    Ok(panic_err) => resume_unwind(panic_err),
                    Err(join_error) => errors.push(
                        Err::<(), _>(join_error)
                            .with_context(|| "join error")
                            .unwrap_err(),
                    ),
                },
            }
        }

        MultiError::check(errors, context).map(|()| outputs)
    }
}
