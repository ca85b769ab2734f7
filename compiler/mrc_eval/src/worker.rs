//! Off-thread program execution.
//!
//! [`ProgramWorker`] owns one dedicated thread and runs at most one program
//! at a time; submitting while a program is running is rejected with
//! [`WorkerError::Busy`]. Every run gets a fresh [`Memory`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};

use mrc_runtime::RuntimeContext;

use crate::{CancelToken, CompiledProgram, ExecError, Memory, SharedPrintHandler, WorkerError};

struct Job {
    program: Arc<CompiledProgram>,
    ctx: RuntimeContext,
    out: SharedPrintHandler,
    cancel: CancelToken,
    reply: Sender<Result<Memory, ExecError>>,
}

/// A submitted program.
pub struct JobHandle {
    cancel: CancelToken,
    result: Receiver<Result<Memory, ExecError>>,
}

impl JobHandle {
    /// Ask the run to stop before its next statement.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Block until the run finishes, returning its final memory.
    pub fn wait(self) -> Result<Memory, WorkerError> {
        match self.result.recv() {
            Ok(result) => Ok(result?),
            Err(_) => Err(WorkerError::Disconnected),
        }
    }
}

pub struct ProgramWorker {
    jobs: Option<Sender<Job>>,
    busy: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ProgramWorker {
    pub fn spawn() -> std::io::Result<Self> {
        let (jobs, queue) = channel::unbounded::<Job>();
        let busy = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&busy);
        let thread = thread::Builder::new()
            .name("mrc-worker".to_owned())
            .spawn(move || run(&queue, &flag))?;
        Ok(ProgramWorker {
            jobs: Some(jobs),
            busy,
            thread: Some(thread),
        })
    }

    /// Start running `program`. Fails if a program is already running.
    pub fn submit(
        &self,
        program: Arc<CompiledProgram>,
        ctx: RuntimeContext,
        out: SharedPrintHandler,
    ) -> Result<JobHandle, WorkerError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(WorkerError::Busy);
        }
        let (reply, result) = channel::bounded(1);
        let cancel = CancelToken::new();
        let job = Job {
            program,
            ctx,
            out,
            cancel: cancel.clone(),
            reply,
        };
        let sent = self.jobs.as_ref().map(|jobs| jobs.send(job));
        if !matches!(sent, Some(Ok(()))) {
            self.busy.store(false, Ordering::Release);
            return Err(WorkerError::Disconnected);
        }
        Ok(JobHandle { cancel, result })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

fn run(queue: &Receiver<Job>, busy: &AtomicBool) {
    for job in queue {
        tracing::debug!(stmts = job.program.stmts().len(), "worker: job started");
        let mut memory = Memory::new();
        let result = job
            .program
            .execute_with_cancel(&job.ctx, &mut memory, &job.out, &job.cancel)
            .map(|()| memory);
        match &result {
            Ok(_) => tracing::debug!("worker: job finished"),
            Err(e) => tracing::debug!(error = %e, "worker: job failed"),
        }
        busy.store(false, Ordering::Release);
        // The submitter may have dropped its handle.
        let _ = job.reply.send(result);
    }
}

impl Drop for ProgramWorker {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop.
        self.jobs = None;
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
