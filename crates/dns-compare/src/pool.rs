use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        mpsc::{self, Receiver, Sender, SyncSender},
        Arc, Mutex,
    },
    thread,
};

use tracing::{debug, error};

use crate::error::PoolError;

type Work<T> = Box<dyn Fn(&str) -> T + Send + Sync>;

/// The immutable half of a job, shared with the workers once the pool runs.
struct Task<T> {
    argument: String,
    work: Work<T>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum JobState {
    Pending,
    Running,
    Finished,
}

/// The runner-owned half of a job. Its state only changes when a worker signal for its
/// index is received in [`JobRunner::wait_all`]. Outputs are handed to the caller and
/// never kept here.
#[derive(Debug)]
pub struct Job {
    argument: String,
    state: JobState,
    history: Vec<JobState>,
}

impl Job {
    pub fn argument(&self) -> &str {
        &self.argument
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == JobState::Running
    }

    pub fn is_finished(&self) -> bool {
        self.state == JobState::Finished
    }

    /// Every state the job entered after `Pending`, in order.
    pub fn history(&self) -> &[JobState] {
        &self.history
    }

    fn advance(&mut self, next: JobState) {
        debug_assert!(
            next > self.state,
            "job {:?} moved from {:?} to {:?}",
            self.argument,
            self.state,
            next
        );
        self.state = next;
        self.history.push(next);
    }
}

enum Signal<T> {
    Started(usize),
    Finished(usize, Option<T>),
}

/// Fixed-size pool of worker threads running one work function per submitted job.
///
/// Jobs are submitted up front, [`JobRunner::run`] starts the workers and queues every
/// job once, and [`JobRunner::wait_all`] blocks until each job reported completion.
/// Workers stop once the runner is dropped.
pub struct JobRunner<T> {
    workers: usize,
    tasks: Vec<Task<T>>,
    jobs: Vec<Job>,
    incoming: Option<SyncSender<usize>>,
    completions: Option<Receiver<Signal<T>>>,
}

impl<T: Send + 'static> JobRunner<T> {
    pub fn new(workers: usize) -> Result<Self, PoolError> {
        if workers == 0 {
            return Err(PoolError::NoWorkers);
        }
        Ok(Self {
            workers,
            tasks: vec![],
            jobs: vec![],
            incoming: None,
            completions: None,
        })
    }

    fn is_started(&self) -> bool {
        self.completions.is_some()
    }

    /// Adds a job and returns its index. Only possible before [`JobRunner::run`].
    pub fn submit<F>(&mut self, argument: impl Into<String>, work: F) -> Result<usize, PoolError>
    where
        F: Fn(&str) -> T + Send + Sync + 'static,
    {
        if self.is_started() {
            return Err(PoolError::AlreadyStarted);
        }
        let argument = argument.into();
        self.jobs.push(Job {
            argument: argument.clone(),
            state: JobState::Pending,
            history: vec![],
        });
        self.tasks.push(Task {
            argument,
            work: Box::new(work),
        });
        Ok(self.jobs.len() - 1)
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn run(&mut self) -> Result<(), PoolError> {
        if self.is_started() {
            return Err(PoolError::AlreadyStarted);
        }

        let tasks: Arc<[Task<T>]> = std::mem::take(&mut self.tasks).into();
        let (incoming_tx, incoming_rx) = mpsc::sync_channel(tasks.len().max(1));
        let incoming_rx = Arc::new(Mutex::new(incoming_rx));
        let (completion_tx, completion_rx) = mpsc::channel();

        for id in 0..self.workers {
            let tasks = Arc::clone(&tasks);
            let incoming = Arc::clone(&incoming_rx);
            let completions = completion_tx.clone();

            thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || work_loop(id, &tasks, &incoming, &completions))
                .map_err(|e| PoolError::Spawn(e.to_string()))?;
        }

        // capacity equals the job count, so none of these sends blocks
        for index in 0..tasks.len() {
            incoming_tx
                .send(index)
                .map_err(|_| PoolError::Disconnected)?;
        }

        debug!(workers = self.workers, jobs = tasks.len(), "job runner started");
        self.incoming = Some(incoming_tx);
        self.completions = Some(completion_rx);
        Ok(())
    }

    /// Blocks until every job finished, handing each output to `on_finished` in
    /// completion order. The output is `None` for a job whose work panicked.
    ///
    /// Exactly one `Finished` signal arrives per job, so this returns after receiving as
    /// many of them as there are jobs.
    pub fn wait_all<F>(&mut self, mut on_finished: F) -> Result<(), PoolError>
    where
        F: FnMut(&str, Option<T>),
    {
        let Self {
            jobs, completions, ..
        } = self;
        let completions = completions.as_ref().ok_or(PoolError::NotStarted)?;

        let mut finished = jobs.iter().filter(|job| job.is_finished()).count();
        while finished < jobs.len() {
            match completions.recv() {
                Ok(Signal::Started(index)) => jobs[index].advance(JobState::Running),
                Ok(Signal::Finished(index, output)) => {
                    let job = &mut jobs[index];
                    job.advance(JobState::Finished);
                    finished += 1;
                    on_finished(&job.argument, output);
                }
                Err(_) => return Err(PoolError::Disconnected),
            }
        }
        Ok(())
    }
}

fn work_loop<T>(
    id: usize,
    tasks: &[Task<T>],
    incoming: &Mutex<Receiver<usize>>,
    completions: &Sender<Signal<T>>,
) {
    loop {
        let next = match incoming.lock() {
            Ok(receiver) => receiver.recv(),
            Err(_) => return,
        };
        let Ok(index) = next else {
            debug!(worker = id, "job queue closed, stopping");
            return;
        };
        let Some(task) = tasks.get(index) else {
            continue;
        };

        if completions.send(Signal::Started(index)).is_err() {
            return;
        }
        let output = match panic::catch_unwind(AssertUnwindSafe(|| (task.work)(&task.argument)))
        {
            Ok(output) => Some(output),
            Err(_) => {
                error!(worker = id, argument = %task.argument, "job panicked");
                None
            }
        };
        if completions.send(Signal::Finished(index, output)).is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Barrier,
        },
    };

    use super::{JobRunner, JobState};
    use crate::error::PoolError;

    #[test]
    fn test_every_job_runs_exactly_once() {
        const JOBS: usize = 50;
        let calls: Arc<Vec<AtomicUsize>> = Arc::new((0..JOBS).map(|_| AtomicUsize::new(0)).collect());

        let mut runner = JobRunner::new(4).unwrap();
        for i in 0..JOBS {
            let calls = Arc::clone(&calls);
            runner
                .submit(format!("name-{i}"), move |name: &str| {
                    calls[i].fetch_add(1, Ordering::SeqCst);
                    name.len()
                })
                .unwrap();
        }
        assert!(runner.jobs().iter().all(|job| job.state() == JobState::Pending));

        runner.run().unwrap();
        let mut completed = vec![];
        runner
            .wait_all(|argument, output| completed.push((argument.to_string(), output)))
            .unwrap();

        assert_eq!(completed.len(), JOBS);
        assert!(runner.jobs().iter().all(|job| job.is_finished()));
        assert!(calls.iter().all(|c| c.load(Ordering::SeqCst) == 1));
        for (argument, output) in &completed {
            assert_eq!(*output, Some(argument.len()));
        }
    }

    #[test]
    fn test_jobs_pass_through_running() {
        let mut runner = JobRunner::new(3).unwrap();
        for i in 0..10 {
            runner.submit(i.to_string(), |_: &str| ()).unwrap();
        }
        assert!(runner.jobs().iter().all(|job| job.history().is_empty()));

        runner.run().unwrap();
        runner.wait_all(|_, _| {}).unwrap();

        for job in runner.jobs() {
            assert_eq!(job.history(), &[JobState::Running, JobState::Finished]);
        }
    }

    #[test]
    fn test_workers_run_in_parallel() {
        // each job blocks until all four are running at the same time
        let barrier = Arc::new(Barrier::new(4));
        let mut runner = JobRunner::new(4).unwrap();
        for i in 0..4 {
            let barrier = Arc::clone(&barrier);
            runner
                .submit(i.to_string(), move |_: &str| {
                    barrier.wait();
                })
                .unwrap();
        }

        runner.run().unwrap();
        runner.wait_all(|_, _| {}).unwrap();
        assert!(runner.jobs().iter().all(|job| job.is_finished()));
    }

    #[test]
    fn test_no_jobs() {
        let mut runner: JobRunner<()> = JobRunner::new(2).unwrap();
        runner.run().unwrap();
        runner.wait_all(|_, _| panic!("nothing to finish")).unwrap();
    }

    #[test]
    fn test_panicking_job_still_finishes() {
        let mut runner = JobRunner::new(2).unwrap();
        runner.submit("ok", |_: &str| 1).unwrap();
        runner
            .submit("boom", |_: &str| -> i32 { panic!("work failed") })
            .unwrap();
        runner.submit("also ok", |_: &str| 3).unwrap();

        runner.run().unwrap();
        let mut outputs = HashMap::new();
        runner
            .wait_all(|argument, output| {
                outputs.insert(argument.to_string(), output);
            })
            .unwrap();

        assert_eq!(outputs.len(), 3);
        assert_eq!(outputs["ok"], Some(1));
        assert_eq!(outputs["boom"], None);
        assert_eq!(outputs["also ok"], Some(3));
        assert!(runner.jobs().iter().all(|job| job.is_finished()));
    }

    #[test]
    fn test_lifecycle_misuse() {
        assert!(matches!(
            JobRunner::<()>::new(0),
            Err(PoolError::NoWorkers)
        ));

        let mut runner = JobRunner::new(1).unwrap();
        assert_eq!(runner.wait_all(|_, _| {}), Err(PoolError::NotStarted));

        runner.submit("a", |_: &str| ()).unwrap();
        runner.run().unwrap();
        assert_eq!(runner.run(), Err(PoolError::AlreadyStarted));
        assert_eq!(
            runner.submit("b", |_: &str| ()),
            Err(PoolError::AlreadyStarted)
        );
        runner.wait_all(|_, _| {}).unwrap();
        assert_eq!(runner.jobs().len(), 1);
    }
}
