use log::info;
pub type TaskID = i32;

/// A unit of pipeline work run repeatedly on its own thread. Returning
/// `false` ends the task.
pub trait SteppableTask: Send + 'static {
    fn step(&mut self) -> bool;
}

pub struct ThreadManager {
    current_task_id: TaskID,
    tasks: std::collections::HashMap<TaskID, ManagedTask>,
}

impl ThreadManager {
    #[must_use]
    pub fn new() -> Self {
        ThreadManager {
            current_task_id: 0,
            tasks: std::collections::HashMap::new(),
        }
    }

    /// Spawns `task` on a thread called `name`.
    ///
    /// A zero `period` steps the task back to back; otherwise steps are
    /// spaced `period` apart.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn add_task<T>(
        &mut self,
        name: &str,
        task: T,
        period: std::time::Duration,
    ) -> Result<TaskID, std::io::Error>
    where
        T: SteppableTask,
    {
        let id = self.current_task_id;

        let (stop_sender, stop_receiver) = crossbeam_channel::bounded::<()>(1);

        let handle = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                if period.is_zero() {
                    run_task_continuously(task, &stop_receiver);
                } else {
                    run_task_with_period(task, period, &stop_receiver);
                }
            })?;
        info!("ThreadManager: started task {id} ({name})");
        self.tasks.insert(
            id,
            ManagedTask {
                name: name.to_string(),
                handle,
                stop_sender,
            },
        );
        self.current_task_id += 1;
        Ok(id)
    }

    pub fn stop_all_tasks(&self) {
        info!("ThreadManager: Signaling all tasks to stop...");
        for task in self.tasks.values() {
            let _ = task.stop_sender.try_send(());
        }
    }

    #[must_use]
    pub fn is_task_finished(&self, task_id: TaskID) -> bool {
        self.tasks
            .get(&task_id)
            .map_or(true, |task| task.handle.is_finished())
    }

    pub fn wait_on_task_finish(&mut self, task_id: TaskID) {
        if let Some(task) = self.tasks.remove(&task_id) {
            if task.handle.join().is_err() {
                log::error!("ThreadManager: task {task_id} ({}) panicked", task.name);
            }
        }
    }

    pub fn wait_on_all_tasks(&mut self) {
        let ids: Vec<TaskID> = self.tasks.keys().copied().collect();
        for id in ids {
            self.wait_on_task_finish(id);
        }
    }
}

impl Default for ThreadManager {
    fn default() -> Self {
        ThreadManager::new()
    }
}

fn run_task_continuously<T: SteppableTask>(
    mut task: T,
    stop_receiver: &crossbeam_channel::Receiver<()>,
) {
    loop {
        match stop_receiver.try_recv() {
            Ok(()) | Err(crossbeam_channel::TryRecvError::Disconnected) => break,
            Err(crossbeam_channel::TryRecvError::Empty) => {}
        }

        if !task.step() {
            break;
        }

        std::thread::yield_now();
    }
}

fn run_task_with_period<T: SteppableTask>(
    mut task: T,
    period: std::time::Duration,
    stop_receiver: &crossbeam_channel::Receiver<()>,
) {
    let mut next_run = std::time::Instant::now();
    loop {
        if !task.step() {
            break;
        }

        next_run += period;
        let now = std::time::Instant::now();

        if next_run > now {
            match stop_receiver.recv_timeout(next_run - now) {
                Ok(()) | Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            }
        } else {
            // lagging, reset the schedule
            next_run = now;

            if let Ok(()) = stop_receiver.try_recv() {
                break;
            }
        }
    }
}

struct ManagedTask {
    name: String,
    handle: std::thread::JoinHandle<()>,
    stop_sender: crossbeam_channel::Sender<()>,
}
