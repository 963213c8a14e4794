//! Kernel - lifecycle orchestration and the tick loop.
//!
//! This module provides [`Kernel`], the central orchestrator of the
//! simulation. A `Kernel` owns every piece of mutable state:
//!
//! - The [`ThreadTable`] arena holding all threads
//! - The [`Scheduler`] with its ready queues and current thread
//! - The process table
//! - The sleep list, keyed by absolute wake tick
//! - The tick counter (per-instance, so independent kernels can coexist)
//! - The allocator and optional filesystem collaborators
//!
//! # The Tick Loop
//!
//! [`run_cycles`](Kernel::run_cycles) advances simulated time. Each tick:
//!
//! 1. The tick counter is incremented.
//! 2. Every sleep entry whose wake tick has arrived is woken and removed,
//!    *before* the scheduling decision - a thread becoming ready this tick
//!    is eligible to run this same tick.
//! 3. The scheduler performs one dispatch step.
//! 4. The new current thread, if any, executes exactly one simulated
//!    instruction, which may terminate it.
//!
//! Execution is strictly cooperative and single-threaded: the dispatch step
//! inside the tick loop is the only suspension point, and nothing suspends
//! mid-instruction.
//!
//! # Example
//!
//! ```rust
//! use coopkern::{Kernel, ThreadPriority, ThreadState};
//!
//! let mut kernel = Kernel::new();
//! let pid = kernel.create_process("init");
//! let worker = kernel.spawn_thread(pid, "worker", ThreadPriority::Low)?;
//!
//! kernel.run_cycles(5);
//!
//! // The High-priority main thread monopolized all five ticks and finished;
//! // the Low-priority worker never ran.
//! assert_eq!(kernel.thread(worker).unwrap().state(), ThreadState::Ready);
//! # Ok::<(), coopkern::Error>(())
//! ```

use crate::{
    memory::RegionAllocator,
    sched::{Pid, Process, Scheduler, Thread, ThreadId, ThreadPriority, ThreadState, ThreadTable},
    storage::FileSystem,
    sync::{LockOutcome, MustYield, Mutex},
    Error, Result,
};

use super::{KernelBuilder, KernelConfig};

/// A pending wake request: `thread` becomes ready once the kernel's tick
/// counter reaches `wake_at`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SleepEntry {
    /// The sleeping thread.
    pub thread: ThreadId,
    /// Absolute tick at which the thread is woken.
    pub wake_at: u64,
}

/// Central orchestrator for the simulated kernel.
///
/// Creates processes and threads, drives the tick loop, and mediates between
/// the scheduler, the mutexes, and the collaborators. See the
/// [module documentation](self) for the tick-loop semantics.
#[derive(Debug)]
pub struct Kernel {
    config: KernelConfig,
    threads: ThreadTable,
    scheduler: Scheduler,
    processes: Vec<Process>,
    sleepers: Vec<SleepEntry>,
    memory: RegionAllocator,
    filesystem: Option<FileSystem>,
    next_pid: u32,
    tick: u64,
}

impl Kernel {
    /// Creates a kernel with the default configuration and no disk attached.
    #[must_use]
    pub fn new() -> Kernel {
        Kernel {
            config: KernelConfig::new(),
            threads: ThreadTable::new(),
            scheduler: Scheduler::new(),
            processes: Vec::new(),
            sleepers: Vec::new(),
            memory: RegionAllocator::new(KernelConfig::new().memory_capacity),
            filesystem: None,
            next_pid: 1,
            tick: 0,
        }
    }

    /// Returns a fluent builder for configuring a kernel.
    #[must_use]
    pub fn builder() -> KernelBuilder {
        KernelBuilder::new()
    }

    /// Creates a kernel from an explicit configuration.
    ///
    /// # Errors
    ///
    /// [`Error::FileError`] if a disk backing file is configured and cannot
    /// be created or mapped.
    pub fn with_config(config: KernelConfig) -> Result<Kernel> {
        let filesystem = match &config.disk_path {
            Some(path) => Some(FileSystem::open_image(path, config.disk_size)?),
            None => None,
        };
        Ok(Kernel {
            memory: RegionAllocator::new(config.memory_capacity),
            filesystem,
            config,
            threads: ThreadTable::new(),
            scheduler: Scheduler::new(),
            processes: Vec::new(),
            sleepers: Vec::new(),
            next_pid: 1,
            tick: 0,
        })
    }

    /// Logs subsystem readiness. No semantic effect.
    pub fn boot(&self) {
        log::info!("kernel: booting up");
        log::info!("kernel: memory manager initialized ({} bytes)", self.memory.capacity());
        if self.filesystem.is_some() {
            log::info!("kernel: filesystem initialized");
        }
        log::info!("kernel: scheduler ready");
    }

    /// Current value of the tick counter.
    #[must_use]
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Creates a process with a fresh pid and one High-priority main thread.
    ///
    /// The fixed-size memory grant is best-effort: allocator exhaustion
    /// leaves the process without a recorded region but the process and its
    /// main thread are created regardless.
    pub fn create_process(&mut self, name: &str) -> Pid {
        let pid = Pid::new(self.next_pid);
        self.next_pid += 1;

        let mut process = Process::new(pid, name);
        match self.memory.allocate(self.config.memory_grant) {
            Ok(region) => process.set_memory(region),
            Err(err) => log::warn!("kernel: memory grant denied for process {}: {}", pid, err),
        }

        let main = self.threads.insert(pid, "main", ThreadPriority::High);
        process.add_thread(main);
        self.scheduler.add_thread(main, ThreadPriority::High);

        log::debug!("kernel: created process {} ('{}'), main thread {}", pid, name, main);
        self.processes.push(process);
        pid
    }

    /// Creates and registers a thread under an existing process.
    ///
    /// # Errors
    ///
    /// [`Error::ProcessNotFound`] if no process with `pid` exists.
    pub fn spawn_thread(
        &mut self,
        pid: Pid,
        name: &str,
        priority: ThreadPriority,
    ) -> Result<ThreadId> {
        if !self.processes.iter().any(|p| p.pid() == pid) {
            return Err(Error::ProcessNotFound(pid));
        }

        let id = self.threads.insert(pid, name, priority);
        self.scheduler.add_thread(id, priority);
        if let Some(process) = self.processes.iter_mut().find(|p| p.pid() == pid) {
            process.add_thread(id);
        }
        log::debug!("kernel: spawned thread {} ('{}') in process {}", id, name, pid);
        Ok(id)
    }

    /// Puts a thread to sleep for `ticks` ticks.
    ///
    /// The thread is detached from the scheduler's ready queues, blocked, and
    /// entered into the sleep list with `wake_at = current_tick + ticks`. The
    /// first tick where the counter reaches `wake_at` wakes it, before that
    /// tick's scheduling decision.
    ///
    /// # Errors
    ///
    /// [`Error::ThreadNotFound`] for a dead handle. A terminated thread is
    /// left alone (no-op).
    pub fn sleep_thread(&mut self, id: ThreadId, ticks: u64) -> Result<()> {
        let Some(thread) = self.threads.get_mut(id) else {
            return Err(Error::ThreadNotFound(id));
        };
        if thread.state() == ThreadState::Terminated {
            return Ok(());
        }

        thread.set_state(ThreadState::Blocked);
        // A sleeping current thread stays current until the next dispatch
        // drops it; a queued one must leave the ready queues now.
        if self.scheduler.current() != Some(id) {
            self.scheduler.remove_thread(id);
        }

        let wake_at = self.tick + ticks;
        self.sleepers.push(SleepEntry { thread: id, wake_at });
        log::debug!("kernel: thread {} sleeping until tick {}", id, wake_at);
        Ok(())
    }

    /// Runs the tick loop for `cycles` ticks.
    pub fn run_cycles(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.tick += 1;
            self.wake_sleepers();

            if let Some(current) = self.scheduler.yield_now(&mut self.threads) {
                self.execute_instruction(current);
            }
        }
    }

    /// Destroys a single thread, detaching it from every tracking structure.
    ///
    /// Returns whether a live thread was destroyed.
    pub fn kill_thread(&mut self, id: ThreadId) -> bool {
        self.scheduler.remove_thread(id);
        self.sleepers.retain(|entry| entry.thread != id);
        for process in &mut self.processes {
            if process.remove_thread(id) {
                break;
            }
        }
        let destroyed = self.threads.remove(id).is_some();
        if destroyed {
            log::debug!("kernel: killed thread {}", id);
        }
        destroyed
    }

    /// Destroys a process and every thread it owns.
    ///
    /// Threads are detached from the scheduler and the sleep list before
    /// their arena slots are freed, so no scheduler reference outlives the
    /// owner. The process's memory grant is returned to the allocator.
    ///
    /// Returns whether a process was found and destroyed.
    pub fn kill_process(&mut self, pid: Pid) -> bool {
        let Some(pos) = self.processes.iter().position(|p| p.pid() == pid) else {
            return false;
        };
        let process = self.processes.remove(pos);

        for &id in process.threads() {
            self.scheduler.remove_thread(id);
            self.sleepers.retain(|entry| entry.thread != id);
            self.threads.remove(id);
        }
        if let Some(region) = process.memory() {
            if let Err(err) = self.memory.deallocate(region) {
                log::warn!("kernel: failed to reclaim grant of process {}: {}", pid, err);
            }
        }
        log::debug!("kernel: killed process {}", pid);
        true
    }

    /// Attempts to lock a mutex on behalf of the current thread.
    ///
    /// Forwards to [`Mutex::lock`] with the kernel's scheduler and thread
    /// table. A [`LockOutcome::Blocked`] result carries the token that must
    /// be passed to [`dispatch`](Kernel::dispatch).
    ///
    /// # Errors
    ///
    /// [`Error::RecursiveLock`] when the caller already owns the mutex.
    pub fn lock(&mut self, mutex: &mut Mutex) -> Result<LockOutcome> {
        mutex.lock(&mut self.scheduler, &mut self.threads)
    }

    /// Releases a mutex on behalf of the current thread.
    ///
    /// # Errors
    ///
    /// [`Error::NotOwner`] when the current thread does not own the mutex.
    pub fn unlock(&mut self, mutex: &mut Mutex) -> Result<()> {
        mutex.unlock(&mut self.scheduler, &mut self.threads)
    }

    /// Hands the processor off after a blocking call, consuming the token.
    ///
    /// Returns the thread selected to run next, if any.
    pub fn dispatch(&mut self, token: MustYield) -> Option<ThreadId> {
        token.complete(&mut self.scheduler, &mut self.threads)
    }

    /// The process table, in creation order.
    #[must_use]
    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    /// Looks up a process by pid.
    #[must_use]
    pub fn process(&self, pid: Pid) -> Option<&Process> {
        self.processes.iter().find(|p| p.pid() == pid)
    }

    /// Looks up a live thread by handle.
    #[must_use]
    pub fn thread(&self, id: ThreadId) -> Option<&Thread> {
        self.threads.get(id)
    }

    /// Snapshot of every thread the scheduler tracks, in dispatch order.
    #[must_use]
    pub fn threads(&self) -> Vec<&Thread> {
        self.scheduler
            .all_threads()
            .into_iter()
            .filter_map(|id| self.threads.get(id))
            .collect()
    }

    /// The scheduler, for inspection.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The memory allocator collaborator.
    #[must_use]
    pub fn memory(&self) -> &RegionAllocator {
        &self.memory
    }

    /// The storage collaborator, if a disk was attached at build time.
    #[must_use]
    pub fn filesystem(&mut self) -> Option<&mut FileSystem> {
        self.filesystem.as_mut()
    }

    /// Pending sleep entries, for inspection.
    #[must_use]
    pub fn sleepers(&self) -> &[SleepEntry] {
        &self.sleepers
    }

    fn wake_sleepers(&mut self) {
        let tick = self.tick;
        let due: Vec<ThreadId> = self
            .sleepers
            .iter()
            .filter(|entry| tick >= entry.wake_at)
            .map(|entry| entry.thread)
            .collect();
        self.sleepers.retain(|entry| tick < entry.wake_at);
        for id in due {
            self.scheduler.wakeup(id, &mut self.threads);
        }
    }

    /// Executes one simulated instruction on the current thread.
    fn execute_instruction(&mut self, id: ThreadId) {
        let threshold = self.config.completion_threshold;
        let Some(thread) = self.threads.get_mut(id) else {
            return;
        };

        log::trace!(
            "cpu: thread {} (pid {}, '{}') executing instruction {}",
            id,
            thread.parent(),
            thread.name(),
            thread.program_counter()
        );
        thread.advance_program_counter();

        if thread.program_counter() >= threshold {
            log::debug!("cpu: thread {} ('{}') completed", id, thread.name());
            thread.set_state(ThreadState::Terminated);
        }
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Kernel::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_process_assigns_pid_main_thread_and_grant() {
        let mut kernel = Kernel::new();
        let pid = kernel.create_process("init");

        assert_eq!(pid, Pid::new(1));
        let process = kernel.process(pid).unwrap();
        assert_eq!(process.name(), "init");
        assert_eq!(process.thread_count(), 1);

        let main = process.threads()[0];
        let thread = kernel.thread(main).unwrap();
        assert_eq!(thread.priority(), ThreadPriority::High);
        assert_eq!(thread.state(), ThreadState::Ready);

        let grant = process.memory().expect("grant honored");
        assert_eq!(grant.size(), 64);
    }

    #[test]
    fn grant_exhaustion_does_not_fail_creation() {
        let mut kernel = Kernel::builder()
            .memory_capacity(100)
            .memory_grant(64)
            .build()
            .unwrap();

        let first = kernel.create_process("a");
        let second = kernel.create_process("b");

        assert!(kernel.process(first).unwrap().memory().is_some());
        // Only 36 bytes left: the grant is denied but the process exists.
        let starved = kernel.process(second).unwrap();
        assert!(starved.memory().is_none());
        assert_eq!(starved.thread_count(), 1);
    }

    #[test]
    fn spawn_into_unknown_process_is_reported() {
        let mut kernel = Kernel::new();
        let err = kernel
            .spawn_thread(Pid::new(9), "w", ThreadPriority::Low)
            .unwrap_err();
        assert!(matches!(err, Error::ProcessNotFound(pid) if pid == Pid::new(9)));
    }

    #[test]
    fn sleeping_thread_wakes_exactly_on_its_tick() {
        let mut kernel = Kernel::new();
        let pid = kernel.create_process("p");
        let main = kernel.process(pid).unwrap().threads()[0];

        kernel.sleep_thread(main, 3).unwrap();
        assert_eq!(kernel.thread(main).unwrap().state(), ThreadState::Blocked);

        // Ticks 1 and 2: still asleep, nothing runs.
        kernel.run_cycles(1);
        assert_eq!(kernel.thread(main).unwrap().state(), ThreadState::Blocked);
        kernel.run_cycles(1);
        assert_eq!(kernel.thread(main).unwrap().state(), ThreadState::Blocked);
        assert_eq!(kernel.sleepers().len(), 1);

        // Tick 3: woken before the dispatch decision, so it runs this tick.
        kernel.run_cycles(1);
        let thread = kernel.thread(main).unwrap();
        assert_eq!(thread.state(), ThreadState::Running);
        assert_eq!(thread.program_counter(), 1);
        assert!(kernel.sleepers().is_empty());
    }

    #[test]
    fn completion_threshold_terminates_the_thread() {
        let mut kernel = Kernel::builder().completion_threshold(2).build().unwrap();
        let pid = kernel.create_process("p");
        let main = kernel.process(pid).unwrap().threads()[0];

        kernel.run_cycles(1);
        assert_eq!(kernel.thread(main).unwrap().state(), ThreadState::Running);

        kernel.run_cycles(1);
        let thread = kernel.thread(main).unwrap();
        assert_eq!(thread.program_counter(), 2);
        assert_eq!(thread.state(), ThreadState::Terminated);

        // The next dispatch drops it from scheduler tracking.
        kernel.run_cycles(1);
        assert!(kernel.threads().is_empty());
    }

    #[test]
    fn kill_thread_detaches_everywhere() {
        let mut kernel = Kernel::new();
        let pid = kernel.create_process("p");
        let worker = kernel.spawn_thread(pid, "w", ThreadPriority::Low).unwrap();

        assert!(kernel.kill_thread(worker));
        assert!(kernel.thread(worker).is_none());
        assert_eq!(kernel.process(pid).unwrap().thread_count(), 1);
        assert!(!kernel
            .scheduler()
            .all_threads()
            .contains(&worker));

        // A second kill reports that nothing was destroyed.
        assert!(!kernel.kill_thread(worker));
    }

    #[test]
    fn kill_process_cascades_and_reclaims_the_grant() {
        let mut kernel = Kernel::new();
        let pid = kernel.create_process("p");
        let worker = kernel.spawn_thread(pid, "w", ThreadPriority::Low).unwrap();
        let sleeper = kernel.spawn_thread(pid, "s", ThreadPriority::Low).unwrap();
        kernel.sleep_thread(sleeper, 10).unwrap();

        assert!(kernel.kill_process(pid));
        assert!(kernel.process(pid).is_none());
        assert!(kernel.thread(worker).is_none());
        assert!(kernel.thread(sleeper).is_none());
        assert!(kernel.threads().is_empty());
        assert!(kernel.sleepers().is_empty());

        // The grant went back to the allocator: the arena is one free region.
        let regions = kernel.memory().regions();
        assert_eq!(regions.len(), 1);
        assert!(regions[0].free);

        assert!(!kernel.kill_process(pid));
    }

    #[test]
    fn tick_counters_are_per_instance() {
        let mut a = Kernel::new();
        let b = Kernel::new();

        a.create_process("p");
        a.run_cycles(4);

        assert_eq!(a.current_tick(), 4);
        assert_eq!(b.current_tick(), 0);
    }
}
