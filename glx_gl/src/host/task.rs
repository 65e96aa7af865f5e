use std::any::Any;
use std::borrow::Cow;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use color_eyre::{eyre::eyre, Result as EyreResult};

use super::platform::PlatformWindow;

pub type TaskResult = EyreResult<()>;

/// A named deferred action. A returned `Err` or a panic both count as a
/// failure.
pub struct Task {
    name: Cow<'static, str>,
    run: Box<dyn FnMut() -> TaskResult>,
}

impl Task {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        run: impl FnMut() -> TaskResult + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            run: Box::new(run),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run(&mut self) -> TaskResult {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.run)())) {
            Ok(result) => result,
            Err(payload) => Err(eyre!("task panicked: {}", panic_message(payload.as_ref()))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "<non-string payload>"
    }
}

fn report_gl_error<W: PlatformWindow>(window: &W) {
    if let Some(err) = window.take_gl_error() {
        log::error!("pending GL error: {err:?}");
    }
}

/// Tasks in insertion order.
#[derive(Default)]
pub struct TaskQueue {
    tasks: Vec<Task>,
}

impl TaskQueue {
    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Runs every task once. Failures are logged and skipped.
    pub(super) fn run_logged<W: PlatformWindow>(&mut self, window: &W) {
        for task in &mut self.tasks {
            if let Err(err) = task.run() {
                log::error!("post-launch task \"{}\" failed: {err:#}", task.name);
                report_gl_error(window);
            }
        }
    }

    /// Runs every task once, giving each failing task one immediate retry.
    pub(super) fn run_with_retry<W: PlatformWindow>(&mut self, window: &W) {
        for task in &mut self.tasks {
            let Err(first) = task.run() else {
                continue;
            };
            log::warn!("tick task \"{}\" failed, retrying: {first:#}", task.name);

            if let Err(err) = task.run() {
                log::error!("tick task \"{}\" failed again, skipped: {err:#}", task.name);
                report_gl_error(window);
            }
        }
    }
}

/// Cloneable view into a [`RenderHost`](super::RenderHost) for tasks.
///
/// Only valid for the host that handed it out.
#[derive(Debug, Clone, Default)]
pub struct HostHandle {
    close: Rc<Cell<bool>>,
    running: Rc<Cell<bool>>,
}

impl HostHandle {
    /// Ends the loop after the current pass.
    pub fn request_close(&self) {
        self.close.set(true);
    }

    pub fn close_requested(&self) -> bool {
        self.close.get()
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub(super) fn set_running(&self, running: bool) {
        self.running.set(running);
    }

    pub(super) fn reset_close(&self) {
        self.close.set(false);
    }
}
