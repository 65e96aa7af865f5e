use std::borrow::Cow;
use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::shader::ShaderProgram;

mod platform;
mod task;

pub use platform::{Glfw, Platform, PlatformWindow};
pub use task::{HostHandle, Task, TaskQueue, TaskResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratio {
    pub numerator: i32,
    pub denominator: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlVersion {
    pub major: u32,
    pub minor: u32,
}

/// Everything `launch` turns into window and context hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub width: i32,
    pub height: i32,
    pub title: String,
    pub gl_version: GlVersion,
    pub aspect_ratio: Option<Ratio>,
    pub forward_compatible: bool,
    pub focus_on_show: bool,
    pub experimental_loader: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "glx".to_string(),
            gl_version: GlVersion { major: 4, minor: 1 },
            aspect_ratio: Some(Ratio {
                numerator: 16,
                denominator: 9,
            }),
            forward_compatible: false,
            focus_on_show: false,
            experimental_loader: true,
        }
    }
}

impl HostConfig {
    /// Fields missing from `json` keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, HostError> {
        serde_json::from_str(json).map_err(|err| HostError::Config(err.to_string()))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|err| HostError::Config(format!("{}: {err}", path.display())))?;
        Self::from_json_str(&json)
    }
}

/// Owns one window, one [`ShaderProgram`] and two task queues, and runs the
/// blocking frame loop.
///
/// Tasks queued with [`queue_post_launch`](Self::queue_post_launch) run once
/// after the context is created; tasks queued with
/// [`queue_on_tick`](Self::queue_on_tick) run every frame. A failing task is
/// logged and never stops the loop.
pub struct RenderHost<P: Platform = Glfw> {
    config: HostConfig,
    window: Option<P::Window>,
    framebuffer_size: IVec2,
    monitor_size: Option<IVec2>,

    post_launch: TaskQueue,
    on_tick: TaskQueue,
    handle: HostHandle,
    shader: Rc<RefCell<ShaderProgram>>,

    platform: P,
}

impl RenderHost<Glfw> {
    pub fn new() -> Result<Self, HostError> {
        Glfw::init().map(Self::with_platform)
    }
}

impl<P: Platform> RenderHost<P> {
    pub fn with_platform(platform: P) -> Self {
        let monitor_size = platform.primary_monitor_size();
        if monitor_size.is_none() {
            log::warn!("failed to get primary monitor");
        }
        let shader = ShaderProgram::new(platform.shader_driver());

        Self {
            config: HostConfig::default(),
            window: None,
            framebuffer_size: IVec2::ZERO,
            monitor_size,
            post_launch: TaskQueue::default(),
            on_tick: TaskQueue::default(),
            handle: HostHandle::default(),
            shader: Rc::new(RefCell::new(shader)),
            platform,
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: HostConfig) {
        self.config = config;
    }

    pub fn set_window_size(&mut self, width: i32, height: i32) {
        self.config.width = width;
        self.config.height = height;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.config.title = title.into();
    }

    pub fn set_gl_version(&mut self, major: u32, minor: u32) {
        self.config.gl_version = GlVersion { major, minor };
    }

    pub fn set_aspect_ratio(&mut self, numerator: i32, denominator: i32) {
        self.config.aspect_ratio = Some(Ratio {
            numerator,
            denominator,
        });
    }

    pub fn set_forward_compatible(&mut self, forward_compatible: bool) {
        self.config.forward_compatible = forward_compatible;
    }

    pub fn set_focus_on_init(&mut self, focus_on_show: bool) {
        self.config.focus_on_show = focus_on_show;
    }

    pub fn set_experimental_loader(&mut self, experimental: bool) {
        self.config.experimental_loader = experimental;
    }

    /// Runs every frame, in insertion order, until the loop ends.
    pub fn queue_on_tick(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        run: impl FnMut() -> TaskResult + 'static,
    ) {
        self.on_tick.push(Task::new(name, run));
    }

    /// Runs once per launch, after the context exists and before the first
    /// frame.
    pub fn queue_post_launch(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        run: impl FnMut() -> TaskResult + 'static,
    ) {
        self.post_launch.push(Task::new(name, run));
    }

    pub fn post_launch_len(&self) -> usize {
        self.post_launch.len()
    }

    pub fn on_tick_len(&self) -> usize {
        self.on_tick.len()
    }

    pub fn shader_tool(&self) -> Rc<RefCell<ShaderProgram>> {
        Rc::clone(&self.shader)
    }

    pub fn handle(&self) -> HostHandle {
        self.handle.clone()
    }

    pub fn primary_monitor_width(&self) -> Option<i32> {
        self.monitor_size.map(|size| size.x)
    }

    pub fn primary_monitor_height(&self) -> Option<i32> {
        self.monitor_size.map(|size| size.y)
    }

    /// As reported by the window at launch.
    pub fn framebuffer_size(&self) -> IVec2 {
        self.framebuffer_size
    }

    /// Creates the window, runs the post-launch tasks and blocks in the frame
    /// loop until the window is asked to close.
    ///
    /// On a creation or loader failure nothing is left running and the
    /// queues are kept.
    pub fn launch(&mut self) -> Result<(), HostError> {
        if self.window.is_some() {
            log::debug!("replacing the window of a previous launch");
            self.teardown_shader();
            self.window = None;
        }

        self.platform.apply_hints(&self.config);
        let window = self
            .platform
            .create_window(&self.config)
            .inspect_err(|err| log::error!("failed to launch: {err}"))?;

        self.framebuffer_size = window.framebuffer_size();
        window.make_current();
        window
            .load_extensions(&self.config)
            .inspect_err(|err| log::error!("failed to launch: {err}"))?;

        let window = &*self.window.insert(window);
        self.handle.reset_close();
        self.handle.set_running(true);
        log::info!(
            "launched \"{}\" ({}x{}, framebuffer {}x{})",
            self.config.title,
            self.config.width,
            self.config.height,
            self.framebuffer_size.x,
            self.framebuffer_size.y,
        );

        self.post_launch.run_logged(window);

        while !window.should_close() && !self.handle.close_requested() {
            self.platform.poll_events();
            self.on_tick.run_with_retry(window);
            window.swap_buffers();
        }

        self.handle.set_running(false);
        log::debug!("frame loop exited");
        Ok(())
    }

    fn teardown_shader(&self) {
        match self.shader.try_borrow_mut() {
            Ok(mut shader) => shader.teardown(),
            Err(_) => log::warn!("shader program is borrowed, skipping teardown"),
        }
    }

    /// Clears both queues and releases the shader program and the window.
    /// Safe to call in any state, any number of times.
    pub fn destroy(&mut self) {
        self.post_launch.clear();
        self.on_tick.clear();
        self.handle.set_running(false);
        self.teardown_shader();
        if self.window.take().is_some() {
            log::debug!("window destroyed");
        }
    }

    /// Whether the loop is running with its context current.
    pub fn status(&self) -> bool {
        self.handle.is_running() && self.window.as_ref().is_some_and(|w| w.is_current())
    }

    pub fn log_info(&self) {
        log::info!("glx version: {}", crate::VERSION);
        let info = self
            .window
            .as_ref()
            .filter(|window| window.is_current())
            .and_then(|window| window.driver_info());
        match info {
            Some(info) => info.log(),
            None => log::info!("no current context, driver info unavailable"),
        }
    }
}

impl<P: Platform> Drop for RenderHost<P> {
    fn drop(&mut self) {
        self.destroy();
    }
}
