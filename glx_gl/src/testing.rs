//! Recording stand-ins for the driver and the windowing library.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};
use std::num::NonZeroU32;
use std::rc::Rc;

use glam::IVec2;

use crate::driver::ShaderDriver;
use crate::error::{GlError, HostError};
use crate::host::{HostConfig, Platform, PlatformWindow};
use crate::info::DriverInfo;
use crate::shader::ShaderStage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCall {
    CreateShader(ShaderStage, u32),
    Compile(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    Attach(u32, u32),
    Link(u32),
    Validate(u32),
    DeleteProgram(u32),
    Use(u32),
}

pub struct MockDriver {
    context: Cell<bool>,
    next_handle: Cell<u32>,
    stages: RefCell<HashMap<u32, ShaderStage>>,
    live: RefCell<BTreeSet<u32>>,
    calls: RefCell<Vec<DriverCall>>,

    compile_failures: RefCell<HashMap<ShaderStage, String>>,
    link_failure: RefCell<Option<String>>,
    validate_failure: RefCell<Option<String>>,
}

impl MockDriver {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            context: Cell::new(true),
            next_handle: Cell::new(1),
            stages: RefCell::default(),
            live: RefCell::default(),
            calls: RefCell::default(),
            compile_failures: RefCell::default(),
            link_failure: RefCell::default(),
            validate_failure: RefCell::default(),
        })
    }

    pub fn set_context(&self, context: bool) {
        self.context.set(context);
    }

    pub fn fail_compile(&self, stage: ShaderStage, info_log: &str) {
        self.compile_failures
            .borrow_mut()
            .insert(stage, info_log.to_string());
    }

    pub fn fail_link(&self, info_log: &str) {
        *self.link_failure.borrow_mut() = Some(info_log.to_string());
    }

    pub fn fail_validate(&self, info_log: &str) {
        *self.validate_failure.borrow_mut() = Some(info_log.to_string());
    }

    pub fn heal(&self) {
        self.compile_failures.borrow_mut().clear();
        *self.link_failure.borrow_mut() = None;
        *self.validate_failure.borrow_mut() = None;
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&DriverCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|call| pred(call)).count()
    }

    /// Objects created and not yet deleted.
    pub fn live_objects(&self) -> usize {
        self.live.borrow().len()
    }

    fn record(&self, call: DriverCall) {
        self.calls.borrow_mut().push(call);
    }

    fn allocate(&self) -> NonZeroU32 {
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        self.live.borrow_mut().insert(handle);
        NonZeroU32::new(handle).unwrap()
    }

    fn free(&self, handle: NonZeroU32) {
        assert!(
            self.live.borrow_mut().remove(&handle.get()),
            "double delete of {handle}"
        );
    }
}

impl ShaderDriver for MockDriver {
    fn has_context(&self) -> bool {
        self.context.get()
    }

    fn create_shader(&self, stage: ShaderStage) -> Option<NonZeroU32> {
        let handle = self.allocate();
        self.stages.borrow_mut().insert(handle.get(), stage);
        self.record(DriverCall::CreateShader(stage, handle.get()));
        Some(handle)
    }

    fn compile_shader(&self, shader: NonZeroU32, source: &str) -> Result<(), String> {
        assert!(!source.is_empty());
        self.record(DriverCall::Compile(shader.get()));
        let stage = self.stages.borrow()[&shader.get()];
        match self.compile_failures.borrow().get(&stage) {
            Some(info_log) => Err(info_log.clone()),
            None => Ok(()),
        }
    }

    fn delete_shader(&self, shader: NonZeroU32) {
        self.record(DriverCall::DeleteShader(shader.get()));
        self.free(shader);
    }

    fn create_program(&self) -> Option<NonZeroU32> {
        let handle = self.allocate();
        self.record(DriverCall::CreateProgram(handle.get()));
        Some(handle)
    }

    fn attach_shader(&self, program: NonZeroU32, shader: NonZeroU32) {
        self.record(DriverCall::Attach(program.get(), shader.get()));
    }

    fn link_program(&self, program: NonZeroU32) -> Result<(), String> {
        self.record(DriverCall::Link(program.get()));
        self.link_failure.borrow().clone().map_or(Ok(()), Err)
    }

    fn validate_program(&self, program: NonZeroU32) -> Result<(), String> {
        self.record(DriverCall::Validate(program.get()));
        self.validate_failure.borrow().clone().map_or(Ok(()), Err)
    }

    fn delete_program(&self, program: NonZeroU32) {
        self.record(DriverCall::DeleteProgram(program.get()));
        self.free(program);
    }

    fn use_program(&self, program: NonZeroU32) {
        self.record(DriverCall::Use(program.get()));
    }
}

pub type EventLog = Rc<RefCell<Vec<String>>>;

pub fn events(log: &EventLog) -> Vec<String> {
    log.borrow().clone()
}

pub fn push_event(log: &EventLog, event: impl Into<String>) {
    log.borrow_mut().push(event.into());
}

/// Windows close by themselves after `close_after_frames` swaps.
pub struct MockPlatform {
    pub driver: Rc<MockDriver>,
    pub events: EventLog,
    pub monitor: Option<IVec2>,
    pub fail_window: bool,
    pub fail_loader: bool,
    pub close_after_frames: usize,
    pub windows_created: usize,
}

impl MockPlatform {
    pub fn new(close_after_frames: usize) -> Self {
        Self {
            driver: MockDriver::new(),
            events: EventLog::default(),
            monitor: Some(IVec2::new(1920, 1080)),
            fail_window: false,
            fail_loader: false,
            close_after_frames,
            windows_created: 0,
        }
    }
}

impl Platform for MockPlatform {
    type Window = MockWindow;

    fn shader_driver(&self) -> Rc<dyn ShaderDriver> {
        self.driver.clone()
    }

    fn primary_monitor_size(&self) -> Option<IVec2> {
        self.monitor
    }

    fn apply_hints(&mut self, config: &HostConfig) {
        push_event(
            &self.events,
            format!(
                "hints {}.{}",
                config.gl_version.major, config.gl_version.minor
            ),
        );
    }

    fn create_window(&mut self, config: &HostConfig) -> Result<MockWindow, HostError> {
        if self.fail_window {
            return Err(HostError::WindowCreation("mock refused".into()));
        }
        self.windows_created += 1;
        push_event(&self.events, format!("create {}", config.title));
        self.driver.set_context(false);
        Ok(MockWindow {
            driver: self.driver.clone(),
            events: self.events.clone(),
            size: IVec2::new(config.width, config.height) * 2,
            fail_loader: self.fail_loader,
            close_after_frames: self.close_after_frames,
            frames: Cell::new(0),
            current: Cell::new(false),
        })
    }

    fn poll_events(&mut self) {
        push_event(&self.events, "poll");
    }
}

pub struct MockWindow {
    driver: Rc<MockDriver>,
    events: EventLog,
    size: IVec2,
    fail_loader: bool,
    close_after_frames: usize,
    frames: Cell<usize>,
    current: Cell<bool>,
}

impl Drop for MockWindow {
    fn drop(&mut self) {
        self.driver.set_context(false);
        push_event(&self.events, "destroy window");
    }
}

impl PlatformWindow for MockWindow {
    fn framebuffer_size(&self) -> IVec2 {
        self.size
    }

    fn make_current(&self) {
        self.current.set(true);
        self.driver.set_context(true);
    }

    fn is_current(&self) -> bool {
        self.current.get()
    }

    fn load_extensions(&self, _config: &HostConfig) -> Result<(), HostError> {
        if self.fail_loader {
            return Err(HostError::ExtensionLoader("mock refused".into()));
        }
        Ok(())
    }

    fn should_close(&self) -> bool {
        self.frames.get() >= self.close_after_frames
    }

    fn swap_buffers(&self) {
        self.frames.set(self.frames.get() + 1);
        push_event(&self.events, "swap");
    }

    fn take_gl_error(&self) -> Option<GlError> {
        None
    }

    fn driver_info(&self) -> Option<DriverInfo> {
        Some(DriverInfo {
            vendor: "mock".into(),
            renderer: "mock".into(),
            version: "4.1".into(),
            shading_language_version: "4.10".into(),
        })
    }
}
