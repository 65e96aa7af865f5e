use std::fmt::{Display, Formatter};
use std::fs;
use std::num::NonZeroU32;
use std::path::Path;
use std::rc::Rc;

use glx_utils::OptExt;

use crate::driver::ShaderDriver;
use crate::error::ShaderError;
use crate::transmutable_u32;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex = gl::VERTEX_SHADER,
    Fragment = gl::FRAGMENT_SHADER,
}
transmutable_u32!(ShaderStage);

impl ShaderStage {
    pub const ALL: [Self; 2] = [Self::Vertex, Self::Fragment];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        }
    }
}

impl Display for ShaderStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectKind {
    Shader,
    Program,
}

/// Owns one driver object and deletes it at most once.
///
/// Nothing is released on `Drop`: the owner calls [`GlObject::release`]
/// while it still knows whether the context is alive.
#[derive(Debug)]
pub struct GlObject {
    handle: Option<NonZeroU32>,
    kind: ObjectKind,
}

impl GlObject {
    const fn shader() -> Self {
        Self {
            handle: None,
            kind: ObjectKind::Shader,
        }
    }

    const fn program() -> Self {
        Self {
            handle: None,
            kind: ObjectKind::Program,
        }
    }

    pub fn get(&self) -> Option<NonZeroU32> {
        self.handle
    }

    pub fn is_live(&self) -> bool {
        self.handle.is_some()
    }

    fn hold(&mut self, handle: NonZeroU32) {
        debug_assert!(self.handle.is_none(), "holding over a live {:?}", self.kind);
        self.handle = Some(handle);
    }

    /// Deletes the object if one is held. Returns whether a handle was held.
    ///
    /// Without a live context the handle is forgotten instead of deleted;
    /// the driver reclaims it with the context.
    pub fn release(&mut self, driver: &dyn ShaderDriver) -> bool {
        let Some(handle) = self.handle.take() else {
            return false;
        };

        if !driver.has_context() {
            log::debug!("no current context, dropping {:?} {handle}", self.kind);
            return true;
        }

        match self.kind {
            ObjectKind::Shader => driver.delete_shader(handle),
            ObjectKind::Program => driver.delete_program(handle),
        }
        log::trace!("deleted {:?} {handle}", self.kind);
        true
    }
}

/// How many stages currently hold a compiled shader object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compiled {
    None,
    Partially,
    Fully,
}

/// A vertex + fragment program moving through
/// source → compile → link → ready → teardown.
///
/// Failures are returned and also kept in [`last_error`](Self::last_error).
/// While an error is kept, [`build`](Self::build) refuses to run; call
/// [`clear_error`](Self::clear_error) or [`teardown`](Self::teardown) first.
pub struct ShaderProgram {
    driver: Rc<dyn ShaderDriver>,

    vertex_source: String,
    fragment_source: String,

    vertex: GlObject,
    fragment: GlObject,
    program: GlObject,

    linked: bool,
    last_error: Option<ShaderError>,
}

impl ShaderProgram {
    pub fn new(driver: Rc<dyn ShaderDriver>) -> Self {
        Self {
            driver,
            vertex_source: String::new(),
            fragment_source: String::new(),
            vertex: GlObject::shader(),
            fragment: GlObject::shader(),
            program: GlObject::program(),
            linked: false,
            last_error: None,
        }
    }

    pub fn source(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex_source,
            ShaderStage::Fragment => &self.fragment_source,
        }
    }

    /// Replaces the stored source. A program that is already built is
    /// unaffected until it is torn down and rebuilt.
    pub fn set_source(&mut self, stage: ShaderStage, source: impl Into<String>) {
        let slot = match stage {
            ShaderStage::Vertex => &mut self.vertex_source,
            ShaderStage::Fragment => &mut self.fragment_source,
        };
        *slot = source.into();
    }

    #[inline]
    pub fn set_vertex_source(&mut self, source: impl Into<String>) {
        self.set_source(ShaderStage::Vertex, source);
    }
    #[inline]
    pub fn set_fragment_source(&mut self, source: impl Into<String>) {
        self.set_source(ShaderStage::Fragment, source);
    }

    /// Reads the whole file as the stage's source.
    ///
    /// On failure the previous source is kept and the error is recorded.
    pub fn set_source_from_file(
        &mut self,
        stage: ShaderStage,
        path: impl AsRef<Path>,
    ) -> Result<(), ShaderError> {
        let path = path.as_ref();
        let read = fs::read(path)
            .map_err(|err| err.to_string())
            .and_then(|bytes| String::from_utf8(bytes).map_err(|err| err.to_string()));

        match read {
            Ok(source) => {
                log::debug!("loaded {stage} shader from {}", path.display());
                self.set_source(stage, source);
                Ok(())
            }
            Err(message) => {
                let err = ShaderError::Io {
                    path: path.to_path_buf(),
                    message,
                };
                log::error!("{err}");
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    #[inline]
    pub fn set_vertex_source_from_file(&mut self, path: impl AsRef<Path>) -> Result<(), ShaderError> {
        self.set_source_from_file(ShaderStage::Vertex, path)
    }
    #[inline]
    pub fn set_fragment_source_from_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<(), ShaderError> {
        self.set_source_from_file(ShaderStage::Fragment, path)
    }

    pub fn log_vertex_source(&self) {
        log::debug!("vertex source:\n{}", self.vertex_source);
    }

    pub fn log_fragment_source(&self) {
        log::debug!("fragment source:\n{}", self.fragment_source);
    }

    /// Compiles both stages and links them. A no-op once linked.
    pub fn build(&mut self) -> Result<(), ShaderError> {
        if self.linked {
            return Ok(());
        }
        if let Some(err) = &self.last_error {
            return Err(ShaderError::StaleError(Box::new(err.clone())));
        }

        let result = self.build_internal();
        if let Err(err) = &result {
            log::error!("{err}");
            self.last_error = Some(err.clone());
        }
        result
    }

    fn build_internal(&mut self) -> Result<(), ShaderError> {
        if let Some(stage) = ShaderStage::ALL
            .into_iter()
            .find(|&stage| self.source(stage).is_empty())
        {
            return Err(ShaderError::EmptySource(stage));
        }

        self.compile_stage(ShaderStage::Vertex)?;
        self.compile_stage(ShaderStage::Fragment)?;
        self.link()
    }

    fn compile_stage(&mut self, stage: ShaderStage) -> Result<(), ShaderError> {
        let driver = &*self.driver;
        let (source, object) = match stage {
            ShaderStage::Vertex => (&self.vertex_source, &mut self.vertex),
            ShaderStage::Fragment => (&self.fragment_source, &mut self.fragment),
        };
        // left over from an earlier failed build
        object.release(driver);

        let handle = driver.create_shader(stage).ok_or_else(|| ShaderError::Compile {
            stage,
            log: "driver could not create a shader object".to_string(),
        })?;

        if let Err(info_log) = driver.compile_shader(handle, source) {
            driver.delete_shader(handle);
            log::error!("{stage} shader compilation failed:");
            for line in info_log.lines() {
                log::error!(" | {line}");
            }
            return Err(ShaderError::Compile {
                stage,
                log: info_log,
            });
        }

        object.hold(handle);
        log::trace!("compiled {stage} shader {handle}");
        Ok(())
    }

    fn link(&mut self) -> Result<(), ShaderError> {
        let driver = &*self.driver;
        let vertex = self.vertex.get().unwrap_unreach();
        let fragment = self.fragment.get().unwrap_unreach();

        self.program.release(driver);
        let program = driver
            .create_program()
            .ok_or_else(|| ShaderError::Link("driver could not create a program object".into()))?;
        self.program.hold(program);

        driver.attach_shader(program, vertex);
        driver.attach_shader(program, fragment);

        let checked = driver
            .link_program(program)
            .map_err(ShaderError::Link)
            .and_then(|()| driver.validate_program(program).map_err(ShaderError::Validate));
        if let Err(err) = checked {
            self.program.release(driver);
            return Err(err);
        }

        self.linked = true;
        log::debug!("linked shader program {program}");
        Ok(())
    }

    pub fn program_handle(&self) -> Result<NonZeroU32, ShaderError> {
        match self.program.get() {
            Some(handle) if self.linked => Ok(handle),
            _ => Err(ShaderError::NotReady),
        }
    }

    pub fn use_self(&self) -> Result<(), ShaderError> {
        let program = self.program_handle()?;
        self.driver.use_program(program);
        Ok(())
    }

    /// Releases the program, then both stages, and resets to unbuilt.
    /// Also clears [`last_error`](Self::last_error). Safe to repeat.
    pub fn teardown(&mut self) {
        let driver = &*self.driver;
        let program = self.program.release(driver);
        let vertex = self.vertex.release(driver);
        let fragment = self.fragment.release(driver);

        self.linked = false;
        self.last_error = None;
        if program || vertex || fragment {
            log::debug!("shader program torn down");
        }
    }

    pub fn is_ready(&self) -> bool {
        self.linked
    }

    pub fn compiled(&self) -> Compiled {
        match (self.vertex.is_live(), self.fragment.is_live()) {
            (true, true) => Compiled::Fully,
            (false, false) => Compiled::None,
            _ => Compiled::Partially,
        }
    }

    pub fn last_error(&self) -> Option<&ShaderError> {
        self.last_error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        self.teardown();
    }
}
