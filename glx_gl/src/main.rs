use std::{cell::RefCell, path::PathBuf, rc::Rc};

use clap::Parser;
use color_eyre::{eyre::OptionExt, Result as EyreResult};
use glx_gl::{gl, info::DriverInfo, vertex::VertexArrayObject, HostConfig, RenderHost};
use glx_utils::{init_logging, LoggingConfig};

const VERTEX_SOURCE: &str = r#"#version 410 core
const vec2 corners[3] = vec2[3](vec2(-0.6, -0.5), vec2(0.6, -0.5), vec2(0.0, 0.6));
out vec2 uv;
void main() {
    uv = corners[gl_VertexID] * 0.5 + 0.5;
    gl_Position = vec4(corners[gl_VertexID], 0.0, 1.0);
}
"#;

const FRAGMENT_SOURCE: &str = r#"#version 410 core
in vec2 uv;
out vec4 color;
void main() {
    color = vec4(uv, 1.0 - uv.x, 1.0);
}
"#;

/// Opens a window and draws one triangle until closed.
#[derive(Parser, Debug)]
struct Args {
    /// JSON host config; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Vertex shader source file
    #[arg(long)]
    vertex: Option<PathBuf>,
    /// Fragment shader source file
    #[arg(long)]
    fragment: Option<PathBuf>,
    /// Close after this many frames
    #[arg(long)]
    frames: Option<u64>,
    /// env_logger filter, overrides RUST_LOG
    #[arg(long)]
    log: Option<String>,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..LoggingConfig::default()
    });

    let mut host = RenderHost::new()?;
    if let Some(path) = &args.config {
        host.set_config(HostConfig::from_json_file(path)?);
    } else {
        host.set_title("glx triangle");
    }

    let shader = host.shader_tool();
    {
        let mut shader = shader.borrow_mut();
        match &args.vertex {
            Some(path) => shader.set_vertex_source_from_file(path)?,
            None => shader.set_vertex_source(VERTEX_SOURCE),
        }
        match &args.fragment {
            Some(path) => shader.set_fragment_source_from_file(path)?,
            None => shader.set_fragment_source(FRAGMENT_SOURCE),
        }
    }

    let vertex_array: Rc<RefCell<Option<VertexArrayObject>>> = Rc::default();

    host.queue_post_launch("driver info", || {
        DriverInfo::query()
            .ok_or_eyre("entry points not loaded")?
            .log();
        Ok(())
    });
    host.queue_post_launch("build shader", {
        let shader = shader.clone();
        let vertex_array = vertex_array.clone();
        move || {
            let vao = VertexArrayObject::new().ok_or_eyre("vertex array creation failed")?;
            vao.use_self();
            *vertex_array.borrow_mut() = Some(vao);
            shader.borrow_mut().build()?;
            Ok(())
        }
    });

    let mut frame = 0u64;
    host.queue_on_tick("clear", move || {
        let pulse = (frame as f32 * 0.01).sin() * 0.5 + 0.5;
        frame += 1;
        unsafe {
            gl::ClearColor(0.05, 0.05 + 0.1 * pulse, 0.1, 1.0);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
        Ok(())
    });
    host.queue_on_tick("draw", {
        let shader = shader.clone();
        let vertex_array = vertex_array.clone();
        move || {
            shader.borrow().use_self()?;
            vertex_array
                .borrow()
                .as_ref()
                .ok_or_eyre("no vertex array")?
                .draw_triangles(3);
            Ok(())
        }
    });
    if let Some(limit) = args.frames {
        let handle = host.handle();
        let mut frames = 0u64;
        host.queue_on_tick("frame limit", move || {
            frames += 1;
            if frames >= limit {
                handle.request_close();
            }
            Ok(())
        });
    }

    host.log_info();
    host.launch()?;

    if let Some(vao) = vertex_array.borrow_mut().take() {
        vao.delete();
    }
    host.destroy();
    Ok(())
}
