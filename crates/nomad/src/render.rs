//! # Rendering
//!
//! The frame loop talks to the GPU through [`RenderBackend`]. Draw submissions
//! are flat [`DrawCommand`] records, so a backend can forward them as uniform
//! bytes without knowing about the ECS.
//!
//! [`HeadlessBackend`] hands out sequential handles and records what was
//! submitted; it drives the binary when no window is available and is what
//! the tests inspect.

use std::path::Path;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use tracing::debug;

use crate::components::{Renderable, Transform};
use crate::error::{GameError, GameResult};

/// Built-in vertex shader.
pub const DEFAULT_VERTEX_SHADER: &str = include_str!("../shaders/square.vert");
/// Built-in fragment shader.
pub const DEFAULT_FRAGMENT_SHADER: &str = include_str!("../shaders/square.frag");

/// Colour every square is drawn with.
pub const SQUARE_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

/// GPU buffers of one mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct MeshHandle {
    /// Vertex array object.
    pub vao: u32,
    /// Vertex buffer.
    pub vbo: u32,
    /// Element (index) buffer.
    pub ebo: u32,
}

/// A linked shader program.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct ShaderHandle(pub u32);

/// View and projection matrices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// World-to-view.
    pub view: Mat4,
    /// View-to-clip.
    pub projection: Mat4,
}

impl Camera {
    /// Camera at `(0, 0, 3)` looking at the origin, 45° vertical FOV.
    #[must_use]
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            view: Mat4::look_at_rh(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y),
            projection: Mat4::perspective_rh_gl(45f32.to_radians(), aspect_ratio, 0.1, 100.0),
        }
    }
}

/// One indexed draw, with every uniform it needs.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DrawCommand {
    /// Buffers to bind.
    pub mesh: MeshHandle,
    /// Program to use.
    pub shader: ShaderHandle,
    /// Number of indices.
    pub index_count: u32,
    /// Column-major model matrix.
    pub model: [f32; 16],
    /// Column-major view matrix.
    pub view: [f32; 16],
    /// Column-major projection matrix.
    pub projection: [f32; 16],
    /// RGBA colour.
    pub color: [f32; 4],
}

impl DrawCommand {
    /// Builds the draw for one renderable entity.
    #[must_use]
    pub fn new(renderable: &Renderable, transform: &Transform, camera: &Camera) -> Self {
        Self {
            mesh: renderable.mesh,
            shader: renderable.shader,
            index_count: renderable.index_count,
            model: transform.model.to_cols_array(),
            view: camera.view.to_cols_array(),
            projection: camera.projection.to_cols_array(),
            color: SQUARE_COLOR,
        }
    }
}

/// What the frame loop needs from a graphics API.
pub trait RenderBackend {
    /// Uploads a mesh of `xyz` vertex positions and triangle indices.
    ///
    /// # Errors
    ///
    /// [`GameError::Backend`] if the data is malformed or the upload fails.
    fn create_mesh(&mut self, vertices: &[f32], indices: &[u32]) -> GameResult<MeshHandle>;

    /// Releases a mesh. Unknown handles are ignored.
    fn destroy_mesh(&mut self, mesh: MeshHandle);

    /// Compiles and links a program from vertex and fragment sources.
    ///
    /// # Errors
    ///
    /// [`GameError::Backend`] on compile or link failure.
    fn create_shader(&mut self, vertex_src: &str, fragment_src: &str) -> GameResult<ShaderHandle>;

    /// Starts a frame by clearing to `color`.
    fn clear(&mut self, color: [f32; 4]);

    /// Queues one draw.
    fn draw(&mut self, command: &DrawCommand);

    /// Finishes the frame.
    ///
    /// # Errors
    ///
    /// [`GameError::Backend`] if the frame could not be presented.
    fn present(&mut self) -> GameResult<()>;
}

/// Reads a shader stage from `path`, or returns `fallback` when unset.
///
/// # Errors
///
/// [`GameError::Shader`] if the file cannot be read.
pub fn load_shader(path: Option<&Path>, fallback: &str) -> GameResult<String> {
    match path {
        None => Ok(fallback.to_owned()),
        Some(path) => std::fs::read_to_string(path).map_err(|source| GameError::Shader {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Everything submitted between a `clear` and a `present`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    /// Clear colour, if `clear` was called.
    pub clear_color: Option<[f32; 4]>,
    /// Draws in submission order.
    pub draws: Vec<DrawCommand>,
}

/// Backend that renders nothing and remembers the last presented frame.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_handle: u32,
    meshes: Vec<MeshHandle>,
    shaders: Vec<ShaderHandle>,
    current: Frame,
    last: Option<Frame>,
    presented: u64,
    total_draws: u64,
}

impl HeadlessBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    /// Number of frames presented.
    #[must_use]
    pub fn frames_presented(&self) -> u64 {
        self.presented
    }

    /// Draws submitted over the backend's lifetime.
    #[must_use]
    pub fn total_draws(&self) -> u64 {
        self.total_draws
    }

    /// The most recently presented frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<&Frame> {
        self.last.as_ref()
    }

    /// Meshes currently alive.
    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Shader programs created so far.
    #[must_use]
    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_mesh(&mut self, vertices: &[f32], indices: &[u32]) -> GameResult<MeshHandle> {
        if vertices.is_empty() || vertices.len() % 3 != 0 {
            return Err(GameError::Backend(format!(
                "vertex data must be non-empty xyz triples, got {} floats",
                vertices.len()
            )));
        }
        let vertex_count = vertices.len() / 3;
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(GameError::Backend(format!(
                "index {bad} out of range for {vertex_count} vertices"
            )));
        }

        let mesh = MeshHandle {
            vao: self.next(),
            vbo: self.next(),
            ebo: self.next(),
        };
        self.meshes.push(mesh);
        debug!(vao = mesh.vao, vertices = vertex_count, indices = indices.len(), "Mesh created");
        Ok(mesh)
    }

    fn destroy_mesh(&mut self, mesh: MeshHandle) {
        let before = self.meshes.len();
        self.meshes.retain(|&live| live != mesh);
        if self.meshes.len() < before {
            debug!(vao = mesh.vao, "Mesh destroyed");
        }
    }

    fn create_shader(&mut self, vertex_src: &str, fragment_src: &str) -> GameResult<ShaderHandle> {
        if vertex_src.trim().is_empty() || fragment_src.trim().is_empty() {
            return Err(GameError::Backend("empty shader source".to_owned()));
        }
        let shader = ShaderHandle(self.next());
        self.shaders.push(shader);
        debug!(program = shader.0, "Shader linked");
        Ok(shader)
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.current = Frame {
            clear_color: Some(color),
            draws: Vec::new(),
        };
    }

    fn draw(&mut self, command: &DrawCommand) {
        self.current.draws.push(*command);
    }

    fn present(&mut self) -> GameResult<()> {
        self.presented += 1;
        self.total_draws += self.current.draws.len() as u64;
        self.last = Some(std::mem::take(&mut self.current));
        Ok(())
    }
}
