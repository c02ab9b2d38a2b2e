use glam::Mat4;
use serde::Serialize;

/// Name of a host-owned resource (mesh, texture, or program).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceId(pub &'static str);

impl ResourceId {
    pub fn name(&self) -> &'static str {
        self.0
    }
}

/// Pipeline stage a program binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramStage {
    Vertex,
    Fragment,
    /// Blend/depth state applied to fragment output.
    Store,
}

/// Fixed-function lighting parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Lighting {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub shininess: f32,
}

/// A vertex of a textured quad: position plus texture coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl QuadVertex {
    pub fn new(x: f32, y: f32, z: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y, z],
            uv: [u, v],
        }
    }
}

/// One host drawing primitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    BindProgram {
        stage: ProgramStage,
        program: ResourceId,
    },
    BindTexture {
        program: ResourceId,
        slot: u32,
        texture: ResourceId,
    },
    SetColor {
        rgba: [f32; 4],
    },
    SetLighting(Lighting),
    LoadModelMatrix {
        matrix: Mat4,
    },
    LoadTextureMatrix {
        matrix: Mat4,
    },
    /// Vertex data for the mesh changed and must be re-uploaded.
    UploadMesh {
        mesh: ResourceId,
    },
    DrawMesh {
        mesh: ResourceId,
    },
    DrawMeshRange {
        mesh: ResourceId,
        start: u32,
        count: u32,
    },
    DrawQuad {
        corners: [[f32; 3]; 4],
    },
    DrawTexturedQuad {
        vertices: [QuadVertex; 4],
    },
    DrawLine {
        from: [f32; 3],
        to: [f32; 3],
    },
}

/// Commands produced by one effect step, in submission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderCommands {
    commands: Vec<DrawCommand>,
    /// False asks the host to stop scheduling frames.
    pub keep_running: bool,
}

impl RenderCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Vec::with_capacity(capacity),
            keep_running: true,
        }
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn bind_program(&mut self, stage: ProgramStage, program: ResourceId) {
        self.push(DrawCommand::BindProgram { stage, program });
    }

    pub fn bind_texture(&mut self, program: ResourceId, slot: u32, texture: ResourceId) {
        self.push(DrawCommand::BindTexture {
            program,
            slot,
            texture,
        });
    }

    pub fn load_model_matrix(&mut self, matrix: Mat4) {
        self.push(DrawCommand::LoadModelMatrix { matrix });
    }

    pub fn load_texture_matrix(&mut self, matrix: Mat4) {
        self.push(DrawCommand::LoadTextureMatrix { matrix });
    }

    pub fn draw_mesh(&mut self, mesh: ResourceId) {
        self.push(DrawCommand::DrawMesh { mesh });
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter()
    }

    /// Number of commands that draw geometry (meshes, quads, lines).
    pub fn draw_calls(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| {
                matches!(
                    command,
                    DrawCommand::DrawMesh { .. }
                        | DrawCommand::DrawMeshRange { .. }
                        | DrawCommand::DrawQuad { .. }
                        | DrawCommand::DrawTexturedQuad { .. }
                        | DrawCommand::DrawLine { .. }
                )
            })
            .count()
    }
}

impl Default for RenderCommands {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: true,
        }
    }
}

impl<'a> IntoIterator for &'a RenderCommands {
    type Item = &'a DrawCommand;
    type IntoIter = std::slice::Iter<'a, DrawCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
