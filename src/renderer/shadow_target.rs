use gl::types::*;
use std::ptr;

/// Depth-only render target: a layered depth texture for cascades, or a single
/// depth texture for a perspective shadow.
pub struct ShadowTarget {
    fbo: GLuint,
    texture: GLuint,
    target: GLenum,
    width: u32,
    height: u32,
    layers: u32,
}

impl ShadowTarget {
    /// One depth layer per cascade in a `TEXTURE_2D_ARRAY`.
    pub fn cascades(width: u32, height: u32, layers: u32) -> Result<Self, String> {
        let layers = layers.max(1);
        let mut texture = 0;
        unsafe {
            gl::GenTextures(1, &mut texture);
            gl::BindTexture(gl::TEXTURE_2D_ARRAY, texture);
            gl::TexImage3D(
                gl::TEXTURE_2D_ARRAY,
                0,
                gl::DEPTH_COMPONENT32F as GLint,
                width as GLsizei,
                height as GLsizei,
                layers as GLsizei,
                0,
                gl::DEPTH_COMPONENT,
                gl::FLOAT,
                ptr::null(),
            );
            set_depth_sampling(gl::TEXTURE_2D_ARRAY);
            gl::BindTexture(gl::TEXTURE_2D_ARRAY, 0);
        }
        Self::with_texture(texture, gl::TEXTURE_2D_ARRAY, width, height, layers)
    }

    pub fn single(width: u32, height: u32) -> Result<Self, String> {
        let mut texture = 0;
        unsafe {
            gl::GenTextures(1, &mut texture);
            gl::BindTexture(gl::TEXTURE_2D, texture);
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::DEPTH_COMPONENT32F as GLint,
                width as GLsizei,
                height as GLsizei,
                0,
                gl::DEPTH_COMPONENT,
                gl::FLOAT,
                ptr::null(),
            );
            set_depth_sampling(gl::TEXTURE_2D);
            gl::BindTexture(gl::TEXTURE_2D, 0);
        }
        Self::with_texture(texture, gl::TEXTURE_2D, width, height, 1)
    }

    fn with_texture(texture: GLuint, target: GLenum, width: u32, height: u32, layers: u32) -> Result<Self, String> {
        let mut fbo = 0;
        unsafe {
            gl::GenFramebuffers(1, &mut fbo);
            gl::BindFramebuffer(gl::FRAMEBUFFER, fbo);
            if target == gl::TEXTURE_2D_ARRAY {
                gl::FramebufferTextureLayer(gl::FRAMEBUFFER, gl::DEPTH_ATTACHMENT, texture, 0, 0);
            } else {
                gl::FramebufferTexture2D(gl::FRAMEBUFFER, gl::DEPTH_ATTACHMENT, gl::TEXTURE_2D, texture, 0);
            }
            gl::DrawBuffer(gl::NONE);
            gl::ReadBuffer(gl::NONE);
            let status = gl::CheckFramebufferStatus(gl::FRAMEBUFFER);
            gl::BindFramebuffer(gl::FRAMEBUFFER, 0);

            let shadow = Self {
                fbo,
                texture,
                target,
                width,
                height,
                layers,
            };
            if status != gl::FRAMEBUFFER_COMPLETE {
                return Err(format!("shadow framebuffer incomplete: 0x{status:x}"));
            }
            tracing::debug!(width, height, layers, "shadow target created");
            Ok(shadow)
        }
    }

    pub fn layers(&self) -> u32 {
        self.layers
    }

    /// Binds the framebuffer with `layer` attached and clears its depth.
    pub fn begin_layer(&self, layer: u32) {
        unsafe {
            gl::BindFramebuffer(gl::FRAMEBUFFER, self.fbo);
            if self.target == gl::TEXTURE_2D_ARRAY {
                let layer = layer.min(self.layers - 1);
                gl::FramebufferTextureLayer(gl::FRAMEBUFFER, gl::DEPTH_ATTACHMENT, self.texture, 0, layer as GLint);
            }
            gl::Viewport(0, 0, self.width as GLsizei, self.height as GLsizei);
            gl::Clear(gl::DEPTH_BUFFER_BIT);
        }
    }

    pub fn bind_texture(&self, unit: u32) {
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0 + unit);
            gl::BindTexture(self.target, self.texture);
        }
    }
}

impl Drop for ShadowTarget {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteFramebuffers(1, &self.fbo);
            gl::DeleteTextures(1, &self.texture);
        }
    }
}

unsafe fn set_depth_sampling(target: GLenum) {
    gl::TexParameteri(target, gl::TEXTURE_MIN_FILTER, gl::NEAREST as GLint);
    gl::TexParameteri(target, gl::TEXTURE_MAG_FILTER, gl::NEAREST as GLint);
    gl::TexParameteri(target, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_BORDER as GLint);
    gl::TexParameteri(target, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_BORDER as GLint);
    // Outside the map counts as fully lit.
    let border = [1.0f32; 4];
    gl::TexParameterfv(target, gl::TEXTURE_BORDER_COLOR, border.as_ptr());
}

/// A std140 uniform buffer bound to a fixed binding point.
pub struct UniformBuffer {
    id: GLuint,
    size: usize,
}

impl UniformBuffer {
    pub fn new(binding: u32, size: usize) -> Self {
        let mut id = 0;
        unsafe {
            gl::GenBuffers(1, &mut id);
            gl::BindBuffer(gl::UNIFORM_BUFFER, id);
            gl::BufferData(gl::UNIFORM_BUFFER, size as GLsizeiptr, ptr::null(), gl::DYNAMIC_DRAW);
            gl::BindBufferBase(gl::UNIFORM_BUFFER, binding, id);
            gl::BindBuffer(gl::UNIFORM_BUFFER, 0);
        }
        Self { id, size }
    }

    pub fn write(&self, bytes: &[u8]) {
        if bytes.len() > self.size {
            tracing::warn!(len = bytes.len(), size = self.size, "uniform buffer write truncated");
        }
        let len = bytes.len().min(self.size);
        unsafe {
            gl::BindBuffer(gl::UNIFORM_BUFFER, self.id);
            gl::BufferSubData(gl::UNIFORM_BUFFER, 0, len as GLsizeiptr, bytes.as_ptr() as *const _);
            gl::BindBuffer(gl::UNIFORM_BUFFER, 0);
        }
    }
}

impl Drop for UniformBuffer {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteBuffers(1, &self.id);
        }
    }
}
