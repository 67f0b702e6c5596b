use gl::types::*;
use glam::{Mat4, Vec3};
use std::collections::HashMap;
use std::ffi::CString;
use std::ptr;

use umbra::{ProgramId, UniformLocation, UniformProgram, UniformValue};

pub struct ShaderProgram {
    pub id: GLuint,
    uniform_cache: HashMap<String, Option<UniformLocation>>,
}

impl ShaderProgram {
    pub fn from_sources(vert_src: &str, frag_src: &str) -> Result<Self, String> {
        unsafe {
            let vert = compile_shader(vert_src, gl::VERTEX_SHADER)?;
            let frag = match compile_shader(frag_src, gl::FRAGMENT_SHADER) {
                Ok(frag) => frag,
                Err(e) => {
                    gl::DeleteShader(vert);
                    return Err(e);
                }
            };

            let program = gl::CreateProgram();
            gl::AttachShader(program, vert);
            gl::AttachShader(program, frag);
            gl::LinkProgram(program);

            let mut success = 0;
            gl::GetProgramiv(program, gl::LINK_STATUS, &mut success);
            if success == 0 {
                let mut len = 0;
                gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
                let mut buf = vec![0u8; len.max(1) as usize];
                gl::GetProgramInfoLog(program, len, ptr::null_mut(), buf.as_mut_ptr() as *mut _);
                buf.pop(); // remove null terminator
                let msg = String::from_utf8_lossy(&buf).to_string();
                gl::DeleteProgram(program);
                gl::DeleteShader(vert);
                gl::DeleteShader(frag);
                return Err(format!("Shader link error: {msg}"));
            }

            gl::DeleteShader(vert);
            gl::DeleteShader(frag);

            tracing::debug!(program, "shader program linked");
            Ok(Self {
                id: program,
                uniform_cache: HashMap::new(),
            })
        }
    }

    /// Points the named std140 block at a uniform buffer binding index.
    pub fn bind_uniform_block(&self, name: &str, binding: u32) {
        let Ok(cname) = CString::new(name) else {
            tracing::warn!(block = name, "uniform block name contains a NUL byte");
            return;
        };
        unsafe {
            let index = gl::GetUniformBlockIndex(self.id, cname.as_ptr());
            if index == gl::INVALID_INDEX {
                tracing::warn!(block = name, program = self.id, "uniform block not found");
                return;
            }
            gl::UniformBlockBinding(self.id, index, binding);
        }
    }

    pub fn set_mat4(&mut self, name: &str, mat: &Mat4) {
        self.set_uniform_by_name(name, UniformValue::Mat4(*mat));
    }

    pub fn set_vec3(&mut self, name: &str, v: Vec3) {
        self.set_uniform_by_name(name, UniformValue::Vec3(v));
    }

    pub fn set_int(&mut self, name: &str, val: i32) {
        self.set_uniform_by_name(name, UniformValue::Int(val));
    }
}

impl UniformProgram for ShaderProgram {
    fn id(&self) -> ProgramId {
        ProgramId(self.id)
    }

    fn bind(&self) {
        unsafe {
            gl::UseProgram(self.id);
        }
    }

    fn uniform_location(&mut self, name: &str) -> Option<UniformLocation> {
        if let Some(&loc) = self.uniform_cache.get(name) {
            return loc;
        }
        let Ok(cname) = CString::new(name) else {
            tracing::warn!(uniform = name, "uniform name contains a NUL byte");
            return None;
        };
        let raw = unsafe { gl::GetUniformLocation(self.id, cname.as_ptr()) };
        let loc = (raw >= 0).then_some(UniformLocation(raw));
        self.uniform_cache.insert(name.to_string(), loc);
        loc
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let loc = location.0;
        unsafe {
            match value {
                UniformValue::Bool(v) => gl::Uniform1i(loc, v as GLint),
                UniformValue::Int(v) => gl::Uniform1i(loc, v),
                UniformValue::Float(v) => gl::Uniform1f(loc, v),
                UniformValue::Vec2(v) => gl::Uniform2f(loc, v.x, v.y),
                UniformValue::Vec3(v) => gl::Uniform3f(loc, v.x, v.y, v.z),
                UniformValue::Vec4(v) => gl::Uniform4f(loc, v.x, v.y, v.z, v.w),
                UniformValue::Mat3(m) => {
                    gl::UniformMatrix3fv(loc, 1, gl::FALSE, m.to_cols_array().as_ptr())
                }
                UniformValue::Mat4(m) => {
                    gl::UniformMatrix4fv(loc, 1, gl::FALSE, m.to_cols_array().as_ptr())
                }
            }
        }
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteProgram(self.id);
        }
    }
}

unsafe fn compile_shader(src: &str, shader_type: GLenum) -> Result<GLuint, String> {
    let c_src = CString::new(src).map_err(|e| format!("shader source contains NUL: {e}"))?;
    let shader = gl::CreateShader(shader_type);
    gl::ShaderSource(shader, 1, &c_src.as_ptr(), ptr::null());
    gl::CompileShader(shader);

    let mut success = 0;
    gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut success);
    if success == 0 {
        let mut len = 0;
        gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
        let mut buf = vec![0u8; len.max(1) as usize];
        gl::GetShaderInfoLog(shader, len, ptr::null_mut(), buf.as_mut_ptr() as *mut _);
        buf.pop();
        let kind = if shader_type == gl::VERTEX_SHADER {
            "vertex"
        } else {
            "fragment"
        };
        let msg = String::from_utf8_lossy(&buf).to_string();
        gl::DeleteShader(shader);
        return Err(format!("{kind} shader compile error: {msg}"));
    }
    Ok(shader)
}
