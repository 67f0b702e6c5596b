use gl::types::*;
use std::f32::consts::PI;
use std::mem;
use std::ptr;

/// Floats per vertex: position then normal.
const VERTEX_STRIDE: usize = 6;

pub struct Mesh {
    vao: GLuint,
    vbo: GLuint,
    ebo: GLuint,
    pub index_count: i32,
}

impl Mesh {
    pub fn draw(&self) {
        unsafe {
            gl::BindVertexArray(self.vao);
            gl::DrawElements(gl::TRIANGLES, self.index_count, gl::UNSIGNED_INT, ptr::null());
            gl::BindVertexArray(0);
        }
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteVertexArrays(1, &self.vao);
            gl::DeleteBuffers(1, &self.vbo);
            gl::DeleteBuffers(1, &self.ebo);
        }
    }
}

/// Interleaved position/normal vertices and triangle indices, before upload.
#[derive(Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }

    fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3]) {
        self.vertices.extend_from_slice(&position);
        self.vertices.extend_from_slice(&normal);
    }

    pub fn upload(&self) -> Mesh {
        upload_mesh(&self.vertices, &self.indices)
    }
}

fn upload_mesh(vertices: &[f32], indices: &[u32]) -> Mesh {
    let mut vao = 0;
    let mut vbo = 0;
    let mut ebo = 0;

    unsafe {
        gl::GenVertexArrays(1, &mut vao);
        gl::GenBuffers(1, &mut vbo);
        gl::GenBuffers(1, &mut ebo);

        gl::BindVertexArray(vao);

        gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
        gl::BufferData(
            gl::ARRAY_BUFFER,
            (vertices.len() * mem::size_of::<f32>()) as GLsizeiptr,
            vertices.as_ptr() as *const _,
            gl::STATIC_DRAW,
        );

        gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, ebo);
        gl::BufferData(
            gl::ELEMENT_ARRAY_BUFFER,
            (indices.len() * mem::size_of::<u32>()) as GLsizeiptr,
            indices.as_ptr() as *const _,
            gl::STATIC_DRAW,
        );

        let stride = (VERTEX_STRIDE * mem::size_of::<f32>()) as GLsizei;

        // position attribute (location 0)
        gl::VertexAttribPointer(0, 3, gl::FLOAT, gl::FALSE, stride, ptr::null());
        gl::EnableVertexAttribArray(0);

        // normal attribute (location 1)
        gl::VertexAttribPointer(
            1,
            3,
            gl::FLOAT,
            gl::FALSE,
            stride,
            (3 * mem::size_of::<f32>()) as *const _,
        );
        gl::EnableVertexAttribArray(1);

        gl::BindVertexArray(0);
    }

    Mesh {
        vao,
        vbo,
        ebo,
        index_count: indices.len() as i32,
    }
}

pub fn sphere_geometry(radius: f32, stacks: u32, sectors: u32) -> MeshData {
    let stacks = stacks.max(2);
    let sectors = sectors.max(3);
    let mut data = MeshData::default();

    for i in 0..=stacks {
        let stack_angle = PI / 2.0 - (i as f32) * PI / (stacks as f32);
        let ring = stack_angle.cos();
        let y = stack_angle.sin();

        for j in 0..=sectors {
            let sector_angle = 2.0 * PI * (j as f32) / (sectors as f32);
            let normal = [ring * sector_angle.cos(), y, ring * sector_angle.sin()];
            data.push_vertex(normal.map(|n| n * radius), normal);
        }
    }

    for i in 0..stacks {
        for j in 0..sectors {
            let first = i * (sectors + 1) + j;
            let second = first + sectors + 1;
            data.indices.extend_from_slice(&[first, second, first + 1, first + 1, second, second + 1]);
        }
    }

    data
}

pub fn box_geometry(width: f32, height: f32, depth: f32) -> MeshData {
    let hw = width * 0.5;
    let hh = height * 0.5;
    let hd = depth * 0.5;

    #[rustfmt::skip]
    let vertices: Vec<f32> = vec![
        // Front face (+Z)
        -hw, -hh,  hd,  0.0,  0.0,  1.0,
         hw, -hh,  hd,  0.0,  0.0,  1.0,
         hw,  hh,  hd,  0.0,  0.0,  1.0,
        -hw,  hh,  hd,  0.0,  0.0,  1.0,
        // Back face (-Z)
         hw, -hh, -hd,  0.0,  0.0, -1.0,
        -hw, -hh, -hd,  0.0,  0.0, -1.0,
        -hw,  hh, -hd,  0.0,  0.0, -1.0,
         hw,  hh, -hd,  0.0,  0.0, -1.0,
        // Top face (+Y)
        -hw,  hh,  hd,  0.0,  1.0,  0.0,
         hw,  hh,  hd,  0.0,  1.0,  0.0,
         hw,  hh, -hd,  0.0,  1.0,  0.0,
        -hw,  hh, -hd,  0.0,  1.0,  0.0,
        // Bottom face (-Y)
        -hw, -hh, -hd,  0.0, -1.0,  0.0,
         hw, -hh, -hd,  0.0, -1.0,  0.0,
         hw, -hh,  hd,  0.0, -1.0,  0.0,
        -hw, -hh,  hd,  0.0, -1.0,  0.0,
        // Right face (+X)
         hw, -hh,  hd,  1.0,  0.0,  0.0,
         hw, -hh, -hd,  1.0,  0.0,  0.0,
         hw,  hh, -hd,  1.0,  0.0,  0.0,
         hw,  hh,  hd,  1.0,  0.0,  0.0,
        // Left face (-X)
        -hw, -hh, -hd, -1.0,  0.0,  0.0,
        -hw, -hh,  hd, -1.0,  0.0,  0.0,
        -hw,  hh,  hd, -1.0,  0.0,  0.0,
        -hw,  hh, -hd, -1.0,  0.0,  0.0,
    ];

    let mut indices = Vec::with_capacity(36);
    for face in 0..6u32 {
        let base = face * 4;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData { vertices, indices }
}

/// A flat `size × size` ground plane subdivided into `tiles × tiles` quads, facing +Y.
///
/// Subdivision keeps per-vertex attributes well behaved under large light frusta.
pub fn plane_geometry(size: f32, tiles: u32) -> MeshData {
    let tiles = tiles.max(1);
    let step = size / tiles as f32;
    let half = size * 0.5;
    let mut data = MeshData::default();

    for row in 0..=tiles {
        for col in 0..=tiles {
            let x = -half + col as f32 * step;
            let z = -half + row as f32 * step;
            data.push_vertex([x, 0.0, z], [0.0, 1.0, 0.0]);
        }
    }

    let stride = tiles + 1;
    for row in 0..tiles {
        for col in 0..tiles {
            let a = row * stride + col;
            let b = a + stride;
            data.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    data
}

/// Capped cylinder along Y, centred on the origin. Used as the tube light emitter.
pub fn cylinder_geometry(radius: f32, height: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let half_h = height * 0.5;
    let mut data = MeshData::default();

    // Side: bottom/top ring pairs with outward normals
    for i in 0..=segments {
        let angle = 2.0 * PI * (i as f32) / (segments as f32);
        let (nz, nx) = angle.sin_cos();
        let (x, z) = (radius * nx, radius * nz);
        data.push_vertex([x, -half_h, z], [nx, 0.0, nz]);
        data.push_vertex([x, half_h, z], [nx, 0.0, nz]);
    }
    for i in 0..segments {
        let bot = i * 2;
        data.indices.extend_from_slice(&[bot, bot + 2, bot + 1, bot + 1, bot + 2, bot + 3]);
    }

    for (y, ny) in [(half_h, 1.0), (-half_h, -1.0)] {
        let center = data.vertex_count() as u32;
        data.push_vertex([0.0, y, 0.0], [0.0, ny, 0.0]);
        let ring = data.vertex_count() as u32;
        for i in 0..=segments {
            let angle = 2.0 * PI * (i as f32) / (segments as f32);
            data.push_vertex([radius * angle.cos(), y, radius * angle.sin()], [0.0, ny, 0.0]);
        }
        for i in 0..segments {
            if ny > 0.0 {
                data.indices.extend_from_slice(&[center, ring + i, ring + i + 1]);
            } else {
                data.indices.extend_from_slice(&[center, ring + i + 1, ring + i]);
            }
        }
    }

    data
}

pub fn create_sphere(radius: f32, stacks: u32, sectors: u32) -> Mesh {
    sphere_geometry(radius, stacks, sectors).upload()
}

pub fn create_box(width: f32, height: f32, depth: f32) -> Mesh {
    box_geometry(width, height, depth).upload()
}

pub fn create_plane(size: f32, tiles: u32) -> Mesh {
    plane_geometry(size, tiles).upload()
}

pub fn create_cylinder(radius: f32, height: f32, segments: u32) -> Mesh {
    cylinder_geometry(radius, height, segments).upload()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_valid(data: &MeshData) {
        assert_eq!(data.vertices.len() % VERTEX_STRIDE, 0);
        assert_eq!(data.indices.len() % 3, 0);
        let count = data.vertex_count() as u32;
        assert!(data.indices.iter().all(|&i| i < count));
        for v in data.vertices.chunks(VERTEX_STRIDE) {
            let n = glam::Vec3::new(v[3], v[4], v[5]);
            assert!((n.length() - 1.0).abs() < 1e-4, "normal {n} not unit");
        }
    }

    #[test]
    fn sphere_is_well_formed() {
        let data = sphere_geometry(0.5, 12, 16);
        assert_valid(&data);
        assert_eq!(data.vertex_count(), 13 * 17);
        for v in data.vertices.chunks(VERTEX_STRIDE) {
            let p = glam::Vec3::new(v[0], v[1], v[2]);
            assert!((p.length() - 0.5).abs() < 1e-4);
        }
    }

    #[test]
    fn box_has_six_faces() {
        let data = box_geometry(1.0, 2.0, 3.0);
        assert_valid(&data);
        assert_eq!(data.vertex_count(), 24);
        assert_eq!(data.indices.len(), 36);
    }

    #[test]
    fn plane_spans_its_size() {
        let data = plane_geometry(40.0, 8);
        assert_valid(&data);
        assert_eq!(data.vertex_count(), 81);
        assert_eq!(data.indices.len(), 8 * 8 * 6);
        let xs: Vec<f32> = data.vertices.chunks(VERTEX_STRIDE).map(|v| v[0]).collect();
        let min = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!((min + 20.0).abs() < 1e-4 && (max - 20.0).abs() < 1e-4);
    }

    #[test]
    fn degenerate_subdivisions_are_clamped() {
        assert_valid(&sphere_geometry(1.0, 0, 0));
        assert_valid(&plane_geometry(1.0, 0));
        assert_valid(&cylinder_geometry(1.0, 1.0, 1));
    }

    #[test]
    fn cylinder_is_well_formed() {
        let data = cylinder_geometry(0.1, 2.0, 12);
        assert_valid(&data);
        assert_eq!(data.indices.len(), 12 * 6 + 2 * 12 * 3);
    }
}
