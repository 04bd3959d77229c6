use wgpu::util::DeviceExt;

use super::Handle;
use crate::renderer::Vertex;

/// Attribute layout recorded for an uploaded vertex buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexArray {
    pub array_stride: wgpu::BufferAddress,
    pub attributes: Vec<wgpu::VertexAttribute>,
}

impl VertexArray {
    pub fn for_vertex() -> Self {
        let layout = Vertex::layout();
        Self {
            array_stride: layout.array_stride,
            attributes: layout.attributes.to_vec(),
        }
    }
}

#[derive(Debug)]
pub struct VertexBuffer {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl VertexBuffer {
    pub fn from_vertices(device: &wgpu::Device, label: &str, vertices: &[Vertex]) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            buffer,
            vertex_count: vertices.len() as u32,
        }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}

/// Backend handles for one uploaded mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelData {
    pub vertex_array: Handle<VertexArray>,
    pub vertex_buffer: Handle<VertexBuffer>,
}

impl ModelData {
    pub fn new(vertex_array: Handle<VertexArray>, vertex_buffer: Handle<VertexBuffer>) -> Self {
        Self {
            vertex_array,
            vertex_buffer,
        }
    }
}

/// Anything that can turn a vertex list into backend buffers.
pub trait VertexUploader {
    fn upload_vertices(&mut self, label: &str, vertices: &[Vertex]) -> ModelData;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_array_matches_vertex_layout() {
        let array = VertexArray::for_vertex();
        assert_eq!(array.array_stride, 44);
        let locations: Vec<u32> = array.attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, vec![0, 1, 2, 3]);
    }
}
