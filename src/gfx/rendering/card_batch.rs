//! Instanced card rendering
//!
//! Every card is the same unit quad, so the whole wall goes out in a single
//! instanced draw. Per-instance data carries the card's model matrix, its
//! tint and which layer of the card image array to sample.

use bytemuck::{Pod, Zeroable};
use cgmath::{InnerSpace, Vector3};
use wgpu::util::DeviceExt;
use wgpu::{Buffer, Device, Queue, RenderPass};

use super::vertex::CardVertex;
use crate::{card::Card, wgpu_utils::InstanceBuffer};

/// Instance data for a single card
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CardInstance {
    /// Model matrix, column-major
    pub transform: [[f32; 4]; 4],
    /// sRGB tint with alpha
    pub tint: [f32; 4],
    /// x: image layer, y: 1.0 once the image is uploaded
    pub image: [f32; 4],
}

impl CardInstance {
    pub fn from_card(card: &Card, has_image: bool) -> Self {
        Self {
            transform: card.model_matrix().into(),
            tint: card.tint,
            image: [card.item as f32, if has_image { 1.0 } else { 0.0 }, 0.0, 0.0],
        }
    }

    /// Get vertex buffer layout for instance data
    pub fn vertex_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CardInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // Transform matrix (4 vec4s), after position(0) and uv(1)
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // Tint (vec4)
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // Image layer + flag (vec4)
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 20]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Unit quad in the XY plane facing +Z, centered at the origin
pub struct QuadMesh {
    pub vertex_buffer: Buffer,
    pub index_buffer: Buffer,
    pub index_count: u32,
}

impl QuadMesh {
    pub const VERTICES: [CardVertex; 4] = [
        CardVertex { position: [-0.5, -0.5, 0.0], uv: [0.0, 1.0] },
        CardVertex { position: [ 0.5, -0.5, 0.0], uv: [1.0, 1.0] },
        CardVertex { position: [ 0.5,  0.5, 0.0], uv: [1.0, 0.0] },
        CardVertex { position: [-0.5,  0.5, 0.0], uv: [0.0, 0.0] },
    ];

    pub const INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

    pub fn new(device: &Device) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Card Quad Vertex Buffer"),
            contents: bytemuck::cast_slice(&Self::VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Card Quad Index Buffer"),
            contents: bytemuck::cast_slice(&Self::INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: Self::INDICES.len() as u32,
        }
    }
}

/// Card indices sorted far-to-near from `eye`, so blended cards composite correctly
pub fn depth_order(cards: &[Card], eye: Vector3<f32>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..cards.len()).collect();
    order.sort_by(|&a, &b| {
        let da = (cards[a].position - eye).magnitude2();
        let db = (cards[b].position - eye).magnitude2();
        db.total_cmp(&da)
    });
    order
}

/// Instance buffer plus the shared quad for drawing every card at once
pub struct CardBatch {
    quad: QuadMesh,
    instances: InstanceBuffer<CardInstance>,
    /// Per card: has its image been uploaded
    image_ready: Vec<bool>,
    scratch: Vec<CardInstance>,
}

impl CardBatch {
    pub fn new(device: &Device, max_cards: usize) -> Self {
        Self {
            quad: QuadMesh::new(device),
            instances: InstanceBuffer::new(device, max_cards),
            image_ready: vec![false; max_cards],
            scratch: Vec::with_capacity(max_cards),
        }
    }

    /// Registers card `index`; its image is considered missing until marked ready
    pub fn mount(&mut self, index: usize) {
        if index >= self.image_ready.len() {
            self.image_ready.resize(index + 1, false);
        }
        self.image_ready[index] = false;
    }

    pub fn mark_image_ready(&mut self, index: usize) {
        if let Some(ready) = self.image_ready.get_mut(index) {
            *ready = true;
        }
    }

    /// Rebuilds the instance buffer, back-to-front as seen from `eye`
    pub fn update_instances(&mut self, queue: &Queue, cards: &[Card], eye: Vector3<f32>) {
        self.scratch.clear();
        for index in depth_order(cards, eye) {
            let card = &cards[index];
            let has_image = self.image_ready.get(card.item).copied().unwrap_or(false);
            self.scratch.push(CardInstance::from_card(card, has_image));
        }
        self.instances.update_data(queue, &self.scratch);
    }

    pub fn draw(&self, render_pass: &mut RenderPass<'_>) {
        if self.instances.is_empty() {
            return;
        }
        render_pass.set_vertex_buffer(0, self.quad.vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.instances.buffer().slice(..));
        render_pass.set_index_buffer(self.quad.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.quad.index_count, 0, 0..self.instances.len() as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_order_is_far_to_near() {
        let cards = vec![
            Card::new(0, Vector3::new(0.0, 0.0, 100.0)),
            Card::new(1, Vector3::new(0.0, 0.0, -900.0)),
            Card::new(2, Vector3::new(0.0, 0.0, 0.0)),
        ];
        let order = depth_order(&cards, Vector3::new(0.0, 0.0, 3000.0));
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_instance_carries_layer_and_flag() {
        let mut card = Card::new(7, Vector3::new(1.0, 2.0, 3.0));
        card.tint = [0.0, 0.5, 0.5, 0.3];

        let instance = CardInstance::from_card(&card, false);
        assert_eq!(instance.image, [7.0, 0.0, 0.0, 0.0]);
        assert_eq!(instance.tint, card.tint);
        assert_eq!(instance.transform[3], [1.0, 2.0, 3.0, 1.0]);

        assert_eq!(CardInstance::from_card(&card, true).image[1], 1.0);
    }

    #[test]
    fn test_instance_layout_matches_struct() {
        let layout = CardInstance::vertex_buffer_layout();
        assert_eq!(layout.array_stride as usize, std::mem::size_of::<CardInstance>());
        assert_eq!(std::mem::size_of::<CardInstance>(), 24 * 4);
    }

    #[test]
    fn test_quad_faces_positive_z() {
        let [a, b, c, ..] = QuadMesh::VERTICES;
        let ab = Vector3::from(b.position) - Vector3::from(a.position);
        let ac = Vector3::from(c.position) - Vector3::from(a.position);
        assert!(ab.cross(ac).z > 0.0);
    }
}
