//! WGPU-based rendering engine for the card wall
//!
//! Owns the surface, device and every GPU resource the cards need: the global
//! camera uniform, the instanced quad batch and a texture array holding one
//! image per card. Frames are one alpha-blended instanced draw plus an optional
//! UI overlay pass.

use cgmath::Vector3;
use log::{debug, info, warn};
use wgpu::TextureFormat;

use super::{
    card_batch::{CardBatch, CardInstance},
    card_renderer::{CardRenderer, FrameOutcome, RenderError},
    pipeline::PipelineConfig,
    vertex::CardVertex,
};
use crate::{
    card::Card,
    gfx::{
        camera::CameraUniform,
        resources::{update_global_ubo, DepthTexture, GlobalBindings, GlobalUBO, TextureResource},
    },
    images::ImageData,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder},
        binding_types,
    },
};

/// Edge length in pixels of each card image layer
pub const CARD_TEXTURE_SIZE: u32 = 128;

const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_texture: DepthTexture,
    format: TextureFormat,
    pipeline: wgpu::RenderPipeline,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    card_images: TextureResource,
    card_images_bind_group: wgpu::BindGroup,
    image_layers: u32,
    batch: CardBatch,
}

impl RenderEngine {
    /// Creates a render engine for `window`, sized for up to `max_cards` cards.
    ///
    /// Cards beyond the device's texture array layer limit render with their
    /// tint only.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        max_cards: usize,
    ) -> Result<RenderEngine, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = DepthTexture::new(&device, &config, "depth_texture");

        let global_ubo = GlobalUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo);

        let layer_limit = device.limits().max_texture_array_layers;
        let image_layers = (max_cards as u32).clamp(1, layer_limit);
        if (max_cards as u32) > layer_limit {
            warn!(
                "{} cards requested but only {} image layers available, the rest show their tint only",
                max_cards, layer_limit
            );
        }
        let card_images = TextureResource::create_card_array(
            &device,
            CARD_TEXTURE_SIZE,
            image_layers,
            "Card Images",
        );

        let card_images_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d_array())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(&device, "Card Images Bind Group Layout");
        let card_images_bind_group = BindGroupBuilder::new(&card_images_layout)
            .texture(&card_images.view)
            .sampler(&card_images.sampler)
            .create(&device, "Card Images Bind Group");

        // Cards are seen from both sides while they spin, so no culling
        let pipeline = PipelineConfig::new("Cards", include_str!("card.wgsl"), format)
            .with_bind_group_layouts(vec![
                global_bindings.bind_group_layout(),
                &card_images_layout.layout,
            ])
            .with_vertex_buffers(vec![CardVertex::desc(), CardInstance::vertex_buffer_layout()])
            .with_cull_mode(None)
            .with_blend(Some(wgpu::BlendState::ALPHA_BLENDING))
            .with_depth(DepthTexture::FORMAT)
            .build(&device);

        let batch = CardBatch::new(&device, max_cards);

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            depth_texture,
            format,
            pipeline,
            global_ubo,
            global_bindings,
            card_images,
            card_images_bind_group,
            image_layers,
            batch,
        })
    }

    /// Uploads a decoded image into card `index`'s texture layer.
    ///
    /// Returns false if the image does not match the layer size or the card
    /// has no layer.
    pub fn upload_card_image(&mut self, index: usize, image: &ImageData) -> bool {
        if index as u32 >= self.image_layers {
            return false;
        }
        if image.width != CARD_TEXTURE_SIZE || image.height != CARD_TEXTURE_SIZE {
            warn!(
                "Card {} image is {}x{}, expected {}x{}",
                index, image.width, image.height, CARD_TEXTURE_SIZE, CARD_TEXTURE_SIZE
            );
            return false;
        }
        self.card_images.write_layer(
            &self.queue,
            index as u32,
            &image.rgba,
            image.width,
            image.height,
        );
        self.batch.mark_image_ready(index);
        true
    }

    /// Renders the cards, then lets `ui_callback` record an overlay pass.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped, as
    /// is a frame whose acquisition timed out.
    pub fn render_frame<F>(
        &mut self,
        cards: &[Card],
        camera: &CameraUniform,
        ui_callback: Option<F>,
    ) -> Result<FrameOutcome, RenderError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(FrameOutcome::Skipped);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Timed out acquiring frame, skipping");
                return Ok(FrameOutcome::Skipped);
            }
            Err(e) => return Err(e.into()),
        };

        update_global_ubo(&mut self.global_ubo, &self.queue, *camera);
        let eye: Vector3<f32> = camera.eye();
        self.batch.update_instances(&self.queue, cards, eye);

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Card Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);
            render_pass.set_bind_group(1, &self.card_images_bind_group, &[]);
            self.batch.draw(&mut render_pass);
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(FrameOutcome::Presented)
    }

    /// Convenience method for rendering with a UI overlay
    pub fn render_frame_with_ui<F>(
        &mut self,
        cards: &[Card],
        camera: &CameraUniform,
        ui_callback: F,
    ) -> Result<FrameOutcome, RenderError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        self.render_frame(cards, camera, Some(ui_callback))
    }

    /// Resizes the surface and recreates the depth buffer; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture = DepthTexture::new(&self.device, &self.config, "depth_texture");
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Used for creating compatible render targets and UI systems.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

impl CardRenderer for RenderEngine {
    fn mount(&mut self, index: usize, _card: &Card) {
        self.batch.mount(index);
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.resize(width, height);
    }

    fn render(
        &mut self,
        cards: &[Card],
        camera: &CameraUniform,
    ) -> Result<FrameOutcome, RenderError> {
        self.render_frame(
            cards,
            camera,
            None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
        )
    }
}
