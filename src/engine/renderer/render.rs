use wgpu::util::DeviceExt;

use crate::engine::depth_buffer::DepthBuffer;

pub struct Renderer {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,

    /// Format of the window surface, used as the default color target.
    surface_format: wgpu::TextureFormat,
}

pub trait BufferLayout: Clone {
    fn layout() -> wgpu::VertexBufferLayout<'static>;
}

impl Renderer {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
        }
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn create_vertex_buffer<B>(&self, label: &str, buffer: &[B]) -> wgpu::Buffer
    where
        B: bytemuck::NoUninit,
    {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(buffer),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            })
    }

    pub fn create_index_buffer(&self, label: &str, buffer: &[u32]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(buffer),
                usage: wgpu::BufferUsages::INDEX,
            })
    }

    pub fn create_uniform_buffer<T>(&self, label: &str, value: &T) -> wgpu::Buffer
    where
        T: bytemuck::NoUninit,
    {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::bytes_of(value),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
    }

    #[must_use]
    pub fn build_render_pipeline<'a, B>(
        &'a self,
        label: &'a str,
        module: &'a wgpu::ShaderModule,
    ) -> RenderPipelineBuilder<'a, B>
    where
        B: BufferLayout,
    {
        RenderPipelineBuilder {
            renderer: self,
            label,
            bindings: vec![],
            module,
            primitive_state: None,
            depth_compare: None,
            depth_writes: true,
            blend: None,
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A single object passed around during the rendering of a single frame.
pub struct Frame<'r> {
    /// The encoder to use for creating render passes.
    pub encoder: wgpu::CommandEncoder,

    /// The window surface.
    pub surface: wgpu::TextureView,

    /// The [Renderer] we belong to.
    pub renderer: &'r Renderer,
}

pub struct RenderPipelineBuilder<'a, V>
where
    V: BufferLayout,
{
    renderer: &'a Renderer,

    label: &'a str,

    bindings: Vec<&'a wgpu::BindGroupLayout>,

    module: &'a wgpu::ShaderModule,

    /// A specific primitive state, otherwise use the default.
    primitive_state: Option<wgpu::PrimitiveState>,

    /// Use depth testing in the pipeline.
    depth_compare: Option<wgpu::CompareFunction>,
    depth_writes: bool,

    /// Blend state.
    blend: Option<wgpu::BlendState>,

    _phantom: std::marker::PhantomData<V>,
}

impl<'a, V> RenderPipelineBuilder<'a, V>
where
    V: BufferLayout,
{
    pub fn with_primitive(mut self, primitive_state: wgpu::PrimitiveState) -> Self {
        self.primitive_state = Some(primitive_state);
        self
    }

    pub fn with_depth_compare(mut self, compare: wgpu::CompareFunction) -> Self {
        self.depth_compare = Some(compare);
        self
    }

    pub fn with_depth_writes(mut self, depth_writes: bool) -> Self {
        self.depth_writes = depth_writes;
        self
    }

    pub fn binding(mut self, layout: &'a wgpu::BindGroupLayout) -> Self {
        self.bindings.push(layout);
        self
    }

    pub fn with_blend(mut self, blend: wgpu::BlendState) -> Self {
        self.blend = Some(blend);
        self
    }

    pub fn build(self) -> wgpu::RenderPipeline {
        let layout = self
            .renderer
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(self.label),
                bind_group_layouts: &self.bindings,
                push_constant_ranges: &[],
            });

        self.renderer
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(self.label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: self.module,
                    entry_point: None,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    buffers: &[V::layout()],
                },
                primitive: self.primitive_state.unwrap_or_default(),
                depth_stencil: self
                    .depth_compare
                    .map(|compare| DepthBuffer::depth_stencil_state(compare, self.depth_writes)),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: self.module,
                    entry_point: None,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.renderer.surface_format,
                        blend: self.blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
                cache: None,
            })
    }
}
