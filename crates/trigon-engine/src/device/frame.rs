/// A presentable image borrowed from the wgpu surface chain.
///
/// This object is short-lived and must be submitted promptly. Holding it
/// prevents acquisition of subsequent images once the chain is exhausted.
pub struct SurfaceImage {
    pub(crate) surface_texture: wgpu::SurfaceTexture,
    pub(crate) view: wgpu::TextureView,
}

impl SurfaceImage {
    pub(crate) fn new(surface_texture: wgpu::SurfaceTexture) -> Self {
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            surface_texture,
            view,
        }
    }

    /// Hands the image back to the compositor for display.
    pub(crate) fn present(self) {
        drop(self.view);
        self.surface_texture.present();
    }
}
