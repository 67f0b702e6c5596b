use sdl2::video::{GLContext, GLProfile, SwapInterval, Window};
use sdl2::Sdl;

pub struct DemoWindow {
    _gl_context: GLContext,
    window: Window,
}

impl DemoWindow {
    pub fn new(sdl: &Sdl, title: &str, width: u32, height: u32, vsync: bool) -> Result<Self, String> {
        let video = sdl.video()?;

        let gl_attr = video.gl_attr();
        gl_attr.set_context_profile(GLProfile::Core);
        gl_attr.set_context_version(3, 3);
        gl_attr.set_depth_size(24);

        let window = video
            .window(title, width, height)
            .opengl()
            .resizable()
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let gl_context = window.gl_create_context()?;
        gl::load_with(|s| video.gl_get_proc_address(s) as *const _);

        let interval = if vsync { SwapInterval::VSync } else { SwapInterval::Immediate };
        if let Err(e) = video.gl_set_swap_interval(interval) {
            tracing::warn!(error = %e, "could not set swap interval");
        }

        tracing::info!(width, height, "window created, OpenGL 3.3 core");
        Ok(Self {
            _gl_context: gl_context,
            window,
        })
    }

    pub fn swap(&self) {
        self.window.gl_swap_window();
    }

    /// Drawable size in pixels.
    pub fn size(&self) -> (u32, u32) {
        self.window.drawable_size()
    }

    pub fn set_title(&mut self, title: &str) {
        if let Err(e) = self.window.set_title(title) {
            tracing::debug!(error = %e, "window title not updated");
        }
    }
}
