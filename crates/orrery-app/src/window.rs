//! Window creation and event handling via winit.
//!
//! [`OrreryApp`] implements winit's [`ApplicationHandler`]: it owns the window,
//! the GPU context and the input devices, and drives one [`Orrery::step`] and
//! one render per redraw.

use std::sync::Arc;

use orrery_config::Config;
use orrery_input::{
    ActionResolver, ActionState, FrameInput, InputMap, KeyboardState, MouseState, PointerCommand,
};
use orrery_render::{RenderContext, SceneRenderer, SurfaceError, init_render_context_blocking};
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::frame::Orrery;
use crate::frame_clock::FrameClock;
use crate::hud::format_hud;

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let attrs = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            f64::from(config.window.width),
            f64::from(config.window.height),
        ));
    if config.window.fullscreen {
        attrs.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attrs
    }
}

/// Title text: the configured title, followed by the telemetry and the
/// control help when the HUD is enabled.
pub fn window_title(config: &Config, orrery: &Orrery) -> String {
    if config.debug.show_hud {
        format!("{} | {}", config.window.title, format_hud(orrery.hud()))
    } else {
        config.window.title.clone()
    }
}

/// GPU state that exists only while a window is open.
struct Gpu {
    context: RenderContext,
    renderer: SceneRenderer,
}

pub struct OrreryApp {
    config: Config,
    orrery: Orrery,
    input_map: InputMap,
    keyboard: KeyboardState,
    mouse: MouseState,
    actions: ActionState,
    clock: FrameClock,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    title: String,
}

impl OrreryApp {
    pub fn new(config: Config, orrery: Orrery, input_map: InputMap) -> Self {
        let title = config.window.title.clone();
        Self {
            config,
            orrery,
            input_map,
            keyboard: KeyboardState::new(),
            mouse: MouseState::new(),
            actions: ActionState::new(),
            clock: FrameClock::new(),
            window: None,
            gpu: None,
            title,
        }
    }

    pub fn orrery(&self) -> &Orrery {
        &self.orrery
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) {
        let window = match event_loop.create_window(window_attributes_from_config(&self.config)) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };

        match init_render_context_blocking(window.clone(), self.config.window.vsync) {
            Ok(context) => {
                let renderer = SceneRenderer::new(&context);
                let (width, height) = context.size();
                info!(
                    "Rendering to {width}x{height} ({:?})",
                    context.surface_format
                );
                self.gpu = Some(Gpu { context, renderer });
            }
            Err(e) => {
                error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        }

        self.clock.reset();
        window.request_redraw();
        self.window = Some(window);
    }

    fn resize(&mut self, width: u32, height: u32) {
        if let Some(gpu) = &mut self.gpu {
            gpu.context.resize(width, height);
            gpu.renderer.resize(&gpu.context);
            info!("Window resized to {width}x{height}");
        }
    }

    /// Drop the pointer and every held key, e.g. when focus is lost.
    fn release_input(&mut self) {
        self.keyboard.release_all();
        match &self.window {
            Some(window) => self.mouse.set_captured(window, false),
            None => self.mouse.set_captured_flag(false),
        }
        self.orrery.camera.controls.unlock();
    }

    /// One frame: read input, step the simulation, render, refresh the title.
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        ActionResolver::resolve(
            &self.input_map,
            &self.keyboard,
            &self.mouse,
            &mut self.actions,
        );
        let input = FrameInput::collect(&self.actions, &self.mouse);

        if let (Some(command), Some(window)) = (input.pointer, &self.window) {
            self.mouse
                .set_captured(window, command == PointerCommand::Lock);
        }

        let gpu = &mut self.gpu;
        let mut outcome = Ok(());
        self.clock.tick(
            &mut self.orrery,
            |orrery, dt| orrery.step(dt, &input),
            |orrery| {
                if let Some(gpu) = gpu {
                    outcome = render(gpu, orrery);
                }
            },
        );

        match outcome {
            Ok(()) => {}
            Err(SurfaceError::OutOfMemory) => {
                error!("GPU out of memory, shutting down");
                event_loop.exit();
                return;
            }
            Err(e) => warn!("Frame skipped: {e}"),
        }

        self.keyboard.end_frame();
        self.mouse.end_frame();

        if let Some(window) = &self.window {
            let title = window_title(&self.config, &self.orrery);
            if title != self.title {
                window.set_title(&title);
                self.title = title;
            }
            window.request_redraw();
        }
    }
}

fn render(gpu: &mut Gpu, orrery: &Orrery) -> Result<(), SurfaceError> {
    let (width, height) = gpu.context.size();
    let view = orrery.frame_view(width as f32 / height.max(1) as f32);
    let scene = &orrery.system.scene;
    gpu.renderer
        .render(&gpu.context, &scene.graph, &scene.resources, &view)
}

impl ApplicationHandler for OrreryApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            self.create_window(event_loop);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::Focused(false) => self.release_input(),
            WindowEvent::KeyboardInput { event, .. } => {
                self.keyboard.process_event(&event);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.mouse.on_button(button, state);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.mouse.on_raw_motion(delta.0, delta.1);
        }
    }
}

/// Errors that end the event loop.
#[derive(Debug)]
pub struct RunError(winit::error::EventLoopError);

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "event loop failed: {}", self.0)
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// Creates an event loop and runs the orrery until the window is closed.
///
/// # Errors
///
/// Returns [`RunError`] if the event loop cannot be created or fails.
pub fn run(config: Config, orrery: Orrery, input_map: InputMap) -> Result<(), RunError> {
    let event_loop = EventLoop::new().map_err(RunError)?;
    let mut app = OrreryApp::new(config, orrery, input_map);
    event_loop.run_app(&mut app).map_err(RunError)?;
    info!(
        "Event loop finished after {} frames ({:.1}s simulated)",
        app.clock.frame_count(),
        app.clock.total_time()
    );
    Ok(())
}
