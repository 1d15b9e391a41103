use crate::backend::{self, BackendKind, RenderBackend};
use anyhow::anyhow;
use cubefield_assets::AssetRoot;
use cubefield_input::{Action, CameraController, FrameClock, KeyState};
use cubefield_render::{Camera, Renderer, RendererConfig, SurfaceTarget, draw_frame};
use glam::{Mat4, Vec4};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

pub const CLEAR_COLOR: Vec4 = Vec4::new(0.2, 0.4, 0.8, 1.0);

pub struct AppOptions {
    pub backend: BackendKind,
    pub config: RendererConfig,
    pub assets: AssetRoot,
    pub width: u32,
    pub height: u32,
}

/// Whether mouse motion steers the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum CursorMode {
    #[default]
    Free,
    Captured,
}

impl CursorMode {
    /// Escape releases a captured cursor; a second Escape quits.
    fn on_escape(&mut self) -> Option<Action> {
        match self {
            CursorMode::Captured => {
                *self = CursorMode::Free;
                None
            }
            CursorMode::Free => Some(Action::Quit),
        }
    }
}

/// Application driver.
pub struct App {
    options: AppOptions,
    // Dropped before `window`: the backend's surface borrows the native view.
    renderer: Option<RenderBackend>,
    window: Option<Window>,
    camera: Camera,
    projection: Mat4,
    keys: KeyState,
    clock: FrameClock,
    cursor: CursorMode,
    failure: Option<anyhow::Error>,
}

impl App {
    pub fn new(options: AppOptions) -> Self {
        let camera = Camera::default();
        let aspect = Camera::aspect_ratio(options.width, options.height);
        let projection = camera.projection_matrix(aspect);
        Self {
            options,
            renderer: None,
            window: None,
            camera,
            projection,
            keys: KeyState::new(),
            clock: FrameClock::new(),
            cursor: CursorMode::Free,
            failure: None,
        }
    }

    /// Outcome of the run, once the event loop has returned.
    pub fn finish(mut self) -> anyhow::Result<()> {
        self.shutdown();
        match self.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let attrs = Window::default_attributes()
            .with_title(backend::window_title())
            .with_inner_size(PhysicalSize::new(self.options.width, self.options.height));
        let window = event_loop.create_window(attrs)?;

        let size = window.inner_size();
        let target = SurfaceTarget::from_window(&window, size.width, size.height)?;

        let mut renderer = RenderBackend::select(
            self.options.backend,
            self.options.assets.clone(),
            self.options.config,
        )?;
        tracing::info!("selected {} backend", renderer.name());
        renderer.initialize(&target)?;

        self.projection = self
            .camera
            .projection_matrix(Camera::aspect_ratio(size.width, size.height));
        self.clock = FrameClock::new();
        self.window = Some(window);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{error:#}");
        self.failure = Some(error);
        event_loop.exit();
    }

    fn handle_action(&mut self, event_loop: &ActiveEventLoop, action: Action, dt: f32) {
        match action {
            Action::Quit => event_loop.exit(),
            Action::Resize { width, height } => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(width, height);
                }
                self.projection = self
                    .camera
                    .projection_matrix(Camera::aspect_ratio(width, height));
            }
            Action::Move(_) | Action::Look { .. } => {
                CameraController::apply(&mut self.camera, action, dt);
            }
        }
    }

    fn set_cursor(&mut self, mode: CursorMode) {
        self.cursor = mode;
        let Some(window) = &self.window else {
            return;
        };
        let captured = mode == CursorMode::Captured;
        let grab = if captured {
            window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(e) = grab {
            tracing::warn!("cursor grab not supported: {e}");
        }
        window.set_cursor_visible(!captured);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let dt = self.clock.tick();
        let moves: Vec<Action> = self.keys.actions().collect();
        for action in moves {
            self.handle_action(event_loop, action, dt);
        }

        let view = self.camera.view_matrix();
        if let Some(renderer) = &mut self.renderer {
            draw_frame(renderer, CLEAR_COLOR, &view, &self.projection);
        }
    }

    fn shutdown(&mut self) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.destroy();
        }
        self.window = None;
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.failure.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            self.fail(event_loop, anyhow!("failed to start renderer: {e:#}"));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.handle_action(event_loop, Action::Quit, 0.0),
            WindowEvent::Resized(size) => {
                let action = Action::Resize {
                    width: size.width,
                    height: size.height,
                };
                self.handle_action(event_loop, action, 0.0);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                let pressed = state == ElementState::Pressed;
                if key == KeyCode::Escape {
                    if pressed && !repeat {
                        let mut cursor = self.cursor;
                        let action = cursor.on_escape();
                        self.set_cursor(cursor);
                        if let Some(action) = action {
                            self.handle_action(event_loop, action, 0.0);
                        }
                    }
                } else {
                    self.keys.set(key, pressed);
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } => {
                if self.cursor == CursorMode::Free {
                    self.set_cursor(CursorMode::Captured);
                }
            }
            WindowEvent::Focused(false) => {
                self.keys.clear();
                if self.cursor == CursorMode::Captured {
                    self.set_cursor(CursorMode::Free);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.cursor == CursorMode::Captured {
                self.handle_action(event_loop, Action::look(delta), 0.0);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}
