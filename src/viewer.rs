//! The viewer shell: window, event loop and lifecycle.
//!
//! [`run`] opens a window, brings up the GPU context, starts the model fetch
//! and drives a continuous redraw chain until the window closes or a hook
//! asks to exit. The host plugs in through [`ViewerHooks`]: it supplies
//! module completion state and the countdown seconds each frame, and gets
//! called back when a defusal zone is clicked.
//!
//! Teardown is ordered and runs exactly once: the redraw chain is broken
//! first, then input detaches, then scene GPU resources are disposed, and
//! the model payload is released last.

use std::{collections::HashMap, iter, path::PathBuf, sync::Arc};

use instant::{Duration, Instant};

use cgmath::Rotation3;
use tokio::runtime::Runtime;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    assets::{
        gltf,
        loader::{LoadDriver, LoadOutcome},
        source::{fs_reader, ModelReader},
    },
    context::Context,
    error::ViewerError,
    interaction::{InteractionController, PointerAction},
    scene::graph::SceneGraph,
};

/// Pixels of drag per radian of rotation, roughly tuned for a 900px window.
pub const DEFAULT_DRAG_SENSITIVITY: f32 = 0.01;
/// How long a model fetch may stall before it is reported as failed.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything the host decides up front.
pub struct ViewerConfig {
    /// Asset name handed to the model reader.
    pub asset_name: String,
    /// Directory the default filesystem reader resolves names against.
    pub asset_root: PathBuf,
    /// Mesh name to module id. Only meshes named here are clickable.
    pub zone_modules: HashMap<String, String>,
    pub drag_sensitivity: f32,
    pub load_timeout: Duration,
    pub window_title: String,
    /// Surface clear colour behind the grid and model.
    pub clear_colour: wgpu::Color,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_name: "bomb.glb".to_owned(),
            asset_root: PathBuf::from("assets"),
            zone_modules: HashMap::new(),
            drag_sensitivity: DEFAULT_DRAG_SENSITIVITY,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            window_title: "fuseview".to_owned(),
            clear_colour: wgpu::Color {
                r: 0.015,
                g: 0.02,
                b: 0.03,
                a: 1.0,
            },
        }
    }
}

/// What the host sees of the viewer's lifecycle. `degraded` means the
/// placeholder scene is up because the model would not decode; `error` holds
/// the last failure in display form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerStatus {
    pub loading: bool,
    pub error: Option<String>,
    pub degraded: bool,
}

/// Host integration points. `module_status` and `timer_seconds` are polled
/// every frame; the `on_*` hooks fire on the event loop thread.
pub trait ViewerHooks: 'static {
    /// Module id to "defused" flag. Zones whose module appears here get the
    /// status colors; everything else keeps its authored material.
    fn module_status(&self) -> &HashMap<String, bool>;

    /// Seconds remaining on the countdown.
    fn timer_seconds(&self) -> u32;

    /// A zone-mapped mesh was clicked. `module` is the resolved module id.
    fn on_zone_click(&mut self, viewer: &mut ViewerControls<'_>, module: &str);

    /// Any window event, after the viewer's own input handling. Wheel events
    /// never arrive here; the viewer swallows them.
    fn on_window_event(&mut self, _viewer: &mut ViewerControls<'_>, _event: &WindowEvent) {}

    /// Called whenever the status value changes.
    fn on_status(&mut self, _status: &ViewerStatus) {}
}

/// Handle passed into hooks for poking the running viewer.
pub struct ViewerControls<'a> {
    session: &'a mut Session,
    runtime: &'a Runtime,
    reader: &'a ModelReader,
    config: &'a ViewerConfig,
    exit: &'a mut bool,
}

impl ViewerControls<'_> {
    pub fn status(&self) -> ViewerStatus {
        self.session.status.clone()
    }

    /// Snap the model back to its upright rest orientation.
    pub fn reset_rotation(&mut self) {
        if let Some(scene) = &mut self.session.scene {
            scene.pivot.reset();
        }
    }

    /// Throw away the current scene and fetch the model again. An in-flight
    /// fetch is superseded; input stays detached until the new scene is up.
    pub fn retry(&mut self) {
        log::info!("retrying model load");
        self.session.interaction.detach();
        if let Some(mut scene) = self.session.scene.take() {
            scene.dispose();
        }
        self.session.driver.begin(
            self.runtime,
            self.reader,
            &self.config.asset_name,
            self.config.load_timeout,
        );
        self.session.status = ViewerStatus {
            loading: true,
            error: None,
            degraded: false,
        };
    }

    /// Ask the event loop to wind down after this hook returns.
    pub fn exit(&mut self) {
        *self.exit = true;
    }
}

/// Live per-window state, the part that only exists between `resumed` and
/// teardown.
struct Session {
    ctx: Context,
    is_surface_configured: bool,
    interaction: InteractionController,
    scene: Option<SceneGraph>,
    driver: LoadDriver,
    status: ViewerStatus,
    redraw_chain: bool,
    shut_down: bool,
}

impl Session {
    fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            self.is_surface_configured = true;
        }
    }

    /// Ordered teardown: break the redraw chain, detach input, dispose scene
    /// GPU resources, release the model payload. Runs at most once.
    fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        log::info!("viewer teardown");
        self.redraw_chain = false;
        self.interaction.detach();
        if let Some(mut scene) = self.scene.take() {
            scene.dispose();
        }
        self.driver.unmount();
    }

    fn render(
        &mut self,
        module_status: &HashMap<String, bool>,
        seconds: u32,
        dt: Duration,
    ) -> Result<(), wgpu::SurfaceError> {
        // Keep the redraw chain alive; shutdown breaks it by clearing the flag.
        if self.redraw_chain {
            self.ctx.window.request_redraw();
        }

        // Rendering requires the surface to be configured.
        if !self.is_surface_configured {
            return Ok(());
        }

        // Slow light orbit so specular shading reads as depth.
        let old_position: cgmath::Vector3<_> = self.ctx.light.uniform.position.into();
        self.ctx.light.uniform.position = (cgmath::Quaternion::from_axis_angle(
            (0.0, 1.0, 0.0).into(),
            cgmath::Deg(12.0 * dt.as_secs_f32()),
        ) * old_position)
            .into();
        self.ctx.light.refresh(&self.ctx.queue);

        if let Some(scene) = &mut self.scene {
            scene.frame_sync(module_status, seconds, &self.ctx.queue);
            scene.write_frame_uniforms(&self.ctx.queue);
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(scene) = &self.scene {
                scene.draw(
                    &mut render_pass,
                    &self.ctx.pipelines,
                    &self.ctx.camera.bind_group,
                    &self.ctx.light.bind_group,
                );
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub struct Viewer<H: ViewerHooks> {
    config: ViewerConfig,
    hooks: H,
    reader: ModelReader,
    runtime: Runtime,
    session: Option<Session>,
    last_status: Option<ViewerStatus>,
    last_time: Instant,
}

impl<H: ViewerHooks> Viewer<H> {
    fn fail_startup(&mut self, err: ViewerError, event_loop: &ActiveEventLoop) {
        log::error!("{err}");
        let status = ViewerStatus {
            loading: false,
            error: Some(err.to_string()),
            degraded: false,
        };
        self.hooks.on_status(&status);
        self.last_status = Some(status);
        event_loop.exit();
    }

    /// Move a finished fetch forward: decode, assemble, upload. Fetch
    /// failures land in the status; decode failures additionally put up the
    /// placeholder scene so the viewer stays interactive.
    fn advance_load(&mut self) {
        let Some(session) = self.session.as_mut() else { return };
        let Some(outcome) = session.driver.poll(&self.config.asset_name) else {
            return;
        };

        match outcome {
            LoadOutcome::Ready => {
                let decoded = match session.driver.bytes() {
                    Some(bytes) => gltf::decode(&self.config.asset_name, bytes),
                    None => Err(ViewerError::fetch(
                        &self.config.asset_name,
                        "payload released before decode",
                    )),
                };
                if let Some(mut old) = session.scene.take() {
                    old.dispose();
                }
                match decoded {
                    Ok(payload) => {
                        let mut scene = SceneGraph::assemble(payload, &self.config.zone_modules);
                        scene.upload(&session.ctx.device, &session.ctx.queue, &session.ctx.pipelines);
                        session.scene = Some(scene);
                        session.interaction.attach();
                        session.status = ViewerStatus::default();
                    }
                    Err(err) if err.is_decode() => {
                        log::error!("{err}");
                        let mut scene = SceneGraph::placeholder(&self.config.zone_modules);
                        scene.upload(&session.ctx.device, &session.ctx.queue, &session.ctx.pipelines);
                        session.scene = Some(scene);
                        session.interaction.attach();
                        session.status = ViewerStatus {
                            loading: false,
                            error: Some(err.to_string()),
                            degraded: true,
                        };
                    }
                    Err(err) => {
                        log::error!("{err}");
                        session.status = ViewerStatus {
                            loading: false,
                            error: Some(err.to_string()),
                            degraded: false,
                        };
                    }
                }
            }
            LoadOutcome::Failed(err) => {
                log::error!("{err}");
                session.status = ViewerStatus {
                    loading: false,
                    error: Some(err.to_string()),
                    degraded: false,
                };
            }
        }
    }

    /// Feed the event through the interaction controller and apply whatever
    /// it asks for. Returns whether a hook requested exit.
    fn dispatch_pointer(&mut self, event: &WindowEvent) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        match session.interaction.handle_window_event(event) {
            PointerAction::None => false,
            PointerAction::Rotate { dx, dy } => {
                let sensitivity = session.interaction.sensitivity;
                if let Some(scene) = &mut session.scene {
                    scene.pivot.apply_drag(dx, dy, sensitivity);
                }
                false
            }
            PointerAction::Click { position } => {
                let pick = session.scene.as_ref().and_then(|scene| {
                    let ray = session.ctx.camera.camera.cast_ray_from_screen(
                        position,
                        session.ctx.config.width,
                        session.ctx.config.height,
                        &session.ctx.projection,
                    );
                    scene.raycast(&ray)
                });
                let Some(pick) = pick else {
                    log::debug!(
                        "click at ({:.0}, {:.0}) hit no zone",
                        position.x,
                        position.y
                    );
                    return false;
                };
                log::info!(
                    "zone `{}` clicked: module `{}` at distance {:.2}",
                    pick.zone,
                    pick.module,
                    pick.distance
                );
                let mut exit = false;
                let mut controls = ViewerControls {
                    session: &mut *session,
                    runtime: &self.runtime,
                    reader: &self.reader,
                    config: &self.config,
                    exit: &mut exit,
                };
                self.hooks.on_zone_click(&mut controls, &pick.module);
                exit
            }
        }
    }

    fn dispatch_window_hook(&mut self, event: &WindowEvent) -> bool {
        // The wheel is consumed wholesale; it must not reach the host.
        if matches!(event, WindowEvent::MouseWheel { .. }) {
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let mut exit = false;
        let mut controls = ViewerControls {
            session,
            runtime: &self.runtime,
            reader: &self.reader,
            config: &self.config,
            exit: &mut exit,
        };
        self.hooks.on_window_event(&mut controls, event);
        exit
    }

    fn publish_status(&mut self) {
        let Some(status) = self.session.as_ref().map(|s| s.status.clone()) else {
            return;
        };
        if self.last_status.as_ref() != Some(&status) {
            log::debug!(
                "status: loading={} degraded={} error={:?}",
                status.loading,
                status.degraded,
                status.error
            );
            self.hooks.on_status(&status);
            self.last_status = Some(status);
        }
    }
}

impl<H: ViewerHooks> ApplicationHandler for Viewer<H> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() {
            return;
        }

        let attributes = Window::default_attributes().with_title(self.config.window_title.clone());
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                self.fail_startup(ViewerError::Init(err.to_string()), event_loop);
                return;
            }
        };

        let mut ctx = match self.runtime.block_on(Context::new(window)) {
            Ok(ctx) => ctx,
            Err(err) => {
                self.fail_startup(ViewerError::Init(format!("{err:#}")), event_loop);
                return;
            }
        };
        ctx.clear_colour = self.config.clear_colour;

        let mut session = Session {
            ctx,
            is_surface_configured: false,
            interaction: InteractionController::new(self.config.drag_sensitivity),
            scene: None,
            driver: LoadDriver::new(),
            status: ViewerStatus {
                loading: true,
                error: None,
                degraded: false,
            },
            redraw_chain: true,
            shut_down: false,
        };
        let size = session.ctx.window.inner_size();
        session.resize(size.width, size.height);
        session.driver.begin(
            &self.runtime,
            &self.reader,
            &self.config.asset_name,
            self.config.load_timeout,
        );
        session.ctx.window.request_redraw();
        self.session = Some(session);
        self.publish_status();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if self.session.is_none() {
            return;
        }

        let exit_requested = self.dispatch_pointer(&event) | self.dispatch_window_hook(&event);
        if exit_requested {
            if let Some(session) = self.session.as_mut() {
                session.shutdown();
            }
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                if let Some(session) = self.session.as_mut() {
                    session.shutdown();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(session) = self.session.as_mut() {
                    session.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.advance_load();

                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                let seconds = self.hooks.timer_seconds();
                let module_status = self.hooks.module_status();
                if let Some(session) = self.session.as_mut() {
                    match session.render(module_status, seconds, dt) {
                        Ok(()) => {}
                        // Reconfigure the surface if it's lost or outdated
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            let size = session.ctx.window.inner_size();
                            session.resize(size.width, size.height);
                        }
                        Err(e) => {
                            log::error!("Unable to render {}", e);
                        }
                    }
                }
            }
            _ => {}
        }

        self.publish_status();
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Safety net for exits that bypass CloseRequested; shutdown is a
        // no-op when teardown already ran.
        if let Some(session) = self.session.as_mut() {
            session.shutdown();
        }
    }
}

/// Run the viewer with the default filesystem reader rooted at
/// `config.asset_root`.
pub fn run<H: ViewerHooks>(config: ViewerConfig, hooks: H) -> anyhow::Result<()> {
    let reader = fs_reader(config.asset_root.clone());
    run_with_reader(config, reader, hooks)
}

/// Run the viewer with a custom model reader. Blocks until the window
/// closes or a hook requests exit.
pub fn run_with_reader<H: ViewerHooks>(
    config: ViewerConfig,
    reader: ModelReader,
    hooks: H,
) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let runtime = Runtime::new()?;
    let event_loop = EventLoop::new()?;
    let mut viewer = Viewer {
        config,
        hooks,
        reader,
        runtime,
        session: None,
        last_status: None,
        last_time: Instant::now(),
    };
    event_loop.run_app(&mut viewer)?;
    Ok(())
}
