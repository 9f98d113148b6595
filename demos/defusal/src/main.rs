//! A minimal defusal round around the viewer: four numerical-method modules,
//! a five minute countdown and keyboard shortcuts for the host-side actions.
//!
//! Click a zone with the left button to toggle its module, drag with the
//! right button to turn the bomb. `R` resets the rotation, `L` reloads the
//! model, `Escape` quits.

use std::collections::HashMap;
use std::time::Instant;

use fuseview::viewer::{self, ViewerConfig, ViewerControls, ViewerHooks, ViewerStatus};
use fuseview::{ElementState, KeyCode, PhysicalKey, WindowEvent};

const ROUND_SECONDS: u64 = 300;

struct GameHooks {
    status: HashMap<String, bool>,
    started: Instant,
}

impl GameHooks {
    fn new() -> Self {
        let status = HashMap::from([
            ("biseccion".to_owned(), false),
            ("newton".to_owned(), false),
            ("gauss".to_owned(), false),
            ("simpson".to_owned(), false),
        ]);
        Self {
            status,
            started: Instant::now(),
        }
    }
}

impl ViewerHooks for GameHooks {
    fn module_status(&self) -> &HashMap<String, bool> {
        &self.status
    }

    fn timer_seconds(&self) -> u32 {
        ROUND_SECONDS.saturating_sub(self.started.elapsed().as_secs()) as u32
    }

    fn on_zone_click(&mut self, _viewer: &mut ViewerControls<'_>, module: &str) {
        if let Some(done) = self.status.get_mut(module) {
            *done = !*done;
            log::info!(
                "module `{module}` is now {}",
                if *done { "defused" } else { "armed" }
            );
        }
    }

    fn on_window_event(&mut self, viewer: &mut ViewerControls<'_>, event: &WindowEvent) {
        let WindowEvent::KeyboardInput { event: key, .. } = event else {
            return;
        };
        if key.state != ElementState::Pressed {
            return;
        }
        match key.physical_key {
            PhysicalKey::Code(KeyCode::KeyR) => viewer.reset_rotation(),
            PhysicalKey::Code(KeyCode::KeyL) => viewer.retry(),
            PhysicalKey::Code(KeyCode::Escape) => viewer.exit(),
            _ => {}
        }
    }

    fn on_status(&mut self, status: &ViewerStatus) {
        if let Some(error) = &status.error {
            log::warn!("viewer reported: {error}");
        }
    }
}

fn main() -> anyhow::Result<()> {
    let config = ViewerConfig {
        zone_modules: HashMap::from([
            ("zona_biseccion".to_owned(), "biseccion".to_owned()),
            ("zona_newton".to_owned(), "newton".to_owned()),
            ("zona_gauss".to_owned(), "gauss".to_owned()),
            ("zona_simpson".to_owned(), "simpson".to_owned()),
        ]),
        window_title: "bomba numerica".to_owned(),
        ..ViewerConfig::default()
    };
    viewer::run(config, GameHooks::new())
}
