// Zoom state machine over the four task zones.
// At most one task zone is scaled at a time; `g` is never a target.
// Observers are injected; the controller never reaches for host globals.

use log::{info, warn};

use crate::error::EngineError;
use crate::types::*;

/// Called after a successful `set_zoom`.
pub type ChangeHook = Box<dyn FnMut(&ZoomChange) -> Result<(), EngineError>>;
/// Called after `reset`, and as the fallback for either event.
pub type StateHook = Box<dyn FnMut(&ZoomState) -> Result<(), EngineError>>;

pub const DEFAULT_ZOOM_SCALE: f64 = 1.5;

/// A zoom scale must be finite, positive and differ from the unzoomed 1.0.
pub fn validate_scale(scale: f64) -> Result<(), EngineError> {
    if scale.is_finite() && scale > 0.0 && scale != 1.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidScale(scale))
    }
}

/// Owns the zoom state and notifies the hosting UI.
#[derive(Default)]
pub struct ZoomController {
    state: ZoomState,
    on_change: Option<ChangeHook>,
    on_reset: Option<StateHook>,
    update_hook: Option<StateHook>,
}

impl ZoomController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the zoom-change observer.
    pub fn on_change(&mut self, hook: ChangeHook) {
        self.on_change = Some(hook);
    }

    /// Register the reset observer.
    pub fn on_reset(&mut self, hook: StateHook) {
        self.on_reset = Some(hook);
    }

    /// Host-supplied update function used when the specific observer is missing.
    pub fn set_update_hook(&mut self, hook: StateHook) {
        self.update_hook = Some(hook);
    }

    pub fn zoom_state(&self) -> ZoomState {
        self.state
    }

    pub fn zoomed_zone(&self) -> Option<Zone> {
        self.state.zoomed_zone()
    }

    pub fn scale_of(&self, zone: Zone) -> f64 {
        self.state.scale_of(zone)
    }

    /// Zoom `zone` to `scale`, returning every other zone to 1.0.
    /// Non-task zones and invalid scales are rejected and leave the state untouched.
    pub fn set_zoom(
        &mut self,
        zone: Zone,
        scale: f64,
        timestamp: Timestamp,
    ) -> Result<ZoomState, EngineError> {
        if !zone.is_task() {
            return Err(EngineError::InvalidZone(zone.to_string()));
        }
        validate_scale(scale)?;

        self.state.clear();
        self.state.set(zone, scale);
        info!("zone {} zoomed to {}x", zone, scale);

        let change = ZoomChange {
            zoomed_area: zone,
            zoom_state: self.state,
            timestamp,
        };
        if let Some(hook) = self.on_change.as_mut() {
            hook(&change)?;
        } else if let Some(hook) = self.update_hook.as_mut() {
            hook(&change.zoom_state)?;
        } else {
            warn!("no zoom-change observer registered: {:?}", change);
        }

        Ok(self.state)
    }

    /// Same as `set_zoom` but takes a zone id string from the host.
    pub fn set_zoom_by_id(
        &mut self,
        zone_id: &str,
        scale: f64,
        timestamp: Timestamp,
    ) -> Result<ZoomState, EngineError> {
        let zone: Zone = zone_id.parse()?;
        self.set_zoom(zone, scale, timestamp)
    }

    /// Return every zone to 1.0 and notify the reset observer.
    pub fn reset(&mut self) -> Result<ZoomState, EngineError> {
        self.state.clear();
        info!("zoom reset");

        if let Some(hook) = self.on_reset.as_mut() {
            hook(&self.state)?;
        } else if let Some(hook) = self.update_hook.as_mut() {
            hook(&self.state)?;
        } else {
            warn!("no zoom-reset observer registered");
        }

        Ok(self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn now() -> Timestamp {
        Timestamp::from_millis(42)
    }

    #[test]
    fn starts_unzoomed() {
        let zoom = ZoomController::new();
        for zone in Zone::ALL {
            assert_eq!(zoom.scale_of(zone), 1.0);
        }
        assert_eq!(zoom.zoomed_zone(), None);
    }

    #[test]
    fn set_zoom_replaces_previous_zone() {
        let mut zoom = ZoomController::new();
        zoom.set_zoom(Zone::A, DEFAULT_ZOOM_SCALE, now()).unwrap();
        let state = zoom.set_zoom(Zone::C, DEFAULT_ZOOM_SCALE, now()).unwrap();

        assert_eq!(state.scale_of(Zone::C), 1.5);
        assert_eq!(state.scale_of(Zone::A), 1.0);
        assert_eq!(zoom.zoomed_zone(), Some(Zone::C));
    }

    #[test]
    fn non_task_zone_is_rejected() {
        let mut zoom = ZoomController::new();
        zoom.set_zoom(Zone::B, 2.0, now()).unwrap();

        let err = zoom.set_zoom(Zone::G, 2.0, now()).unwrap_err();
        assert_eq!(err, EngineError::InvalidZone("g".to_string()));
        assert_eq!(zoom.scale_of(Zone::B), 2.0);
        assert_eq!(zoom.scale_of(Zone::G), 1.0);

        assert!(zoom.set_zoom_by_id("z", 2.0, now()).is_err());
        assert_eq!(zoom.zoomed_zone(), Some(Zone::B));
    }

    #[test]
    fn degenerate_scales_are_rejected() {
        let mut zoom = ZoomController::new();
        zoom.set_zoom(Zone::A, 2.0, now()).unwrap();

        for scale in [1.0, 0.0, -3.0, f64::NAN, f64::INFINITY] {
            let err = zoom.set_zoom(Zone::C, scale, now()).unwrap_err();
            assert!(matches!(err, EngineError::InvalidScale(_)));
            assert_eq!(zoom.zoomed_zone(), Some(Zone::A));
            assert_eq!(zoom.scale_of(Zone::A), 2.0);
            assert_eq!(zoom.scale_of(Zone::C), 1.0);
        }

        let state = zoom.set_zoom(Zone::C, 0.5, now()).unwrap();
        assert_eq!(state.zoomed_zone(), Some(Zone::C));
    }

    #[test]
    fn change_observer_receives_payload() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut zoom = ZoomController::new();
        zoom.on_change(Box::new(move |change: &ZoomChange| -> Result<(), EngineError> {
            sink.borrow_mut().push(change.clone());
            Ok(())
        }));
        zoom.set_zoom_by_id("F", 1.5, now()).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].zoomed_area, Zone::F);
        assert_eq!(seen[0].zoom_state.scale_of(Zone::F), 1.5);
        assert_eq!(seen[0].timestamp, now());
    }

    #[test]
    fn reset_notifies_reset_observer_only() {
        let resets = Rc::new(RefCell::new(0));
        let changes = Rc::new(RefCell::new(0));
        let (r, c) = (Rc::clone(&resets), Rc::clone(&changes));

        let mut zoom = ZoomController::new();
        zoom.on_reset(Box::new(move |state: &ZoomState| -> Result<(), EngineError> {
            assert_eq!(state.zoomed_zone(), None);
            *r.borrow_mut() += 1;
            Ok(())
        }));
        zoom.on_change(Box::new(move |_: &ZoomChange| -> Result<(), EngineError> {
            *c.borrow_mut() += 1;
            Ok(())
        }));

        zoom.set_zoom(Zone::A, 1.5, now()).unwrap();
        zoom.reset().unwrap();

        assert_eq!(*resets.borrow(), 1);
        assert_eq!(*changes.borrow(), 1);
        assert_eq!(zoom.zoomed_zone(), None);
    }

    #[test]
    fn update_hook_is_fallback_for_both_events() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);

        let mut zoom = ZoomController::new();
        zoom.set_update_hook(Box::new(move |state: &ZoomState| -> Result<(), EngineError> {
            sink.borrow_mut().push(state.zoomed_zone());
            Ok(())
        }));
        zoom.set_zoom(Zone::C, 1.5, now()).unwrap();
        zoom.reset().unwrap();

        assert_eq!(*calls.borrow(), vec![Some(Zone::C), None]);
    }

    #[test]
    fn failing_observer_propagates() {
        let mut zoom = ZoomController::new();
        zoom.on_change(Box::new(|_: &ZoomChange| -> Result<(), EngineError> {
            Err(EngineError::Observer("ui gone".to_string()))
        }));

        let err = zoom.set_zoom(Zone::A, 1.5, now()).unwrap_err();
        assert!(matches!(err, EngineError::Observer(_)));
    }

    proptest! {
        #[test]
        fn at_most_one_task_zone_scaled(ops in prop::collection::vec((0usize..5, -1.0f64..3.0), 1..20)) {
            let mut zoom = ZoomController::new();
            for (i, scale) in ops {
                let zone = Zone::ALL[i];
                let before = zoom.zoom_state();
                match zoom.set_zoom(zone, scale, now()) {
                    Ok(state) => {
                        let scaled = Zone::TASK.iter().filter(|z| state.scale_of(**z) != 1.0).count();
                        prop_assert_eq!(scaled, 1);
                        prop_assert_eq!(state.scale_of(zone), scale);
                    }
                    Err(_) => {
                        prop_assert_eq!(zoom.zoom_state(), before);
                    }
                }
                prop_assert_eq!(zoom.scale_of(Zone::G), 1.0);
            }
        }
    }
}
