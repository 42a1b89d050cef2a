use crate::domain::model::{Annotation, AnnotationId, GeoPoint, Snapshot, Viewport};
use crate::domain::ports::MapSurface;
use chrono::Local;

pub const HOME_ZOOM: f64 = 12.0;
pub const FOCUS_ZOOM: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSettings {
    pub home: GeoPoint,
    pub home_zoom: f64,
    pub focus_zoom: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            home: GeoPoint::default(),
            home_zoom: HOME_ZOOM,
            focus_zoom: FOCUS_ZOOM,
        }
    }
}

/// Sole owner of the annotations shown on a map surface.
pub struct AnnotationReconciler<M: MapSurface> {
    surface: M,
    settings: ViewportSettings,
    displayed: Vec<AnnotationId>,
}

impl<M: MapSurface> AnnotationReconciler<M> {
    /// Centers the surface on the home viewport before any data arrives.
    pub fn new(mut surface: M, settings: ViewportSettings) -> Self {
        surface.set_viewport(Viewport {
            center: settings.home,
            zoom: settings.home_zoom,
        });
        Self {
            surface,
            settings,
            displayed: Vec::new(),
        }
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }

    pub fn displayed(&self) -> &[AnnotationId] {
        &self.displayed
    }

    /// Replaces every displayed annotation with one per facility, in snapshot order.
    pub fn reconcile(&mut self, snapshot: &Snapshot, is_first_cycle: bool) {
        for id in self.displayed.drain(..) {
            self.surface.remove_annotation(id);
        }

        let updated_at = Local::now();
        for facility in snapshot.facilities() {
            let annotation = Annotation::for_facility(facility, updated_at);
            let id = self.surface.add_annotation(&annotation);
            self.surface.show_detail(id);
            self.displayed.push(id);
        }

        if is_first_cycle {
            if let Some(first) = snapshot.first() {
                self.surface.set_viewport(Viewport {
                    center: first.position,
                    zoom: self.settings.focus_zoom,
                });
            }
        }

        self.surface.invalidate();
        tracing::debug!(annotations = self.displayed.len(), "Annotations reconciled");
    }
}
