use crate::domain::model::{Annotation, AnnotationId, Facility, GeoPoint, Notice, Slot, Viewport};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn lots_path(&self) -> &str;
    fn slots_path(&self) -> &str;
    fn poll_interval(&self) -> Duration;
    fn request_timeout(&self) -> Duration;
    fn default_position(&self) -> GeoPoint;
    fn home_zoom(&self) -> f64;
    fn focus_zoom(&self) -> f64;
}

#[async_trait]
pub trait FacilityRepository: Send + Sync {
    async fn fetch_facilities(&self) -> Result<Vec<Facility>>;
    async fn fetch_slots(&self) -> Result<Vec<Slot>>;
}

#[async_trait]
impl<R: FacilityRepository + ?Sized> FacilityRepository for Arc<R> {
    async fn fetch_facilities(&self) -> Result<Vec<Facility>> {
        (**self).fetch_facilities().await
    }

    async fn fetch_slots(&self) -> Result<Vec<Slot>> {
        (**self).fetch_slots().await
    }
}

pub trait MapSurface: Send {
    fn add_annotation(&mut self, annotation: &Annotation) -> AnnotationId;
    fn remove_annotation(&mut self, id: AnnotationId);
    fn show_detail(&mut self, id: AnnotationId);
    fn set_viewport(&mut self, viewport: Viewport);
    fn invalidate(&mut self);
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}
