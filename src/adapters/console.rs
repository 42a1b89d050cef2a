use crate::domain::model::{Annotation, AnnotationId, Notice, Viewport};
use crate::domain::ports::{MapSurface, Notifier};
use std::collections::BTreeMap;

/// Terminal stand-in for a map widget: keeps the annotation set and prints it
/// on every repaint.
#[derive(Debug, Default)]
pub struct ConsoleMap {
    next_id: u64,
    annotations: BTreeMap<AnnotationId, Annotation>,
    expanded: Vec<AnnotationId>,
    viewport: Option<Viewport>,
}

impl ConsoleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.values()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(viewport) = self.viewport {
            out.push_str(&format!(
                "[map @ {:.4}, {:.4} zoom {:.1}]\n",
                viewport.center.latitude, viewport.center.longitude, viewport.zoom
            ));
        }
        for (id, annotation) in &self.annotations {
            let marker = if self.expanded.contains(id) { "📍" } else { "·" };
            out.push_str(&format!(
                "{} {} ({})\n",
                marker,
                annotation.title.replace('\n', " | "),
                annotation.snippet
            ));
        }
        out
    }
}

impl MapSurface for ConsoleMap {
    fn add_annotation(&mut self, annotation: &Annotation) -> AnnotationId {
        self.next_id += 1;
        let id = AnnotationId(self.next_id);
        self.annotations.insert(id, annotation.clone());
        id
    }

    fn remove_annotation(&mut self, id: AnnotationId) {
        self.annotations.remove(&id);
        self.expanded.retain(|shown| *shown != id);
    }

    fn show_detail(&mut self, id: AnnotationId) {
        if self.annotations.contains_key(&id) && !self.expanded.contains(&id) {
            self.expanded.push(id);
        }
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    fn invalidate(&mut self) {
        print!("{}", self.render());
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        if notice.is_error() {
            tracing::warn!("{}", notice.message());
            eprintln!("❌ {}", notice.message());
        } else {
            tracing::info!("{}", notice.message());
            println!("{}", notice.message());
        }
    }
}
