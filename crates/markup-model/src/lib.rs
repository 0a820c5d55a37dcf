//! Annotation model of the PDF markup workspace.
//!
//! Annotations are stored in render space (page pixels at zoom 1) so that they are independent
//! of the current zoom and map to PDF points with one transform per page.

pub mod annotation;
pub mod geometry;
pub mod gesture;
pub mod history;
pub mod path_data;
pub mod settings;
pub mod store;

pub use annotation::{AnnotationId, ParseColorError, PenStroke, Rgb, TextAnnotation, TextPatch};
pub use geometry::{
    to_display_space, to_pdf_space, to_render_space, InvalidRotation, PageGeometry,
    PageGeometryCache, PageTransform, Point, Rotation,
};
pub use gesture::{
    Gesture, GestureError, GestureKind, GestureMachine, GestureOutcome, GestureTarget, PenStyle,
};
pub use history::{History, Snapshot};
pub use path_data::{parse_path_data, to_path_data, PathDataError};
pub use settings::{
    EditorSettings, PenSettings, ResizeLimits, SettingsError, TextDefaults, ZoomSettings,
};
pub use store::{AnnotationStore, StoreError};
