//! Editing session over one PDF: page geometry, annotation actions, preview and export.

pub mod export;
pub mod preview;
pub mod session;

pub use export::{
    export_pdf, exported_file_name, plan_export, AnnotationKind, DrawCommand, ExportError,
    ExportJob, ExportPlan, ExportReport, ExportedFile, SkipReason, SkippedAnnotation,
};
pub use preview::{paint_overlay, Overlay, OverlayStroke};
pub use session::{
    shortcut_for, ActionOutcome, EditorAction, EditorSession, Modifiers, SessionError, Tool,
};
