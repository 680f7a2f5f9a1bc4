//! Document graph of a LEGO instruction book.
//!
//! Abstract parts (shared geometry) and part instances live in a
//! [`PartStore`] and are referenced by typed ids. Submodels own pages,
//! pages own steps, steps own a CSI, an optional PLI and callouts. The
//! [`Document`] ties everything to a main model and provides the builder
//! operations importers use.

pub mod arena;
pub mod color;
pub mod document;
pub mod error;
pub mod geometry;
pub mod page;
pub mod part;
pub mod render;
pub mod step;
pub mod store;
pub mod style;
pub mod template;

pub use arena::{AbstractPartId, ArenaIdx, PartInstanceId};
pub use color::{COMPLEMENT_COLOR, CURRENT_COLOR, ColorTable, LicColor, color_code};
pub use document::{Document, DocumentStats};
pub use error::ModelError;
pub use geometry::{IDENTITY_MATRIX, Matrix, PointF, Primitive, PrimitiveKind, RectF, Size};
pub use page::{Annotation, Guide, Page, PartListPage, StepSeparator, TitleLabel, TitlePage};
pub use part::{
    ARROW_FILENAME, AbstractPart, Arrow, Dimensions, DisplaceDirection, Displacement, ParentRef,
    Part, SubmodelData,
};
pub use render::{BUFFER_LADDER, DisplayItem, DisplayListId, Renderer, ScopedBuffer};
pub use step::{
    Callout, CalloutArrow, Csi, LengthIndicator, Pli, PliItem, PreviewDimensions, QuantityLabel,
    RotateIcon, Step, SubmodelPreview,
};
pub use store::PartStore;
pub use style::{Brush, BrushStyle, Font, Frame, Label, Pen, Pixmap, Rgba};
pub use template::{LegacyScales, StaticInfo, Template, TemplatePage, TemplateStyles};
