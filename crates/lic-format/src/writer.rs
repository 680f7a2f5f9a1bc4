//! Record writers, the mirror image of [`reader`](crate::reader).
//!
//! [`LicWriter`] can produce any version from 1 to the current one. Data a
//! target version has no field for is dropped with a debug log, or, with
//! [`WriterOptions::lossless`], refused with
//! [`LicError::UnrepresentableAtVersion`].

use std::io::Write;

use tracing::{debug, info};

use lic_model::{
    ARROW_FILENAME, AbstractPart, Annotation, Arrow, Callout, Csi, Dimensions, Document, Frame,
    Guide, Label, LicColor, Matrix, Page, Part, PartInstanceId, PartListPage, PartStore, Pli,
    PliItem, PreviewDimensions, Primitive, StaticInfo, Step, SubmodelPreview, Template,
    TemplateStyles, TitlePage, color_code,
};

use crate::error::{LicError, Result};
use crate::gates::Field;
use crate::header::write_header;
use crate::options::{CURRENT_VERSION, FIRST_VERSION, WriterOptions};
use crate::stream::StreamWriter;

/// Template written for documents that carry none.
pub const DEFAULT_TEMPLATE_NAME: &str = "default_template.lit";

/// Writes documents and templates in one format version.
pub struct LicWriter<W: Write> {
    stream: StreamWriter<W>,
    options: WriterOptions,
}

impl<W: Write> LicWriter<W> {
    /// Writer for the current version.
    pub fn new(writer: W) -> Self {
        Self {
            stream: StreamWriter::new(writer, CURRENT_VERSION),
            options: WriterOptions::default(),
        }
    }

    /// Writer with explicit options; fails for versions outside
    /// `1..=CURRENT_VERSION`.
    pub fn with_options(writer: W, options: WriterOptions) -> Result<Self> {
        if !(FIRST_VERSION..=CURRENT_VERSION).contains(&options.version) {
            return Err(LicError::UnsupportedVersion {
                found: options.version,
                max_supported: CURRENT_VERSION,
            });
        }
        Ok(Self {
            stream: StreamWriter::new(writer, options.version),
            options,
        })
    }

    #[must_use]
    pub fn version(&self) -> i16 {
        self.stream.version()
    }

    /// Write a complete `.lic` stream and return the underlying writer.
    pub fn write_document(mut self, doc: &Document) -> Result<W> {
        write_header(&mut self.stream)?;
        if self.stream.has(Field::ProgressCount) {
            let total = 3 + doc.store.plain_parts().count() + doc.store.submodels().count();
            self.stream.write_count(total)?;
        }

        let fallback;
        let template = match &doc.template {
            Some(template) => template,
            None => {
                fallback = Template::new(DEFAULT_TEMPLATE_NAME);
                &fallback
            }
        };
        self.write_template_block(template)?;

        self.stream.write_string(&doc.filename)?;
        self.write_static_info(&doc.static_info)?;
        self.write_dictionary(&doc.store, true, &template.styles)?;

        let main = doc.main_model().ok_or_else(|| LicError::Inconsistent {
            message: "document has no main model".to_string(),
        })?;
        self.write_submodel(main, &doc.store, &template.styles)?;
        self.write_title_page(doc.title_page.as_ref(), main, &template.styles)?;
        self.stream.write_count(doc.part_list_pages.len())?;
        for page in &doc.part_list_pages {
            self.write_part_list_page(page, &template.styles)?;
        }
        self.write_guides(&doc.guides)?;

        self.stream.flush()?;
        info!(version = self.version(), filename = %doc.filename, "wrote document");
        Ok(self.stream.into_inner())
    }

    /// Write a standalone `.lit` stream and return the underlying writer.
    pub fn write_template(mut self, template: &Template) -> Result<W> {
        write_header(&mut self.stream)?;
        self.write_template_block(template)?;
        self.stream.flush()?;
        info!(version = self.version(), filename = %template.filename, "wrote template");
        Ok(self.stream.into_inner())
    }

    /// Skip data the target version cannot hold, or refuse when lossless.
    fn drop_field(&self, what: &'static str) -> Result<()> {
        let version = self.version();
        if self.options.allow_lossy {
            debug!(what, version, "dropping data the target version cannot hold");
            Ok(())
        } else {
            Err(LicError::UnrepresentableAtVersion { what, version })
        }
    }

    fn write_template_block(&mut self, template: &Template) -> Result<()> {
        self.stream.write_string(&template.filename)?;
        if self.stream.has(Field::SeparatorVisibility) {
            self.stream.write_bool(template.separators_visible)?;
        } else if !template.separators_visible {
            self.drop_field("hidden step separators")?;
        }
        if self.stream.has(Field::PliIncludeSubmodels) {
            self.stream.write_bool(template.include_submodels)?;
        } else if template.include_submodels {
            self.drop_field("PLI submodel inclusion")?;
        }

        let with_submodels = self.stream.has(Field::SubmodelDictionary);
        if !with_submodels && template.store.submodels().next().is_some() {
            self.drop_field("template submodels")?;
        }
        self.write_dictionary(&template.store, with_submodels, &template.styles)?;

        let model = template.submodel().ok_or_else(|| LicError::Inconsistent {
            message: format!("template '{}' has no sample model", template.filename),
        })?;
        self.write_submodel(model, &template.store, &template.styles)?;

        if self.stream.has(Field::LegacyItemStyles) {
            let mut page = template.page.page.clone();
            push_legacy_styles(&mut page, &template.styles);
            self.write_page(&page, model, &template.store, &template.styles)?;
        } else {
            self.write_page(&template.page.page, model, &template.store, &template.styles)?;
        }

        if self.stream.has(Field::TemplateStaticInfo) {
            let info = template.static_info.clone().unwrap_or_default();
            self.write_static_info(&info)?;
        }
        if self.stream.has(Field::TemplateLightParameters) {
            self.stream.write_count(template.light_parameters.len())?;
            for value in &template.light_parameters {
                self.stream.write_f32(*value)?;
            }
        } else if !template.light_parameters.is_empty() {
            self.drop_field("light parameters")?;
        }
        Ok(())
    }

    fn write_dictionary(
        &mut self,
        store: &PartStore,
        with_submodels: bool,
        styles: &TemplateStyles,
    ) -> Result<()> {
        self.stream.write_count(store.plain_parts().count())?;
        for (_, part) in store.plain_parts() {
            self.write_abstract_part(part, store)?;
        }
        if with_submodels {
            self.stream.write_count(store.submodels().count())?;
            for (_, submodel) in store.submodels() {
                self.write_submodel(submodel, store, styles)?;
            }
        }
        Ok(())
    }

    fn write_color(&mut self, color: Option<&LicColor>) -> Result<()> {
        if !self.stream.has(Field::RgbaColor) {
            return self.stream.write_i32(color_code(color));
        }
        let Some(color) = color else {
            return self.stream.write_bool(false);
        };
        self.stream.write_bool(true)?;
        for channel in color.rgba {
            self.stream.write_f32(channel)?;
        }
        self.stream.write_string(&color.name)?;
        if self.stream.has(Field::ColorCode) {
            self.stream.write_i32(color.code)?;
        }
        Ok(())
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.stream.write_point(frame.pos)?;
        self.stream.write_rect(frame.rect)?;
        if self.stream.has(Field::LegacyItemStyles) {
            self.stream.write_pen(&frame.pen)?;
            self.stream.write_brush(&frame.brush)?;
            self.stream.write_i16(frame.corner_radius)?;
        }
        Ok(())
    }

    fn write_label(&mut self, label: &Label) -> Result<()> {
        self.stream.write_point(label.pos)?;
        self.stream.write_font(&label.font)
    }

    fn write_static_info(&mut self, info: &StaticInfo) -> Result<()> {
        self.stream.write_size(info.page_size)?;
        self.stream.write_f32(info.resolution)?;
        if self.stream.has(Field::PageNumberPosition) {
            self.stream.write_string(&info.number_pos)?;
        }
        if self.stream.has(Field::LegacyScales) {
            let legacy = info.legacy.unwrap_or_default();
            self.stream.write_f32(legacy.csi_scale)?;
            self.stream.write_f32(legacy.pli_scale)?;
            self.stream.write_f32(legacy.preview_scale)?;
            self.stream.write_f32x3(&legacy.csi_rotation)?;
            self.stream.write_f32x3(&legacy.pli_rotation)?;
            self.stream.write_f32x3(&legacy.preview_rotation)?;
        }
        Ok(())
    }

    fn write_primitive(&mut self, primitive: &Primitive) -> Result<()> {
        self.write_color(primitive.color.as_ref())?;
        self.stream.write_i16(primitive.kind.gl_mode())?;
        self.stream.write_i32(primitive.winding)?;
        for value in &primitive.points {
            self.stream.write_f32(*value)?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn write_placement(
        &mut self,
        filename: &str,
        invert: bool,
        color: Option<&LicColor>,
        matrix: &Matrix,
        in_callout: bool,
        page_number: i32,
        step_number: i32,
        is_in_pli: bool,
    ) -> Result<()> {
        self.stream.write_string(filename)?;
        self.stream.write_bool(invert)?;
        self.write_color(color)?;
        self.stream.write_matrix(matrix)?;
        self.stream.write_bool(in_callout)?;
        self.stream.write_i32(page_number)?;
        self.stream.write_i32(step_number)?;
        if self.stream.has(Field::PartInPli) {
            self.stream.write_bool(is_in_pli)?;
        } else if !is_in_pli {
            self.drop_field("PLI exclusion")?;
        }
        Ok(())
    }

    fn write_arrow(&mut self, arrow: &Arrow) -> Result<()> {
        self.write_placement(
            ARROW_FILENAME,
            arrow.invert,
            arrow.color.as_ref(),
            &arrow.matrix,
            arrow.in_callout,
            arrow.page_number,
            arrow.step_number,
            arrow.is_in_pli,
        )?;
        self.stream.write_bool(true)?;
        self.stream.write_f32x3(&arrow.offset)?;
        self.stream.write_i32(arrow.direction.0)?;
        self.stream.write_i32(arrow.length)?;
        self.stream.write_f32(arrow.axis_rotation)
    }

    /// Write a placement, storing `step_number` as its step.
    fn write_part(&mut self, part: &Part, step_number: i32) -> Result<()> {
        self.write_placement(
            &part.filename,
            part.invert,
            part.color.as_ref(),
            &part.matrix,
            part.in_callout,
            part.page_number,
            step_number,
            part.is_in_pli,
        )?;
        let Some(displacement) = &part.displacement else {
            return self.stream.write_bool(false);
        };
        self.stream.write_bool(true)?;
        self.stream.write_f32x3(&displacement.offset)?;
        self.stream.write_i32(displacement.direction.0)?;

        if self.stream.has(Field::MultipleArrows) {
            self.stream.write_count(displacement.arrows.len())?;
            for arrow in &displacement.arrows {
                self.write_arrow(arrow)?;
            }
            return Ok(());
        }
        match displacement.arrows.split_first() {
            Some((first, rest)) => {
                if !rest.is_empty() {
                    self.drop_field("additional displacement arrows")?;
                }
                self.write_arrow(first)
            }
            None => {
                let arrow = Arrow::new(displacement.direction, displacement.offset);
                self.write_arrow(&arrow)
            }
        }
    }

    fn write_abstract_part(&mut self, part: &AbstractPart, store: &PartStore) -> Result<()> {
        self.stream.write_string(&part.filename)?;
        self.stream.write_string(&part.name)?;
        self.stream.write_bool(part.is_primitive)?;
        let dims = &part.dimensions;
        self.stream.write_i32(dims.width)?;
        self.stream.write_i32(dims.height)?;
        self.stream.write_i32(dims.left_inset)?;
        self.stream.write_i32(dims.bottom_inset)?;
        self.stream.write_point(dims.center)?;
        self.stream.write_f32(part.pli_scale)?;
        self.stream.write_f32x3(&part.pli_rotation)?;

        self.stream.write_count(part.primitives.len())?;
        for primitive in &part.primitives {
            self.write_primitive(primitive)?;
        }
        self.stream.write_count(part.parts.len())?;
        for id in &part.parts {
            let child = instance(store, *id)?;
            self.write_part(child, child.step_number)?;
        }
        Ok(())
    }

    fn write_submodel(
        &mut self,
        model: &AbstractPart,
        store: &PartStore,
        styles: &TemplateStyles,
    ) -> Result<()> {
        let data = model.submodel().ok_or_else(|| LicError::Inconsistent {
            message: format!("'{}' is written as a submodel but has no pages", model.filename),
        })?;
        self.write_abstract_part(model, store)?;
        self.stream.write_count(data.pages.len())?;
        for page in &data.pages {
            self.write_page(page, model, store, styles)?;
        }
        self.stream.write_count(data.submodel_names.len())?;
        for name in &data.submodel_names {
            self.stream.write_string(name)?;
        }
        self.stream.write_i32(data.row)?;
        self.stream.write_string(&data.parent_name)?;
        self.stream.write_bool(data.is_sub_assembly)
    }

    fn write_annotations(&mut self, annotations: &[Annotation]) -> Result<()> {
        if !self.stream.has(Field::PageAnnotations) {
            if !annotations.is_empty() {
                self.drop_field("page annotations")?;
            }
            return Ok(());
        }
        self.stream.write_count(annotations.len())?;
        for annotation in annotations {
            self.stream.write_pixmap(&annotation.pixmap)?;
            self.stream.write_string(&annotation.filename)?;
            self.stream.write_point(annotation.pos)?;
            if self.stream.has(Field::AnnotationLayer) {
                self.stream.write_bool(annotation.is_annotation)?;
                self.stream.write_i32(annotation.z_value)?;
            }
        }
        Ok(())
    }

    fn write_custom_number(&mut self, number: Option<i32>) -> Result<()> {
        if !self.stream.has(Field::CustomNumber) {
            if number.is_some() {
                self.drop_field("custom page or step number")?;
            }
            return Ok(());
        }
        self.stream.write_bool(number.is_some())?;
        if let Some(number) = number {
            self.stream.write_i32(number)?;
        }
        Ok(())
    }

    fn write_page(
        &mut self,
        page: &Page,
        owner: &AbstractPart,
        store: &PartStore,
        styles: &TemplateStyles,
    ) -> Result<()> {
        self.stream.write_i32(page.number)?;
        self.stream.write_i32(page.row)?;
        self.write_frame(&page.frame)?;
        if self.stream.has(Field::LegacyItemStyles) {
            self.stream
                .write_rgba(&page.color.unwrap_or(styles.page_background))?;
        }
        self.stream.write_i32(page.layout_orientation)?;
        self.write_label(&page.number_item)?;
        self.write_custom_number(page.custom_number)?;

        self.stream.write_count(page.steps.len())?;
        for step in &page.steps {
            self.write_step(step, store)?;
        }
        self.stream.write_bool(page.submodel_item.is_some())?;
        if let Some(preview) = &page.submodel_item {
            self.write_preview(preview, &owner.dimensions)?;
        }
        self.stream.write_count(page.separators.len())?;
        for separator in &page.separators {
            self.stream.write_i32(separator.index)?;
            self.stream.write_point(separator.pos)?;
            self.stream.write_rect(separator.rect)?;
            self.stream.write_pen(&separator.pen)?;
            if self.stream.has(Field::SeparatorVisibility) {
                self.stream.write_bool(separator.enabled)?;
            }
        }
        self.write_annotations(&page.annotations)
    }

    fn write_csi(&mut self, csi: &Csi) -> Result<()> {
        self.stream.write_point(csi.pos)?;
        self.stream.write_i32(csi.width)?;
        self.stream.write_i32(csi.height)?;
        self.stream.write_point(csi.center)?;
        self.stream.write_f32(csi.scaling)?;
        self.stream.write_f32x3(&csi.rotation)
    }

    fn write_step(&mut self, step: &Step, store: &PartStore) -> Result<()> {
        self.stream.write_i32(step.number)?;
        self.stream.write_bool(step.pli.is_some())?;
        self.stream.write_bool(step.has_number_item)?;
        self.stream.write_point(step.pos)?;
        self.stream.write_rect(step.rect)?;
        self.stream.write_rect(step.max_rect)?;
        self.write_csi(&step.csi)?;
        if let Some(pli) = &step.pli {
            self.write_pli(pli)?;
        }
        self.stream.write_bool(step.pli_enabled)?;
        if step.has_number_item {
            self.write_label(&step.number_item)?;
        }

        self.stream.write_count(step.callouts.len())?;
        for callout in &step.callouts {
            self.write_callout(callout, store)?;
        }
        if self.stream.has(Field::StepRotateIcon) {
            self.stream.write_bool(step.rotate_icon.is_some())?;
            if let Some(icon) = &step.rotate_icon {
                self.write_frame(&icon.frame)?;
                if self.stream.has(Field::LegacyItemStyles) {
                    self.stream.write_pen(&icon.arrow_pen)?;
                }
            }
        } else if step.rotate_icon.is_some() {
            self.drop_field("rotate icon")?;
        }
        self.write_custom_number(step.custom_number)
    }

    fn write_pli(&mut self, pli: &Pli) -> Result<()> {
        self.write_frame(&pli.frame)?;
        self.stream.write_count(pli.items.len())?;
        for item in &pli.items {
            self.write_pli_item(item)?;
        }
        Ok(())
    }

    fn write_pli_item(&mut self, item: &PliItem) -> Result<()> {
        self.stream.write_string(&item.filename)?;
        self.write_color(item.color.as_ref())?;
        self.stream.write_i32(item.quantity)?;
        self.stream.write_point(item.pos)?;
        self.stream.write_rect(item.rect)?;
        self.write_label(&item.number_item)?;
        if !self.stream.has(Field::PliItemLengthIndicator) {
            if item.length_indicator.is_some() {
                self.drop_field("length indicator")?;
            }
            return Ok(());
        }
        self.stream.write_bool(item.length_indicator.is_some())?;
        if let Some(indicator) = &item.length_indicator {
            self.stream.write_point(indicator.pos)?;
            self.stream.write_rect(indicator.rect)?;
            self.stream.write_font(&indicator.font)?;
            self.stream.write_string(&indicator.text)?;
            self.stream.write_rgba(&indicator.label_color)?;
            self.stream.write_pen(&indicator.pen)?;
            self.stream.write_brush(&indicator.brush)?;
        }
        Ok(())
    }

    fn write_callout(&mut self, callout: &Callout, store: &PartStore) -> Result<()> {
        self.stream.write_i32(callout.number)?;
        self.stream.write_bool(callout.show_step_numbers)?;
        self.stream.write_i32(callout.border_fit)?;
        self.write_frame(&callout.frame)?;
        self.stream.write_point(callout.arrow.tip)?;
        self.stream.write_point(callout.arrow.base)?;
        if self.stream.has(Field::LegacyItemStyles) {
            self.stream.write_pen(&callout.arrow.pen)?;
            self.stream.write_brush(&callout.arrow.brush)?;
        }
        self.stream.write_bool(callout.quantity_label.is_some())?;
        if let Some(quantity) = &callout.quantity_label {
            self.write_label(&quantity.label)?;
            self.stream.write_i32(quantity.quantity)?;
        }
        self.stream.write_count(callout.steps.len())?;
        for step in &callout.steps {
            self.write_step(step, store)?;
        }

        let parts: Vec<(PartInstanceId, i32)> = callout
            .steps
            .iter()
            .flat_map(|step| step.csi.parts.iter().map(move |id| (*id, step.number)))
            .collect();
        self.stream.write_count(parts.len())?;
        for (id, step_number) in parts {
            self.write_part(instance(store, id)?, step_number)?;
        }
        Ok(())
    }

    fn write_preview(&mut self, preview: &SubmodelPreview, owner: &Dimensions) -> Result<()> {
        self.stream.write_i32(preview.row)?;
        self.write_frame(&preview.frame)?;
        self.stream.write_f32(preview.scaling)?;
        self.stream.write_f32x3(&preview.rotation)?;
        self.stream.write_bool(preview.is_sub_assembly)?;
        if preview.is_sub_assembly {
            match &preview.pli {
                Some(pli) => self.write_pli(pli)?,
                None => self.write_pli(&Pli::default())?,
            }
        }

        if self.stream.has(Field::SubmodelPreviewQuantity) {
            self.stream.write_bool(preview.quantity_label.is_some())?;
            if let Some(quantity) = &preview.quantity_label {
                self.stream.write_i32(quantity.quantity)?;
                self.write_label(&quantity.label)?;
            }
        } else if preview.quantity_label.is_some() {
            self.drop_field("submodel preview quantity")?;
        }

        if self.stream.has(Field::SubmodelPreviewDimensions) {
            let dims = preview.dimensions.unwrap_or_else(|| preview_dimensions(owner));
            self.stream.write_i32(dims.width)?;
            self.stream.write_i32(dims.height)?;
            self.stream.write_i32(dims.center_x)?;
            self.stream.write_i32(dims.center_y)?;
        } else if preview.dimensions.is_some() {
            self.drop_field("submodel preview dimensions")?;
        }
        Ok(())
    }

    fn write_title_page(
        &mut self,
        page: Option<&TitlePage>,
        main: &AbstractPart,
        styles: &TemplateStyles,
    ) -> Result<()> {
        let Some(page) = page else {
            return self.stream.write_bool(false);
        };
        self.stream.write_bool(true)?;
        self.write_frame(&page.frame)?;
        if self.stream.has(Field::LegacyItemStyles) {
            self.stream
                .write_rgba(&page.color.unwrap_or(styles.page_background))?;
        }
        self.stream.write_bool(page.submodel_item.is_some())?;
        if let Some(preview) = &page.submodel_item {
            self.write_preview(preview, &main.dimensions)?;
        }
        self.stream.write_count(page.labels.len())?;
        for label in &page.labels {
            self.stream.write_point(label.pos)?;
            self.stream.write_font(&label.font)?;
            self.stream.write_string(&label.text)?;
        }
        self.write_annotations(&page.annotations)
    }

    fn write_part_list_page(&mut self, page: &PartListPage, styles: &TemplateStyles) -> Result<()> {
        self.stream.write_i32(page.number)?;
        self.stream.write_i32(page.row)?;
        self.write_frame(&page.frame)?;
        if self.stream.has(Field::LegacyItemStyles) {
            self.stream
                .write_rgba(&page.color.unwrap_or(styles.page_background))?;
        }
        self.write_label(&page.number_item)?;
        self.write_pli(&page.pli)?;
        self.write_annotations(&page.annotations)
    }

    fn write_guides(&mut self, guides: &[Guide]) -> Result<()> {
        self.stream.write_count(guides.len())?;
        for guide in guides {
            self.stream.write_i32(guide.orientation)?;
            self.stream.write_point(guide.pos)?;
        }
        Ok(())
    }
}

fn instance(store: &PartStore, id: PartInstanceId) -> Result<&Part> {
    store.instance(id).ok_or_else(|| LicError::Inconsistent {
        message: format!("part instance {id} is referenced but not stored"),
    })
}

fn preview_dimensions(owner: &Dimensions) -> PreviewDimensions {
    PreviewDimensions {
        width: owner.width,
        height: owner.height,
        center_x: owner.center.x as i32,
        center_y: owner.center.y as i32,
    }
}

/// Put the template styles back on the sample items older versions keep
/// them on.
fn push_legacy_styles(page: &mut Page, styles: &TemplateStyles) {
    page.color = Some(styles.page_background);
    let Some(step) = page.steps.first_mut() else {
        return;
    };
    if let Some(callout) = step.callouts.first_mut() {
        callout.arrow.pen = styles.callout_arrow_pen.clone();
        callout.arrow.brush = styles.callout_arrow_brush.clone();
    }
    if let Some(icon) = step.rotate_icon.as_mut() {
        icon.arrow_pen = styles.rotate_icon_arrow_pen.clone();
    }
}

/// Serialise a document into a new buffer.
pub fn write_document(doc: &Document, options: &WriterOptions) -> Result<Vec<u8>> {
    LicWriter::with_options(Vec::new(), options.clone())?.write_document(doc)
}

/// Serialise a template into a new buffer.
pub fn write_template(template: &Template, options: &WriterOptions) -> Result<Vec<u8>> {
    LicWriter::with_options(Vec::new(), options.clone())?.write_template(template)
}
