//! Record readers for the `.lic` / `.lit` stream.
//!
//! Each function consumes exactly one record in the order the writer
//! produced it. Presence of optional fields is decided by [`Field`] gates
//! against the stream version, never by ad-hoc comparisons.
//!
//! The readers build a partially linked graph: parts carry only their
//! target filename, submodels carry only their children's names. The
//! [`link`](crate::link) pass resolves everything once the whole stream
//! has been read.

use tracing::debug;

use lic_model::{
    ARROW_FILENAME, AbstractPart, Annotation, Arrow, COMPLEMENT_COLOR, CURRENT_COLOR, Callout,
    ColorTable, Csi, DisplaceDirection, Displacement, Frame, Guide, Label, LegacyScales,
    LengthIndicator, LicColor, Page, Part, PartListPage, Pen, Pli, PliItem, PreviewDimensions,
    Primitive, PrimitiveKind, QuantityLabel, RotateIcon, StaticInfo, Step, StepSeparator,
    SubmodelData, SubmodelPreview, Template, TemplatePage, TemplateStyles, TitleLabel, TitlePage,
};

use crate::context::LoadContext;
use crate::diagnostics::{DiagnosticKind, Diagnostics, LoadReport};
use crate::error::{LicError, Result};
use crate::gates::Field;
use crate::header::{HEADER_LEN, read_header};
use crate::link;
use crate::options::{FileKind, ReaderOptions};
use crate::stream::StreamReader;

/// A part record is either an ordinary placement or an arrow.
enum PartRecord {
    Part(Part),
    Arrow(Arrow),
}

pub(crate) fn read_color(r: &mut StreamReader<'_>, ctx: &mut LoadContext) -> Result<Option<LicColor>> {
    if !r.has(Field::RgbaColor) {
        let code = r.read_i32()?;
        if let Some(color) = ctx.colors.resolve(code) {
            return Ok(Some(color.clone()));
        }
        if code == CURRENT_COLOR || code == COMPLEMENT_COLOR {
            return Ok(None);
        }
        ctx.report(
            DiagnosticKind::UnknownColor,
            format!("colour code {code} is not in the palette"),
        )?;
        return Ok(Some(LicColor::new([0.0, 0.0, 0.0, 1.0], format!("Unknown {code}"), code)));
    }

    if !r.read_bool()? {
        return Ok(None);
    }
    let rgba = [r.read_f32()?, r.read_f32()?, r.read_f32()?, r.read_f32()?];
    let name = r.read_string()?;
    let code = if r.has(Field::ColorCode) {
        r.read_i32()?
    } else {
        ctx.colors
            .find_by_name(&name)
            .map_or(CURRENT_COLOR, |c| c.code)
    };

    match ctx.colors.get(code) {
        Some(known) => {
            if known.rgba != rgba || known.name != name {
                debug!(
                    code,
                    stored = %name,
                    palette = %known.name,
                    "stored colour differs from palette; using palette"
                );
            }
            Ok(Some(known.clone()))
        }
        None => Ok(Some(LicColor::new(rgba, name, code))),
    }
}

pub(crate) fn read_frame(r: &mut StreamReader<'_>) -> Result<Frame> {
    let mut frame = Frame::new(r.read_point()?, r.read_rect()?);
    if r.has(Field::LegacyItemStyles) {
        frame.pen = r.read_pen()?;
        frame.brush = r.read_brush()?;
        frame.corner_radius = r.read_i16()?;
    }
    Ok(frame)
}

fn read_label(r: &mut StreamReader<'_>) -> Result<Label> {
    Ok(Label {
        pos: r.read_point()?,
        font: r.read_font()?,
    })
}

pub(crate) fn read_static_info(r: &mut StreamReader<'_>) -> Result<StaticInfo> {
    let mut info = StaticInfo {
        page_size: r.read_size()?,
        resolution: r.read_f32()?,
        ..StaticInfo::default()
    };
    if r.has(Field::PageNumberPosition) {
        info.number_pos = r.read_string()?;
    }
    if r.has(Field::LegacyScales) {
        info.legacy = Some(LegacyScales {
            csi_scale: r.read_f32()?,
            pli_scale: r.read_f32()?,
            preview_scale: r.read_f32()?,
            csi_rotation: r.read_f32x3()?,
            pli_rotation: r.read_f32x3()?,
            preview_rotation: r.read_f32x3()?,
        });
    }
    Ok(info)
}

fn read_primitive(r: &mut StreamReader<'_>, ctx: &mut LoadContext) -> Result<Primitive> {
    let color = read_color(r, ctx)?;
    let mode = r.read_i16()?;
    let kind = PrimitiveKind::from_gl_mode(mode)
        .ok_or_else(|| LicError::invalid_format(format!("unknown primitive kind {mode}")))?;
    let winding = r.read_i32()?;
    let mut points = Vec::with_capacity(kind.coordinate_count());
    for _ in 0..kind.coordinate_count() {
        points.push(r.read_f32()?);
    }
    Ok(Primitive::new(color, kind, winding, points))
}

fn read_part_record(r: &mut StreamReader<'_>, ctx: &mut LoadContext) -> Result<PartRecord> {
    let offset = r.position();
    let filename = r.read_string()?;
    let invert = r.read_bool()?;
    let color = read_color(r, ctx)?;
    let matrix = r.read_matrix()?;
    let in_callout = r.read_bool()?;
    let page_number = r.read_i32()?;
    let step_number = r.read_i32()?;
    let is_in_pli = if r.has(Field::PartInPli) {
        r.read_bool()?
    } else {
        true
    };
    let is_arrow = filename == ARROW_FILENAME;

    let mut displacement = None;
    if r.read_bool()? {
        let vector = r.read_f32x3()?;
        let direction = DisplaceDirection(r.read_i32()?);
        let mut arrows = Vec::new();
        if !is_arrow {
            let count = if r.has(Field::MultipleArrows) {
                r.read_count()?
            } else {
                1
            };
            for _ in 0..count {
                arrows.push(read_arrow(r, ctx)?);
            }
        }
        displacement = Some(Displacement {
            offset: vector,
            direction,
            arrows,
        });
    }

    if is_arrow {
        let Some(displacement) = displacement else {
            return Err(LicError::invalid_format(format!(
                "arrow record at offset {offset} has no displacement"
            )));
        };
        return Ok(PartRecord::Arrow(Arrow {
            color,
            matrix,
            invert,
            in_callout,
            page_number,
            step_number,
            is_in_pli,
            offset: displacement.offset,
            direction: displacement.direction,
            length: r.read_i32()?,
            axis_rotation: r.read_f32()?,
        }));
    }

    Ok(PartRecord::Part(Part {
        filename,
        abstract_part: None,
        color,
        matrix,
        invert,
        in_callout,
        page_number,
        step_number,
        is_in_pli,
        displacement,
        callout_part: None,
        original_part: None,
    }))
}

fn read_arrow(r: &mut StreamReader<'_>, ctx: &mut LoadContext) -> Result<Arrow> {
    match read_part_record(r, ctx)? {
        PartRecord::Arrow(arrow) => Ok(arrow),
        PartRecord::Part(part) => Err(LicError::invalid_format(format!(
            "expected an arrow record, found part '{}'",
            part.filename
        ))),
    }
}

/// Read a part placement. Arrows are only valid inside a displacement.
pub(crate) fn read_part(r: &mut StreamReader<'_>, ctx: &mut LoadContext) -> Result<Part> {
    let offset = r.position();
    match read_part_record(r, ctx)? {
        PartRecord::Part(part) => Ok(part),
        PartRecord::Arrow(_) => Err(LicError::invalid_format(format!(
            "arrow record at offset {offset} outside a displacement"
        ))),
    }
}

/// Read a dictionary entry. Child placements are added to the context's
/// instance arena and referenced by id.
pub(crate) fn read_abstract_part(r: &mut StreamReader<'_>, ctx: &mut LoadContext) -> Result<AbstractPart> {
    let filename = r.read_string()?;
    let name = r.read_string()?;
    let mut part = AbstractPart::new(filename, name);
    part.is_primitive = r.read_bool()?;
    part.dimensions.width = r.read_i32()?;
    part.dimensions.height = r.read_i32()?;
    part.dimensions.left_inset = r.read_i32()?;
    part.dimensions.bottom_inset = r.read_i32()?;
    part.dimensions.center = r.read_point()?;
    part.pli_scale = r.read_f32()?;
    part.pli_rotation = r.read_f32x3()?;

    for _ in 0..r.read_count()? {
        let primitive = read_primitive(r, ctx)?;
        part.primitives.push(primitive);
    }
    for _ in 0..r.read_count()? {
        let child = read_part(r, ctx)?;
        part.parts.push(ctx.store.add_instance(child));
    }
    Ok(part)
}

pub(crate) fn read_submodel(r: &mut StreamReader<'_>, ctx: &mut LoadContext) -> Result<AbstractPart> {
    let mut part = read_abstract_part(r, ctx)?;
    let mut data = SubmodelData::default();
    for _ in 0..r.read_count()? {
        let page = read_page(r, ctx)?;
        data.pages.push(page);
    }
    for _ in 0..r.read_count()? {
        data.submodel_names.push(r.read_string()?);
    }
    data.row = r.read_i32()?;
    data.parent_name = r.read_string()?;
    data.is_sub_assembly = r.read_bool()?;
    part.submodel = Some(Box::new(data));
    Ok(part)
}

fn read_annotations(r: &mut StreamReader<'_>) -> Result<Vec<Annotation>> {
    let count = r.read_count()?;
    let mut annotations = Vec::with_capacity(count.min(r.remaining()));
    for _ in 0..count {
        let pixmap = r.read_pixmap()?;
        let filename = r.read_string()?;
        let mut annotation = Annotation::new(pixmap, filename, r.read_point()?);
        if r.has(Field::AnnotationLayer) {
            annotation.is_annotation = r.read_bool()?;
            annotation.z_value = r.read_i32()?;
        }
        annotations.push(annotation);
    }
    Ok(annotations)
}

fn read_page(r: &mut StreamReader<'_>, ctx: &mut LoadContext) -> Result<Page> {
    let number = r.read_i32()?;
    let row = r.read_i32()?;
    let mut page = Page::new(number, row);
    page.frame = read_frame(r)?;
    if r.has(Field::LegacyItemStyles) {
        page.color = Some(r.read_rgba()?);
    }
    page.layout_orientation = r.read_i32()?;
    page.number_item = read_label(r)?;
    if r.has(Field::CustomNumber) && r.read_bool()? {
        page.custom_number = Some(r.read_i32()?);
    }

    for _ in 0..r.read_count()? {
        let step = read_step(r, ctx)?;
        page.steps.push(step);
    }
    if r.read_bool()? {
        page.submodel_item = Some(read_preview(r, ctx)?);
    }
    for _ in 0..r.read_count()? {
        let mut separator = StepSeparator::new(r.read_i32()?);
        separator.pos = r.read_point()?;
        separator.rect = r.read_rect()?;
        separator.pen = r.read_pen()?;
        if r.has(Field::SeparatorVisibility) {
            separator.enabled = r.read_bool()?;
        }
        page.separators.push(separator);
    }
    if r.has(Field::PageAnnotations) {
        page.annotations = read_annotations(r)?;
    }
    Ok(page)
}

fn read_csi(r: &mut StreamReader<'_>) -> Result<Csi> {
    Ok(Csi {
        pos: r.read_point()?,
        width: r.read_i32()?,
        height: r.read_i32()?,
        center: r.read_point()?,
        scaling: r.read_f32()?,
        rotation: r.read_f32x3()?,
        dirty: false,
        ..Csi::default()
    })
}

fn read_step(r: &mut StreamReader<'_>, ctx: &mut LoadContext) -> Result<Step> {
    let number = r.read_i32()?;
    let has_pli = r.read_bool()?;
    let has_number_item = r.read_bool()?;
    let mut step = Step::new(number);
    step.has_number_item = has_number_item;
    step.pos = r.read_point()?;
    step.rect = r.read_rect()?;
    step.max_rect = r.read_rect()?;
    step.csi = read_csi(r)?;
    step.pli = if has_pli { Some(read_pli(r, ctx)?) } else { None };
    step.pli_enabled = r.read_bool()?;
    if has_number_item {
        step.number_item = read_label(r)?;
    }

    for _ in 0..r.read_count()? {
        let callout = read_callout(r, ctx)?;
        step.callouts.push(callout);
    }
    if r.has(Field::StepRotateIcon) && r.read_bool()? {
        let frame = read_frame(r)?;
        let arrow_pen = if r.has(Field::LegacyItemStyles) {
            r.read_pen()?
        } else {
            Pen::default()
        };
        step.rotate_icon = Some(RotateIcon { frame, arrow_pen });
    }
    if r.has(Field::CustomNumber) && r.read_bool()? {
        step.custom_number = Some(r.read_i32()?);
    }
    Ok(step)
}

fn read_pli(r: &mut StreamReader<'_>, ctx: &mut LoadContext) -> Result<Pli> {
    let mut pli = Pli {
        frame: read_frame(r)?,
        items: Vec::new(),
    };
    for _ in 0..r.read_count()? {
        let item = read_pli_item(r, ctx)?;
        pli.items.push(item);
    }
    Ok(pli)
}

fn read_pli_item(r: &mut StreamReader<'_>, ctx: &mut LoadContext) -> Result<PliItem> {
    let filename = r.read_string()?;
    let color = read_color(r, ctx)?;
    let mut item = PliItem::new(filename, color);
    item.quantity = r.read_i32()?;
    item.pos = r.read_point()?;
    item.rect = r.read_rect()?;
    item.number_item = read_label(r)?;
    if r.has(Field::PliItemLengthIndicator) && r.read_bool()? {
        item.length_indicator = Some(LengthIndicator {
            pos: r.read_point()?,
            rect: r.read_rect()?,
            font: r.read_font()?,
            text: r.read_string()?,
            label_color: r.read_rgba()?,
            pen: r.read_pen()?,
            brush: r.read_brush()?,
        });
    }
    Ok(item)
}

fn read_callout(r: &mut StreamReader<'_>, ctx: &mut LoadContext) -> Result<Callout> {
    let mut callout = Callout::new(r.read_i32()?);
    callout.show_step_numbers = r.read_bool()?;
    callout.border_fit = r.read_i32()?;
    callout.frame = read_frame(r)?;
    callout.arrow.tip = r.read_point()?;
    callout.arrow.base = r.read_point()?;
    if r.has(Field::LegacyItemStyles) {
        callout.arrow.pen = r.read_pen()?;
        callout.arrow.brush = r.read_brush()?;
    }
    if r.read_bool()? {
        let label = read_label(r)?;
        let quantity = r.read_i32()?;
        callout.quantity_label = Some(QuantityLabel { label, quantity });
    }
    for _ in 0..r.read_count()? {
        let step = read_step(r, ctx)?;
        callout.steps.push(step);
    }

    for _ in 0..r.read_count()? {
        let part = read_part(r, ctx)?;
        let step_number = part.step_number;
        let filename = part.filename.clone();
        let id = ctx.store.add_instance(part);
        match callout.step_mut(step_number) {
            Some(step) => step.csi.parts.push(id),
            None => ctx.report(
                DiagnosticKind::UnplacedPart,
                format!(
                    "callout {} part '{filename}' names step {step_number}, which the callout does not have",
                    callout.number
                ),
            )?,
        }
    }
    Ok(callout)
}

fn read_preview(r: &mut StreamReader<'_>, ctx: &mut LoadContext) -> Result<SubmodelPreview> {
    let mut preview = SubmodelPreview {
        row: r.read_i32()?,
        frame: read_frame(r)?,
        scaling: r.read_f32()?,
        rotation: r.read_f32x3()?,
        is_sub_assembly: r.read_bool()?,
        ..SubmodelPreview::default()
    };
    if preview.is_sub_assembly {
        preview.pli = Some(read_pli(r, ctx)?);
    }
    if r.has(Field::SubmodelPreviewQuantity) && r.read_bool()? {
        let quantity = r.read_i32()?;
        let label = read_label(r)?;
        preview.quantity_label = Some(QuantityLabel { label, quantity });
    }
    if r.has(Field::SubmodelPreviewDimensions) {
        preview.dimensions = Some(PreviewDimensions {
            width: r.read_i32()?,
            height: r.read_i32()?,
            center_x: r.read_i32()?,
            center_y: r.read_i32()?,
        });
    }
    Ok(preview)
}

pub(crate) fn read_title_page(r: &mut StreamReader<'_>, ctx: &mut LoadContext) -> Result<Option<TitlePage>> {
    if !r.read_bool()? {
        return Ok(None);
    }
    let mut page = TitlePage {
        frame: read_frame(r)?,
        ..TitlePage::default()
    };
    if r.has(Field::LegacyItemStyles) {
        page.color = Some(r.read_rgba()?);
    }
    if r.read_bool()? {
        page.submodel_item = Some(read_preview(r, ctx)?);
    }
    for _ in 0..r.read_count()? {
        page.labels.push(TitleLabel {
            pos: r.read_point()?,
            font: r.read_font()?,
            text: r.read_string()?,
        });
    }
    if r.has(Field::PageAnnotations) {
        page.annotations = read_annotations(r)?;
    }
    Ok(Some(page))
}

pub(crate) fn read_part_list_page(r: &mut StreamReader<'_>, ctx: &mut LoadContext) -> Result<PartListPage> {
    let number = r.read_i32()?;
    let row = r.read_i32()?;
    let mut page = PartListPage::new(number, row);
    page.frame = read_frame(r)?;
    if r.has(Field::LegacyItemStyles) {
        page.color = Some(r.read_rgba()?);
    }
    page.number_item = read_label(r)?;
    page.pli = read_pli(r, ctx)?;
    if r.has(Field::PageAnnotations) {
        page.annotations = read_annotations(r)?;
    }
    Ok(page)
}

pub(crate) fn read_guides(r: &mut StreamReader<'_>) -> Result<Vec<Guide>> {
    let mut guides = Vec::new();
    for _ in 0..r.read_count()? {
        guides.push(Guide {
            orientation: r.read_i32()?,
            pos: r.read_point()?,
        });
    }
    Ok(guides)
}

/// Read a whole part dictionary in one go: abstract parts, then (when the
/// stream carries one) the submodel section.
fn read_dictionary(r: &mut StreamReader<'_>, ctx: &mut LoadContext, with_submodels: bool) -> Result<()> {
    for _ in 0..r.read_count()? {
        let part = read_abstract_part(r, ctx)?;
        ctx.insert_entry(part)?;
    }
    if with_submodels {
        for _ in 0..r.read_count()? {
            let submodel = read_submodel(r, ctx)?;
            ctx.insert_entry(submodel)?;
        }
    }
    Ok(())
}

/// Read a template block and link it against its own dictionary.
///
/// The template gets a fresh [`LoadContext`]; its diagnostics are returned
/// for the caller to merge.
pub(crate) fn read_template_block(
    r: &mut StreamReader<'_>,
    colors: &ColorTable,
    strict: bool,
) -> Result<(Template, Diagnostics)> {
    let filename = r.read_string()?;
    let separators_visible = if r.has(Field::SeparatorVisibility) {
        r.read_bool()?
    } else {
        true
    };
    let include_submodels = if r.has(Field::PliIncludeSubmodels) {
        r.read_bool()?
    } else {
        false
    };

    let mut ctx = LoadContext::new(colors.clone(), strict);
    let with_submodels = r.has(Field::SubmodelDictionary);
    read_dictionary(r, &mut ctx, with_submodels)?;

    let mut model = read_submodel(r, &mut ctx)?;
    if let Some(data) = model.submodel_mut() {
        data.is_main = true;
        data.used = true;
    }
    let submodel = ctx.store.insert_unindexed(model);
    let page = TemplatePage::new(read_page(r, &mut ctx)?);

    let static_info = if r.has(Field::TemplateStaticInfo) {
        Some(read_static_info(r)?)
    } else {
        None
    };
    let mut light_parameters = Vec::new();
    if r.has(Field::TemplateLightParameters) {
        for _ in 0..r.read_count()? {
            light_parameters.push(r.read_f32()?);
        }
    }

    let LoadContext {
        store,
        mut diagnostics,
        ..
    } = ctx;
    let mut template = Template {
        filename,
        separators_visible,
        include_submodels,
        store,
        submodel,
        page,
        static_info,
        light_parameters,
        styles: TemplateStyles::default(),
    };

    if r.has(Field::LegacyItemStyles) {
        let complete = template.page.lift_legacy_styles(&mut template.styles);
        let has_callout = template
            .page
            .first_step()
            .is_some_and(|step| !step.callouts.is_empty());
        // Rotate icons only exist from version 3 on.
        if !complete && (!has_callout || r.has(Field::StepRotateIcon)) {
            diagnostics.report(
                DiagnosticKind::MissingTemplateItem,
                "template page lacks the sample callout or rotate icon carrying its styles",
            )?;
        }
    }
    link::link_template(&mut template, &mut diagnostics)?;
    Ok((template, diagnostics))
}

/// A template read from a standalone `.lit` file.
#[derive(Debug)]
pub struct LoadedTemplate {
    pub template: Template,
    pub report: LoadReport,
}

/// Read a standalone `.lit` template.
pub fn read_template(data: &[u8], options: &ReaderOptions) -> Result<LoadedTemplate> {
    let version = read_header(data, FileKind::Template, options)?;
    let mut reader = StreamReader::at(data, HEADER_LEN, version);
    let (template, diagnostics) =
        read_template_block(&mut reader, &ColorTable::ldraw(), options.strict)?;
    debug!(
        version,
        filename = %template.filename,
        trailing = reader.remaining(),
        "read template"
    );
    Ok(LoadedTemplate {
        template,
        report: LoadReport {
            version,
            diagnostics: diagnostics.into_vec(),
        },
    })
}
