//! Placing a loaded PDF on the canvas.

use super::PdfDocument;
use crate::camera::{CameraBehavior, CameraConstraints, CameraOptions, InitialZoom};
use crate::config::PdfConfig;
use crate::editor::{Editor, SideEffectId};
use crate::error::EditorResult;
use crate::shapes::{
    Asset, AssetId, ImageFormat, ImageProps, ParentId, Shape, ShapeId, ShapeProps, ShapeUpdate,
};
use kurbo::{Point, Rect, Vec2};
use std::collections::HashSet;
use std::rc::Rc;

/// Name given to page image assets.
const PAGE_ASSET_NAME: &str = "page";

/// A PDF placed on the canvas. Call [`AppliedPdf::dispose`] to take it off again.
#[derive(Debug)]
pub struct AppliedPdf {
    config: PdfConfig,
    shape_ids: Rc<[ShapeId]>,
    asset_ids: Vec<AssetId>,
    side_effects: Vec<SideEffectId>,
    bounds: Option<Rect>,
    is_mobile: bool,
}

/// Put the pages of `pdf` on the canvas as locked images below every other
/// shape and constrain the camera to them.
pub fn apply_pdf_to_editor(
    editor: &mut dyn Editor,
    pdf: &PdfDocument,
    config: &PdfConfig,
) -> EditorResult<AppliedPdf> {
    let asset_ids: Vec<AssetId> = pdf.pages.iter().map(|page| page.asset_id).collect();
    let new_assets: Vec<AssetId> = asset_ids
        .iter()
        .copied()
        .filter(|id| editor.asset(*id).is_none())
        .collect();
    editor.create_assets(
        pdf.pages
            .iter()
            .map(|page| Asset {
                id: page.asset_id,
                src: page.src.clone(),
                w: page.bounds.width(),
                h: page.bounds.height(),
                format: ImageFormat::Png,
                name: PAGE_ASSET_NAME.to_string(),
                is_animated: false,
            })
            .collect(),
    );

    let shapes = pdf
        .pages
        .iter()
        .map(|page| {
            Shape::new(ShapeProps::Image(ImageProps::new(
                page.asset_id,
                page.bounds.width(),
                page.bounds.height(),
            )))
            .with_id(page.shape_id)
            .at(page.bounds.origin())
            .locked(true)
        })
        .collect();
    if let Err(err) = editor.create_shapes(shapes) {
        editor.delete_assets(&new_assets);
        return Err(err);
    }

    let shape_ids: Rc<[ShapeId]> = pdf.page_shape_ids().into();
    let locked: HashSet<ShapeId> = shape_ids.iter().copied().collect();

    let before_change = editor.register_before_change_handler(Rc::new(
        move |prev: &Shape, next: Shape| {
            if !locked.contains(&next.id) || next.is_locked {
                return next;
            }
            Shape {
                is_locked: true,
                ..prev.clone()
            }
        },
    ));

    keep_pages_at_bottom(editor, &shape_ids);
    let pages = shape_ids.clone();
    let after_create = editor.register_after_create_handler(Rc::new(
        move |editor: &mut dyn Editor, _: &Shape| keep_pages_at_bottom(editor, &pages),
    ));
    let pages = shape_ids.clone();
    let after_change = editor.register_after_change_handler(Rc::new(
        move |editor: &mut dyn Editor, _: &Shape| keep_pages_at_bottom(editor, &pages),
    ));

    let mut applied = AppliedPdf {
        config: config.clone(),
        shape_ids,
        asset_ids,
        side_effects: vec![before_change, after_create, after_change],
        bounds: pdf.bounds(),
        is_mobile: false,
    };
    applied.is_mobile = applied.viewport_is_mobile(editor);
    applied.update_camera_bounds(editor);

    log::info!("Applied {} ({} pages)", pdf.name, pdf.page_count());
    Ok(applied)
}

impl AppliedPdf {
    pub fn shape_ids(&self) -> &[ShapeId] {
        &self.shape_ids
    }

    pub fn asset_ids(&self) -> &[AssetId] {
        &self.asset_ids
    }

    /// Whether the camera currently uses the narrow-viewport padding.
    pub fn is_mobile(&self) -> bool {
        self.is_mobile
    }

    /// Re-apply the camera constraints if the viewport crossed the mobile
    /// breakpoint. Returns whether anything changed.
    pub fn on_viewport_changed(&mut self, editor: &mut dyn Editor) -> bool {
        let is_mobile = self.viewport_is_mobile(editor);
        if is_mobile == self.is_mobile {
            return false;
        }
        self.is_mobile = is_mobile;
        self.update_camera_bounds(editor);
        true
    }

    /// Unregister the side effects, then delete the page shapes and assets
    /// that still exist.
    pub fn dispose(self, editor: &mut dyn Editor) {
        for id in &self.side_effects {
            editor.unregister_side_effect(*id);
        }

        let existing: Vec<ShapeId> = self
            .shape_ids
            .iter()
            .copied()
            .filter(|id| editor.shape(*id).is_some())
            .collect();
        if !existing.is_empty() {
            editor.update_shapes(
                existing
                    .iter()
                    .map(|id| ShapeUpdate::new(*id).locked(false))
                    .collect(),
            );
            editor.delete_shapes(&existing);
        }

        let existing_assets: Vec<AssetId> = self
            .asset_ids
            .iter()
            .copied()
            .filter(|id| editor.asset(*id).is_some())
            .collect();
        if !existing_assets.is_empty() {
            editor.delete_assets(&existing_assets);
        }
    }

    fn viewport_is_mobile(&self, editor: &dyn Editor) -> bool {
        editor.viewport_screen_bounds().width() < self.config.mobile_breakpoint
    }

    fn update_camera_bounds(&self, editor: &mut dyn Editor) {
        let Some(bounds) = self.bounds else {
            return;
        };
        let padding_x = if self.is_mobile {
            self.config.mobile_padding_x
        } else {
            self.config.desktop_padding_x
        };
        editor.set_camera_options(CameraOptions {
            constraints: Some(CameraConstraints {
                bounds,
                padding: Vec2::new(padding_x, self.config.padding_y),
                origin: Point::new(0.5, 0.0),
                initial_zoom: InitialZoom::FitX100,
                behavior: CameraBehavior::Contain,
            }),
        });
        editor.reset_camera();
    }
}

/// Move the page shapes under every other shape on the page, keeping their
/// order, unless they are already the bottom-most ones.
fn keep_pages_at_bottom(editor: &mut dyn Editor, page_ids: &[ShapeId]) {
    let mut pages: Vec<(usize, ShapeId)> = page_ids
        .iter()
        .filter_map(|&id| Some((editor.z_index(id)?, id)))
        .collect();
    if pages.is_empty() {
        return;
    }
    pages.sort();
    let pages: Vec<ShapeId> = pages.into_iter().map(|(_, id)| id).collect();

    let siblings = editor.sorted_child_ids(ParentId::Page);
    if siblings.len() >= pages.len() && siblings[..pages.len()] == pages[..] {
        return;
    }
    if !siblings.iter().any(|id| !page_ids.contains(id)) {
        return;
    }
    log::debug!("Moving {} PDF page(s) back to the bottom", pages.len());
    editor.send_to_back(&pages);
}
