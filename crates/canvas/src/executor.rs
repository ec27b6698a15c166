//! Applies [`Action`]s to an [`Editor`].

use crate::{Action, ActionResult, Editor, EditorError, RenderSink, Target};
use history::Command;
use log::{debug, warn};
use node::{Bounds, Element, ElementId, ElementKind, Point, Transform};

impl<R: RenderSink> Editor<R> {
    /// Applies an action, reporting failures in the result instead of as an
    /// error.
    pub fn apply_action(&mut self, action: Action) -> ActionResult {
        match self.try_apply_action(action) {
            Ok(result) => result,
            Err(err) => {
                warn!("action failed: {err}");
                ActionResult::error(err.to_string())
            }
        }
    }

    /// Applies an action. Every edit it makes is recorded in the history.
    pub fn try_apply_action(&mut self, action: Action) -> Result<ActionResult, EditorError> {
        debug!("applying {action:?}");
        match action {
            Action::CreateShape {
                shape,
                parent,
                fill,
                stroke,
                opacity,
                transform,
            } => {
                let mut element = Element::new(self.next_id(), shape).with_style(self.config().default_style);
                if let Some(fill) = fill {
                    element = element.with_fill(fill.color());
                }
                if let Some(stroke) = stroke {
                    element = element.with_stroke(Some(stroke.color), stroke.width);
                }
                if let Some(opacity) = opacity {
                    element = element.with_opacity(opacity);
                }
                if let Some(transform) = transform {
                    element = element.with_transform(transform);
                }
                let id = self.insert(parent, element)?;
                Ok(ActionResult::created(vec![id]))
            }

            Action::Delete { target } => {
                let ids = self.resolve_target(&target)?;
                if ids.is_empty() {
                    return Ok(ActionResult::success());
                }
                let deleted = self.delete(&ids)?;
                Ok(ActionResult::deleted(deleted))
            }

            Action::Select {
                target,
                add_to_selection,
            } => {
                let ids = self.resolve_target(&target)?;
                self.select(&ids, add_to_selection)?;
                Ok(ActionResult::success())
            }

            Action::SelectAt { point, additive } => {
                self.select_at(point, additive);
                Ok(ActionResult::success())
            }

            Action::SelectInRect { min, max, additive } => {
                self.select_in_rect(Bounds::from_corners(min, max), additive);
                Ok(ActionResult::success())
            }

            Action::ClearSelection => {
                self.clear_selection();
                Ok(ActionResult::success())
            }

            Action::SelectAll => {
                self.select_all();
                Ok(ActionResult::success())
            }

            Action::Move { target, delta } => self.edit_targets(&target, |editor, ids| editor.translate(ids, delta)),

            Action::Rotate {
                target,
                degrees,
                pivot,
            } => self.edit_targets(&target, |editor, ids| {
                let pivot = pivot.unwrap_or_else(|| editor.pivot_of(ids));
                editor.transform(ids, Transform::rotate_about(degrees, pivot))
            }),

            Action::Scale { target, factor, pivot } => self.edit_targets(&target, |editor, ids| {
                let pivot = pivot.unwrap_or_else(|| editor.pivot_of(ids));
                editor.transform(ids, Transform::scale_about(factor.x, factor.y, pivot))
            }),

            Action::Transform { target, transform } => {
                self.edit_targets(&target, |editor, ids| editor.transform(ids, transform))
            }

            Action::SetFill { target, fill } => self.update_targets(&target, |element| element.style.fill = fill.color()),

            Action::SetStroke { target, stroke } => self.update_targets(&target, |element| match stroke {
                Some(stroke) => {
                    element.style.stroke = Some(stroke.color);
                    element.style.stroke_width = stroke.width;
                }
                None => element.style.stroke = None,
            }),

            Action::SetOpacity { target, opacity } => {
                self.update_targets(&target, |element| element.style.opacity = opacity)
            }

            Action::SetCornerRadius { target, radius } => {
                let ids = self.resolve_target(&target)?;
                let rects: Vec<_> = ids
                    .into_iter()
                    .filter(|&id| matches!(self.scene().find(id).map(|e| &e.kind), Some(ElementKind::Rect { .. })))
                    .collect();
                self.update_targets(&Target::Elements(rects), |element| {
                    if let ElementKind::Rect { rx, .. } = &mut element.kind {
                        *rx = radius;
                    }
                })
            }

            Action::Group { target } => {
                let ids = self.resolve_target(&target)?;
                if ids.is_empty() {
                    return Err(EditorError::EmptySelection);
                }
                let group = self.group(&ids)?;
                Ok(ActionResult::Success {
                    created: vec![group],
                    modified: ids,
                    deleted: vec![],
                })
            }

            Action::Ungroup { target } => {
                let ids = self.resolve_target(&target)?;
                let groups: Vec<_> = ids
                    .iter()
                    .copied()
                    .filter(|&id| self.scene().find(id).is_some_and(Element::is_group))
                    .collect();
                let released = self.ungroup(&groups)?;
                Ok(ActionResult::Success {
                    created: vec![],
                    modified: released,
                    deleted: groups,
                })
            }

            Action::BringForward { target } => self.reorder_targets(&target, Self::bring_forward),

            Action::SendBackward { target } => self.reorder_targets(&target, Self::send_backward),

            Action::BringToFront { target } => self.reorder_targets(&target, Self::bring_to_front),

            Action::SendToBack { target } => self.reorder_targets(&target, Self::send_to_back),

            Action::SetTool { tool } => {
                self.set_tool(tool);
                Ok(ActionResult::success())
            }

            Action::Undo => {
                self.undo()?;
                Ok(ActionResult::success())
            }

            Action::Redo => {
                self.redo()?;
                Ok(ActionResult::success())
            }

            Action::Batch { actions } => {
                let mut result = ActionResult::success();
                for action in actions {
                    result = result.merge(self.try_apply_action(action)?);
                }
                Ok(result)
            }
        }
    }

    /// Ids an action targets. Explicit ids must exist.
    pub fn resolve_target(&self, target: &Target) -> Result<Vec<ElementId>, EditorError> {
        let ids = match target {
            Target::Selection => self.selection().ids().to_vec(),
            Target::Element(id) => vec![*id],
            Target::Elements(ids) => ids.clone(),
            Target::All => self.scene().root_ids(),
        };
        if let Some(&missing) = ids.iter().find(|&&id| !self.scene().contains(id)) {
            return Err(EditorError::NotFound(missing));
        }
        Ok(ids)
    }

    /// Center of the combined world bounds of `ids`.
    fn pivot_of(&self, ids: &[ElementId]) -> Point {
        self.bounds_of(ids).map_or(Point::ZERO, |bounds| bounds.center())
    }

    fn edit_targets(
        &mut self,
        target: &Target,
        edit: impl FnOnce(&mut Self, &[ElementId]) -> Result<(), EditorError>,
    ) -> Result<ActionResult, EditorError> {
        let ids = self.resolve_target(target)?;
        if ids.is_empty() {
            return Ok(ActionResult::success());
        }
        edit(self, &ids)?;
        Ok(ActionResult::modified(ids))
    }

    fn update_targets(
        &mut self,
        target: &Target,
        change: impl FnMut(&mut Element),
    ) -> Result<ActionResult, EditorError> {
        self.edit_targets(target, |editor, ids| {
            let command = Command::update_each(editor.scene(), ids, change)?;
            editor.execute(command)
        })
    }

    fn reorder_targets(
        &mut self,
        target: &Target,
        reorder: fn(&mut Self, &[ElementId]) -> Result<usize, EditorError>,
    ) -> Result<ActionResult, EditorError> {
        let ids = self.resolve_target(target)?;
        if reorder(self, &ids)? == 0 {
            return Ok(ActionResult::success());
        }
        Ok(ActionResult::modified(ids))
    }
}
