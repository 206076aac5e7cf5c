use super::path::path_to_markup;
use crate::state::GraphicsState;
use crate::util::context::Page;
use crate::util::helper::{Attributes, TransformExt};
use crate::Result;

/// Write the current path of the state as a clip path and make it the active
/// clip of the state. Elements drawn afterwards are grouped under it until the
/// state is restored.
pub fn render(page: &mut Page, state: &mut GraphicsState, id: String) -> Result<()> {
    if state.path.is_empty() {
        return Ok(());
    }

    let mut clip_attributes = Attributes::new();
    clip_attributes.insert("id", id.clone());
    page.begin("clipPath", &clip_attributes)?;

    let mut attributes = Attributes::new();
    attributes.insert("d", path_to_markup(&state.path, None));
    attributes.insert("transform", state.transform.to_svg_matrix());
    attributes.insert("clip-rule", "evenodd".to_string());
    page.empty("path", &attributes)?;

    page.end("clipPath")?;
    state.clip_path_id = Some(id);
    Ok(())
}
