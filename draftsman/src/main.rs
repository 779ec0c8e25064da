use std::rc::Rc;

use draftsman::{logging, Editor, Settings};
use draftsman_core::{factory::Factory, invalidate::InvalidationSink, DocumentGraph, NodeID};

/// Stands in for a renderer.
struct LogSink;
impl InvalidationSink for LogSink {
    fn redraw(&self, container: NodeID) {
        log::debug!("redraw {container}");
    }
    fn clear_render_cache(&self, is_zooming: bool) {
        log::debug!("clear render cache (zooming: {is_zooming})");
    }
}

fn main() -> anyhow::Result<()> {
    let settings = Settings::load();
    logging::init(settings.log_level);

    let mut graph = DocumentGraph::new();
    let built = Factory::new(&mut graph).default_project("Untitled");
    let mut editor = Editor::new(Rc::new(LogSink), &settings);
    editor.load(graph, built.project)?;

    let group = editor.edit(|writer| {
        let mut factory = writer.factory();
        let rectangle = factory.rectangle(10.0, 10.0, 110.0, 60.0, Some(built.style));
        let ellipse = factory.ellipse(130.0, 10.0, 230.0, 60.0, Some(built.style));
        writer.add_shapes(built.layer, &[rectangle, ellipse])?;
        writer.move_shapes(&[rectangle, ellipse], 5.0, 5.0)?;
        writer.group_shapes(built.layer, &[rectangle, ellipse])
    })?;
    log::info!("grouped into {group}, dirty: {}", editor.is_dirty());

    let mut undone = 0;
    while editor.undo() {
        undone += 1;
    }
    log::info!("undid {undone} edits");
    editor.mark_saved();
    editor.close();

    if let Err(e) = settings.save() {
        log::warn!("Failed to save settings:\n{e:?}");
    }
    Ok(())
}
