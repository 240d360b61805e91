//! The graph, its resources and the loader that fills them, bundled.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::assets::{AssetEvent, AssetLoader, AssetRequest, AssetSource};
use crate::graph::SceneGraph;
use crate::model::ModelData;
use crate::resources::{ModelHandle, SceneResources, TextureHandle};

pub struct Scene {
    pub graph: SceneGraph,
    pub resources: SceneResources,
    loader: AssetLoader,
    next_model: u32,
}

impl Scene {
    pub fn new(loader: AssetLoader) -> Self {
        Self {
            graph: SceneGraph::new(),
            resources: SceneResources::new(),
            loader,
            next_model: 0,
        }
    }

    /// A scene whose loads all run on the frame thread.
    pub fn inline(source: Arc<dyn AssetSource>) -> Self {
        Self::new(AssetLoader::inline(source))
    }

    /// Reserve a texture slot and start loading into it.
    pub fn request_texture(&mut self, path: impl Into<PathBuf>) -> TextureHandle {
        let handle = self.resources.reserve_texture();
        self.loader.submit(AssetRequest::Texture {
            handle,
            path: path.into(),
        });
        handle
    }

    pub fn request_model(&mut self, path: impl Into<PathBuf>) -> ModelHandle {
        let handle = ModelHandle(self.next_model);
        self.next_model += 1;
        self.loader.submit(AssetRequest::Model {
            handle,
            path: path.into(),
        });
        handle
    }

    /// Apply finished texture loads and hand back finished models.
    ///
    /// Failures are logged and otherwise dropped: a failed texture leaves its
    /// slot failed, a failed model is simply never returned.
    pub fn drain_assets(&mut self) -> Vec<(ModelHandle, ModelData)> {
        let mut models = Vec::new();
        for event in self.loader.drain() {
            match event {
                AssetEvent::Texture {
                    handle,
                    path,
                    result: Ok(data),
                } => {
                    info!(
                        "loaded texture {} ({}x{})",
                        path.display(),
                        data.width,
                        data.height
                    );
                    self.resources.fulfil_texture(handle, data);
                }
                AssetEvent::Texture {
                    handle,
                    result: Err(e),
                    ..
                } => {
                    warn!("texture load failed: {e}");
                    self.resources.fail_texture(handle);
                }
                AssetEvent::Model {
                    handle,
                    path,
                    result: Ok(model),
                } => {
                    info!(
                        "loaded model {} ({} primitives, {} vertices)",
                        path.display(),
                        model.primitives.len(),
                        model.vertex_count()
                    );
                    models.push((handle, model));
                }
                AssetEvent::Model { result: Err(e), .. } => {
                    warn!("model load failed: {e}");
                }
            }
        }
        models
    }

    /// Loads requested but not yet applied.
    pub fn pending_assets(&self) -> usize {
        self.loader.in_flight_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::tests::FakeSource;
    use crate::resources::TextureSlot;

    #[test]
    fn test_texture_results_fill_slots() {
        let mut scene = Scene::inline(Arc::new(FakeSource));
        let good = scene.request_texture("media/ok.jpg");
        let bad = scene.request_texture("media/missing.jpg");
        assert!(matches!(scene.resources.texture(good), Some(TextureSlot::Pending)));
        assert_eq!(scene.pending_assets(), 2);

        assert!(scene.drain_assets().is_empty());
        assert!(scene.resources.ready_texture(good).is_some());
        assert!(matches!(scene.resources.texture(bad), Some(TextureSlot::Failed)));
        assert_eq!(scene.pending_assets(), 0);
    }

    #[test]
    fn test_only_successful_models_are_returned() {
        let mut scene = Scene::inline(Arc::new(FakeSource));
        let good = scene.request_model("models/ok.obj");
        let bad = scene.request_model("models/missing.obj");
        assert_ne!(good, bad);

        let models = scene.drain_assets();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].0, good);
    }
}
