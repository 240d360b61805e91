//! Background asset loading with a completion queue.
//!
//! Requests return a handle immediately. Worker threads decode the file and
//! post an [`AssetEvent`]; the frame thread collects them with
//! [`AssetLoader::drain`] at one fixed point in the frame, so a finished load
//! can never race the update step.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, warn};

use crate::model::{ModelData, import_obj};
use crate::resources::{ModelHandle, TextureData, TextureHandle};

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("failed to import model {}: {source}", path.display())]
    Model {
        path: PathBuf,
        source: tobj::LoadError,
    },
    #[error("model {} has no triangle faces", path.display())]
    EmptyModel { path: PathBuf },
}

/// Where asset bytes come from.
pub trait AssetSource: Send + Sync {
    fn load_texture(&self, path: &Path) -> Result<TextureData, AssetError>;
    fn load_model(&self, path: &Path) -> Result<ModelData, AssetError>;
}

/// Loads assets from disk, relative to a root directory.
#[derive(Clone, Debug)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl AssetSource for FsAssetSource {
    fn load_texture(&self, path: &Path) -> Result<TextureData, AssetError> {
        let full = self.resolve(path);
        let bytes = std::fs::read(&full).map_err(|source| AssetError::Io {
            path: full.clone(),
            source,
        })?;
        let image = image::load_from_memory(&bytes)
            .map_err(|source| AssetError::Image { path: full, source })?
            .to_rgba8();
        Ok(TextureData {
            width: image.width(),
            height: image.height(),
            rgba: image.into_raw(),
        })
    }

    fn load_model(&self, path: &Path) -> Result<ModelData, AssetError> {
        let full = self.resolve(path);
        if let Err(source) = std::fs::metadata(&full) {
            return Err(AssetError::Io { path: full, source });
        }
        import_obj(&full)
    }
}

/// One load to perform.
#[derive(Clone, Debug, PartialEq)]
pub enum AssetRequest {
    Texture { handle: TextureHandle, path: PathBuf },
    Model { handle: ModelHandle, path: PathBuf },
}

/// A finished load, successful or not.
#[derive(Debug)]
pub enum AssetEvent {
    Texture {
        handle: TextureHandle,
        path: PathBuf,
        result: Result<TextureData, AssetError>,
    },
    Model {
        handle: ModelHandle,
        path: PathBuf,
        result: Result<ModelData, AssetError>,
    },
}

fn run(source: &dyn AssetSource, request: AssetRequest) -> AssetEvent {
    match request {
        AssetRequest::Texture { handle, path } => {
            let result = source.load_texture(&path);
            AssetEvent::Texture {
                handle,
                path,
                result,
            }
        }
        AssetRequest::Model { handle, path } => {
            let result = source.load_model(&path);
            AssetEvent::Model {
                handle,
                path,
                result,
            }
        }
    }
}

/// Fire-and-forget asset loads on a small pool of named worker threads.
///
/// With zero workers every request is loaded on the calling thread, but its
/// event is still only delivered by [`drain`](Self::drain).
pub struct AssetLoader {
    source: Arc<dyn AssetSource>,
    request_sender: Option<Sender<AssetRequest>>,
    event_sender: Sender<AssetEvent>,
    event_receiver: Receiver<AssetEvent>,
    workers: Vec<JoinHandle<()>>,
    in_flight: Arc<AtomicUsize>,
}

impl AssetLoader {
    pub fn new(source: Arc<dyn AssetSource>, worker_count: usize) -> Self {
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<AssetRequest>();
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let mut workers = Vec::with_capacity(worker_count);
        for i in 0..worker_count {
            let rx = request_rx.clone();
            let tx = event_tx.clone();
            let src = Arc::clone(&source);
            let spawned = std::thread::Builder::new()
                .name(format!("asset-loader-{i}"))
                .spawn(move || {
                    while let Ok(request) = rx.recv() {
                        let _ = tx.send(run(src.as_ref(), request));
                    }
                });
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => warn!("failed to spawn asset loader thread: {e}"),
            }
        }
        if worker_count > 0 && workers.is_empty() {
            warn!("no asset loader threads available; loading on the frame thread");
        }

        Self {
            source,
            request_sender: (!workers.is_empty()).then_some(request_tx),
            event_sender: event_tx,
            event_receiver: event_rx,
            workers,
            in_flight,
        }
    }

    /// A loader that performs every load during [`submit`](Self::submit).
    pub fn inline(source: Arc<dyn AssetSource>) -> Self {
        Self::new(source, 0)
    }

    pub fn submit(&self, request: AssetRequest) {
        debug!("queueing asset load: {request:?}");
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        let request = match &self.request_sender {
            Some(sender) => match sender.send(request) {
                Ok(()) => return,
                Err(crossbeam_channel::SendError(request)) => request,
            },
            None => request,
        };
        let _ = self.event_sender.send(run(self.source.as_ref(), request));
    }

    /// Every event completed since the last drain, in completion order.
    pub fn drain(&self) -> Vec<AssetEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_receiver.try_recv() {
            events.push(event);
        }
        self.in_flight.fetch_sub(events.len(), Ordering::Relaxed);
        events
    }

    /// Requests submitted but not yet drained.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stop accepting background work and join the workers.
    pub fn shutdown(&mut self) {
        self.request_sender.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for AssetLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    /// Serves a 2x2 texture and a one-triangle model for any path containing
    /// "ok"; everything else is missing.
    pub(crate) struct FakeSource;

    fn missing(path: &Path) -> AssetError {
        AssetError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        }
    }

    pub(crate) fn triangle_model() -> ModelData {
        use crate::model::ModelPrimitive;
        use glam::Vec3;

        ModelData {
            primitives: vec![ModelPrimitive {
                mesh: orrery_mesh::Mesh {
                    positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
                    normals: vec![Vec3::Z; 3],
                    uvs: vec![[0.0, 0.0]; 3],
                    indices: vec![0, 1, 2],
                },
                texture: Some(TextureData::solid(1, 1, [9, 9, 9, 255])),
                base_color: crate::material::Color::WHITE,
            }],
        }
    }

    impl AssetSource for FakeSource {
        fn load_texture(&self, path: &Path) -> Result<TextureData, AssetError> {
            if path.to_string_lossy().contains("ok") {
                Ok(TextureData::solid(2, 2, [255, 0, 0, 255]))
            } else {
                Err(missing(path))
            }
        }

        fn load_model(&self, path: &Path) -> Result<ModelData, AssetError> {
            if path.to_string_lossy().contains("ok") {
                Ok(triangle_model())
            } else {
                Err(missing(path))
            }
        }
    }

    fn drain_until(loader: &AssetLoader, count: usize) -> Vec<AssetEvent> {
        let start = Instant::now();
        let mut events = Vec::new();
        while events.len() < count {
            events.extend(loader.drain());
            assert!(
                start.elapsed() < Duration::from_secs(5),
                "timed out waiting for asset events"
            );
            std::thread::sleep(Duration::from_millis(1));
        }
        events
    }

    #[test]
    fn test_inline_loader_defers_delivery_to_drain() {
        let loader = AssetLoader::inline(Arc::new(FakeSource));
        loader.submit(AssetRequest::Texture {
            handle: TextureHandle(0),
            path: "ok.png".into(),
        });
        assert_eq!(loader.in_flight_count(), 1);

        let events = loader.drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            AssetEvent::Texture { handle: TextureHandle(0), result: Ok(t), .. } if t.width == 2
        ));
        assert_eq!(loader.in_flight_count(), 0);
        assert!(loader.drain().is_empty());
    }

    #[test]
    fn test_worker_threads_report_success_and_failure() {
        let loader = AssetLoader::new(Arc::new(FakeSource), 2);
        assert_eq!(loader.worker_count(), 2);
        loader.submit(AssetRequest::Model {
            handle: ModelHandle(1),
            path: "ok.obj".into(),
        });
        loader.submit(AssetRequest::Model {
            handle: ModelHandle(2),
            path: "gone.obj".into(),
        });

        let events = drain_until(&loader, 2);
        let mut ok = 0;
        let mut failed = 0;
        for event in events {
            match event {
                AssetEvent::Model { result: Ok(_), handle, .. } => {
                    assert_eq!(handle, ModelHandle(1));
                    ok += 1;
                }
                AssetEvent::Model { result: Err(AssetError::Io { .. }), handle, .. } => {
                    assert_eq!(handle, ModelHandle(2));
                    failed += 1;
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert_eq!((ok, failed), (1, 1));
    }

    #[test]
    fn test_shutdown_falls_back_to_inline_loading() {
        let mut loader = AssetLoader::new(Arc::new(FakeSource), 1);
        loader.shutdown();
        loader.submit(AssetRequest::Texture {
            handle: TextureHandle(4),
            path: "ok.jpg".into(),
        });
        assert_eq!(loader.drain().len(), 1);
    }

    #[test]
    fn test_fs_source_decodes_png_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let image = image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]));
        image.save(dir.path().join("tile.png")).unwrap();

        let source = FsAssetSource::new(dir.path());
        let texture = source.load_texture(Path::new("tile.png")).unwrap();
        assert_eq!((texture.width, texture.height), (4, 2));
        assert!(texture.is_consistent());
        assert_eq!(&texture.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_fs_source_reports_missing_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.png"), b"not an image").unwrap();
        let source = FsAssetSource::new(dir.path());

        assert!(matches!(
            source.load_texture(Path::new("absent.jpg")),
            Err(AssetError::Io { .. })
        ));
        assert!(matches!(
            source.load_texture(Path::new("bad.png")),
            Err(AssetError::Image { .. })
        ));
        assert!(matches!(
            source.load_model(Path::new("models/sat.obj")),
            Err(AssetError::Io { .. })
        ));
    }
}
