use crate::io::mtl_loader::parse_mtl;
use crate::io::obj_loader::{parse_obj, parse_obj_grouped};
use crate::scene::material::MaterialTable;
use crate::scene::mesh::{GroupedMesh, ObjMesh};
use log::{error, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("loader thread exited without producing a result")]
    Worker,
}

/// Geometry grouped by material, plus the material table it refers to.
#[derive(Debug, Clone, Default)]
pub struct LoadedModel {
    pub mesh: GroupedMesh,
    pub materials: MaterialTable,
}

impl From<ObjMesh> for LoadedModel {
    fn from(mesh: ObjMesh) -> Self {
        Self {
            mesh: mesh.into_grouped(),
            materials: MaterialTable::new(),
        }
    }
}

fn read_text(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads and parses a geometry file. Parse diagnostics are logged, not returned.
pub fn load_geometry(path: impl AsRef<Path>) -> Result<ObjMesh, LoadError> {
    let path = path.as_ref();
    info!("Loading geometry: {}", path.display());

    let text = read_text(path)?;
    let mesh = parse_obj(&text).report(&path.display().to_string());

    info!(
        "Loaded {} positions, {} triangles",
        mesh.data.position_count(),
        mesh.indices.len() / 3
    );
    Ok(mesh)
}

/// Reads the material file, then the geometry file, and builds the grouped mesh.
/// Either read failing aborts the load.
pub fn load_model(
    geometry: impl AsRef<Path>,
    material: impl AsRef<Path>,
) -> Result<LoadedModel, LoadError> {
    let (geometry, material) = (geometry.as_ref(), material.as_ref());
    info!(
        "Loading model: {} with materials from {}",
        geometry.display(),
        material.display()
    );

    let material_text = read_text(material)?;
    let geometry_text = read_text(geometry)?;

    let materials = parse_mtl(&material_text).report(&material.display().to_string());
    let mesh = parse_obj_grouped(&geometry_text).report(&geometry.display().to_string());

    info!(
        "Loaded {} materials, {} groups, {} triangles",
        materials.len(),
        mesh.groups.len(),
        mesh.groups.triangle_count()
    );
    Ok(LoadedModel { mesh, materials })
}

/// Grouped load when a material file is given, geometry-only otherwise.
pub fn load(geometry: &Path, material: Option<&Path>) -> Result<LoadedModel, LoadError> {
    match material {
        Some(material) => load_model(geometry, material),
        None => load_geometry(geometry).map(LoadedModel::from),
    }
}

/// Handle to a load running on a worker thread.
pub struct PendingLoad<T> {
    receiver: Receiver<Result<T, LoadError>>,
}

impl<T: Send + 'static> PendingLoad<T> {
    fn spawn(name: &str, job: impl FnOnce() -> Result<T, LoadError> + Send + 'static) -> Self {
        let (sender, receiver) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || {
                // The receiver may already be gone; nothing to do then.
                let _ = sender.send(job());
            });

        if let Err(e) = spawned {
            // Dropping the sender makes the handle resolve to `LoadError::Worker`.
            error!("Failed to start loader thread: {}", e);
        }
        Self { receiver }
    }

    /// Non-blocking. `None` while the worker is still running.
    pub fn try_take(&self) -> Option<Result<T, LoadError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(LoadError::Worker)),
        }
    }

    pub fn wait(self) -> Result<T, LoadError> {
        self.receiver.recv().unwrap_or(Err(LoadError::Worker))
    }
}

pub fn spawn_geometry_load(path: PathBuf) -> PendingLoad<ObjMesh> {
    PendingLoad::spawn("geometry-loader", move || load_geometry(path))
}

pub fn spawn_model_load(geometry: PathBuf, material: PathBuf) -> PendingLoad<LoadedModel> {
    PendingLoad::spawn("model-loader", move || load_model(geometry, material))
}

pub fn spawn_load(geometry: PathBuf, material: Option<PathBuf>) -> PendingLoad<LoadedModel> {
    PendingLoad::spawn("model-loader", move || load(&geometry, material.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_geometry("does/not/exist.obj").unwrap_err();
        match err {
            LoadError::Read { path, source } => {
                assert_eq!(path, PathBuf::from("does/not/exist.obj"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn spawned_load_reports_failure_as_value() {
        let pending = spawn_model_load("missing.obj".into(), "missing.mtl".into());
        match pending.wait() {
            // The material file is read first.
            Err(LoadError::Read { path, .. }) => assert_eq!(path, PathBuf::from("missing.mtl")),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn geometry_only_mesh_converts_to_model() {
        let mesh = ObjMesh {
            indices: vec![0, 1, 2],
            ..Default::default()
        };
        let model = LoadedModel::from(mesh);
        assert!(model.materials.is_empty());
        assert_eq!(model.mesh.groups.get(None), Some(&[0, 1, 2][..]));
    }
}
