use crate::core::math::transform::TransformFactory;
use crate::io::loader::LoadedModel;
use crate::pipeline::backend::RenderBackend;
use crate::scene::camera::Camera;
use crate::scene::palette::Palette;
use crate::ui::input::{OrientationTracker, RotationDelta};
use log::debug;
use nalgebra::Matrix4;

/// Running model rotation since session start, plus the fixed display scale.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOrientation {
    cumulative: Matrix4<f32>,
    pub scale: f32,
}

impl ModelOrientation {
    pub fn new(scale: f32) -> Self {
        Self {
            cumulative: Matrix4::identity(),
            scale,
        }
    }

    /// Tilt by `vertical` about X, then turn by `horizontal` about Y.
    pub fn increment(delta: RotationDelta) -> Matrix4<f32> {
        TransformFactory::rotation_x(delta.vertical) * TransformFactory::rotation_y(delta.horizontal)
    }

    /// Composes the new increment on top of everything applied so far.
    pub fn apply(&mut self, delta: RotationDelta) {
        self.cumulative = Self::increment(delta) * self.cumulative;
    }

    pub fn cumulative(&self) -> Matrix4<f32> {
        self.cumulative
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        self.cumulative * TransformFactory::scaling(self.scale)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: usize,
    pub triangles: usize,
}

/// Owns a loaded model and draws it, one call per material group, every frame.
pub struct RenderLoop {
    pub model: LoadedModel,
    pub palette: Palette,
    pub camera: Camera,
    pub orientation: ModelOrientation,
    normals: Vec<f32>,
    needs_upload: bool,
}

impl RenderLoop {
    pub fn new(
        model: LoadedModel,
        palette: Palette,
        camera: Camera,
        orientation: ModelOrientation,
    ) -> Self {
        let normals = model.mesh.data.vertex_normals();
        Self {
            model,
            palette,
            camera,
            orientation,
            normals,
            needs_upload: true,
        }
    }

    /// Swaps in a freshly loaded model. The accumulated orientation is kept.
    pub fn replace_model(&mut self, model: LoadedModel) {
        self.normals = model.mesh.data.vertex_normals();
        self.model = model;
        self.needs_upload = true;
    }

    pub fn frame(
        &mut self,
        backend: &mut impl RenderBackend,
        tracker: &mut OrientationTracker,
    ) -> FrameStats {
        if self.needs_upload {
            backend.upload_vertices(&self.model.mesh.data.positions, &self.normals);
            self.needs_upload = false;
        }

        backend.clear();

        let delta = tracker.take_delta();
        if !delta.is_zero() {
            debug!("Applying rotation {:?}", delta);
        }
        self.orientation.apply(delta);

        backend.set_transforms(
            self.camera.projection_matrix(),
            self.camera.view_matrix(),
            self.orientation.model_matrix(),
        );

        let mut stats = FrameStats::default();
        for group in self.model.mesh.groups.iter() {
            if group.indices.is_empty() {
                continue;
            }
            let color = self
                .palette
                .resolve(group.material.as_deref(), &self.model.materials);
            backend.set_color(color);
            backend.draw_indexed(&group.indices);

            stats.draw_calls += 1;
            stats.triangles += group.triangle_count();
        }
        stats
    }
}
