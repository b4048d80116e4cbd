//! Orbit camera for the 3D viewport

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};
use vd_core::Ray;

use crate::config::CameraConfig;

/// Camera uniform buffer data
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    /// Projection times view
    pub view_proj: [[f32; 4]; 4],
    /// World to view
    pub view: [[f32; 4]; 4],
    /// View to clip
    pub proj: [[f32; 4]; 4],
    /// Eye position, w = 1
    pub eye: [f32; 4],
}

/// Orbit camera with +Y up
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye position
    pub position: Vec3,
    /// Orbit center
    pub target: Vec3,
    /// Up direction
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov: f32,
    /// Width over height
    pub aspect: f32,
    /// Near clipping plane distance
    pub near: f32,
    /// Far clipping plane distance
    pub far: f32,
    // Orbit state
    /// Rotation about +Y, zero looking down -Z
    pub yaw: f32,
    /// Elevation above the horizontal plane
    pub pitch: f32,
    /// Distance from target to eye
    pub distance: f32,
}

impl Camera {
    /// Create a camera from configuration
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let offset = config.eye - config.target;
        let distance = offset.length().max(0.1);
        let yaw = offset.x.atan2(offset.z);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();

        let mut camera = Self {
            position: config.eye,
            target: config.target,
            up: Vec3::Y,
            fov: config.fov_degrees.clamp(10.0, 120.0).to_radians(),
            aspect,
            near: config.near_plane.max(0.001),
            far: config.far_plane.max(config.near_plane + 1.0),
            yaw,
            pitch,
            distance,
        };
        camera.update_position_from_orbit();
        camera
    }

    /// Update aspect ratio
    pub fn update_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Orbit the camera around the target
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch =
            (self.pitch + delta_pitch).clamp(-89.0_f32.to_radians(), 89.0_f32.to_radians());
        self.update_position_from_orbit();
    }

    /// Zoom the camera
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance * (1.0 - delta * 0.1)).clamp(0.5, 50.0);
        self.update_position_from_orbit();
    }

    fn update_position_from_orbit(&mut self) {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.position = self.target + Vec3::new(x, y, z);
    }

    /// Unit view direction
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    /// Get view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Combined projection and view
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Pack the matrices for the GPU
    pub fn uniform(&self) -> CameraUniform {
        let view = self.view_matrix();
        let proj = self.projection_matrix();
        let view_proj = proj * view;

        CameraUniform {
            view_proj: view_proj.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            eye: [self.position.x, self.position.y, self.position.z, 1.0],
        }
    }

    /// Ray from the eye through a normalized device coordinate
    pub fn ndc_to_ray(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();

        // perspective_rh maps depth to [0, 1]
        let near = inverse * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
        let far = inverse * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;

        Ray::new(near, far - near)
    }

    /// Project a world point. Returns NDC x/y and the view-space depth,
    /// or `None` when the point is behind the near plane.
    pub fn project(&self, world: Vec3) -> Option<Vec3> {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w < self.near {
            return None;
        }
        Some(Vec3::new(clip.x / clip.w, clip.y / clip.w, clip.w))
    }

    /// Distance from the eye along the view direction
    pub fn depth_of(&self, world: Vec3) -> f32 {
        (world - self.position).dot(self.forward())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> Camera {
        Camera::new(&CameraConfig::default(), 4.0 / 3.0)
    }

    #[test]
    fn test_default_looks_down_negative_z() {
        let camera = camera();
        assert_relative_eq!(camera.position.y, 2.8, epsilon = 1e-5);
        assert_relative_eq!(camera.position.z, 6.6, epsilon = 1e-5);
        let forward = camera.forward();
        assert_relative_eq!(forward.z, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_center_ray_matches_forward() {
        let camera = camera();
        let ray = camera.ndc_to_ray(Vec2::ZERO);
        assert_relative_eq!(ray.direction.dot(camera.forward()), 1.0, epsilon = 1e-4);
        assert!(ray.origin.z < camera.position.z);
    }

    #[test]
    fn test_project_inverts_ray() {
        let camera = camera();
        let ndc = Vec2::new(0.3, -0.4);
        let ray = camera.ndc_to_ray(ndc);
        let point = ray.at(5.0);

        let projected = camera.project(point).unwrap();
        assert_relative_eq!(projected.x, ndc.x, epsilon = 1e-3);
        assert_relative_eq!(projected.y, ndc.y, epsilon = 1e-3);
    }

    #[test]
    fn test_point_behind_camera_not_projected() {
        let camera = camera();
        assert!(camera.project(Vec3::new(0.0, 2.8, 10.0)).is_none());
    }

    #[test]
    fn test_orbit_keeps_distance() {
        let mut camera = camera();
        camera.orbit(0.5, 0.2);
        assert_relative_eq!(camera.position.distance(camera.target), 6.6, epsilon = 1e-4);
    }

    #[test]
    fn test_uniform_carries_eye_and_view_projection() {
        let camera = camera();
        let uniform = camera.uniform();
        assert_eq!(uniform.eye, [camera.position.x, camera.position.y, camera.position.z, 1.0]);
        assert_eq!(
            Mat4::from_cols_array_2d(&uniform.view_proj),
            camera.view_projection()
        );
    }
}
