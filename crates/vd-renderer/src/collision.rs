//! Ray casting against primitive shapes
//!
//! Every test takes the ray already expressed in the primitive's local frame.
//! Cylinders and cones run along local +Z and are centered on the origin.
//! Each function returns the ray parameter of the nearest hit in front of the
//! origin, so the hit point is `ray_origin + t * ray_dir`.

use glam::{Vec2, Vec3};
use vd_core::VisualShape;

const EPSILON: f32 = 1e-6;

/// Ray test dispatched on the shape
pub fn ray_shape_intersection(ray_origin: Vec3, ray_dir: Vec3, shape: &VisualShape) -> Option<f32> {
    match *shape {
        VisualShape::Cuboid { size } => ray_box_intersection(ray_origin, ray_dir, size * 0.5),
        VisualShape::Sphere { radius } => {
            ray_sphere_intersection(ray_origin, ray_dir, Vec3::ZERO, radius)
        }
        VisualShape::Cylinder { radius, length } => {
            let half = Vec3::Z * (length * 0.5);
            nearest([
                ray_cylinder_intersection(ray_origin, ray_dir, -half, half, radius),
                ray_disk_intersection(ray_origin, ray_dir, half, radius),
                ray_disk_intersection(ray_origin, ray_dir, -half, radius),
            ])
        }
        VisualShape::Cone { radius, length } => nearest([
            ray_cone_intersection(ray_origin, ray_dir, radius, length),
            ray_disk_intersection(ray_origin, ray_dir, Vec3::Z * (length * 0.5), radius),
        ]),
    }
}

fn nearest<const N: usize>(hits: [Option<f32>; N]) -> Option<f32> {
    hits.into_iter().flatten().min_by(f32::total_cmp)
}

/// Ray-sphere intersection test.
///
/// A ray starting inside the sphere reports the exit point.
pub fn ray_sphere_intersection(
    ray_origin: Vec3,
    ray_dir: Vec3,
    center: Vec3,
    radius: f32,
) -> Option<f32> {
    let oc = ray_origin - center;
    let b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let t = -b - root;
    if t >= 0.0 {
        return Some(t);
    }
    let t = -b + root;
    (t >= 0.0).then_some(t)
}

/// Slab test against a box centered on the origin
pub fn ray_box_intersection(ray_origin: Vec3, ray_dir: Vec3, half_extents: Vec3) -> Option<f32> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let origin = ray_origin[axis];
        let dir = ray_dir[axis];
        let half = half_extents[axis];

        if dir.abs() < EPSILON {
            // Parallel to this slab
            if origin < -half || origin > half {
                return None;
            }
            continue;
        }

        let t1 = (-half - origin) / dir;
        let t2 = (half - origin) / dir;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
        if t_min > t_max {
            return None;
        }
    }

    if t_max < 0.0 {
        return None;
    }
    Some(if t_min >= 0.0 { t_min } else { t_max })
}

/// Ray-cylinder intersection test.
///
/// Tests the side surface of a finite cylinder between `cylinder_start` and
/// `cylinder_end`. Caps are not included.
///
/// The ray and the axis are projected onto the plane perpendicular to the
/// axis, which leaves a 2D circle test `at² + bt + c = 0`. The hit is then
/// accepted only if it falls between the two end points.
pub fn ray_cylinder_intersection(
    ray_origin: Vec3,
    ray_dir: Vec3,
    cylinder_start: Vec3,
    cylinder_end: Vec3,
    radius: f32,
) -> Option<f32> {
    let cylinder_axis = (cylinder_end - cylinder_start).normalize_or_zero();
    let cylinder_length = (cylinder_end - cylinder_start).length();
    if cylinder_length < EPSILON {
        return None;
    }

    let d = ray_dir - cylinder_axis * ray_dir.dot(cylinder_axis);
    let offset = ray_origin - cylinder_start;
    let o = offset - cylinder_axis * offset.dot(cylinder_axis);

    let a = d.dot(d);
    if a < EPSILON {
        // Ray runs along the axis and can only hit the caps
        return None;
    }
    let b = 2.0 * d.dot(o);
    let c = o.dot(o) - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    [(-b - root) / (2.0 * a), (-b + root) / (2.0 * a)]
        .into_iter()
        .filter(|t| *t >= 0.0)
        .find(|t| {
            let projection = (ray_origin + ray_dir * *t - cylinder_start).dot(cylinder_axis);
            (0.0..=cylinder_length).contains(&projection)
        })
}

/// Disk perpendicular to +Z at `center`
pub fn ray_disk_intersection(
    ray_origin: Vec3,
    ray_dir: Vec3,
    center: Vec3,
    radius: f32,
) -> Option<f32> {
    if ray_dir.z.abs() < EPSILON {
        return None;
    }

    let t = (center.z - ray_origin.z) / ray_dir.z;
    if t < 0.0 {
        return None;
    }

    let hit = ray_origin + ray_dir * t;
    let radial = Vec2::new(hit.x - center.x, hit.y - center.y);
    (radial.length_squared() <= radius * radius).then_some(t)
}

/// Side surface of a cone with its apex at `-length / 2` on the Z axis and a
/// base of `radius` at `+length / 2`
pub fn ray_cone_intersection(
    ray_origin: Vec3,
    ray_dir: Vec3,
    radius: f32,
    length: f32,
) -> Option<f32> {
    if length < EPSILON {
        return None;
    }

    let apex = -length * 0.5;
    let k = radius / length;
    let k2 = k * k;
    let oz = ray_origin.z - apex;

    // x² + y² = k² (z - apex)²
    let a = ray_dir.x * ray_dir.x + ray_dir.y * ray_dir.y - k2 * ray_dir.z * ray_dir.z;
    let b = 2.0 * (ray_origin.x * ray_dir.x + ray_origin.y * ray_dir.y - k2 * oz * ray_dir.z);
    let c = ray_origin.x * ray_origin.x + ray_origin.y * ray_origin.y - k2 * oz * oz;

    let mut roots = Vec::with_capacity(2);
    if a.abs() < EPSILON {
        if b.abs() > EPSILON {
            roots.push(-c / b);
        }
    } else {
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        roots.push((-b - root) / (2.0 * a));
        roots.push((-b + root) / (2.0 * a));
    }

    roots
        .into_iter()
        .filter(|t| *t >= 0.0)
        .filter(|t| {
            let z = ray_origin.z + ray_dir.z * *t - apex;
            (0.0..=length).contains(&z)
        })
        .min_by(f32::total_cmp)
}
