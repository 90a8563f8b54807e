use glam::{EulerRot, Mat4, Quat, Vec3};

/// Local transform of one scene node. Rotation is XYZ Euler angles in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Compose the local matrix as translation * rotation * scale.
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

/// World matrices for the children of a single group node.
/// The scene is one level deep, so `parent * local` is the full chain.
pub fn compute_world_transforms<'a>(
    parent: &Transform,
    children: impl IntoIterator<Item = &'a Transform> + 'a,
) -> impl Iterator<Item = Mat4> + 'a {
    let parent = parent.matrix();
    children.into_iter().map(move |child| parent * child.matrix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    const EPSILON: f32 = 1e-5;

    fn approx_vec(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_default_is_identity() {
        assert_eq!(Transform::default().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_scale_then_rotate_then_translate() {
        let t = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::new(0.0, FRAC_PI_2, 0.0),
            scale: Vec3::new(2.0, 1.0, 1.0),
        };
        // +X scaled to 2, yawed a quarter turn onto -Z, then translated.
        let p = t.matrix().transform_point3(Vec3::X);
        assert!(approx_vec(p, Vec3::new(1.0, 2.0, 1.0)), "{p}");
    }

    #[test]
    fn test_group_yaw_rotates_children_about_origin() {
        let group = Transform {
            rotation: Vec3::new(0.0, PI, 0.0),
            ..Default::default()
        };
        let child = Transform::from_position(Vec3::new(3.0, -2.0, 1.0));
        let world: Vec<Mat4> = compute_world_transforms(&group, [&child]).collect();
        assert_eq!(world.len(), 1);
        let p = world[0].transform_point3(Vec3::ZERO);
        assert!(approx_vec(p, Vec3::new(-3.0, -2.0, -1.0)), "{p}");
    }

    #[test]
    fn test_children_keep_their_own_scale() {
        let group = Transform::from_position(Vec3::new(0.0, 1.0, 0.0));
        let bar = Transform {
            scale: Vec3::new(1.0, 3.0, 1.0),
            ..Default::default()
        };
        let world: Vec<Mat4> = compute_world_transforms(&group, [&bar]).collect();
        let top = world[0].transform_point3(Vec3::Y);
        assert!(approx_vec(top, Vec3::new(0.0, 4.0, 0.0)));
    }
}
