// Scene graph and one-time scene construction

use glam::{Mat4, Vec3};
use std::f32::consts::{FRAC_PI_2, SQRT_2};

use crate::math::{deg_to_rad, Transform};
use crate::mesh::MeshData;

const GOAL_HEIGHT: f32 = 1.0;
const TUBE_RADIUS: f32 = 0.05;
const SEGMENTS: u32 = 32;

const SHOES_HEIGHT: f32 = 0.08;
const LEGS_HEIGHT: f32 = GOAL_HEIGHT / 4.0;
const UPPER_BODY_HEIGHT: f32 = LEGS_HEIGHT;
const NECK_HEIGHT: f32 = LEGS_HEIGHT / 7.0;
const HEAD_HEIGHT: f32 = 5.0 * NECK_HEIGHT;
const HANDS_HEIGHT: f32 = LEGS_HEIGHT;

/// Scene palette, sRGB hex.
mod colors {
    pub const WHITE: u32 = 0xffffff;
    pub const NET: u32 = 0xd3d3d3;
    pub const BLACK: u32 = 0x000000;
    pub const SHIRT: u32 = 0x0000ff;
    pub const SKIN: u32 = 0xffdbac;
    pub const GLOVE: u32 = 0xffd700;
    pub const MOUTH: u32 = 0x660000;
    pub const GRID: u32 = 0x444444;
    pub const AXIS_X: u32 = 0xff0000;
    pub const AXIS_Y: u32 = 0x00ff00;
    pub const AXIS_Z: u32 = 0x0000ff;
    pub const BACKGROUND: u32 = 0x228b22; // ForestGreen
}

/// Decode an sRGB hex color into linear RGBA.
pub fn color(hex: u32) -> [f32; 4] {
    let channel = |c: u32| {
        let c = c as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [
        channel((hex >> 16) & 0xff),
        channel((hex >> 8) & 0xff),
        channel(hex & 0xff),
        1.0,
    ]
}

#[derive(Debug, Clone, Copy)]
pub struct Material {
    pub color: [f32; 4],
    pub wireframe: bool,
    pub unlit: bool,
}

impl Material {
    fn lit(hex: u32) -> Self {
        Self {
            color: color(hex),
            wireframe: false,
            unlit: false,
        }
    }

    fn line(hex: u32) -> Self {
        Self {
            color: color(hex),
            wireframe: false,
            unlit: true,
        }
    }
}

/// A renderable part: baked geometry, a material, and an object transform.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: &'static str,
    pub mesh: MeshData,
    pub material: Material,
    pub transform: Transform,
}

impl SceneNode {
    fn new(name: &'static str, mesh: MeshData, material: Material) -> Self {
        Self {
            name,
            mesh,
            material,
            transform: Transform::identity(),
        }
    }
}

/// Parts under a shared group transform, exclusively owned.
#[derive(Debug, Clone)]
pub struct Group {
    pub transform: Transform,
    pub nodes: Vec<SceneNode>,
}

impl Group {
    fn new(nodes: Vec<SceneNode>) -> Self {
        Self {
            transform: Transform::identity(),
            nodes,
        }
    }
}

/// The whole scene: goal (skeleton + nets), ball, goalkeeper, plus
/// grid/axes helpers that sit outside the wireframe toggle.
#[derive(Debug, Clone)]
pub struct Scene {
    pub goal: Group,
    pub ball: SceneNode,
    pub goalkeeper: Group,
    pub helpers: Vec<SceneNode>,
    pub background: [f32; 4],
}

impl Scene {
    /// One-time deterministic construction; no runtime inputs, cannot fail.
    pub fn build() -> Self {
        Self {
            goal: Group::new(build_goal()),
            ball: build_ball(),
            goalkeeper: Group::new(build_goalkeeper()),
            helpers: build_helpers(),
            background: color(colors::BACKGROUND),
        }
    }

    /// Every material covered by the wireframe toggle: goal skeleton, nets,
    /// ball, and all goalkeeper parts. Helper lines are excluded.
    pub fn tracked_materials_mut(&mut self) -> impl Iterator<Item = &mut Material> {
        self.goal
            .nodes
            .iter_mut()
            .map(|n| &mut n.material)
            .chain(std::iter::once(&mut self.ball.material))
            .chain(self.goalkeeper.nodes.iter_mut().map(|n| &mut n.material))
    }

    /// All nodes with their effective model matrices, in a stable order.
    pub fn nodes_with_models(&self) -> impl Iterator<Item = (&SceneNode, Mat4)> {
        let goal_matrix = self.goal.transform.matrix();
        let keeper_matrix = self.goalkeeper.transform.matrix();
        self.goal
            .nodes
            .iter()
            .map(move |n| (n, goal_matrix * n.transform.matrix()))
            .chain(std::iter::once((&self.ball, self.ball.transform.matrix())))
            .chain(
                self.goalkeeper
                    .nodes
                    .iter()
                    .map(move |n| (n, keeper_matrix * n.transform.matrix())),
            )
            .chain(self.helpers.iter().map(|n| (n, n.transform.matrix())))
    }
}

fn build_goal() -> Vec<SceneNode> {
    let mut nodes = Vec::new();

    // Crossbar, rotated onto the X axis and lifted to the bar height.
    let mut crossbar = MeshData::cylinder(TUBE_RADIUS, 3.0, SEGMENTS);
    crossbar.apply_matrix(Mat4::from_rotation_z(FRAC_PI_2));
    crossbar.apply_matrix(Mat4::from_translation(Vec3::new(0.0, GOAL_HEIGHT, 0.0)));
    nodes.push(SceneNode::new("crossbar", crossbar, Material::lit(colors::WHITE)));

    // Posts, cloned across the goal mouth.
    let mut left_post = MeshData::cylinder(TUBE_RADIUS, GOAL_HEIGHT, SEGMENTS);
    left_post.apply_matrix(Mat4::from_translation(Vec3::new(-1.5, 0.5, 0.0)));
    let right_post = left_post.translated(3.0, 0.0, 0.0);
    nodes.push(SceneNode::new("left_post", left_post, Material::lit(colors::WHITE)));
    nodes.push(SceneNode::new("right_post", right_post, Material::lit(colors::WHITE)));

    // Post edge rings at the feet.
    let mut left_post_edge = MeshData::torus(TUBE_RADIUS, TUBE_RADIUS, 2, SEGMENTS);
    left_post_edge.apply_matrix(Mat4::from_rotation_x(FRAC_PI_2));
    left_post_edge.apply_matrix(Mat4::from_translation(Vec3::new(-1.5, 0.0, 0.0)));
    let right_post_edge = left_post_edge.translated(3.0, 0.0, 0.0);
    nodes.push(SceneNode::new(
        "left_post_edge",
        left_post_edge,
        Material::lit(colors::WHITE),
    ));
    nodes.push(SceneNode::new(
        "right_post_edge",
        right_post_edge,
        Material::lit(colors::WHITE),
    ));

    // Back supports: upright behind the post, then slanted 45 degrees about
    // X around the pivot at the support's foot.
    let mut left_support = MeshData::cylinder(TUBE_RADIUS, SQRT_2, SEGMENTS);
    left_support.apply_matrix(Mat4::from_translation(Vec3::new(-1.5, SQRT_2 / 2.0, -1.0)));
    let pivot = Mat4::from_translation(Vec3::new(1.5, 0.0, 1.0));
    left_support.apply_matrix(pivot);
    left_support.apply_matrix(Mat4::from_rotation_x(deg_to_rad(45.0)));
    left_support.apply_matrix(pivot.inverse());
    let right_support = left_support.translated(3.0, 0.0, 0.0);
    nodes.push(SceneNode::new(
        "left_back_support",
        left_support,
        Material::lit(colors::WHITE),
    ));
    nodes.push(SceneNode::new(
        "right_back_support",
        right_support,
        Material::lit(colors::WHITE),
    ));

    // Edge rings where the supports meet the ground.
    let mut left_support_edge = MeshData::torus(TUBE_RADIUS, TUBE_RADIUS, 2, SEGMENTS);
    left_support_edge.apply_matrix(Mat4::from_rotation_x(FRAC_PI_2));
    left_support_edge.apply_matrix(Mat4::from_translation(Vec3::new(-1.5, 0.0, -1.0)));
    let right_support_edge = left_support_edge.translated(3.0, 0.0, 0.0);
    nodes.push(SceneNode::new(
        "left_back_support_edge",
        left_support_edge,
        Material::lit(colors::WHITE),
    ));
    nodes.push(SceneNode::new(
        "right_back_support_edge",
        right_support_edge,
        Material::lit(colors::WHITE),
    ));

    // Back net: a thin slab hung from the crossbar down to the ground back
    // edge, slanted with the supports.
    let rect_height = SQRT_2;
    let mut back_net = MeshData::cuboid(3.0, rect_height, 0.02);
    back_net.apply_matrix(Mat4::from_translation(Vec3::new(
        0.0,
        0.5 * rect_height,
        -1.0,
    )));
    let net_pivot = Mat4::from_translation(Vec3::new(0.0, 0.0, 1.0));
    back_net.apply_matrix(net_pivot);
    back_net.apply_matrix(Mat4::from_rotation_x(deg_to_rad(45.0)));
    back_net.apply_matrix(net_pivot.inverse());
    nodes.push(SceneNode::new("back_net", back_net, Material::lit(colors::NET)));

    // Triangular side nets, double-sided.
    let right_triangle_net = MeshData::triangle(
        Vec3::new(1.5, 0.0, 0.0),
        Vec3::new(1.5, 0.0, -1.0),
        Vec3::new(1.5, 1.0, 0.0),
    );
    let left_triangle_net = right_triangle_net.translated(-3.0, 0.0, 0.0);
    nodes.push(SceneNode::new(
        "right_triangle_net",
        right_triangle_net,
        Material::lit(colors::NET),
    ));
    nodes.push(SceneNode::new(
        "left_triangle_net",
        left_triangle_net,
        Material::lit(colors::NET),
    ));

    nodes
}

fn build_ball() -> SceneNode {
    // Geometry stays at the origin; the offset lives in the node transform
    // so the spin animation carries the offset around with it.
    let mesh = MeshData::sphere(GOAL_HEIGHT / 16.0, SEGMENTS, SEGMENTS);
    let mut ball = SceneNode::new("ball", mesh, Material::lit(colors::BLACK));
    ball.transform = Transform::from_translation(Vec3::new(0.0, GOAL_HEIGHT / 16.0, 1.0));
    ball
}

fn build_goalkeeper() -> Vec<SceneNode> {
    let mut nodes = Vec::new();

    let mut left_shoe = MeshData::cuboid(SHOES_HEIGHT, SHOES_HEIGHT, 2.0 * SHOES_HEIGHT);
    left_shoe.apply_matrix(Mat4::from_translation(Vec3::new(
        -0.075,
        SHOES_HEIGHT / 2.0,
        0.02,
    )));
    let right_shoe = left_shoe.translated(0.15, 0.0, 0.0);
    nodes.push(SceneNode::new("left_shoe", left_shoe, Material::lit(colors::BLACK)));
    nodes.push(SceneNode::new("right_shoe", right_shoe, Material::lit(colors::BLACK)));

    let mut left_leg = MeshData::cylinder(0.03, LEGS_HEIGHT, SEGMENTS);
    left_leg.apply_matrix(Mat4::from_translation(Vec3::new(
        -0.075,
        LEGS_HEIGHT / 2.0 + SHOES_HEIGHT,
        0.0,
    )));
    let right_leg = left_leg.translated(0.15, 0.0, 0.0);
    nodes.push(SceneNode::new("left_leg", left_leg, Material::lit(colors::SHIRT)));
    nodes.push(SceneNode::new("right_leg", right_leg, Material::lit(colors::SHIRT)));

    let mut upper_body = MeshData::cuboid(
        UPPER_BODY_HEIGHT,
        UPPER_BODY_HEIGHT,
        UPPER_BODY_HEIGHT / 3.0,
    );
    upper_body.apply_matrix(Mat4::from_translation(Vec3::new(
        0.0,
        UPPER_BODY_HEIGHT / 2.0 + LEGS_HEIGHT + SHOES_HEIGHT,
        0.0,
    )));
    nodes.push(SceneNode::new("upper_body", upper_body, Material::lit(colors::SHIRT)));

    let mut neck = MeshData::cylinder(0.03, NECK_HEIGHT, SEGMENTS);
    neck.apply_matrix(Mat4::from_translation(Vec3::new(
        0.0,
        NECK_HEIGHT / 2.0 + UPPER_BODY_HEIGHT + LEGS_HEIGHT + SHOES_HEIGHT,
        0.0,
    )));
    nodes.push(SceneNode::new("neck", neck, Material::lit(colors::SKIN)));

    let head_y = HEAD_HEIGHT / 2.0 + NECK_HEIGHT + UPPER_BODY_HEIGHT + LEGS_HEIGHT + SHOES_HEIGHT;
    let mut head = MeshData::sphere(HEAD_HEIGHT / 2.0, SEGMENTS, SEGMENTS);
    head.apply_matrix(Mat4::from_translation(Vec3::new(0.0, head_y, 0.0)));
    nodes.push(SceneNode::new("head", head, Material::lit(colors::SKIN)));

    // Arms spread outward, tilted 30 degrees off vertical.
    let hands_y = HANDS_HEIGHT / 2.0 + UPPER_BODY_HEIGHT * 0.75 + LEGS_HEIGHT + SHOES_HEIGHT;
    let mut left_hand = MeshData::cylinder(0.03, HANDS_HEIGHT, SEGMENTS);
    left_hand.apply_matrix(Mat4::from_rotation_z(deg_to_rad(-30.0)));
    left_hand.apply_matrix(Mat4::from_translation(Vec3::new(
        UPPER_BODY_HEIGHT * 0.6,
        hands_y,
        0.0,
    )));
    let mut right_hand = MeshData::cylinder(0.03, HANDS_HEIGHT, SEGMENTS);
    right_hand.apply_matrix(Mat4::from_rotation_z(deg_to_rad(30.0)));
    right_hand.apply_matrix(Mat4::from_translation(Vec3::new(
        UPPER_BODY_HEIGHT * -0.6,
        hands_y,
        0.0,
    )));
    nodes.push(SceneNode::new("left_hand", left_hand, Material::lit(colors::SHIRT)));
    nodes.push(SceneNode::new("right_hand", right_hand, Material::lit(colors::SHIRT)));

    let glove_width = 0.08;
    let gloves_y = HANDS_HEIGHT + UPPER_BODY_HEIGHT * 0.75 + LEGS_HEIGHT + SHOES_HEIGHT;
    let mut left_glove = MeshData::cuboid(glove_width, 0.1, 0.08);
    left_glove.apply_matrix(Mat4::from_rotation_z(deg_to_rad(-30.0)));
    left_glove.apply_matrix(Mat4::from_translation(Vec3::new(
        UPPER_BODY_HEIGHT * 0.6 + glove_width,
        gloves_y,
        0.0,
    )));
    let mut right_glove = MeshData::cuboid(glove_width, 0.1, 0.08);
    right_glove.apply_matrix(Mat4::from_rotation_z(deg_to_rad(30.0)));
    right_glove.apply_matrix(Mat4::from_translation(Vec3::new(
        UPPER_BODY_HEIGHT * -0.6 - glove_width,
        gloves_y,
        0.0,
    )));
    nodes.push(SceneNode::new("left_glove", left_glove, Material::lit(colors::GLOVE)));
    nodes.push(SceneNode::new("right_glove", right_glove, Material::lit(colors::GLOVE)));

    // Face features are positioned relative to the head center, then carried
    // through the head's translation.
    let head_matrix = Mat4::from_translation(Vec3::new(0.0, head_y, 0.0));
    let mut mouth = MeshData::cuboid(HEAD_HEIGHT * 0.5, HEAD_HEIGHT * 0.05, 0.02);
    mouth.apply_matrix(Mat4::from_translation(Vec3::new(
        0.0,
        -0.03,
        HEAD_HEIGHT * 0.5,
    )));
    mouth.apply_matrix(head_matrix);
    nodes.push(SceneNode::new("mouth", mouth, Material::lit(colors::MOUTH)));

    let mut left_eye = MeshData::sphere(HEAD_HEIGHT * 0.1, SEGMENTS, SEGMENTS);
    left_eye.apply_matrix(Mat4::from_translation(Vec3::new(
        HEAD_HEIGHT * -0.2,
        HEAD_HEIGHT * 0.1,
        HEAD_HEIGHT * 0.35,
    )));
    left_eye.apply_matrix(head_matrix);
    let right_eye = left_eye.translated(HEAD_HEIGHT * 0.4, 0.0, 0.0);
    nodes.push(SceneNode::new("left_eye", left_eye, Material::lit(colors::BLACK)));
    nodes.push(SceneNode::new("right_eye", right_eye, Material::lit(colors::BLACK)));

    nodes
}

fn build_helpers() -> Vec<SceneNode> {
    let mut nodes = Vec::new();

    nodes.push(SceneNode::new(
        "grid",
        MeshData::grid(10.0, 10),
        Material::line(colors::GRID),
    ));
    nodes.push(SceneNode::new(
        "grid_center",
        MeshData::lines(&[
            (Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0)),
            (Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 5.0)),
        ]),
        Material::line(colors::BLACK),
    ));

    // Axes sit just above the grid so they stay visible.
    let axis_y = 0.01;
    let axes: [(&'static str, Vec3, u32); 3] = [
        ("axis_x", Vec3::X, colors::AXIS_X),
        ("axis_y", Vec3::Y, colors::AXIS_Y),
        ("axis_z", Vec3::Z, colors::AXIS_Z),
    ];
    for (name, dir, hex) in axes {
        let origin = Vec3::new(0.0, axis_y, 0.0);
        nodes.push(SceneNode::new(
            name,
            MeshData::lines(&[(origin, origin + dir * 5.0)]),
            Material::line(hex),
        ));
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn scene_has_expected_part_counts() {
        let scene = Scene::build();
        assert_eq!(scene.goal.nodes.len(), 12); // 9 skeleton + 3 nets
        assert_eq!(scene.goalkeeper.nodes.len(), 14);
        assert_eq!(scene.helpers.len(), 5);
    }

    #[test]
    fn tracked_materials_cover_goal_ball_and_goalkeeper() {
        let mut scene = Scene::build();
        assert_eq!(scene.tracked_materials_mut().count(), 12 + 1 + 14);
    }

    #[test]
    fn crossbar_spans_goal_mouth_at_bar_height() {
        let scene = Scene::build();
        let crossbar = &scene.goal.nodes[0];
        assert_eq!(crossbar.name, "crossbar");
        let (min, max) = crossbar.mesh.bounds();
        assert_relative_eq!(min.x, -1.5, epsilon = 1e-4);
        assert_relative_eq!(max.x, 1.5, epsilon = 1e-4);
        assert_relative_eq!(min.y, 1.0 - TUBE_RADIUS, epsilon = 1e-3);
        assert_relative_eq!(max.y, 1.0 + TUBE_RADIUS, epsilon = 1e-3);
    }

    #[test]
    fn posts_are_mirrored_about_center() {
        let scene = Scene::build();
        let left = scene.goal.nodes.iter().find(|n| n.name == "left_post").unwrap();
        let right = scene.goal.nodes.iter().find(|n| n.name == "right_post").unwrap();
        let (lmin, lmax) = left.mesh.bounds();
        let (rmin, rmax) = right.mesh.bounds();
        assert_relative_eq!(lmin.x + rmax.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(lmax.x + rmin.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(lmin.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(lmax.y, GOAL_HEIGHT, epsilon = 1e-4);
    }

    #[test]
    fn back_supports_reach_ground_behind_goal() {
        let scene = Scene::build();
        let support = scene
            .goal
            .nodes
            .iter()
            .find(|n| n.name == "left_back_support")
            .unwrap();
        let (min, max) = support.mesh.bounds();
        // Slanted 45 degrees: from the crossbar corner down to z = -1.
        assert!(min.z < -1.0 && min.z > -1.1);
        assert!(max.y > GOAL_HEIGHT && max.y < GOAL_HEIGHT + 0.1);
        assert!(min.y < 0.01);
        assert_relative_eq!(min.x, -1.5 - TUBE_RADIUS, epsilon = 1e-3);
    }

    #[test]
    fn ball_rests_in_front_of_goal_at_its_radius() {
        let scene = Scene::build();
        let m = scene.ball.transform.matrix();
        assert_relative_eq!(m.w_axis.x, 0.0);
        assert_relative_eq!(m.w_axis.y, GOAL_HEIGHT / 16.0);
        assert_relative_eq!(m.w_axis.z, 1.0);
        // Geometry itself stays centered at the origin.
        let (min, max) = scene.ball.mesh.bounds();
        assert_relative_eq!(min.x + max.x, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn goalkeeper_parts_stack_from_shoes_to_head() {
        let scene = Scene::build();
        let top_of = |name: &str| {
            let node = scene
                .goalkeeper
                .nodes
                .iter()
                .find(|n| n.name == name)
                .unwrap();
            node.mesh.bounds().1.y
        };
        assert_relative_eq!(top_of("left_shoe"), SHOES_HEIGHT, epsilon = 1e-5);
        assert_relative_eq!(top_of("left_leg"), SHOES_HEIGHT + LEGS_HEIGHT, epsilon = 1e-5);
        assert_relative_eq!(
            top_of("upper_body"),
            SHOES_HEIGHT + LEGS_HEIGHT + UPPER_BODY_HEIGHT,
            epsilon = 1e-5
        );
        assert_relative_eq!(
            top_of("head"),
            SHOES_HEIGHT + LEGS_HEIGHT + UPPER_BODY_HEIGHT + NECK_HEIGHT + HEAD_HEIGHT,
            epsilon = 1e-5
        );
    }

    #[test]
    fn helpers_are_unlit_and_untracked() {
        let mut scene = Scene::build();
        for material in scene.tracked_materials_mut() {
            material.wireframe = true;
        }
        assert!(scene.helpers.iter().all(|n| n.material.unlit));
        assert!(scene.helpers.iter().all(|n| !n.material.wireframe));
        assert!(scene.ball.material.wireframe);
    }

    #[test]
    fn node_model_matrices_follow_group_transforms() {
        let mut scene = Scene::build();
        scene
            .goalkeeper
            .transform
            .apply(Mat4::from_translation(Vec3::new(0.3, 0.0, 0.0)));
        let (_, model) = scene
            .nodes_with_models()
            .find(|(n, _)| n.name == "upper_body")
            .unwrap();
        assert_relative_eq!(model.w_axis.x, 0.3, epsilon = 1e-6);
        // Goal nodes are unaffected.
        let (_, goal_model) = scene
            .nodes_with_models()
            .find(|(n, _)| n.name == "crossbar")
            .unwrap();
        assert_relative_eq!(goal_model.w_axis.x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn background_is_forest_green() {
        let scene = Scene::build();
        // Green channel dominates.
        assert!(scene.background[1] > scene.background[0]);
        assert!(scene.background[1] > scene.background[2]);
    }
}
